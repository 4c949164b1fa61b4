use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::defaults::{DefaultValue, ParameterCollection};
use crate::native::{FunctionId, NativeTypes, ParamInfo};

// -----------------------------------------------------------------------------
// FunctionDesc

/// A callable member registered on a [`ClassDesc`](super::ClassDesc).
#[derive(Clone, Debug)]
pub struct FunctionDesc {
    function: FunctionId,
    name: String,
    params: Vec<ParamInfo>,
    // Shared with the default-parameter table.
    defaults: Option<Arc<ParameterCollection>>,
}

impl FunctionDesc {
    /// Captures a native callable and its optional default arguments.
    pub fn new<H: NativeTypes + ?Sized>(
        native: &H,
        function: FunctionId,
        defaults: Option<Arc<ParameterCollection>>,
    ) -> Self {
        let info = native.function_info(function);
        Self {
            function,
            name: info.name.clone(),
            params: info.params.clone(),
            defaults,
        }
    }

    #[inline]
    pub const fn function(&self) -> FunctionId {
        self.function
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters, the return slot included.
    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Number of parameters a caller passes, the return slot excluded.
    pub fn num_args(&self) -> usize {
        self.params.iter().filter(|p| !p.is_return).count()
    }

    pub fn has_return(&self) -> bool {
        self.params.iter().any(|p| p.is_return)
    }

    #[inline]
    pub fn defaults(&self) -> Option<&ParameterCollection> {
        self.defaults.as_deref()
    }

    /// The default value of a parameter, if the table provides one.
    pub fn default_arg(&self, param: &str) -> Option<&DefaultValue> {
        self.defaults.as_ref()?.get(param)
    }
}
