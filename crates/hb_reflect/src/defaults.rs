//! Default argument values for native callables.
//!
//! Native reflection data usually drops the default values of function
//! parameters. Embedders collect them ahead of time (typically from header
//! metadata) into a [`DefaultParams`] table:
//!
//! ```text
//! class name ──► FunctionCollection
//!                  function name ──► ParameterCollection
//!                                      parameter name ──► DefaultValue
//! ```
//!
//! Tables are plain `serde` data and can be loaded from any format.
//!
//! # Examples
//!
//! ```
//! use hb_reflect::defaults::{DefaultParams, DefaultValue};
//!
//! let mut defaults = DefaultParams::new();
//! defaults
//!     .class_mut("AActor")
//!     .function_mut("SetLifeSpan")
//!     .insert("InLifespan", DefaultValue::Float(0.0));
//!
//! let functions = defaults.find("AActor").unwrap();
//! let params = functions.find("SetLifeSpan").unwrap();
//! assert_eq!(params.get("InLifespan"), Some(&DefaultValue::Float(0.0)));
//! ```

use alloc::string::String;
use alloc::sync::Arc;

use hb_utils::hash::HashMap;
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// DefaultValue

/// A literal default argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// An interned host name, kept as text.
    Name(String),
}

// -----------------------------------------------------------------------------
// ParameterCollection

/// Default values of one callable, keyed by parameter name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterCollection {
    params: HashMap<String, DefaultValue>,
}

impl ParameterCollection {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default of a parameter, returning the previous one.
    pub fn insert(&mut self, param: &str, value: DefaultValue) -> Option<DefaultValue> {
        self.params.insert(param.into(), value)
    }

    #[inline]
    pub fn get(&self, param: &str) -> Option<&DefaultValue> {
        self.params.get(param)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DefaultValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }
}

// -----------------------------------------------------------------------------
// FunctionCollection

/// Default-argument sets of one class, keyed by function name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionCollection {
    functions: HashMap<String, Arc<ParameterCollection>>,
}

impl FunctionCollection {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn find(&self, function: &str) -> Option<&Arc<ParameterCollection>> {
        self.functions.get(function)
    }

    /// Returns the collection of a function, creating an empty one if needed.
    ///
    /// Collections already handed out to descriptors are left untouched;
    /// the edit lands in a fresh copy.
    pub fn function_mut(&mut self, function: &str) -> &mut ParameterCollection {
        let params = self.functions.entry(function.into()).or_default();
        Arc::make_mut(params)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

// -----------------------------------------------------------------------------
// DefaultParams

/// The default-parameter table, keyed by descriptor (metatable) name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefaultParams {
    classes: HashMap<String, Arc<FunctionCollection>>,
}

impl DefaultParams {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn find(&self, class: &str) -> Option<&Arc<FunctionCollection>> {
        self.classes.get(class)
    }

    /// Returns the collection of a class, creating an empty one if needed.
    ///
    /// Like [`FunctionCollection::function_mut`], this never mutates data
    /// already shared with a descriptor.
    pub fn class_mut(&mut self, class: &str) -> &mut FunctionCollection {
        let functions = self.classes.entry(class.into()).or_default();
        Arc::make_mut(functions)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultParams, DefaultValue};
    use alloc::sync::Arc;

    #[test]
    fn shared_collections_are_not_mutated() {
        let mut defaults = DefaultParams::new();
        defaults
            .class_mut("UKismetSystemLibrary")
            .function_mut("PrintString")
            .insert("Duration", DefaultValue::Float(2.0));

        let shared = Arc::clone(
            defaults
                .find("UKismetSystemLibrary")
                .unwrap()
                .find("PrintString")
                .unwrap(),
        );

        defaults
            .class_mut("UKismetSystemLibrary")
            .function_mut("PrintString")
            .insert("Duration", DefaultValue::Float(5.0));

        assert_eq!(shared.get("Duration"), Some(&DefaultValue::Float(2.0)));
        let current = defaults.find("UKismetSystemLibrary").unwrap();
        let params = current.find("PrintString").unwrap();
        assert_eq!(params.get("Duration"), Some(&DefaultValue::Float(5.0)));
    }

    #[test]
    fn load_from_json() {
        let json = r#"{
            "AActor": {
                "SetLifeSpan": { "InLifespan": { "Float": 0.0 } },
                "K2_DestroyActor": {}
            },
            "UKismetSystemLibrary": {
                "PrintString": {
                    "bPrintToScreen": { "Bool": true },
                    "Key": { "Name": "None" }
                }
            }
        }"#;

        let defaults: DefaultParams = serde_json::from_str(json).unwrap();
        assert_eq!(defaults.len(), 2);

        let actor = defaults.find("AActor").unwrap();
        assert_eq!(actor.len(), 2);
        assert!(actor.find("K2_DestroyActor").unwrap().is_empty());

        let print = defaults
            .find("UKismetSystemLibrary")
            .unwrap()
            .find("PrintString")
            .unwrap();
        assert_eq!(print.get("bPrintToScreen"), Some(&DefaultValue::Bool(true)));
        assert_eq!(print.get("Key"), Some(&DefaultValue::Name("None".into())));
        assert_eq!(print.get("Duration"), None);
    }
}
