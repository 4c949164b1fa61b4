// -----------------------------------------------------------------------------
// RegistryConfig

/// Size in bytes of a full userdata header of a 64-bit Lua 5.4 build.
pub const LUA_USERDATA_HEADER_SIZE: usize = 40;

/// Runtime options of a [`ClassRegistry`](super::ClassRegistry).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Bytes the scripting runtime places in front of userdata memory.
    /// Value structs get enough padding after this header to satisfy
    /// their alignment.
    pub userdata_header_size: usize,

    /// Also cache inherited members at the descriptor a lookup was issued
    /// against, not only at the declaring ancestor.
    ///
    /// Repeated lookups through a subclass then hit its own cache instead of
    /// delegating every time. Handles keep pointing at the declaring
    /// ancestor either way.
    pub cache_at_query: bool,
}

impl Default for RegistryConfig {
    #[inline]
    fn default() -> Self {
        Self {
            userdata_header_size: LUA_USERDATA_HEADER_SIZE,
            cache_at_query: false,
        }
    }
}
