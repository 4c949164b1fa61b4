slotmap::new_key_type! {
    /// A key of a [`ClassDesc`](super::ClassDesc) inside its registry.
    ///
    /// Keys are non-owning. Once the registry evicts a descriptor, every
    /// copy of its key is stale: lookups return `None` rather than reaching
    /// another descriptor.
    pub struct DescId;
}
