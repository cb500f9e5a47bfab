//! Marker trait for services held by a container

/// Marker trait for types that can be stored in a container or wrapped in a
/// [`Value::Object`](crate::Value::Object).
///
/// This is automatically implemented for all types that are `Send + Sync + 'static`.
pub trait Injectable: Send + Sync + 'static {
    /// Identifier used when the type is registered without an explicit one
    #[inline]
    fn identifier() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

// Blanket implementation - everything that's Send + Sync + 'static is Injectable
impl<T: Send + Sync + 'static> Injectable for T {}
