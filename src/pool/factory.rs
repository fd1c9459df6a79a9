use super::errors::PoolResult;

/// Callbacks a [`BoundedObjectPool`](super::BoundedObjectPool) uses to manage its objects
///
/// - `make_object` creates a ready-to-use (initialised, not yet activated) object
/// - `validate_object` decides whether a returned object may be reused
/// - `activate_object` runs on every borrow
/// - `passivate_object` runs on every return and after creation
/// - `destroy_object` releases the object for good and must not fail
pub trait PooledObjectFactory: Send + Sync {
    type Object: Send;

    fn make_object(&self) -> PoolResult<Self::Object>;

    fn validate_object(&self, object: &Self::Object) -> bool;

    fn activate_object(&self, object: &mut Self::Object) -> PoolResult<()>;

    fn passivate_object(&self, object: &mut Self::Object) -> PoolResult<()>;

    fn destroy_object(&self, object: Self::Object);
}
