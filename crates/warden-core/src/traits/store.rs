use crate::errors::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable key/value contract the trust engine persists profiles through.
///
/// Not required to be transactional across keys. Keys are `/`-separated;
/// `list(namespace)` returns every key starting with `namespace/`.
pub trait IStore: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    /// Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> StoreResult<()>;
    fn list(&self, namespace: &str) -> StoreResult<Vec<String>>;
    fn exists(&self, key: &str) -> StoreResult<bool>;
}
