// Service exports
pub mod cache;
pub mod notifier;
pub mod store;

pub use cache::{CacheError, CacheKey, ProfileCache};
pub use notifier::{MemorySink, Notification, NotificationKind, NotificationSink, RedisSink, TracingSink};
pub use store::{EdgeKind, MemoryStore, PgStore, RelationStore, StoreError};
