// ── Synchronized stores ──
//
// One store per entity type, publishing collection snapshots through
// `watch` channels.

mod collection;
mod subscription;
mod synced;

pub use collection::{CollectionSnapshot, DataSource};
pub use subscription::{CollectionSubscription, SnapshotStream};
pub use synced::{FetchOutcome, SyncedCollectionStore};
