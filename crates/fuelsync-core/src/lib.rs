//! Offline-tolerant data layer between `fuelsync-api` and UI consumers.
//!
//! - **[`Console`]**: Facade wiring one backend session into the three
//!   managed collections: stations, users and washing-bay entries.
//!
//! - **[`SyncedCollectionStore<T>`]**: Canonical collection + statistics for
//!   one entity type. Each fetch consults the [`ConnectionStatusProvider`]
//!   and reads either the backend or the [`FallbackRepository`]; results are
//!   published as [`CollectionSnapshot`]s through `watch` channels.
//!
//! - **[`MutationCoordinator<T>`]**: Single-flight create/update/delete/
//!   status/assign/unassign. Online mutations are followed by a forced
//!   refetch; offline ones are applied to the fallback repository according
//!   to the [`OfflineMutationPolicy`].
//!
//! - **[`FilterDebouncer<T>`]**: Collapses rapid filter edits into one
//!   forced fetch after a quiet window.
//!
//! - **Domain model** ([`model`]): [`Station`], [`User`],
//!   [`WashingBayEntry`], their drafts/patches/statistics, and the shared
//!   [`FilterSet`] and [`EntityId`] types. Per-type behavior lives behind the
//!   [`EntityKind`] trait.

pub mod config;
pub mod connection;
pub mod console;
pub mod debounce;
pub mod entity;
pub mod error;
pub mod fallback;
pub mod manager;
pub mod model;
pub mod mutation;
pub mod notify;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEBOUNCE_WINDOW, OfflineMutationPolicy, SyncConfig, TlsVerification};
pub use connection::{ConnectionStatusProvider, ProbingStatusProvider, StaticStatusProvider};
pub use console::Console;
pub use debounce::FilterDebouncer;
pub use entity::{Assignee, EntityKind};
pub use error::{ApiError, ErrorCode};
pub use fallback::{FallbackRepository, InMemoryRepository};
pub use manager::{EntityManager, SharedParts};
pub use mutation::{MutationCoordinator, MutationIntent, MutationKind, MutationOutcome, MutationState};
pub use notify::{CollectingSink, Notification, NotificationLevel, NotificationSink, TracingSink};
pub use store::{
    CollectionSnapshot, CollectionSubscription, DataSource, FetchOutcome, SnapshotStream, SyncedCollectionStore,
};

// Transport types consumers need alongside the core.
pub use fuelsync_api::{BodyPolicy, ConnectionStatus, StaticToken, TokenProvider};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ALL, EntityId, FilterSet, FilterValue, PaymentMethod, SEARCH, Station, StationDraft, StationPatch,
    StationStats, StationStatus, User, UserDraft, UserPatch, UserRole, UserStats, UserStatus,
    WashStatus, WashingBayDraft, WashingBayEntry, WashingBayPatch, WashingBayStats,
};
