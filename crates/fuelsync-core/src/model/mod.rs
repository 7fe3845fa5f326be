// ── Domain model ──
//
// Canonical records for the three synchronized collections plus the
// identity and filter types they share.

pub mod entity_id;
pub mod filter;

pub mod station;
pub mod user;
pub mod washing_bay;

// ── Re-exports ──────────────────────────────────────────────────────

pub use entity_id::EntityId;
pub use filter::{ALL, FilterSet, FilterValue, SEARCH};

pub use station::{Station, StationDraft, StationPatch, StationStats, StationStatus};
pub use user::{User, UserDraft, UserPatch, UserRole, UserStats, UserStatus};
pub use washing_bay::{
    PaymentMethod, WashStatus, WashingBayDraft, WashingBayEntry, WashingBayPatch, WashingBayStats,
};
