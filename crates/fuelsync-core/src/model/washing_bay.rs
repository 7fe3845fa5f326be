// ── Washing-bay ledger entries ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::filter::{FilterSet, SEARCH};
use crate::entity::{EntityKind, require_opt_text, require_text};
use crate::error::ApiError;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PaymentMethod {
    #[default]
    Cash,
    MobileMoney,
    Card,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum WashStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

/// One vehicle wash recorded at a station's washing bay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WashingBayEntry {
    pub id: EntityId,
    pub station_id: EntityId,
    #[serde(default)]
    pub station_name: String,
    pub plate_number: String,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub service_type: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: WashStatus,
    #[serde(default)]
    pub attendant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WashingBayDraft {
    pub station_id: EntityId,
    #[serde(default)]
    pub station_name: String,
    pub plate_number: String,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub service_type: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: WashStatus,
    #[serde(default)]
    pub attendant: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WashingBayPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendant: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WashingBayStats {
    pub total_entries: u32,
    pub completed: u32,
    pub pending: u32,
    pub cancelled: u32,
    /// Sum of completed entries only.
    pub total_revenue: f64,
    /// Mean amount of completed entries, zero when none completed.
    pub average_ticket: f64,
}

fn validate_amount(amount: f64) -> Result<(), ApiError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ApiError::validation("amount must be greater than zero"))
    }
}

impl EntityKind for WashingBayEntry {
    const RESOURCE: &'static str = "washing-bay";
    const LABEL: &'static str = "Washing-bay entry";
    const FILTER_KEYS: &'static [&'static str] = &["station", "service", "payment", "status", SEARCH];

    type Draft = WashingBayDraft;
    type Patch = WashingBayPatch;
    type Status = WashStatus;
    type Stats = WashingBayStats;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn matches(&self, filters: &FilterSet) -> bool {
        (filters.accepts("station", &self.station_id.to_string())
            || filters.accepts("station", &self.station_name))
            && filters.accepts("service", &self.service_type)
            && filters.accepts("payment", &self.payment_method.to_string())
            && filters.accepts("status", &self.status.to_string())
            && filters.search_hits(&[&self.plate_number, &self.attendant, &self.vehicle_type])
    }

    fn compute_stats(items: &[Self]) -> WashingBayStats {
        let mut stats = WashingBayStats::default();
        for entry in items {
            stats.total_entries += 1;
            match entry.status {
                WashStatus::Completed => {
                    stats.completed += 1;
                    stats.total_revenue += entry.amount;
                }
                WashStatus::Pending => stats.pending += 1,
                WashStatus::Cancelled => stats.cancelled += 1,
            }
        }
        if stats.completed > 0 {
            stats.average_ticket = stats.total_revenue / f64::from(stats.completed);
        }
        stats
    }

    fn validate_draft(draft: &WashingBayDraft) -> Result<(), ApiError> {
        require_text("plate number", &draft.plate_number)?;
        validate_amount(draft.amount)
    }

    fn validate_patch(patch: &WashingBayPatch) -> Result<(), ApiError> {
        require_opt_text("plate number", patch.plate_number.as_ref())?;
        patch.amount.map_or(Ok(()), validate_amount)
    }

    fn from_draft(id: EntityId, draft: WashingBayDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            station_id: draft.station_id,
            station_name: draft.station_name,
            plate_number: draft.plate_number,
            vehicle_type: draft.vehicle_type,
            service_type: draft.service_type,
            amount: draft.amount,
            payment_method: draft.payment_method,
            status: draft.status,
            attendant: draft.attendant,
            recorded_at: Some(now),
            updated_at: Some(now),
        }
    }

    fn apply_patch(&mut self, patch: WashingBayPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.plate_number {
            self.plate_number = v;
        }
        if let Some(v) = patch.vehicle_type {
            self.vehicle_type = v;
        }
        if let Some(v) = patch.service_type {
            self.service_type = v;
        }
        if let Some(v) = patch.amount {
            self.amount = v;
        }
        if let Some(v) = patch.payment_method {
            self.payment_method = v;
        }
        if let Some(v) = patch.attendant {
            self.attendant = v;
        }
        self.updated_at = Some(now);
    }

    fn set_status(&mut self, status: WashStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
    }

    fn seed() -> Vec<Self> {
        crate::fallback::seed::washing_bay()
    }
}
