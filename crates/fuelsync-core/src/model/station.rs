// ── Station domain types ──

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::filter::{FilterSet, SEARCH};
use crate::entity::{Assignee, EntityKind, require_opt_text, require_text};
use crate::error::ApiError;

/// Operational state of a filling station.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum StationStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: EntityId,
    pub code: String,
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: StationStatus,
    #[serde(default)]
    pub pump_count: u32,
    #[serde(default)]
    pub fuel_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a station.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDraft {
    pub code: String,
    pub name: String,
    pub region: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: StationStatus,
    #[serde(default)]
    pub pump_count: u32,
    #[serde(default)]
    pub fuel_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_name: Option<String>,
}

/// Partial station update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pump_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationStats {
    pub total: u32,
    pub active: u32,
    pub inactive: u32,
    pub maintenance: u32,
    /// Distinct regions covered.
    pub regions: u32,
    pub with_manager: u32,
}

/// `XX-000`: two to four letters, a dash, at least three digits.
pub fn is_station_code(code: &str) -> bool {
    let Some((prefix, number)) = code.split_once('-') else {
        return false;
    };
    (2..=4).contains(&prefix.len())
        && prefix.chars().all(|c| c.is_ascii_alphabetic())
        && number.len() >= 3
        && number.chars().all(|c| c.is_ascii_digit())
}

fn validate_code(code: &str) -> Result<(), ApiError> {
    if is_station_code(code) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "station code `{code}` must look like AS-001"
        )))
    }
}

fn count<T>(items: &[T], pred: impl Fn(&T) -> bool) -> u32 {
    u32::try_from(items.iter().filter(|i| pred(i)).count()).unwrap_or(u32::MAX)
}

impl EntityKind for Station {
    const RESOURCE: &'static str = "stations";
    const LABEL: &'static str = "Station";
    const FILTER_KEYS: &'static [&'static str] = &["status", "region", SEARCH];
    const ASSIGNMENT: Option<&'static str> = Some("manager");

    type Draft = StationDraft;
    type Patch = StationPatch;
    type Status = StationStatus;
    type Stats = StationStats;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn matches(&self, filters: &FilterSet) -> bool {
        filters.accepts("status", &self.status.to_string())
            && filters.accepts("region", &self.region)
            && filters.search_hits(&[&self.name, &self.code, &self.location])
    }

    fn compute_stats(items: &[Self]) -> StationStats {
        let regions: BTreeSet<String> = items.iter().map(|s| s.region.to_lowercase()).collect();
        StationStats {
            total: count(items, |_| true),
            active: count(items, |s| s.status == StationStatus::Active),
            inactive: count(items, |s| s.status == StationStatus::Inactive),
            maintenance: count(items, |s| s.status == StationStatus::Maintenance),
            regions: u32::try_from(regions.len()).unwrap_or(u32::MAX),
            with_manager: count(items, |s| s.manager_id.is_some()),
        }
    }

    fn validate_draft(draft: &StationDraft) -> Result<(), ApiError> {
        validate_code(&draft.code)?;
        require_text("station name", &draft.name)?;
        require_text("region", &draft.region)
    }

    fn validate_patch(patch: &StationPatch) -> Result<(), ApiError> {
        if let Some(code) = &patch.code {
            validate_code(code)?;
        }
        require_opt_text("station name", patch.name.as_ref())?;
        require_opt_text("region", patch.region.as_ref())
    }

    fn from_draft(id: EntityId, draft: StationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            code: draft.code,
            name: draft.name,
            region: draft.region,
            location: draft.location,
            status: draft.status,
            pump_count: draft.pump_count,
            fuel_types: draft.fuel_types,
            manager_id: draft.manager_id,
            manager_name: draft.manager_name,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    fn apply_patch(&mut self, patch: StationPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.code {
            self.code = v;
        }
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.region {
            self.region = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = patch.pump_count {
            self.pump_count = v;
        }
        if let Some(v) = patch.fuel_types {
            self.fuel_types = v;
        }
        self.updated_at = Some(now);
    }

    fn set_status(&mut self, status: StationStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
    }

    fn assign(&mut self, assignee: &Assignee, now: DateTime<Utc>) -> Result<(), ApiError> {
        require_text("manager name", &assignee.assignee_name)?;
        self.manager_id = Some(assignee.assignee_id.clone());
        self.manager_name = Some(assignee.assignee_name.clone());
        self.updated_at = Some(now);
        Ok(())
    }

    fn unassign(&mut self, now: DateTime<Utc>) -> Result<(), ApiError> {
        if self.manager_id.is_none() {
            return Err(ApiError::validation(format!(
                "station {} has no manager to unassign",
                self.code
            ))
            .with_related(self.id.clone()));
        }
        self.manager_id = None;
        self.manager_name = None;
        self.updated_at = Some(now);
        Ok(())
    }

    fn seed() -> Vec<Self> {
        crate::fallback::seed::stations()
    }
}
