// ── User domain types ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::entity_id::EntityId;
use super::filter::{FilterSet, SEARCH};
use crate::entity::{Assignee, EntityKind, require_opt_text, require_text};
use crate::error::ApiError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum UserRole {
    Admin,
    Manager,
    Attendant,
    Accountant,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: UserRole,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total: u32,
    pub active: u32,
    pub inactive: u32,
    pub suspended: u32,
    /// Head count per role, keyed by the role's wire name.
    pub by_role: BTreeMap<String, u32>,
}

/// Loose address check: one `@`, something before it, a dotted domain after.
pub fn is_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// 10 to 13 digits with an optional leading `+`. Spaces and dashes are ignored.
pub fn is_phone(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| *c != ' ' && *c != '-').collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);
    (10..=13).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    if is_email(email) {
        Ok(())
    } else {
        Err(ApiError::validation(format!("`{email}` is not a valid email address")))
    }
}

fn validate_phone(phone: &str) -> Result<(), ApiError> {
    if phone.is_empty() || is_phone(phone) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "`{phone}` is not a valid phone number (10-13 digits, optional +)"
        )))
    }
}

impl EntityKind for User {
    const RESOURCE: &'static str = "users";
    const LABEL: &'static str = "User";
    const FILTER_KEYS: &'static [&'static str] = &["role", "status", "station", SEARCH];
    const ASSIGNMENT: Option<&'static str> = Some("station");

    type Draft = UserDraft;
    type Patch = UserPatch;
    type Status = UserStatus;
    type Stats = UserStats;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn matches(&self, filters: &FilterSet) -> bool {
        let station_id = self.station_id.as_ref().map(EntityId::to_string);
        filters.accepts("role", &self.role.to_string())
            && filters.accepts("status", &self.status.to_string())
            && (filters.accepts_opt("station", station_id.as_deref())
                || filters.accepts_opt("station", self.station_name.as_deref()))
            && filters.search_hits(&[&self.full_name, &self.email, &self.phone])
    }

    fn compute_stats(items: &[Self]) -> UserStats {
        let mut stats = UserStats::default();
        for user in items {
            stats.total += 1;
            match user.status {
                UserStatus::Active => stats.active += 1,
                UserStatus::Inactive => stats.inactive += 1,
                UserStatus::Suspended => stats.suspended += 1,
            }
            *stats.by_role.entry(user.role.to_string()).or_default() += 1;
        }
        stats
    }

    fn validate_draft(draft: &UserDraft) -> Result<(), ApiError> {
        require_text("full name", &draft.full_name)?;
        validate_email(&draft.email)?;
        validate_phone(&draft.phone)
    }

    fn validate_patch(patch: &UserPatch) -> Result<(), ApiError> {
        require_opt_text("full name", patch.full_name.as_ref())?;
        if let Some(email) = &patch.email {
            validate_email(email)?;
        }
        if let Some(phone) = &patch.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }

    fn from_draft(id: EntityId, draft: UserDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: draft.full_name,
            email: draft.email,
            phone: draft.phone,
            role: draft.role,
            status: draft.status,
            station_id: draft.station_id,
            station_name: draft.station_name,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    fn apply_patch(&mut self, patch: UserPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.email {
            self.email = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.role {
            self.role = v;
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        self.updated_at = Some(now);
    }

    fn set_status(&mut self, status: UserStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
    }

    fn assign(&mut self, assignee: &Assignee, now: DateTime<Utc>) -> Result<(), ApiError> {
        require_text("station name", &assignee.assignee_name)?;
        self.station_id = Some(assignee.assignee_id.clone());
        self.station_name = Some(assignee.assignee_name.clone());
        self.updated_at = Some(now);
        Ok(())
    }

    fn unassign(&mut self, now: DateTime<Utc>) -> Result<(), ApiError> {
        if self.station_id.is_none() {
            return Err(ApiError::validation(format!(
                "{} is not assigned to a station",
                self.full_name
            ))
            .with_related(self.id.clone()));
        }
        self.station_id = None;
        self.station_name = None;
        self.updated_at = Some(now);
        Ok(())
    }

    fn seed() -> Vec<Self> {
        crate::fallback::seed::users()
    }
}
