// ── Entity identity ──
//
// Backend records carry opaque string ids; records created offline get a
// random UUID. `EntityId` covers both without callers caring which.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier for a station, user or washing-bay entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    Key(String),
}

impl EntityId {
    /// Fresh id for a record created while the backend is unreachable.
    pub fn generate() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Key(_) => None,
        }
    }

    /// Path segment form of this id.
    pub fn as_segment(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Key(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Key(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn uuid_strings_parse_as_uuid() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000");
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn backend_keys_stay_strings() {
        let id: EntityId = "st-001".parse().unwrap();
        assert_eq!(id, EntityId::Key("st-001".into()));
        assert_eq!(id.as_segment(), "st-001");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EntityId::generate(), EntityId::generate());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = EntityId::from("usr-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"usr-7\"");
        let back: EntityId = serde_json::from_str("\"usr-7\"").unwrap();
        assert_eq!(back, id);
    }
}
