use serde::{Deserialize, Serialize};
use std::fmt;

/// Every entity type that has an editor in the admin tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Club,
    Member,
    Season,
    Team,
    Match,
    MembershipType,
    Sport,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        Self::Club,
        Self::Member,
        Self::Season,
        Self::Team,
        Self::Match,
        Self::MembershipType,
        Self::Sport,
    ];

    /// Stable identifier used in intents and storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Club => "club",
            Self::Member => "member",
            Self::Season => "season",
            Self::Team => "team",
            Self::Match => "match",
            Self::MembershipType => "membershipType",
            Self::Sport => "sport",
        }
    }

    /// Human-readable label used in notifications and form errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Club => "Club",
            Self::Member => "Member",
            Self::Season => "Season",
            Self::Team => "Team",
            Self::Match => "Match",
            Self::MembershipType => "Membership type",
            Self::Sport => "Sport",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque entity identifier as it travels through forms and storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Authenticated acting user, resolved freshly for every request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_serializes_as_camel_case() {
        let json = serde_json::to_string(&EntityKind::MembershipType).unwrap();
        assert_eq!(json, "\"membershipType\"");
        assert_eq!(EntityKind::MembershipType.as_str(), "membershipType");
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(EntityId::generate(), EntityId::generate());
    }
}
