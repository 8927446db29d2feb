//! Identifier definitions.
//!
//! [`Id`] is the untagged numeric identifier used by the REST API.
//! [`TaggedId`] is the `prod-{kind}-{number}` form used by the GraphQL
//! and unlock APIs.

use std::fmt;
use std::str::FromStr;

use crate::IdError;

// =============================================================================
// Numeric ID
// =============================================================================

/// An untagged numeric resource ID.
///
/// Serialized as a JSON string, never as a bare number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(i64);

impl Id {
    /// Creates a new Id from an i64.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying i64 value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Parses an ID from its decimal text form.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| IdError::invalid_number(s, e))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for Id {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Id> for i64 {
    fn from(id: Id) -> Self {
        id.0
    }
}

impl serde::Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tagged ID
// =============================================================================

/// A composite ID of the form `{prefix}-{kind}-{number}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaggedId {
    prefix: String,
    kind: String,
    number: Id,
}

impl TaggedId {
    /// The only prefix the API issues.
    pub const PREFIX: &'static str = "prod";

    /// Creates a tagged ID with the [`TaggedId::PREFIX`] prefix.
    ///
    /// `kind` is the singular resource name, e.g. `tenant` or
    /// `access_point`.
    #[must_use]
    pub fn new(kind: impl Into<String>, number: Id) -> Self {
        Self {
            prefix: Self::PREFIX.to_string(),
            kind: kind.into(),
            number,
        }
    }

    /// Returns the prefix segment.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the kind segment.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the numeric segment.
    #[must_use]
    pub const fn number(&self) -> Id {
        self.number
    }

    /// Parses a tagged ID from a string.
    ///
    /// The text is split on the first two dashes; everything after the
    /// second dash is the number, so `prod-unit--5` has number `-5`.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }

        let mut parts = s.splitn(3, '-');
        let (Some(prefix), Some(kind), Some(number)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(IdError::MissingSegments(s.to_string()));
        };

        if prefix != Self::PREFIX {
            return Err(IdError::InvalidPrefix {
                expected: Self::PREFIX,
                actual: prefix.to_string(),
            });
        }

        if kind.is_empty() {
            return Err(IdError::EmptyKind(s.to_string()));
        }

        let number = number
            .parse::<i64>()
            .map_err(|e| IdError::invalid_number(number, e))?;

        Ok(Self {
            prefix: prefix.to_string(),
            kind: kind.to_string(),
            number: Id(number),
        })
    }
}

impl fmt::Display for TaggedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.prefix, self.kind, self.number)
    }
}

impl FromStr for TaggedId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for TaggedId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for TaggedId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Projects tagged IDs onto their numeric segment, preserving order.
pub fn tagged_ids_to_numbers(tagged: &[TaggedId]) -> Vec<Id> {
    tagged.iter().map(TaggedId::number).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_id_json_is_string() {
        let json = serde_json::to_string(&Id::new(31427903)).unwrap();
        assert_eq!(json, "\"31427903\"");
        let parsed: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Id::new(31427903));
    }

    #[test]
    fn test_id_rejects_bare_number() {
        let result: Result<Id, _> = serde_json::from_str("31427903");
        assert!(result.is_err());
    }

    #[test]
    fn test_id_rejects_malformed_text() {
        let result: Result<Id, _> = serde_json::from_str("\"12ab\"");
        assert!(result.is_err());
        assert!(matches!(
            Id::parse("12ab").unwrap_err(),
            IdError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn test_tagged_id_parse() {
        let id: TaggedId = "prod-tenant-7648837".parse().unwrap();
        assert_eq!(id.prefix(), "prod");
        assert_eq!(id.kind(), "tenant");
        assert_eq!(id.number(), Id::new(7648837));
    }

    #[test]
    fn test_tagged_id_new_uses_prod_prefix() {
        let id = TaggedId::new("access_point", Id::new(53449));
        assert_eq!(id.to_string(), "prod-access_point-53449");
    }

    #[test]
    fn test_tagged_id_number_takes_rest_after_second_dash() {
        let id: TaggedId = "prod-unit--5".parse().unwrap();
        assert_eq!(id.kind(), "unit");
        assert_eq!(id.number(), Id::new(-5));
        assert_eq!(id.to_string(), "prod-unit--5");

        let result: Result<TaggedId, _> = "prod-unit-5-6".parse();
        assert!(matches!(
            result.unwrap_err(),
            IdError::InvalidNumber { .. }
        ));
    }

    #[test]
    fn test_tagged_id_bad() {
        let result: Result<TaggedId, _> = "bad".parse();
        assert!(matches!(result.unwrap_err(), IdError::MissingSegments(_)));
    }

    #[test]
    fn test_tagged_id_empty() {
        let result: Result<TaggedId, _> = "".parse();
        assert!(result.unwrap_err().is_empty());
    }

    #[test]
    fn test_tagged_id_empty_kind() {
        let result: Result<TaggedId, _> = "prod--5".parse();
        assert!(matches!(result.unwrap_err(), IdError::EmptyKind(_)));
    }

    #[test]
    fn test_tagged_id_invalid_prefix() {
        let result: Result<TaggedId, _> = "dev-tenant-1".parse();
        assert!(result.unwrap_err().is_prefix_error());
    }

    #[test]
    fn test_tagged_id_json_roundtrip() {
        let id = TaggedId::new("tenant", Id::new(42));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"prod-tenant-42\"");
        let parsed: TaggedId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_tagged_ids_to_numbers_preserves_order() {
        let ids = vec![
            TaggedId::new("tenant", Id::new(3)),
            TaggedId::new("tenant", Id::new(1)),
            TaggedId::new("unit", Id::new(2)),
        ];
        assert_eq!(
            tagged_ids_to_numbers(&ids),
            vec![Id::new(3), Id::new(1), Id::new(2)]
        );
        assert!(tagged_ids_to_numbers(&[]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_tagged_id_format_inverts_parse(kind in "[a-z_]{1,16}", n in any::<i64>()) {
            let text = format!("prod-{kind}-{n}");
            let parsed = TaggedId::parse(&text).unwrap();
            prop_assert_eq!(parsed.to_string(), text);
        }

        #[test]
        fn prop_id_display_parse_roundtrip(n in any::<i64>()) {
            let id = Id::new(n);
            prop_assert_eq!(Id::parse(&id.to_string()).unwrap(), id);
        }
    }
}
