//! Resource schemas for the access API.
//!
//! Resources are decoded with [`bmx_compound::decode_reference`], so each
//! struct declares `id` next to its `attributes` and `relationships` and
//! is `#[serde(default)]`. GraphQL entities are plain camelCase objects
//! keyed by [`TaggedId`].

use std::fmt;
use std::str::FromStr;

use bmx_compound::{ObjectType, ReferenceList, Relationship};
use bmx_id::{Id, TaggedId};
use chrono::{DateTime, FixedOffset, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Object Types
// =============================================================================

pub const TYPE_ACCESS_POINT: ObjectType = ObjectType::from_static("access_points");
pub const TYPE_BUILDING: ObjectType = ObjectType::from_static("buildings");
pub const TYPE_DOOR_RELEASE: ObjectType = ObjectType::from_static("door_releases");
pub const TYPE_KEYCHAIN: ObjectType = ObjectType::from_static("keychains");
pub const TYPE_PANEL: ObjectType = ObjectType::from_static("panels");
pub const TYPE_TENANT: ObjectType = ObjectType::from_static("tenants");
pub const TYPE_VIRTUAL_KEY: ObjectType = ObjectType::from_static("virtual_keys");

/// Kind segment of a tenant's [`TaggedId`].
pub const TAGGED_TENANT: &str = "tenant";

/// Kind segment of an access point's [`TaggedId`].
pub const TAGGED_ACCESS_POINT: &str = "access_point";

// =============================================================================
// Resources
// =============================================================================

/// A set of virtual keys sharing one validity window and door list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Keychain {
    pub id: Id,
    pub attributes: KeychainAttributes,
    pub relationships: KeychainRelationships,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeychainAttributes {
    pub name: String,
    pub kind: Option<KeychainKind>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub time_from: Option<WatchTime>,
    pub time_to: Option<WatchTime>,
    pub weekdays: Vec<Weekday>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeychainRelationships {
    pub virtual_keys: ReferenceList<VirtualKey>,
    pub devices: ReferenceList<Panel>,
}

/// A PIN code allocated to one recipient.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VirtualKey {
    pub id: Id,
    pub attributes: VirtualKeyAttributes,
    pub relationships: VirtualKeyRelationships,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VirtualKeyAttributes {
    pub name: String,
    pub email: String,
    #[serde(rename = "pin")]
    pub pin_code: PinCode,
    pub qr_code_image_url: Option<String>,
    pub instructions_url: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VirtualKeyRelationships {
    pub door_releases: ReferenceList<DoorRelease>,
}

/// One door opening.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoorRelease {
    pub id: Id,
    pub attributes: DoorReleaseAttributes,
    pub relationships: DoorReleaseRelationships,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoorReleaseAttributes {
    pub release_method: Option<String>,
    pub door_release_type: Option<String>,
    pub panel_user_type: Option<String>,
    /// Account name of whoever opened the door.
    pub name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub logged_at: Option<DateTime<Utc>>,
    pub thumb_url: Option<String>,
    pub medium_url: Option<String>,
}

/// Units and users are not modeled; they resolve to raw JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DoorReleaseRelationships {
    pub unit: Relationship<Value>,
    pub user: Relationship<Value>,
    pub panel: Relationship<Panel>,
    /// Devices are tagged `panels` by the API.
    pub device: Relationship<Panel>,
}

/// A physical entry panel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Panel {
    pub id: Id,
    pub attributes: PanelAttributes,
    pub relationships: PanelRelationships,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelAttributes {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelRelationships {
    pub building: Relationship<Value>,
}

// =============================================================================
// GraphQL Entities
// =============================================================================

/// A tenant the token can act for.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: TaggedId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pin_code: Option<PinCode>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub building: Option<Building>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: TaggedId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub floor_number: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Building {
    pub id: TaggedId,
    #[serde(default)]
    pub guid: String,
    #[serde(default)]
    pub name: String,
}

/// A door a tenant can open.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessPoint {
    pub id: TaggedId,
    #[serde(default)]
    pub name: String,
    /// Seconds the door stays released.
    #[serde(default)]
    pub open_duration: i64,
    #[serde(default)]
    pub online: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Status filter for access codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessCodeStatus {
    #[default]
    Active,
}

impl AccessCodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessCodeStatus::Active => "active",
        }
    }
}

impl fmt::Display for AccessCodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keychain kind. Kinds this client does not know decode as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeychainKind {
    Custom,
    Recurring,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for KeychainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeychainKind::Custom => write!(f, "custom"),
            KeychainKind::Recurring => write!(f, "recurring"),
            KeychainKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Day of the week as the API spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
    #[serde(other)]
    Unknown,
}

impl Weekday {
    /// The matching chrono day, `None` for an unrecognised spelling.
    pub fn to_chrono(self) -> Option<chrono::Weekday> {
        match self {
            Weekday::Mon => Some(chrono::Weekday::Mon),
            Weekday::Tue => Some(chrono::Weekday::Tue),
            Weekday::Wed => Some(chrono::Weekday::Wed),
            Weekday::Thu => Some(chrono::Weekday::Thu),
            Weekday::Fri => Some(chrono::Weekday::Fri),
            Weekday::Sat => Some(chrono::Weekday::Sat),
            Weekday::Sun => Some(chrono::Weekday::Sun),
            Weekday::Unknown => None,
        }
    }
}

// =============================================================================
// Value Types
// =============================================================================

/// A door PIN code. Every character is an ASCII digit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PinCode(String);

impl PinCode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.chars().find(|c| !c.is_ascii_digit()) {
            Some(c) => Err(format!("invalid PIN code: contains non-digit character {c:?}")),
            None => Ok(Self(s.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the digits as numbers.
    pub fn digits(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b - b'0')
    }
}

impl fmt::Display for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PinCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A time of day in `HH:MM` form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchTime {
    pub hour: u32,
    pub minute: u32,
}

impl WatchTime {
    pub const FORMAT: &'static str = "%H:%M";

    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0)
    }
}

impl FromStr for WatchTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = NaiveTime::parse_from_str(s, Self::FORMAT)?;
        Ok(Self {
            hour: time.hour(),
            minute: time.minute(),
        })
    }
}

impl fmt::Display for WatchTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for WatchTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WatchTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Request Arguments
// =============================================================================

/// Arguments for creating a custom keychain.
#[derive(Debug, Clone, Serialize)]
pub struct CustomKeychainArgs {
    pub name: String,
    #[serde(serialize_with = "serialize_api_time")]
    pub starts_at: DateTime<FixedOffset>,
    #[serde(serialize_with = "serialize_api_time")]
    pub ends_at: DateTime<FixedOffset>,
    pub allow_unit_access: bool,
}

/// Arguments for adding virtual keys to a keychain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VirtualKeyArgs {
    pub recipients: Vec<VirtualKeyRecipient>,
}

/// A virtual key recipient. Keys are delivered by email.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualKeyRecipient {
    pub name: String,
    pub deliver_to: String,
}

/// The API expects `2025-12-09T16:58:00-0800`, without a colon in the
/// offset.
pub const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

fn serialize_api_time<S>(time: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&time.format(API_TIME_FORMAT))
}
