// Raw service request as stored in the requests collection.

use chrono::{DateTime, FixedOffset};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Request lifecycle status; serializes to lowercase JSON (e.g. "closed").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Active,
    Closed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Active => "active",
            RequestStatus::Closed => "closed",
            RequestStatus::Unknown => "unknown",
        }
    }
}

/// One service request. Timestamps keep the offset they were stored with; hour-of-day
/// is read from that representation without conversion. Only `createdAt` is required; any
/// other field with an unexpected type falls back to its default instead of dropping the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Document key in the requests collection; not part of the stored body.
    #[serde(skip)]
    pub id: String,
    pub created_at: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "lenient")]
    pub accepted_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient")]
    pub closed_at: Option<DateTime<FixedOffset>>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: RequestStatus,
    #[serde(default, deserialize_with = "technician_id")]
    pub technician_id: Option<String>,
    #[serde(default = "unknown_name", deserialize_with = "name_or_unknown")]
    pub technician_name: String,
    #[serde(default = "unknown_name", deserialize_with = "name_or_unknown")]
    pub author_name: String,
}

impl RawRecord {
    /// Seconds from creation to acceptance, when accepted.
    pub fn assign_time_secs(&self) -> Option<f64> {
        self.accepted_at
            .map(|accepted| seconds_between(self.created_at, accepted))
    }

    /// Seconds from creation to close, when closed.
    pub fn resolution_time_secs(&self) -> Option<f64> {
        self.closed_at
            .map(|closed| seconds_between(self.created_at, closed))
    }

    /// Technician id when assigned; empty ids count as unassigned.
    pub fn assigned_technician(&self) -> Option<&str> {
        self.technician_id.as_deref().filter(|id| !id.is_empty())
    }
}

fn seconds_between(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

/// A value of the expected shape, or anything else (skipped).
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(v) => v,
        Lenient::Invalid(_) => T::default(),
    })
}

/// Technician ids are strings, but numeric ids are accepted and stringified.
#[derive(Deserialize)]
#[serde(untagged)]
enum TechnicianId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

fn technician_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let id: Option<TechnicianId> = lenient(deserializer)?;
    Ok(id.map(|id| match id {
        TechnicianId::Text(s) => s,
        TechnicianId::Signed(n) => n.to_string(),
        TechnicianId::Unsigned(n) => n.to_string(),
    }))
}

fn name_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = lenient(deserializer)?;
    Ok(name.filter(|n| !n.is_empty()).unwrap_or_else(unknown_name))
}
