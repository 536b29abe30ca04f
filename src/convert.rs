//! Conversion helpers for protobuf well-known types.

use crate::error::{ClientError, Result};
use chrono::{DateTime, Utc};
use prost_types::{Any, Timestamp};

/// Default type URL prefix for protocol buffer messages.
pub const TYPE_URL_PREFIX: &str = "type.googleapis.com";

/// Build a fully-qualified type URL from a message type name.
///
/// # Examples
/// ```
/// use gcloud_iam::convert::type_url;
/// assert_eq!(type_url("google.iam.v2.Policy"), "type.googleapis.com/google.iam.v2.Policy");
/// ```
pub fn type_url(type_name: &str) -> String {
    format!("{}/{}", TYPE_URL_PREFIX, type_name)
}

/// Extract the type name suffix from a type URL.
///
/// Returns the part after the last `/` or the whole string if no `/` present.
pub fn type_name_from_url(type_url: &str) -> &str {
    type_url.rsplit('/').next().unwrap_or(type_url)
}

/// Unpack an `Any` into `M`, reporting a type URL mismatch as an invalid response.
pub fn unpack_any<M>(any: &Any) -> Result<M>
where
    M: prost::Name + Default,
{
    if type_name_from_url(&any.type_url) != M::full_name() {
        return Err(ClientError::InvalidResponse(format!(
            "expected {}, got {}",
            M::full_name(),
            any.type_url
        )));
    }
    M::decode(any.value.as_slice())
        .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", M::full_name(), e)))
}

/// Pack `msg` into an `Any` with the `type.googleapis.com/` prefix.
pub fn pack_any<M: prost::Name>(msg: &M) -> Any {
    Any {
        type_url: M::type_url(),
        value: msg.encode_to_vec(),
    }
}

/// Parse an RFC3339 timestamp string into a protobuf Timestamp.
///
/// # Examples
/// ```
/// use gcloud_iam::convert::parse_timestamp;
/// let ts = parse_timestamp("2024-01-15T10:30:00Z").unwrap();
/// assert_eq!(ts.seconds, 1705314600);
/// ```
pub fn parse_timestamp(rfc3339: &str) -> Result<Timestamp> {
    let dt: DateTime<Utc> = rfc3339
        .parse()
        .map_err(|e| ClientError::InvalidTimestamp(format!("{}: {}", rfc3339, e)))?;
    Ok(datetime_to_timestamp(dt))
}

pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        nanos: dt.timestamp_subsec_nanos() as i32,
    }
}

/// Convert a protobuf Timestamp into a `chrono` UTC datetime.
pub fn timestamp_to_datetime(ts: &Timestamp) -> Result<DateTime<Utc>> {
    let nanos = u32::try_from(ts.nanos)
        .map_err(|_| ClientError::InvalidTimestamp(format!("negative nanos: {}", ts.nanos)))?;
    DateTime::from_timestamp(ts.seconds, nanos)
        .ok_or_else(|| ClientError::InvalidTimestamp(format!("out of range: {}", ts.seconds)))
}

/// Convert a std duration into a protobuf Duration, saturating at `i64::MAX` seconds.
pub fn to_proto_duration(d: std::time::Duration) -> prost_types::Duration {
    prost_types::Duration {
        seconds: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
        nanos: d.subsec_nanos() as i32,
    }
}

/// Get the current time as a protobuf Timestamp.
pub fn now() -> Timestamp {
    datetime_to_timestamp(Utc::now())
}
