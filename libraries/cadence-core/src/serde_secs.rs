//! Serialize `Duration` values as fractional seconds
//!
//! Queue files and configuration store every duration as an `f64` number of
//! seconds (`"duration": 4.5`). Use with `#[serde(with = "cadence_core::serde_secs")]`.

use serde::{de::Error as _, Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
}

/// Same encoding for `Option<Duration>`
pub mod option {
    use super::*;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| Duration::try_from_secs_f64(secs).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "crate::serde_secs")]
        length: Duration,
        #[serde(default, with = "crate::serde_secs::option")]
        offset: Option<Duration>,
    }

    #[test]
    fn encodes_fractional_seconds() {
        let holder = Holder {
            length: Duration::from_millis(1500),
            offset: None,
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"length":1.5,"offset":null}"#);
    }

    #[test]
    fn rejects_negative_seconds() {
        let result: Result<Holder, _> = serde_json::from_str(r#"{"length":-2.0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_optional_is_none() {
        let holder: Holder = serde_json::from_str(r#"{"length":3}"#).unwrap();
        assert_eq!(holder.length, Duration::from_secs(3));
        assert_eq!(holder.offset, None);
    }
}
