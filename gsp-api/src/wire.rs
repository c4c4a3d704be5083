//! Wire-format helpers shared by every backend resource.
//!
//! The backend is a Django REST Framework service. Two of its habits need
//! explicit handling on this side:
//!
//! - List endpoints return either a bare JSON array or a paginated
//!   `{"count": .., "results": [...]}` envelope, depending on whether
//!   pagination is enabled for that view.
//! - `DecimalField` values (machine coordinates) are serialized as strings,
//!   e.g. `"41.286700"`, while `FloatField` values are plain numbers.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Timestamp format sent to the backend: "YYYY-MM-DDTHH:MM:SS"
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A list endpoint response in either of its two shapes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Bare(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) => items,
            ListResponse::Page { results } => results,
        }
    }
}

/// Body of the backend's custom actions: `{"message": .., "success": true}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            NumberOrString::Number(n) => Ok(n),
            NumberOrString::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid decimal value: {s:?}"))),
        }
    }
}

/// Parse a backend timestamp. Accepts RFC 3339 with an offset (what the
/// backend emits) and naive ISO timestamps with or without seconds.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
}

/// `#[serde(with = "decimal")]` for decimal fields sent as strings or numbers.
pub mod decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        NumberOrString::deserialize(deserializer)?.into_f64()
    }
}

/// Optional variant of [`decimal`]; `null` and empty strings read as `None`.
pub mod option_decimal {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(v) => v.into_f64().map(Some),
        }
    }
}

/// `#[serde(with = "timestamp")]` for backend datetimes.
pub mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`timestamp`].
pub mod option_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.format(TIMESTAMP_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[derive(Debug, Deserialize)]
    struct Point {
        #[serde(with = "decimal")]
        lat: f64,
        #[serde(default, with = "option_decimal")]
        lon: Option<f64>,
    }

    #[test]
    fn test_list_response_bare_array() {
        let parsed: ListResponse<Item> = serde_json::from_str(r#"[{"id":1},{"id":2}]"#).unwrap();
        assert_eq!(parsed.into_vec(), vec![Item { id: 1 }, Item { id: 2 }]);
    }

    #[test]
    fn test_list_response_page_envelope() {
        let body = r#"{"count":1,"next":null,"previous":null,"results":[{"id":7}]}"#;
        let parsed: ListResponse<Item> = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_vec(), vec![Item { id: 7 }]);
    }

    #[test]
    fn test_decimal_from_string_or_number() {
        let p: Point = serde_json::from_str(r#"{"lat":"41.286700","lon":36.33}"#).unwrap();
        assert_eq!(p.lat, 41.2867);
        assert_eq!(p.lon, Some(36.33));

        let p: Point = serde_json::from_str(r#"{"lat":41.0,"lon":null}"#).unwrap();
        assert_eq!(p.lon, None);

        assert!(serde_json::from_str::<Point>(r#"{"lat":"abc"}"#).is_err());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let with_offset = parse_timestamp("2024-05-01T08:00:00+03:00").unwrap();
        assert_eq!(with_offset.to_string(), "2024-05-01 08:00:00");
        let naive = parse_timestamp("2024-05-01T08:00:00").unwrap();
        assert_eq!(naive, with_offset);
        let short = parse_timestamp("2024-05-01T08:00").unwrap();
        assert_eq!(short, with_offset);
        assert!(parse_timestamp("01.05.2024").is_err());
    }
}
