//! Person record model.
//!
//! # Responsibility
//! - Define the read model returned by the backend list endpoint.
//! - Define the editable field set and the create/update payloads.
//!
//! # Invariants
//! - `PersonId` round-trips in the JSON shape the backend used.
//! - `PersonPayload` never carries the derived age.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Opaque backend-assigned identifier.
///
/// Backends differ in whether ids are numeric or textual, so both shapes are
/// accepted and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonId {
    Number(i64),
    Text(String),
}

impl PersonId {
    /// Parses an id typed by a user or passed through a string-only boundary.
    ///
    /// Integer-looking input becomes `Number`; anything else stays `Text`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(value) => Self::Number(value),
            Err(_) => Self::Text(trimmed.to_string()),
        }
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for PersonId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PersonId {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One person as returned by `GET /api/people`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
    #[serde(deserialize_with = "super::wire::deserialize_calendar_date")]
    pub date_of_birth: NaiveDate,
    /// Server-computed age, shown as sent. Stored records are not
    /// re-validated, so it may be negative.
    #[serde(default, deserialize_with = "super::wire::deserialize_lenient_age")]
    pub age: Option<i64>,
    /// Server-assigned creation time. Read-only on the client.
    #[serde(
        default,
        deserialize_with = "super::wire::deserialize_optional_timestamp"
    )]
    pub date_created: Option<DateTime<Utc>>,
}

impl PersonRecord {
    /// `"first last"` as used by search matching.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Editable subset used to pre-fill the record form.
    pub fn fields(&self) -> PersonFields {
        PersonFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
        }
    }
}

/// User-editable fields of a person, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFields {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
}

impl PersonFields {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
        }
    }
}

/// Request body for `POST /api/people` and `PUT /api/people/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPayload {
    /// Present for updates only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<PersonId>,
    pub first_name: String,
    pub last_name: String,
    /// Serialized as an ISO calendar date (`YYYY-MM-DD`).
    pub date_of_birth: NaiveDate,
}

impl PersonPayload {
    pub fn for_create(fields: &PersonFields) -> Self {
        Self {
            id: None,
            first_name: fields.first_name.trim().to_string(),
            last_name: fields.last_name.trim().to_string(),
            date_of_birth: fields.date_of_birth,
        }
    }

    pub fn for_update(id: &PersonId, fields: &PersonFields) -> Self {
        Self {
            id: Some(id.clone()),
            ..Self::for_create(fields)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PersonFields, PersonId, PersonPayload, PersonRecord};
    use chrono::NaiveDate;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn record_accepts_numeric_and_text_ids() {
        let numeric: PersonRecord = serde_json::from_value(json!({
            "id": 7,
            "firstName": "Anna",
            "lastName": "Lee",
            "dateOfBirth": "2000-06-15",
        }))
        .expect("numeric id record should parse");
        assert_eq!(numeric.id, PersonId::Number(7));
        assert_eq!(numeric.age, None);
        assert_eq!(numeric.date_created, None);

        let text: PersonRecord = serde_json::from_value(json!({
            "id": "65f0c1",
            "firstName": "Joe",
            "lastName": "Mann",
            "dateOfBirth": "1990-01-02T00:00:00.000Z",
            "age": 34,
            "dateCreated": "2024-03-01T10:20:30Z",
        }))
        .expect("text id record should parse");
        assert_eq!(text.id, PersonId::Text("65f0c1".to_string()));
        assert_eq!(text.date_of_birth, date(1990, 1, 2));
        assert_eq!(text.age, Some(34));
        assert!(text.date_created.is_some());
    }

    #[test]
    fn list_with_out_of_range_server_age_still_decodes() {
        let page: Vec<PersonRecord> = serde_json::from_value(json!([
            {"id": 1, "firstName": "Anna", "lastName": "Lee",
             "dateOfBirth": "2000-06-15", "age": 24},
            {"id": 2, "firstName": "Future", "lastName": "Born",
             "dateOfBirth": "2098-01-01", "age": -74},
            {"id": 3, "firstName": "Half", "lastName": "Year",
             "dateOfBirth": "2000-01-01", "age": 24.5},
        ]))
        .expect("page should decode");
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].age, Some(24));
        assert_eq!(page[1].age, Some(-74));
        assert_eq!(page[2].age, None);
    }

    #[test]
    fn create_payload_omits_id_and_age() {
        let fields = PersonFields::new(" Anna ", "Lee", date(2000, 6, 15));
        let body = serde_json::to_value(PersonPayload::for_create(&fields)).unwrap();
        assert_eq!(
            body,
            json!({"firstName": "Anna", "lastName": "Lee", "dateOfBirth": "2000-06-15"})
        );
    }

    #[test]
    fn update_payload_echoes_id_shape() {
        let fields = PersonFields::new("Joe", "Mann", date(1990, 1, 2));
        let body =
            serde_json::to_value(PersonPayload::for_update(&PersonId::Number(12), &fields))
                .unwrap();
        assert_eq!(body["id"], json!(12));
        assert!(body.get("age").is_none());
    }

    #[test]
    fn parse_id_prefers_numbers() {
        assert_eq!(PersonId::parse(" 42 "), PersonId::Number(42));
        assert_eq!(PersonId::parse("a-1"), PersonId::Text("a-1".to_string()));
        assert_eq!(PersonId::Number(42).to_string(), "42");
    }
}
