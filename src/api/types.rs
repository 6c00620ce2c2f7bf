//! PetFriends data types
//!
//! The service owns every record; these types only describe what goes over
//! the wire. Responses are kept as a raw `(status, body)` envelope so tests
//! can assert on exactly what the service said, including failures.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque session token returned by `GET api/key`
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of logs
impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(***)")
    }
}

/// Listing filter accepted by `GET api/pets`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetFilter {
    /// Every pet on the service
    #[default]
    #[serde(alias = "")]
    All,
    /// Only pets owned by the authenticated user
    MyPets,
}

impl PetFilter {
    /// Value sent as the `filter` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            PetFilter::All => "",
            PetFilter::MyPets => "my_pets",
        }
    }
}

impl fmt::Display for PetFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetFilter::All => f.write_str("all"),
            PetFilter::MyPets => f.write_str("my_pets"),
        }
    }
}

/// Fields sent when creating or updating a pet
///
/// Nothing is validated locally: empty names, very long names and negative
/// ages go to the service verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetFields {
    pub name: String,
    pub animal_type: String,
    #[serde(deserialize_with = "string_or_number")]
    pub age: String,
}

impl PetFields {
    pub fn new(
        name: impl Into<String>,
        animal_type: impl Into<String>,
        age: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            animal_type: animal_type.into(),
            age: age.into(),
        }
    }
}

/// A pet record as returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pet {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub animal_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub age: String,
    #[serde(default)]
    pub pet_photo: Option<String>,
}

impl Pet {
    /// String value of a named field, as used by scenario expectations
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "id" => Some(self.id.as_str()),
            "name" => Some(self.name.as_str()),
            "animal_type" => Some(self.animal_type.as_str()),
            "age" => Some(self.age.as_str()),
            "pet_photo" => Some(self.pet_photo.as_deref().unwrap_or("")),
            _ => None,
        }
    }
}

/// Response body: JSON when it parses, raw text otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Parse a body the way the suite expects: try JSON, fall back to text
    pub fn parse(text: String) -> Self {
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Json(value) => write!(f, "{}", value),
            Body::Text(text) => f.write_str(text),
        }
    }
}

/// The `(status_code, body)` pair every client call returns
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl ApiResponse {
    pub fn new(status: u16, body: Body) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Top-level JSON field, if the body is a JSON object carrying it
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.body.as_json().and_then(|v| v.get(name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Top-level field rendered as a string (numbers and null included)
    pub fn field_str(&self, name: &str) -> Option<String> {
        self.field(name).map(value_to_string)
    }

    /// Session key carried in the `key` field
    pub fn session_key(&self) -> Option<SessionKey> {
        self.field("key")
            .and_then(Value::as_str)
            .map(SessionKey::new)
    }

    /// Body decoded as a single pet record
    pub fn pet(&self) -> Option<Pet> {
        self.body
            .as_json()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Pets carried in the `pets` field of a listing
    pub fn pets(&self) -> Option<Vec<Pet>> {
        self.field("pets")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Render a JSON scalar the way the service's form fields look
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Accept `"4"`, `4` or `-5` where the service is inconsistent about types
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Null(()) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_parse_json_and_text() {
        assert_eq!(
            Body::parse(r#"{"key":"abc"}"#.to_string()),
            Body::Json(json!({"key": "abc"}))
        );
        assert_eq!(
            Body::parse("<h1>Forbidden</h1>".to_string()),
            Body::Text("<h1>Forbidden</h1>".to_string())
        );
    }

    #[test]
    fn test_session_key_extraction() {
        let ok = ApiResponse::new(200, Body::Json(json!({"key": "ea738148"})));
        assert_eq!(ok.session_key(), Some(SessionKey::new("ea738148")));

        let denied = ApiResponse::new(403, Body::Text("This user wasn't found".into()));
        assert!(denied.session_key().is_none());
        assert!(!denied.has_field("key"));
    }

    #[test]
    fn test_session_key_debug_is_redacted() {
        let key = SessionKey::new("secret-token");
        assert!(!format!("{:?}", key).contains("secret"));
    }

    #[test]
    fn test_pets_listing_with_mixed_age_types() {
        let response = ApiResponse::new(
            200,
            Body::Json(json!({
                "pets": [
                    {"id": "a1", "name": "Барбоскин", "animal_type": "двортерьер", "age": "4", "pet_photo": "data:image/jpeg;base64,AA"},
                    {"id": "b2", "name": "Тузикс", "animal_type": "спаниель", "age": -5, "pet_photo": ""},
                    {"id": "c3", "name": "", "animal_type": "", "age": 2}
                ]
            })),
        );

        let pets = response.pets().unwrap();
        assert_eq!(pets.len(), 3);
        assert_eq!(pets[0].name, "Барбоскин");
        assert_eq!(pets[1].age, "-5");
        assert_eq!(pets[2].pet_photo, None);
        assert_eq!(pets[2].field("pet_photo"), Some(""));
    }

    #[test]
    fn test_null_fields_do_not_drop_the_listing() {
        let response = ApiResponse::new(
            200,
            Body::Json(json!({
                "pets": [
                    {"id": "a1", "name": null, "animal_type": null, "age": null, "pet_photo": null},
                    {"id": "b2", "name": "Мурзик", "animal_type": "Котэ", "age": "5"}
                ]
            })),
        );

        let pets = response.pets().unwrap();
        assert_eq!(pets.len(), 2);
        assert_eq!(pets[0].name, "");
        assert_eq!(pets[0].animal_type, "");
        assert_eq!(pets[0].field("pet_photo"), Some(""));
        assert_eq!(pets[1].name, "Мурзик");
    }

    #[test]
    fn test_pet_from_created_record() {
        let response = ApiResponse::new(
            200,
            Body::Json(json!({"id": "x", "name": "Шарикs", "animal_type": "алабайs", "age": "11", "pet_photo": ""})),
        );
        let pet = response.pet().unwrap();
        assert_eq!(pet.field("name"), Some("Шарикs"));
        assert_eq!(pet.field("owner"), None);
        assert_eq!(response.field_str("age").as_deref(), Some("11"));
    }

    #[test]
    fn test_pet_filter_query_values() {
        assert_eq!(PetFilter::All.as_query(), "");
        assert_eq!(PetFilter::MyPets.as_query(), "my_pets");

        let filter: PetFilter = serde_json::from_value(json!("my_pets")).unwrap();
        assert_eq!(filter, PetFilter::MyPets);
        let filter: PetFilter = serde_json::from_value(json!("")).unwrap();
        assert_eq!(filter, PetFilter::All);
    }
}
