//! Inbound payload models and their validation.
//!
//! Bodies are parsed into a `serde_json::Value` first and then checked field
//! by field so that every problem in a payload is reported at once, each with
//! the location of the offending field. A validated model serializes to
//! exactly its own fields; unknown inbound fields are dropped.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Agent creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub name: String,
    pub description: Option<String>,
    pub knowledge_base_ids: Vec<String>,
}

/// Knowledge base creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeBase {
    pub name: String,
    pub description: Option<String>,
}

/// One path segment of an error location, e.g. `["body", "knowledge_base_ids", 2]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Loc {
    Field(String),
    Index(usize),
}

impl From<&str> for Loc {
    fn from(field: &str) -> Self {
        Self::Field(field.to_string())
    }
}

impl From<usize> for Loc {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Machine-readable category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    JsonInvalid,
    ObjectType,
    Missing,
    StringType,
    StringTooShort,
    ListType,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<Loc>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl FieldError {
    fn new(loc: Vec<Loc>, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind,
        }
    }
}

/// All validation failures found in one payload. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("invalid payload: {} validation error(s)", .0.len())]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn single(error: FieldError) -> Self {
        Self(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }
}

/// An inbound body that can be validated into a typed payload.
pub trait Payload: Sized + Serialize {
    fn validate(value: &Value) -> Result<Self, ValidationErrors>;

    /// Parse raw request bytes and validate them.
    fn from_json(body: &[u8]) -> Result<Self, ValidationErrors> {
        Self::validate(&parse_json(body)?)
    }
}

impl Payload for Agent {
    fn validate(value: &Value) -> Result<Self, ValidationErrors> {
        validate_agent(value)
    }
}

impl Payload for KnowledgeBase {
    fn validate(value: &Value) -> Result<Self, ValidationErrors> {
        validate_knowledge_base(value)
    }
}

/// Decode a request body as JSON.
pub fn parse_json(body: &[u8]) -> Result<Value, ValidationErrors> {
    serde_json::from_slice(body).map_err(|e| {
        ValidationErrors::single(FieldError::new(
            vec!["body".into()],
            ErrorKind::JsonInvalid,
            format!("JSON decode error: {e}"),
        ))
    })
}

pub fn validate_agent(value: &Value) -> Result<Agent, ValidationErrors> {
    let mut fields = Fields::of(value)?;
    let name = fields.name();
    let description = fields.optional_string("description");
    let knowledge_base_ids = fields.string_list("knowledge_base_ids");

    match (name, description, knowledge_base_ids) {
        (Some(name), Some(description), Some(knowledge_base_ids)) => Ok(Agent {
            name,
            description,
            knowledge_base_ids,
        }),
        _ => Err(fields.into_errors()),
    }
}

pub fn validate_knowledge_base(value: &Value) -> Result<KnowledgeBase, ValidationErrors> {
    let mut fields = Fields::of(value)?;
    let name = fields.name();
    let description = fields.optional_string("description");

    match (name, description) {
        (Some(name), Some(description)) => Ok(KnowledgeBase { name, description }),
        _ => Err(fields.into_errors()),
    }
}

/// Field accessor that accumulates errors instead of stopping at the first.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> Result<Self, ValidationErrors> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                errors: Vec::new(),
            }),
            _ => Err(ValidationErrors::single(FieldError::new(
                vec!["body".into()],
                ErrorKind::ObjectType,
                "Input should be a valid JSON object",
            ))),
        }
    }

    fn loc(field: &str) -> Vec<Loc> {
        vec!["body".into(), field.into()]
    }

    fn push(&mut self, loc: Vec<Loc>, kind: ErrorKind, msg: &str) {
        self.errors.push(FieldError::new(loc, kind, msg));
    }

    /// Required, non-empty `name`.
    fn name(&mut self) -> Option<String> {
        match self.object.get("name") {
            None => {
                self.push(Self::loc("name"), ErrorKind::Missing, "Field required");
                None
            }
            Some(Value::String(s)) if s.is_empty() => {
                self.push(
                    Self::loc("name"),
                    ErrorKind::StringTooShort,
                    "String should have at least 1 character",
                );
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(
                    Self::loc("name"),
                    ErrorKind::StringType,
                    "Input should be a valid string",
                );
                None
            }
        }
    }

    /// Optional string; absent and `null` both mean `None`.
    /// The outer `None` signals a type error.
    fn optional_string(&mut self, field: &str) -> Option<Option<String>> {
        match self.object.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s.clone())),
            Some(_) => {
                self.push(
                    Self::loc(field),
                    ErrorKind::StringType,
                    "Input should be a valid string",
                );
                None
            }
        }
    }

    /// Required list of strings, possibly empty.
    fn string_list(&mut self, field: &str) -> Option<Vec<String>> {
        let object = self.object;
        let items = match object.get(field) {
            None => {
                self.push(Self::loc(field), ErrorKind::Missing, "Field required");
                return None;
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.push(
                    Self::loc(field),
                    ErrorKind::ListType,
                    "Input should be a valid list",
                );
                return None;
            }
        };

        let mut out = Vec::with_capacity(items.len());
        let mut ok = true;
        for (index, item) in items.iter().enumerate() {
            if let Value::String(s) = item {
                out.push(s.clone());
            } else {
                let mut loc = Self::loc(field);
                loc.push(index.into());
                self.push(loc, ErrorKind::StringType, "Input should be a valid string");
                ok = false;
            }
        }
        ok.then_some(out)
    }

    /// Only called once some accessor returned `None`, which always records an error.
    fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    /// True if some error points at `field` directly under the body.
    fn has_field(err: &ValidationErrors, field: &str) -> bool {
        err.errors()
            .iter()
            .any(|e| matches!(e.loc.get(1), Some(Loc::Field(f)) if f == field))
    }

    #[test]
    fn full_agent_is_accepted() {
        let agent = validate_agent(&json!({
            "name": "helper",
            "description": "answers questions",
            "knowledge_base_ids": ["kb_1", "kb_2"],
        }))
        .unwrap();
        assert_eq!(agent.name, "helper");
        assert_eq!(agent.description.as_deref(), Some("answers questions"));
        assert_eq!(agent.knowledge_base_ids, vec!["kb_1", "kb_2"]);
    }

    #[test]
    fn agent_with_empty_ids_and_null_description() {
        let agent = validate_agent(&json!({
            "name": "helper",
            "description": null,
            "knowledge_base_ids": [],
        }))
        .unwrap();
        assert!(agent.description.is_none());
        assert!(agent.knowledge_base_ids.is_empty());
    }

    #[test]
    fn agent_missing_knowledge_base_ids_rejected() {
        let err = validate_agent(&json!({"name": "helper"})).unwrap_err();
        assert_eq!(err.errors().len(), 1);
        assert!(has_field(&err, "knowledge_base_ids"));
        assert_eq!(err.errors()[0].kind, ErrorKind::Missing);
    }

    #[test]
    fn every_problem_is_reported() {
        let err = validate_agent(&json!({
            "name": 7,
            "description": false,
            "knowledge_base_ids": "kb_1",
        }))
        .unwrap_err();
        assert_eq!(err.errors().len(), 3);
        assert!(has_field(&err, "name"));
        assert!(has_field(&err, "description"));
        assert!(has_field(&err, "knowledge_base_ids"));
    }

    #[test]
    fn non_string_id_reports_index() {
        let err = validate_agent(&json!({
            "name": "helper",
            "knowledge_base_ids": ["kb_1", 2],
        }))
        .unwrap_err();
        assert_eq!(
            err.errors()[0].loc,
            vec![Loc::from("body"), Loc::from("knowledge_base_ids"), Loc::Index(1)]
        );
    }

    #[test]
    fn empty_name_rejected() {
        let err = validate_knowledge_base(&json!({"name": ""})).unwrap_err();
        assert_eq!(err.errors()[0].kind, ErrorKind::StringTooShort);
    }

    #[test]
    fn non_object_body_rejected() {
        let err = validate_knowledge_base(&json!(["docs"])).unwrap_err();
        assert_eq!(err.errors()[0].kind, ErrorKind::ObjectType);
    }

    #[test]
    fn invalid_json_rejected() {
        let err = KnowledgeBase::from_json(b"{not json").unwrap_err();
        assert_eq!(err.errors()[0].kind, ErrorKind::JsonInvalid);
    }

    #[test]
    fn unknown_fields_are_dropped_on_serialize() {
        let kb = KnowledgeBase::from_json(br#"{"name":"docs","owner":"me"}"#).unwrap();
        assert_eq!(
            serde_json::to_value(&kb).unwrap(),
            json!({"name": "docs", "description": null})
        );
    }

    #[test]
    fn agent_serializes_exactly_its_fields() {
        let agent = Agent::from_json(
            br#"{"name":"a","knowledge_base_ids":["x"],"extra":1}"#,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&agent).unwrap(),
            json!({"name": "a", "description": null, "knowledge_base_ids": ["x"]})
        );
    }

    #[test]
    fn errors_serialize_with_loc_msg_type() {
        let err = validate_agent(&json!({"name": "a"})).unwrap_err();
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value[0]["loc"], json!(["body", "knowledge_base_ids"]));
        assert_eq!(value[0]["type"], "missing");
        assert_eq!(value[0]["msg"], "Field required");
    }
}
