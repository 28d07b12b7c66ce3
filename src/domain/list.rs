//! List Entity
//!
//! A collaborative list with a user-defined item template. Lists are created
//! once and never mutated afterwards.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::{DomainError, DomainResult};
use super::item::Item;

/// Input type of a template field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Url,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Url => "url",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "textarea" => FieldType::Textarea,
            "number" => FieldType::Number,
            "date" => FieldType::Date,
            "url" => FieldType::Url,
            _ => FieldType::Text,
        }
    }
}

/// One field of a list's item template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Machine-safe key, unique within the list
    pub name: String,
    /// Display label
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
}

/// A collaborative list with a custom item schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub template_fields: Vec<FieldSpec>,
    /// Unix millis
    pub created_at: i64,
}

/// A list joined with its items in display order
#[derive(Debug, Clone, Serialize)]
pub struct ListWithItems {
    #[serde(flatten)]
    pub list: List,
    pub items: Vec<Item>,
}

impl List {
    pub fn new(title: String, description: Option<String>, template_fields: Vec<FieldSpec>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            template_fields,
            created_at: Utc::now().timestamp_millis(),
        }
    }

    /// Validate a template before creating a list: at least one field, every
    /// field name machine-safe and unique within the list.
    pub fn validate_fields(fields: &[FieldSpec]) -> DomainResult<()> {
        if fields.is_empty() {
            return Err(DomainError::InvalidInput(
                "Template fields are required and must be a non-empty array".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(fields.len());
        for field in fields {
            if !is_machine_safe(&field.name) {
                return Err(DomainError::InvalidInput(format!(
                    "Invalid field name '{}'",
                    field.name
                )));
            }
            if field.label.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!(
                    "Field '{}' is missing a label",
                    field.name
                )));
            }
            if seen.contains(&field.name.as_str()) {
                return Err(DomainError::InvalidInput(format!(
                    "Duplicate field name '{}'",
                    field.name
                )));
            }
            seen.push(field.name.as_str());
        }

        Ok(())
    }

    /// Names of required template fields that are absent or blank in `content`.
    /// Non-string values (numbers, booleans) count as present.
    pub fn missing_required_fields(&self, content: &Map<String, Value>) -> Vec<String> {
        self.template_fields
            .iter()
            .filter(|field| field.required && !has_value(content, &field.name))
            .map(|field| field.name.clone())
            .collect()
    }
}

fn has_value(content: &Map<String, Value>, name: &str) -> bool {
    match content.get(name) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn is_machine_safe(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
