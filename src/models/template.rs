use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// The set of field types the form renderer knows how to turn into
/// controls. Descriptors may carry any type string; anything outside this
/// set is skipped at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Select,
    Multiselect,
    Image,
}

impl FieldType {
    /// Parse a descriptor's type string. Returns None for unrecognized
    /// types; callers decide whether that means skip or reject.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(FieldType::Text),
            "textarea" => Some(FieldType::Textarea),
            "number" => Some(FieldType::Number),
            "select" => Some(FieldType::Select),
            "multiselect" => Some(FieldType::Multiselect),
            "image" => Some(FieldType::Image),
            _ => None,
        }
    }

    pub fn needs_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Multiselect)
    }
}

/// One typed input in a journal type's form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldDescriptor {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDescriptor {
    pub fn known_type(&self) -> Option<FieldType> {
        FieldType::parse(&self.field_type)
    }
}

/// A named group of fields inside a template ("Morning mood",
/// "Gratitude list", ...). Renders as one form section.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JournalType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub features: Vec<String>,
    #[sqlx(json)]
    pub journal_types: Vec<JournalType>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn journal_type(&self, name: &str) -> Option<&JournalType> {
        self.journal_types.iter().find(|jt| jt.name == name)
    }
}

/// Validate the journal types of a template before it is written.
///
/// Select/multiselect descriptors must supply non-empty options, field ids
/// must be non-empty and unique within their journal type. Unknown type
/// strings are accepted as data; they simply never render.
pub fn validate_journal_types(journal_types: &[JournalType]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if journal_types.is_empty() {
        errors.push("Template must define at least one journal type".to_string());
    }

    for jt in journal_types {
        if jt.name.trim().is_empty() {
            errors.push("Journal type name must not be empty".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for field in &jt.fields {
            if field.id.trim().is_empty() {
                errors.push(format!(
                    "Journal type '{}': field with empty id",
                    jt.name
                ));
            } else if !seen.insert(field.id.as_str()) {
                errors.push(format!(
                    "Journal type '{}': duplicate field id '{}'",
                    jt.name, field.id
                ));
            }

            if let Some(ft) = field.known_type() {
                if ft.needs_options()
                    && field.options.as_ref().map_or(true, |o| o.is_empty())
                {
                    errors.push(format!(
                        "Field '{}' is a {} and must supply non-empty options",
                        field.id, field.field_type
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(id: &str, field_type: &str) -> FieldDescriptor {
        FieldDescriptor {
            id: id.to_string(),
            label: id.to_string(),
            field_type: field_type.to_string(),
            placeholder: None,
            options: None,
            required: false,
            description: None,
        }
    }

    #[test]
    fn test_field_type_parse() {
        assert_eq!(FieldType::parse("select"), Some(FieldType::Select));
        assert_eq!(FieldType::parse("image"), Some(FieldType::Image));
        assert_eq!(FieldType::parse("rating"), None);
        assert_eq!(FieldType::parse("Text"), None);
    }

    #[test]
    fn test_select_requires_options() {
        let jt = JournalType {
            name: "Mood".to_string(),
            description: None,
            fields: vec![field("mood", "select")],
        };

        let errors = validate_journal_types(&[jt]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("non-empty options"));
    }

    #[test]
    fn test_duplicate_field_ids_rejected() {
        let jt = JournalType {
            name: "Goals".to_string(),
            description: None,
            fields: vec![field("goal", "text"), field("goal", "textarea")],
        };

        let errors = validate_journal_types(&[jt]).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("duplicate field id")));
    }

    #[test]
    fn test_unknown_type_is_accepted_as_data() {
        let jt = JournalType {
            name: "Mood".to_string(),
            description: None,
            fields: vec![field("sparkline", "chart")],
        };

        assert!(validate_journal_types(&[jt]).is_ok());
    }

    #[test]
    fn test_empty_template_rejected() {
        assert!(validate_journal_types(&[]).is_err());
    }
}
