use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

use crate::models::{FieldDescriptor, FieldType, ImageUpload, Template};
use crate::storage::{object_key, ObjectStore};

#[derive(Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field_id: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Template has no journal type named '{0}'")]
    UnknownJournalType(String),

    #[error("Submission failed validation")]
    Invalid(Vec<FieldError>),
}

impl SubmissionError {
    /// Flatten field errors into the one-line message shape the API uses.
    pub fn detail(&self) -> String {
        match self {
            SubmissionError::UnknownJournalType(name) => {
                format!("Template has no journal type named '{}'", name)
            }
            SubmissionError::Invalid(errors) => errors
                .iter()
                .map(|e| format!("{}: {}", e.field_id, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

/// Validate and serialize raw client values into a flat submission
/// payload keyed by field id.
///
/// Every field descriptor with a recognized type contributes exactly one
/// key. Image values are uploaded to the object store first and their
/// public URL lands in the payload; a failed upload degrades that field
/// to "" without aborting the submission.
pub async fn build_submission(
    template: &Template,
    journal_type: &str,
    values: &Map<String, Value>,
    user_id: i32,
    store: &dyn ObjectStore,
) -> Result<Map<String, Value>, SubmissionError> {
    let jt = template
        .journal_type(journal_type)
        .ok_or_else(|| SubmissionError::UnknownJournalType(journal_type.to_string()))?;

    let mut payload = Map::new();
    let mut errors = Vec::new();

    for field in &jt.fields {
        let field_type = match field.known_type() {
            Some(ft) => ft,
            // Unrecognized types never rendered, so they never submit
            None => continue,
        };

        let raw = values.get(&field.id);

        let value = match field_type {
            FieldType::Text | FieldType::Textarea => coerce_text(field, raw, &mut errors),
            FieldType::Number => coerce_number(field, raw, &mut errors),
            FieldType::Select => coerce_select(field, raw, &mut errors),
            FieldType::Multiselect => coerce_multiselect(field, raw, &mut errors),
            FieldType::Image => upload_image(field, raw, user_id, store, &mut errors).await,
        };

        payload.insert(field.id.clone(), value);
    }

    if errors.is_empty() {
        Ok(payload)
    } else {
        Err(SubmissionError::Invalid(errors))
    }
}

fn missing(field: &FieldDescriptor, errors: &mut Vec<FieldError>) {
    if field.required {
        errors.push(FieldError {
            field_id: field.id.clone(),
            message: "is required".to_string(),
        });
    }
}

fn invalid(field: &FieldDescriptor, message: &str, errors: &mut Vec<FieldError>) {
    errors.push(FieldError {
        field_id: field.id.clone(),
        message: message.to_string(),
    });
}

fn coerce_text(
    field: &FieldDescriptor,
    raw: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Value {
    match raw {
        Some(Value::String(s)) => {
            if s.is_empty() {
                missing(field, errors);
            }
            Value::String(s.clone())
        }
        None | Some(Value::Null) => {
            missing(field, errors);
            Value::String(String::new())
        }
        Some(_) => {
            invalid(field, "must be a string", errors);
            Value::String(String::new())
        }
    }
}

fn coerce_number(
    field: &FieldDescriptor,
    raw: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Value {
    match raw {
        Some(Value::Number(n)) => Value::Number(n.clone()),
        // Native form inputs submit numbers as strings
        Some(Value::String(s)) if !s.is_empty() => match s.parse::<f64>() {
            Ok(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or_else(|| {
                    invalid(field, "is not a finite number", errors);
                    Value::String(String::new())
                }),
            Err(_) => {
                invalid(field, "must be a number", errors);
                Value::String(String::new())
            }
        },
        None | Some(Value::Null) | Some(Value::String(_)) => {
            missing(field, errors);
            Value::String(String::new())
        }
        Some(_) => {
            invalid(field, "must be a number", errors);
            Value::String(String::new())
        }
    }
}

fn coerce_select(
    field: &FieldDescriptor,
    raw: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Value {
    let options = field.options.as_deref().unwrap_or(&[]);

    match raw {
        Some(Value::String(s)) if !s.is_empty() => {
            if options.iter().any(|o| o == s) {
                Value::String(s.clone())
            } else {
                invalid(field, "is not one of the allowed options", errors);
                Value::String(String::new())
            }
        }
        _ => {
            missing(field, errors);
            Value::String(String::new())
        }
    }
}

fn coerce_multiselect(
    field: &FieldDescriptor,
    raw: Option<&Value>,
    errors: &mut Vec<FieldError>,
) -> Value {
    let options = field.options.as_deref().unwrap_or(&[]);

    match raw {
        Some(Value::Array(items)) => {
            let mut selected = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) if options.iter().any(|o| o == s) => {
                        selected.push(Value::String(s.clone()));
                    }
                    _ => {
                        invalid(field, "contains a value outside the allowed options", errors);
                        return Value::Array(vec![]);
                    }
                }
            }
            if selected.is_empty() {
                missing(field, errors);
            }
            Value::Array(selected)
        }
        None | Some(Value::Null) => {
            missing(field, errors);
            Value::Array(vec![])
        }
        Some(_) => {
            invalid(field, "must be an array of options", errors);
            Value::Array(vec![])
        }
    }
}

async fn upload_image(
    field: &FieldDescriptor,
    raw: Option<&Value>,
    user_id: i32,
    store: &dyn ObjectStore,
    errors: &mut Vec<FieldError>,
) -> Value {
    let raw = match raw {
        Some(Value::Null) | None => {
            missing(field, errors);
            return Value::String(String::new());
        }
        Some(v) => v,
    };

    let upload: ImageUpload = match serde_json::from_value(raw.clone()) {
        Ok(u) => u,
        Err(_) => {
            invalid(field, "must be a file object with base64 data", errors);
            return Value::String(String::new());
        }
    };

    let bytes = match STANDARD.decode(&upload.data) {
        Ok(b) => b,
        Err(_) => {
            invalid(field, "has undecodable file data", errors);
            return Value::String(String::new());
        }
    };

    let key = object_key(user_id, &field.id, &upload.filename);

    // Best-effort: a failed upload degrades this field to "" rather than
    // failing the whole submission.
    match store.upload(&key, bytes, &upload.content_type).await {
        Ok(url) => Value::String(url),
        Err(e) => {
            tracing::warn!(
                field_id = %field.id,
                error = %e,
                "Image upload failed; submitting empty value"
            );
            Value::String(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JournalType;
    use crate::storage::StorageError;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct MockStore {
        fail: bool,
        uploads: Mutex<Vec<String>>,
    }

    impl MockStore {
        fn ok() -> Self {
            Self { fail: false, uploads: Mutex::new(vec![]) }
        }

        fn failing() -> Self {
            Self { fail: true, uploads: Mutex::new(vec![]) }
        }
    }

    #[async_trait]
    impl ObjectStore for MockStore {
        async fn upload(
            &self,
            path: &str,
            _bytes: Vec<u8>,
            _content_type: &str,
        ) -> Result<String, StorageError> {
            if self.fail {
                return Err(StorageError::Rejected(503));
            }
            self.uploads.lock().unwrap().push(path.to_string());
            Ok(format!("https://files.example.com/{}", path))
        }
    }

    fn field(id: &str, field_type: &str, required: bool) -> FieldDescriptor {
        FieldDescriptor {
            id: id.to_string(),
            label: id.to_string(),
            field_type: field_type.to_string(),
            placeholder: None,
            options: None,
            required,
            description: None,
        }
    }

    fn select_field(id: &str, options: &[&str]) -> FieldDescriptor {
        let mut f = field(id, "select", false);
        f.options = Some(options.iter().map(|s| s.to_string()).collect());
        f
    }

    fn template_with(fields: Vec<FieldDescriptor>) -> Template {
        Template {
            id: Uuid::new_v4(),
            name: "Daily Mood".to_string(),
            description: None,
            category: "mood".to_string(),
            tags: vec![],
            icon: None,
            color: None,
            features: vec![],
            journal_types: vec![JournalType {
                name: "Morning".to_string(),
                description: None,
                fields,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn values(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_payload_contains_every_known_field_id() {
        let template = template_with(vec![
            field("title", "text", true),
            field("notes", "textarea", false),
            field("score", "number", false),
            field("widget", "slider", false), // unknown, never submits
        ]);
        let store = MockStore::ok();

        let payload = build_submission(
            &template,
            "Morning",
            &values(&[("title", json!("hello"))]),
            1,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(payload.len(), 3);
        assert!(payload.contains_key("title"));
        assert!(payload.contains_key("notes"));
        assert!(payload.contains_key("score"));
        assert!(!payload.contains_key("widget"));
        assert_eq!(payload["notes"], json!(""));
    }

    #[tokio::test]
    async fn test_absent_optional_multiselect_serializes_as_empty_array() {
        let mut tags = field("moods", "multiselect", false);
        tags.options = Some(vec!["calm".to_string(), "tired".to_string()]);
        let template = template_with(vec![tags]);
        let store = MockStore::ok();

        let payload = build_submission(&template, "Morning", &values(&[]), 1, &store)
            .await
            .unwrap();

        assert_eq!(payload["moods"], json!([]));
    }

    #[tokio::test]
    async fn test_select_value_passes_through() {
        let template = template_with(vec![select_field("choice", &["A", "B"])]);
        let store = MockStore::ok();

        let payload = build_submission(
            &template,
            "Morning",
            &values(&[("choice", json!("B"))]),
            1,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(payload["choice"], json!("B"));
    }

    #[tokio::test]
    async fn test_select_rejects_value_outside_options() {
        let template = template_with(vec![select_field("choice", &["A", "B"])]);
        let store = MockStore::ok();

        let err = build_submission(
            &template,
            "Morning",
            &values(&[("choice", json!("C"))]),
            1,
            &store,
        )
        .await
        .unwrap_err();

        match err {
            SubmissionError::Invalid(errors) => {
                assert_eq!(errors[0].field_id, "choice");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_required_field_missing_is_an_error() {
        let template = template_with(vec![field("title", "text", true)]);
        let store = MockStore::ok();

        let err = build_submission(&template, "Morning", &values(&[]), 1, &store)
            .await
            .unwrap_err();

        match err {
            SubmissionError::Invalid(errors) => {
                assert_eq!(errors[0].field_id, "title");
                assert_eq!(errors[0].message, "is required");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_number_coerces_from_string() {
        let template = template_with(vec![field("score", "number", false)]);
        let store = MockStore::ok();

        let payload = build_submission(
            &template,
            "Morning",
            &values(&[("score", json!("7.5"))]),
            1,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(payload["score"], json!(7.5));
    }

    #[tokio::test]
    async fn test_multiselect_keeps_members_only() {
        let mut f = field("moods", "multiselect", false);
        f.options = Some(vec!["calm".to_string(), "tired".to_string()]);
        let template = template_with(vec![f]);
        let store = MockStore::ok();

        let payload = build_submission(
            &template,
            "Morning",
            &values(&[("moods", json!(["calm", "tired"]))]),
            1,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(payload["moods"], json!(["calm", "tired"]));

        let err = build_submission(
            &template,
            "Morning",
            &values(&[("moods", json!(["calm", "angry"]))]),
            1,
            &store,
        )
        .await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_image_upload_replaces_file_with_url() {
        let template = template_with(vec![field("photo", "image", false)]);
        let store = MockStore::ok();

        let image = json!({
            "filename": "sunset.png",
            "contentType": "image/png",
            "data": STANDARD.encode(b"fake png bytes"),
        });

        let payload = build_submission(
            &template,
            "Morning",
            &values(&[("photo", image)]),
            42,
            &store,
        )
        .await
        .unwrap();

        let url = payload["photo"].as_str().unwrap();
        assert!(url.starts_with("https://files.example.com/uploads/42/photo/"));
        assert!(url.ends_with("sunset.png"));
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_submits_empty_string() {
        let template = template_with(vec![
            field("title", "text", true),
            field("photo", "image", false),
        ]);
        let store = MockStore::failing();

        let image = json!({
            "filename": "sunset.png",
            "contentType": "image/png",
            "data": STANDARD.encode(b"fake png bytes"),
        });

        let payload = build_submission(
            &template,
            "Morning",
            &values(&[("title", json!("a day")), ("photo", image)]),
            1,
            &store,
        )
        .await
        .unwrap();

        // Upload failure does not abort; the field degrades to ""
        assert_eq!(payload["photo"], json!(""));
        assert_eq!(payload["title"], json!("a day"));
    }

    #[tokio::test]
    async fn test_undecodable_image_is_a_validation_error() {
        let template = template_with(vec![field("photo", "image", false)]);
        let store = MockStore::ok();

        let image = json!({
            "filename": "x.png",
            "contentType": "image/png",
            "data": "!!! not base64 !!!",
        });

        let result = build_submission(
            &template,
            "Morning",
            &values(&[("photo", image)]),
            1,
            &store,
        )
        .await;

        assert!(result.is_err());
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_journal_type() {
        let template = template_with(vec![]);
        let store = MockStore::ok();

        let err = build_submission(&template, "Evening", &values(&[]), 1, &store)
            .await
            .unwrap_err();

        assert!(matches!(err, SubmissionError::UnknownJournalType(_)));
    }
}
