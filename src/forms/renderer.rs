use crate::models::{
    FieldDescriptor, FieldType, FormControl, FormSection, JournalType, RenderedForm, Template,
};

/// Expand a template into its renderable form: one section per journal
/// type, one control per field descriptor with a recognized type.
/// Descriptors with unrecognized types produce no control.
pub fn render_form(template: &Template) -> RenderedForm {
    RenderedForm {
        template_id: template.id,
        name: template.name.clone(),
        sections: template.journal_types.iter().map(render_section).collect(),
    }
}

fn render_section(journal_type: &JournalType) -> FormSection {
    FormSection {
        name: journal_type.name.clone(),
        description: journal_type.description.clone(),
        controls: journal_type
            .fields
            .iter()
            .filter_map(render_control)
            .collect(),
    }
}

fn render_control(field: &FieldDescriptor) -> Option<FormControl> {
    let field_type = match field.known_type() {
        Some(ft) => ft,
        None => {
            tracing::debug!(
                field_id = %field.id,
                field_type = %field.field_type,
                "Skipping field with unrecognized type"
            );
            return None;
        }
    };

    Some(FormControl {
        id: field.id.clone(),
        label: field.label.clone(),
        field_type,
        placeholder: field.placeholder.clone(),
        options: if field_type.needs_options() {
            field.options.clone()
        } else {
            None
        },
        required: field.required,
        description: field.description.clone(),
        accept: (field_type == FieldType::Image).then(|| "image/*".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

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
                name: "Morning check-in".to_string(),
                description: Some("How are you feeling?".to_string()),
                fields,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_one_control_per_known_field() {
        let template = template_with(vec![
            field("title", "text"),
            field("notes", "textarea"),
            field("score", "number"),
            field("photo", "image"),
        ]);

        let form = render_form(&template);
        assert_eq!(form.sections.len(), 1);

        let controls = &form.sections[0].controls;
        assert_eq!(controls.len(), 4);
        let ids: Vec<&str> = controls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["title", "notes", "score", "photo"]);
    }

    #[test]
    fn test_unknown_types_render_nothing() {
        let template = template_with(vec![
            field("title", "text"),
            field("widget", "slider"),
            field("chart", "sparkline"),
        ]);

        let controls = &render_form(&template).sections[0].controls;
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].id, "title");
    }

    #[test]
    fn test_select_control_carries_options() {
        let mut select = field("mood", "select");
        select.options = Some(vec!["happy".to_string(), "sad".to_string()]);

        let controls = &render_form(&template_with(vec![select])).sections[0].controls;
        assert_eq!(
            controls[0].options,
            Some(vec!["happy".to_string(), "sad".to_string()])
        );
        assert!(controls[0].accept.is_none());
    }

    #[test]
    fn test_image_control_gets_accept_filter() {
        let controls = &render_form(&template_with(vec![field("photo", "image")])).sections[0]
            .controls;
        assert_eq!(controls[0].accept.as_deref(), Some("image/*"));
    }

    #[test]
    fn test_section_metadata_preserved() {
        let form = render_form(&template_with(vec![]));
        assert_eq!(form.sections[0].name, "Morning check-in");
        assert_eq!(
            form.sections[0].description.as_deref(),
            Some("How are you feeling?")
        );
    }
}
