use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Journalhub API",
        version = "1.0.0",
        description = "Backend API for the Journalhub journaling application",
        contact(
            name = "API Support",
            email = "support@journalhub.app"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Auth
        crate::handlers::auth_handler::sign_in,
        crate::handlers::auth_handler::sign_out,
        crate::handlers::auth_handler::get_me,

        // Journals
        crate::handlers::journals_handler::get_journals,
        crate::handlers::journals_handler::get_journal,
        crate::handlers::journals_handler::create_journal,
        crate::handlers::journals_handler::update_journal,
        crate::handlers::journals_handler::delete_journal,

        // Entries
        crate::handlers::entries_handler::get_entries,
        crate::handlers::entries_handler::get_entry,
        crate::handlers::entries_handler::create_entry,
        crate::handlers::entries_handler::update_entry,
        crate::handlers::entries_handler::delete_entry,

        // Templates
        crate::handlers::templates_handler::get_templates,
        crate::handlers::templates_handler::get_template,
        crate::handlers::templates_handler::get_template_form,
        crate::handlers::templates_handler::submit_template_form,
        crate::handlers::templates_handler::create_template,
        crate::handlers::templates_handler::update_template,
        crate::handlers::templates_handler::delete_template,

        // Admin
        crate::handlers::users_handler::get_users,
        crate::handlers::users_handler::get_user,
        crate::handlers::users_handler::get_stats,
        crate::handlers::users_handler::update_role,
        crate::handlers::users_handler::update_user,
        crate::handlers::users_handler::delete_user,
    ),
    components(
        schemas(
            crate::models::user::Role,
            crate::models::user::UserProfile,
            crate::models::user_input::UpdateRoleInput,
            crate::models::user_input::UpdateUserProfileInput,
            crate::models::user_input::UserMutationResponse,
            crate::models::user_input::PartitionedUsers,
            crate::models::user_input::AdminStats,
            crate::models::journal::Journal,
            crate::models::journal::JournalSettings,
            crate::models::journal_input::CreateJournalInput,
            crate::models::journal_input::UpdateJournalInput,
            crate::models::journal_input::JournalMutationResponse,
            crate::models::entry::Entry,
            crate::models::entry_input::CreateEntryInput,
            crate::models::entry_input::UpdateEntryInput,
            crate::models::entry_input::EntryMutationResponse,
            crate::models::template::Template,
            crate::models::template::JournalType,
            crate::models::template::FieldDescriptor,
            crate::models::template::FieldType,
            crate::models::template_input::CreateTemplateInput,
            crate::models::template_input::UpdateTemplateInput,
            crate::models::template_input::TemplateMutationResponse,
            crate::models::form::RenderedForm,
            crate::models::form::FormSection,
            crate::models::form::FormControl,
            crate::models::form::ImageUpload,
            crate::models::form::SubmitFormInput,
            crate::handlers::auth_handler::SignInRequest,
            crate::handlers::auth_handler::SignInResponse,
            crate::handlers::auth_handler::SignOutResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Sign-in and session"),
        (name = "journals", description = "Journal CRUD"),
        (name = "entries", description = "Entry CRUD"),
        (name = "templates", description = "Template marketplace and forms"),
        (name = "admin", description = "Role-gated administration"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("__session"))),
            );
        }
    }
}
