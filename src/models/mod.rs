pub mod entry;
pub mod entry_input;
pub mod form;
pub mod journal;
pub mod journal_input;
pub mod template;
pub mod template_input;
pub mod user;
pub mod user_input;

pub use entry::Entry;
pub use entry_input::{CreateEntryInput, EntryMutationResponse, UpdateEntryInput};
pub use form::{FormControl, FormSection, ImageUpload, RenderedForm, SubmitFormInput};
pub use journal::{Journal, JournalSettings};
pub use journal_input::{CreateJournalInput, JournalMutationResponse, UpdateJournalInput};
pub use template::{validate_journal_types, FieldDescriptor, FieldType, JournalType, Template};
pub use template_input::{CreateTemplateInput, TemplateMutationResponse, UpdateTemplateInput};
pub use user::{Role, UserProfile};
pub use user_input::{
    AdminStats, PartitionedUsers, UpdateRoleInput, UpdateUserProfileInput, UserMutationResponse,
};
