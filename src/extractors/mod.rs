pub mod auth;
pub mod roles;

pub use auth::AuthenticatedUser;
pub use roles::AdminUser;
