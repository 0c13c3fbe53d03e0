pub mod claims;
pub mod clerk_api;
pub mod clerk_jwks;
pub mod jwt;
pub mod session;

pub use claims::{ClerkClaims, SessionClaims};
pub use clerk_api::{fetch_primary_email, verify_password, VerifiedIdentity};
pub use clerk_jwks::JwksCache;
pub use jwt::validate_clerk_jwt;
pub use session::{issue_session_token, validate_session_token};
