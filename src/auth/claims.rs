use serde::{Deserialize, Serialize};

/// Claims carried in a Clerk-issued RS256 token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ClerkClaims {
    pub sub: String,  // Clerk user ID (user_xxx)
    pub exp: i64,     // Expiration timestamp
    pub iat: i64,     // Issued at timestamp
    pub iss: String,  // Issuer
    pub email: Option<String>,
    pub azp: Option<String>, // Authorized party
}

/// Claims carried in a locally minted HS256 session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,  // Clerk user ID the session was minted for
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}
