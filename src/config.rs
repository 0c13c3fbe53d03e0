use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub clerk_secret_key: String,
    pub clerk_publishable_key: String,
    pub clerk_domain: String,
    pub session_secret: String,
    pub storage_base_url: String,
    pub storage_signing_key: String,
    pub debug_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let clerk_secret_key = env::var("CLERK_SECRET_KEY")
            .map_err(|_| "CLERK_SECRET_KEY must be set".to_string())?;

        let clerk_publishable_key = env::var("VITE_CLERK_PUBLISHABLE_KEY")
            .map_err(|_| "VITE_CLERK_PUBLISHABLE_KEY must be set".to_string())?;

        // Extract Clerk domain from publishable key
        // Format: pk_test_xxx or pk_live_xxx
        let clerk_domain = extract_clerk_domain(&clerk_publishable_key)?;

        let session_secret = env::var("SESSION_SECRET")
            .map_err(|_| "SESSION_SECRET must be set".to_string())?;

        let storage_base_url = env::var("STORAGE_BASE_URL")
            .map_err(|_| "STORAGE_BASE_URL must be set".to_string())?
            .trim_end_matches('/')
            .to_string();

        let storage_signing_key = env::var("STORAGE_SIGNING_KEY")
            .map_err(|_| "STORAGE_SIGNING_KEY must be set".to_string())?;

        let debug_key = env::var("DEBUG_KEY")
            .map_err(|_| "DEBUG_KEY must be set".to_string())?;

        Ok(Self {
            database_url,
            clerk_secret_key,
            clerk_publishable_key,
            clerk_domain,
            session_secret,
            storage_base_url,
            storage_signing_key,
            debug_key,
        })
    }
}

fn extract_clerk_domain(publishable_key: &str) -> Result<String, String> {
    // Remove pk_test_ or pk_live_ prefix
    let encoded = publishable_key
        .strip_prefix("pk_test_")
        .or_else(|| publishable_key.strip_prefix("pk_live_"))
        .ok_or("Invalid Clerk publishable key format")?;

    // The domain is base64-encoded in the key
    use std::str;
    let decoded = base64_decode(encoded)
        .map_err(|_| "Failed to decode Clerk domain")?;

    let domain = str::from_utf8(&decoded)
        .map_err(|_| "Invalid UTF-8 in Clerk domain")?
        .trim_end_matches('$')
        .to_string();

    Ok(domain)
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.decode(input).map_err(|e| format!("Base64 decode error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn test_extract_clerk_domain() {
        let encoded = STANDARD.encode("clerk.example.com$");
        let key = format!("pk_test_{}", encoded);

        let domain = extract_clerk_domain(&key).unwrap();
        assert_eq!(domain, "clerk.example.com");
    }

    #[test]
    fn test_extract_clerk_domain_bad_prefix() {
        assert!(extract_clerk_domain("sk_test_abc").is_err());
    }
}
