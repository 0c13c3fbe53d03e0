use serde_json::Value;

use crate::error::SignInError;
use crate::{AppError, AppResult};

const CLERK_API_BASE: &str = "https://api.clerk.com/v1";

/// The identity the platform hands back after a successful password check.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub clerk_user_id: String,
    pub email: String,
}

/// Verify an email/password pair against Clerk.
///
/// Failure taxonomy: unknown email → UserNotFound, bad password →
/// WrongPassword, malformed email → InvalidEmail, anything else → Other.
pub async fn verify_password(
    email: &str,
    password: &str,
    clerk_secret_key: &str,
) -> Result<VerifiedIdentity, SignInError> {
    if !email.contains('@') || email.trim() != email || email.is_empty() {
        return Err(SignInError::InvalidEmail);
    }

    let client = reqwest::Client::new();

    // Look the user up by email first
    let response = client
        .get(format!("{}/users", CLERK_API_BASE))
        .query(&[("email_address", email)])
        .header("Authorization", format!("Bearer {}", clerk_secret_key))
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, email, "Clerk user lookup failed");
            SignInError::Other(format!("Identity platform unreachable: {}", e))
        })?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::error!(status = %status, email, "Clerk user lookup returned error");
        return Err(SignInError::Other(format!(
            "Identity platform returned {}",
            status
        )));
    }

    let users: Vec<Value> = response
        .json()
        .await
        .map_err(|e| SignInError::Other(format!("Failed to parse user lookup: {}", e)))?;

    let user = users
        .first()
        .ok_or(SignInError::UserNotFound)?;

    let clerk_user_id = user
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| SignInError::Other("User record has no id".to_string()))?
        .to_string();

    // Then check the password against that user
    let response = client
        .post(format!(
            "{}/users/{}/verify_password",
            CLERK_API_BASE, clerk_user_id
        ))
        .header("Authorization", format!("Bearer {}", clerk_secret_key))
        .json(&serde_json::json!({ "password": password }))
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, email, "Clerk password verification failed");
            SignInError::Other(format!("Identity platform unreachable: {}", e))
        })?;

    let status = response.status();
    if status.is_success() {
        tracing::debug!(email, clerk_user_id, "Password verified");
        Ok(VerifiedIdentity {
            clerk_user_id,
            email: email.to_string(),
        })
    } else if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        || status == reqwest::StatusCode::BAD_REQUEST
    {
        Err(SignInError::WrongPassword)
    } else {
        tracing::error!(status = %status, email, "Clerk password verification returned error");
        Err(SignInError::Other(format!(
            "Identity platform returned {}",
            status
        )))
    }
}

/// Fetch a user's primary email from Clerk. Used when a bearer token
/// carries no email claim and the profile row does not exist yet.
pub async fn fetch_primary_email(clerk_user_id: &str, clerk_secret_key: &str) -> AppResult<String> {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/users/{}", CLERK_API_BASE, clerk_user_id))
        .header("Authorization", format!("Bearer {}", clerk_secret_key))
        .send()
        .await
        .map_err(|e| {
            tracing::error!(error = %e, clerk_user_id, "Clerk API request failed");
            AppError::Internal(format!("Clerk API request failed: {}", e))
        })?;

    if !response.status().is_success() {
        let status = response.status();
        tracing::error!(status = %status, clerk_user_id, "Clerk API returned error");
        return Err(AppError::Internal(format!(
            "Clerk API returned {} for user {}",
            status, clerk_user_id
        )));
    }

    let user_data: Value = response.json().await.map_err(|e| {
        AppError::Internal(format!("Failed to parse Clerk response: {}", e))
    })?;

    let email_addresses = user_data
        .get("email_addresses")
        .and_then(|v| v.as_array())
        .ok_or_else(|| {
            AppError::Internal(format!(
                "No email addresses in Clerk response for user {}",
                clerk_user_id
            ))
        })?;

    let primary_email = email_addresses
        .iter()
        .find(|e| e.get("id") == user_data.get("primary_email_address_id"))
        .or_else(|| email_addresses.first())
        .and_then(|e| e.get("email_address"))
        .and_then(|e| e.as_str())
        .ok_or_else(|| {
            AppError::Internal(format!("No primary email found for user {}", clerk_user_id))
        })?
        .to_string();

    Ok(primary_email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_email_rejected_locally() {
        // No email at all and no '@' never reach the network
        let result = verify_password("not-an-email", "pw", "sk_test_dummy").await;
        assert_eq!(result.unwrap_err(), SignInError::InvalidEmail);

        let result = verify_password(" padded@example.com", "pw", "sk_test_dummy").await;
        assert_eq!(result.unwrap_err(), SignInError::InvalidEmail);
    }
}
