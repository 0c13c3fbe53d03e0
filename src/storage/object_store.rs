use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload request failed: {0}")]
    Transport(String),

    #[error("Store rejected upload with status {0}")]
    Rejected(u16),

    #[error("{0}")]
    Signing(String),
}

/// File storage boundary: put bytes at a path, get a public URL back.
///
/// A trait seam so form submission logic can be exercised without a live
/// store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// Production store: HTTP PUT to `{base_url}/{path}` authorized with an
/// HMAC-SHA256 signature over the object path.
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    signing_key: String,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, signing_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            signing_key: signing_key.to_string(),
        }
    }

    fn sign_path(&self, path: &str) -> Result<String, StorageError> {
        sign_object_path(path, &self.signing_key)
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = format!("{}/{}", self.base_url, path);
        let signature = self.sign_path(path)?;

        tracing::debug!(path, size = bytes.len(), "Uploading object");

        let response = self
            .client
            .put(&url)
            .header("Content-Type", content_type)
            .header("X-Storage-Signature", signature)
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, path, "Object upload failed");
                StorageError::Transport(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            tracing::error!(status, path, "Object store rejected upload");
            return Err(StorageError::Rejected(status));
        }

        Ok(url)
    }
}

/// HMAC-SHA256 over the object path, hex-encoded.
fn sign_object_path(path: &str, signing_key: &str) -> Result<String, StorageError> {
    let mut mac = HmacSha256::new_from_slice(signing_key.as_bytes())
        .map_err(|e| StorageError::Signing(format!("HMAC initialization error: {}", e)))?;

    mac.update(path.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build an object key for an uploaded form image. A random nonce keeps
/// concurrent uploads of identically named files from colliding.
pub fn object_key(user_id: i32, field_id: &str, filename: &str) -> String {
    let nonce: u64 = rand::thread_rng().gen();
    // Strip path separators out of the client-supplied filename
    let safe_name: String = filename
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();

    format!("uploads/{}/{}/{:016x}-{}", user_id, field_id, nonce, safe_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_stable_and_key_dependent() {
        let a = sign_object_path("uploads/1/photo/x.png", "key_one").unwrap();
        let b = sign_object_path("uploads/1/photo/x.png", "key_one").unwrap();
        let c = sign_object_path("uploads/1/photo/x.png", "key_two").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64); // hex-encoded SHA-256
    }

    #[test]
    fn test_object_key_sanitizes_filename() {
        let key = object_key(7, "photo", "../../etc/passwd");
        assert!(key.starts_with("uploads/7/photo/"));
        assert!(!key.contains("/etc/"));
    }

    #[test]
    fn test_object_keys_do_not_collide() {
        let a = object_key(1, "photo", "same.png");
        let b = object_key(1, "photo", "same.png");
        assert_ne!(a, b);
    }
}
