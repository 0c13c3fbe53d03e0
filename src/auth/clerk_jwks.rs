use jsonwebtoken::{jwk::JwkSet, DecodingKey};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

const JWKS_CACHE_KEY: &str = "jwks";

/// Caches the identity platform's JWKS document so bearer-token
/// validation does not hit the network on every request. An unknown
/// `kid` forces one refetch to pick up rotated signing keys.
pub struct JwksCache {
    cache: Cache<&'static str, Arc<JwkSet>>,
    client: reqwest::Client,
    jwks_url: String,
}

impl JwksCache {
    pub fn new(clerk_domain: &str) -> Self {
        Self {
            cache: Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .build(),
            client: reqwest::Client::new(),
            jwks_url: format!("https://{}/.well-known/jwks.json", clerk_domain),
        }
    }

    async fn fetch(&self) -> Result<Arc<JwkSet>, String> {
        let response = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("JWKS endpoint returned {}", response.status()));
        }

        let jwks: JwkSet = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse JWKS: {}", e))?;

        let jwks = Arc::new(jwks);
        self.cache.insert(JWKS_CACHE_KEY, jwks.clone()).await;
        Ok(jwks)
    }

    async fn get_jwks(&self) -> Result<Arc<JwkSet>, String> {
        match self.cache.get(&JWKS_CACHE_KEY).await {
            Some(jwks) => Ok(jwks),
            None => self.fetch().await,
        }
    }

    pub async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, String> {
        let mut jwks = self.get_jwks().await?;

        if find_key(&jwks, kid).is_none() {
            // Key may have rotated since the last fetch
            self.cache.invalidate(&JWKS_CACHE_KEY).await;
            jwks = self.fetch().await?;
        }

        let jwk = find_key(&jwks, kid).ok_or_else(|| format!("No key found with kid: {}", kid))?;
        DecodingKey::from_jwk(jwk).map_err(|e| format!("Failed to create decoding key: {}", e))
    }
}

fn find_key<'a>(jwks: &'a JwkSet, kid: &str) -> Option<&'a jsonwebtoken::jwk::Jwk> {
    jwks.keys
        .iter()
        .find(|k| k.common.key_id.as_deref() == Some(kid))
}
