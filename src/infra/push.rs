use crate::app::ports::PushSenderPort;
use crate::config::PushConfig;
use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Mutex;
use tracing::debug;

/// OAuth2 service-account claims signed into the assertion JWT.
#[derive(Debug, Serialize)]
pub struct ServiceAccountClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn build_claims(client_email: &str, scope: &str, token_url: &str) -> ServiceAccountClaims {
    let now = Utc::now().timestamp();
    ServiceAccountClaims {
        iss: client_email.to_string(),
        scope: scope.to_string(),
        aud: token_url.to_string(),
        iat: now,
        // Provider caps assertion lifetime at one hour
        exp: now + 3600,
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Push adapter: signs a service-account JWT, exchanges it for a bearer
/// token, then posts one messages:send call per device token. Credentials
/// come from PUSH_SA_CLIENT_EMAIL and PUSH_SA_PRIVATE_KEY (PEM).
pub struct ServiceAccountPush {
    config: PushConfig,
    token: Mutex<Option<CachedToken>>,
}

impl ServiceAccountPush {
    pub fn new(config: PushConfig) -> Self {
        Self {
            config,
            token: Mutex::new(None),
        }
    }

    fn credentials() -> Result<(String, String), String> {
        let client_email = std::env::var("PUSH_SA_CLIENT_EMAIL")
            .map_err(|_| "PUSH_SA_CLIENT_EMAIL environment variable not set".to_string())?;
        let private_key = std::env::var("PUSH_SA_PRIVATE_KEY")
            .map_err(|_| "PUSH_SA_PRIVATE_KEY environment variable not set".to_string())?;
        Ok((client_email, private_key))
    }

    fn sign_assertion(&self) -> Result<String, String> {
        let (client_email, private_key) = Self::credentials()?;
        let claims = build_claims(&client_email, &self.config.scope, &self.config.token_url);
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| format!("invalid service-account private key: {e}"))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| format!("failed to sign assertion: {e}"))
    }

    async fn bearer_token(&self) -> Result<String, String> {
        {
            let cached = self.token.lock().unwrap();
            if let Some(token) = cached.as_ref() {
                // 60s slack so a token never expires mid-fanout
                if token.expires_at > Utc::now().timestamp() + 60 {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let assertion = self.sign_assertion()?;
        debug!("Exchanging service-account assertion at {}", self.config.token_url);
        let client = reqwest::Client::new();
        let resp = client
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("token exchange failed: {} - {}", status, body));
        }

        let token: TokenResponse = resp.json().await.map_err(|e| e.to_string())?;
        let access_token = token.access_token.clone();
        *self.token.lock().unwrap() = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Utc::now().timestamp() + token.expires_in,
        });
        Ok(access_token)
    }
}

#[async_trait]
impl PushSenderPort for ServiceAccountPush {
    async fn send_to_token(&self, token: &str, title: &str, body: &str) -> Result<(), String> {
        let bearer = self.bearer_token().await?;
        let endpoint = format!(
            "{}/projects/{}/messages:send",
            self.config.send_url.trim_end_matches('/'),
            self.config.project_id
        );

        let client = reqwest::Client::new();
        let resp = client
            .post(&endpoint)
            .bearer_auth(bearer)
            .json(&json!({
                "message": {
                    "token": token,
                    "notification": { "title": title, "body": body },
                }
            }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = resp.status();
        if !status.is_success() {
            let resp_body = resp.text().await.unwrap_or_default();
            return Err(format!("push send failed: {} - {}", status, resp_body));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_target_the_token_endpoint() {
        let claims = build_claims(
            "svc@project.iam.example",
            "https://example.com/auth/messaging",
            "https://oauth2.example.com/token",
        );
        assert_eq!(claims.iss, "svc@project.iam.example");
        assert_eq!(claims.aud, "https://oauth2.example.com/token");
        assert_eq!(claims.exp - claims.iat, 3600);
    }
}
