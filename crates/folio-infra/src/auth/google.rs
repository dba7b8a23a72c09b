//! Google ID-token verification through the tokeninfo endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use folio_core::ports::{AuthError, IdentityVerifier, VerifiedIdentity};

use crate::http::{ApiClient, Body, ClientConfig, HttpClientError, typed};

const DEFAULT_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const TOKENINFO_TIMEOUT: Duration = Duration::from_secs(10);
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client id the token must be issued for.
    pub client_id: String,
    pub tokeninfo_url: Url,
}

impl GoogleConfig {
    pub fn from_env() -> Option<Self> {
        let client_id = std::env::var("GOOGLE_CLIENT_ID").ok()?;
        let raw = std::env::var("GOOGLE_TOKENINFO_URL")
            .unwrap_or_else(|_| DEFAULT_TOKENINFO_URL.to_string());
        match Url::parse(&raw) {
            Ok(tokeninfo_url) => Some(Self {
                client_id,
                tokeninfo_url,
            }),
            Err(e) => {
                tracing::error!(url = %raw, error = %e, "Invalid GOOGLE_TOKENINFO_URL");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    iss: Option<String>,
    email: Option<String>,
    email_verified: Option<Value>,
    name: Option<String>,
}

impl TokenInfo {
    fn email_verified(&self) -> bool {
        match &self.email_verified {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

/// Verifies Google ID tokens by asking Google to decode them.
pub struct GoogleIdentityVerifier {
    api: ApiClient,
    config: GoogleConfig,
}

impl GoogleIdentityVerifier {
    pub fn new(config: GoogleConfig) -> Self {
        let client_config = ClientConfig {
            timeout: Some(TOKENINFO_TIMEOUT),
            ..ClientConfig::default()
        };
        Self::with_client(ApiClient::native(client_config), config)
    }

    pub fn with_client(api: ApiClient, config: GoogleConfig) -> Self {
        Self { api, config }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, AuthError> {
        let info = self
            .api
            .post(
                self.config.tokeninfo_url.as_str(),
                Body::url_encoded([("id_token", id_token)]),
            )
            .send_as(&typed::<TokenInfo>())
            .await
            .map_err(|e| match e {
                HttpClientError::Api(api) if api.status.is_client_error() => {
                    AuthError::InvalidCredentials
                }
                other => AuthError::ProviderUnavailable(other.to_string()),
            })?;

        if info.aud != self.config.client_id {
            tracing::warn!(aud = %info.aud, "ID token issued for another client");
            return Err(AuthError::InvalidCredentials);
        }
        if let Some(iss) = &info.iss {
            if !GOOGLE_ISSUERS.contains(&iss.as_str()) {
                tracing::warn!(iss = %iss, "ID token from unexpected issuer");
                return Err(AuthError::InvalidCredentials);
            }
        }
        if !info.email_verified() {
            return Err(AuthError::InvalidCredentials);
        }
        let email = info.email.ok_or(AuthError::InvalidCredentials)?;

        Ok(VerifiedIdentity {
            email,
            name: info.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn verifier(server: &MockServer) -> GoogleIdentityVerifier {
        GoogleIdentityVerifier::new(GoogleConfig {
            client_id: "client-123".to_string(),
            tokeninfo_url: Url::parse(&format!("{}/tokeninfo", server.uri())).unwrap(),
        })
    }

    #[tokio::test]
    async fn test_valid_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tokeninfo"))
            .and(body_string("id_token=tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "aud": "client-123",
                "iss": "https://accounts.google.com",
                "email": "writer@example.com",
                "email_verified": "true",
                "name": "Writer"
            })))
            .mount(&server)
            .await;

        let identity = verifier(&server).await.verify("tok").await.unwrap();
        assert_eq!(identity.email, "writer@example.com");
        assert_eq!(identity.name.as_deref(), Some("Writer"));
    }

    #[tokio::test]
    async fn test_wrong_audience() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "aud": "someone-else",
                "email": "writer@example.com",
                "email_verified": true
            })))
            .mount(&server)
            .await;

        let err = verifier(&server).await.verify("tok").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_token" })),
            )
            .mount(&server)
            .await;

        let err = verifier(&server).await.verify("expired").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_provider_down() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = verifier(&server).await.verify("tok").await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[tokio::test]
    async fn test_id_token_stays_out_of_logs() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string("id_token=SECRET-ID-TOKEN"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_token" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = verifier(&server)
            .await
            .verify("SECRET-ID-TOKEN")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let text = logs.text();
        assert!(text.contains("HTTP request started"));
        assert!(text.contains("HTTP request returned an error status"));
        assert!(text.contains("/tokeninfo"));
        assert!(!text.contains("SECRET-ID-TOKEN"));
    }
}
