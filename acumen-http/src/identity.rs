//! Privy identity-provider client.
//!
//! Thin [`IdentityProvider`] implementation over the Privy user API. The
//! wire format (snake_case REST records) is private to this module; callers
//! only see the core [`IdentityUser`] shape. All failures - unknown user,
//! bad credentials, provider outage - surface as [`IdentityError`], which
//! the deposit-address resolver converts into the deterministic fallback.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use acumen::identity::{IdentityError, IdentityProvider, IdentityUser, LinkedAccount};

/// Public Privy API base URL.
pub const DEFAULT_BASE_URL: &str = "https://auth.privy.io/api/v1";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`PrivyIdentityClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivyConfig {
    /// Privy application id.
    pub app_id: String,
    /// Privy application secret.
    pub app_secret: String,
    /// API base URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

/// [`IdentityProvider`] implementation over the Privy user API.
#[derive(Debug, Clone)]
pub struct PrivyIdentityClient {
    http: reqwest::Client,
    base_url: Url,
    app_id: String,
    app_secret: String,
}

impl PrivyIdentityClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL does not parse.
    pub fn new(config: &PrivyConfig) -> Result<Self, url::ParseError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        Ok(Self {
            http,
            base_url: config.base_url.parse()?,
            app_id: config.app_id.clone(),
            app_secret: config.app_secret.clone(),
        })
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.base_url.as_str().trim_end_matches('/'))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .basic_auth(&self.app_id, Some(&self.app_secret))
            .header("privy-app-id", &self.app_id)
    }

    async fn decode_user(response: reqwest::Response) -> Result<IdentityUser, IdentityError> {
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::NotFound);
        }
        let response = response
            .error_for_status()
            .map_err(|err| IdentityError::Provider(Box::new(err)))?;
        let wire: WireUser = response
            .json()
            .await
            .map_err(|err| IdentityError::Provider(Box::new(err)))?;
        Ok(wire.into())
    }
}

impl IdentityProvider for PrivyIdentityClient {
    async fn user_by_id(&self, id: &str) -> Result<IdentityUser, IdentityError> {
        let response = self
            .authorized(self.http.get(self.endpoint(&format!("users/{id}"))))
            .send()
            .await
            .map_err(|err| IdentityError::Provider(Box::new(err)))?;
        Self::decode_user(response).await
    }

    async fn user_by_email(&self, email: &str) -> Result<IdentityUser, IdentityError> {
        let response = self
            .authorized(self.http.post(self.endpoint("users/email")))
            .json(&serde_json::json!({ "address": email }))
            .send()
            .await
            .map_err(|err| IdentityError::Provider(Box::new(err)))?;
        Self::decode_user(response).await
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireUser {
    id: String,
    linked_accounts: Vec<WireLinkedAccount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireLinkedAccount {
    #[serde(rename = "type")]
    kind: String,
    connector_type: Option<String>,
    chain_id: Option<String>,
    wallet_client_type: Option<String>,
    address: Option<String>,
}

impl From<WireUser> for IdentityUser {
    fn from(wire: WireUser) -> Self {
        Self {
            id: wire.id,
            linked_accounts: wire
                .linked_accounts
                .into_iter()
                .map(|account| LinkedAccount {
                    kind: account.kind,
                    connector_type: account.connector_type,
                    chain_id: account.chain_id,
                    wallet_client_type: account.wallet_client_type,
                    address: account.address,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> PrivyIdentityClient {
        PrivyIdentityClient::new(&PrivyConfig {
            app_id: "app".into(),
            app_secret: "secret".into(),
            base_url: server.uri(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn decodes_linked_accounts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/did:privy:u1"))
            .and(header_exists("authorization"))
            .and(header_exists("privy-app-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "did:privy:u1",
                "linked_accounts": [
                    { "type": "email", "address": "alice@example.com" },
                    {
                        "type": "wallet",
                        "connector_type": "embedded",
                        "chain_id": "eip155:84532",
                        "address": "0x1111111111111111111111111111111111111111"
                    }
                ]
            })))
            .mount(&server)
            .await;

        let user = client(&server).user_by_id("did:privy:u1").await.unwrap();
        assert_eq!(user.id, "did:privy:u1");
        assert_eq!(
            user.embedded_evm_address(),
            Some("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(user.embedded_solana_address(), None);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/did:privy:missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client(&server).user_by_id("did:privy:missing").await.unwrap_err();
        assert!(matches!(err, IdentityError::NotFound));
    }

    #[tokio::test]
    async fn provider_outage_is_a_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server).user_by_id("did:privy:u1").await.unwrap_err();
        assert!(matches!(err, IdentityError::Provider(_)));
    }

    #[tokio::test]
    async fn email_lookup_posts_the_address() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "did:privy:u2",
                "linked_accounts": []
            })))
            .mount(&server)
            .await;

        let user = client(&server).user_by_email("bob@example.com").await.unwrap();
        assert_eq!(user.id, "did:privy:u2");
        assert!(user.linked_accounts.is_empty());
    }
}
