//! OAuth 服务
//! Google OAuth2 授权码交换与 token 身份查询

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::models::Credentials;
use crate::core::traits::{IdentityProvider, IdentityRecord, ProviderError};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Token 响应
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
}

/// tokeninfo 响应，只关心 email
#[derive(Debug, Clone, Deserialize)]
struct TokenInfoResponse {
    email: Option<String>,
}

pub struct GoogleIdentityProvider {
    client: reqwest::Client,
    credentials: Credentials,
    redirect_uri: String,
    token_url: String,
    tokeninfo_url: String,
}

impl GoogleIdentityProvider {
    pub fn new(credentials: Credentials, redirect_uri: impl Into<String>) -> Result<Self, String> {
        Self::with_endpoints(credentials, redirect_uri, TOKEN_URL, TOKENINFO_URL)
    }

    /// Same as [`new`](Self::new) with overridden endpoints.
    pub fn with_endpoints(
        credentials: Credentials,
        redirect_uri: impl Into<String>,
        token_url: impl Into<String>,
        tokeninfo_url: impl Into<String>,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            credentials,
            redirect_uri: redirect_uri.into(),
            token_url: token_url.into(),
            tokeninfo_url: tokeninfo_url.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    /// 使用 Authorization Code 交换 Token
    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        tracing::info!("Exchanging authorization code...");

        let response = self.client.post(&self.token_url).form(&params).send().await?;

        if response.status().is_success() {
            let token_res = response.json::<TokenResponse>().await?;
            tracing::info!(
                "Token exchange succeeded: {}..., expires in {}s",
                token_res.access_token.chars().take(8).collect::<String>(),
                token_res.expires_in
            );
            Ok(token_res.access_token)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ProviderError::Rejected(format!(
                "token exchange failed: {}",
                error_text
            )))
        }
    }

    /// 查询 token 对应的身份
    async fn token_info(&self, token: &str) -> Result<IdentityRecord, ProviderError> {
        let url = url::Url::parse_with_params(&self.tokeninfo_url, &[("access_token", token)])
            .map_err(|e| ProviderError::Rejected(format!("invalid tokeninfo url: {}", e)))?;

        let response = self.client.get(url).send().await?;

        if response.status().is_success() {
            let info = response.json::<TokenInfoResponse>().await?;
            let email = info
                .email
                .ok_or_else(|| ProviderError::Rejected("token carries no email scope".into()))?;
            Ok(IdentityRecord { email })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ProviderError::Rejected(format!(
                "token info lookup failed: {}",
                error_text
            )))
        }
    }
}
