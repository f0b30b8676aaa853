use dashmap::DashMap;
use std::sync::Arc;

use crate::core::{IdentityProvider, IdentityRecord, ProviderError};

/// 身份校验与缓存
///
/// 缓存在进程生命周期内有效，不过期也不淘汰。同一个新 token 并发校验时
/// 可能重复请求身份服务，但写入的记录相同。
pub struct IdentityGate {
    provider: Arc<dyn IdentityProvider>,
    cache: DashMap<String, IdentityRecord>, // token -> identity
}

impl IdentityGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            cache: DashMap::new(),
        }
    }

    /// 校验会话 token，失败时原样返回身份服务的错误
    pub async fn validate(&self, token: &str) -> Result<IdentityRecord, ProviderError> {
        if let Some(record) = self.cache.get(token) {
            return Ok(record.clone());
        }

        let record = self.provider.token_info(token).await?;
        self.cache.insert(token.to_string(), record.clone());
        tracing::debug!(
            "Cached identity {} for token {}... ({} cached)",
            record.email,
            token.chars().take(8).collect::<String>(),
            self.cached_len()
        );
        Ok(record)
    }

    /// 一次性授权码换取会话 token
    pub async fn exchange(&self, code: &str) -> Result<String, ProviderError> {
        self.provider.exchange_code(code).await
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory provider with call counters.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub codes: HashMap<String, String>,
        pub tokens: HashMap<String, String>,
        pub info_calls: AtomicUsize,
    }

    impl FakeProvider {
        pub fn with_token(token: &str, email: &str) -> Self {
            let mut provider = Self::default();
            provider.tokens.insert(token.to_string(), email.to_string());
            provider
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn exchange_code(&self, code: &str) -> Result<String, ProviderError> {
            self.codes
                .get(code)
                .cloned()
                .ok_or_else(|| ProviderError::Rejected(format!("invalid_grant: {}", code)))
        }

        async fn token_info(&self, token: &str) -> Result<IdentityRecord, ProviderError> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            self.tokens
                .get(token)
                .map(|email| IdentityRecord {
                    email: email.clone(),
                })
                .ok_or_else(|| ProviderError::Rejected("invalid_token".to_string()))
        }
    }

    #[tokio::test]
    async fn test_validate_caches_success() {
        let provider = Arc::new(FakeProvider::with_token("t1", "owner@example.com"));
        let gate = IdentityGate::new(provider.clone());

        let first = gate.validate("t1").await.unwrap();
        let second = gate.validate("t1").await.unwrap();

        assert_eq!(first.email, "owner@example.com");
        assert_eq!(first, second);
        assert_eq!(provider.info_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.cached_len(), 1);
    }

    #[tokio::test]
    async fn test_validate_does_not_cache_failure() {
        let provider = Arc::new(FakeProvider::default());
        let gate = IdentityGate::new(provider.clone());

        assert!(gate.validate("bad").await.is_err());
        assert!(gate.validate("bad").await.is_err());

        assert_eq!(provider.info_calls.load(Ordering::SeqCst), 2);
        assert_eq!(gate.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_exchange_delegates() {
        let mut provider = FakeProvider::default();
        provider.codes.insert("code-1".into(), "session-1".into());
        let gate = IdentityGate::new(Arc::new(provider));

        assert_eq!(gate.exchange("code-1").await.unwrap(), "session-1");
        let err = gate.exchange("code-2").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "identity provider rejected the request: invalid_grant: code-2"
        );
    }
}
