//! 核心 trait 定义
//! 身份服务抽象，便于替换为测试实现

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 身份信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub email: String,
}

/// 身份服务错误，原样向上传递
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("identity provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
}

/// 外部身份服务
///
/// `exchange_code` 将一次性授权码换为会话 token，
/// `token_info` 根据会话 token 查询身份。
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<String, ProviderError>;

    async fn token_info(&self, token: &str) -> Result<IdentityRecord, ProviderError>;
}
