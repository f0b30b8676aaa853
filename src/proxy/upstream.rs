// 上游请求 - 对目标源站发起 GET 并完整缓冲响应
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::time::Duration;

use super::error::{RelayError, Result};
use crate::core::UrlComponents;

pub const HTTP: &str = "http://";
pub const HTTPS: &str = "https://";

/// 源站响应（已完整读取）
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub chunks: Vec<Bytes>,
}

impl RelayResponse {
    pub fn body_len(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }
}

pub struct OriginRelay {
    client: reqwest::Client,
}

impl OriginRelay {
    /// 创建上游客户端。不跟随重定向，`timeout` 为 `None` 时无限等待源站
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// GET the target and buffer every body chunk in arrival order.
    ///
    /// Only `http://` (port 80) and `https://` (port 443) are accepted; an
    /// explicit port in `host` overrides the default.
    pub async fn fetch(&self, target: &UrlComponents) -> Result<RelayResponse> {
        if target.protocol != HTTP && target.protocol != HTTPS {
            return Err(RelayError::UnsupportedProtocol(target.protocol.clone()));
        }

        let url = target.to_url();
        tracing::debug!("Relaying GET {}", url);

        let mut response = self.client.get(&url).send().await?;
        let status = response.status();
        let headers = std::mem::take(response.headers_mut());

        let mut chunks = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            chunks.push(chunk);
        }

        let response = RelayResponse {
            status,
            headers,
            chunks,
        };
        tracing::debug!(
            "Origin {} answered {} with {} bytes in {} chunks",
            target.host,
            response.status,
            response.body_len(),
            response.chunks.len()
        );

        Ok(response)
    }
}
