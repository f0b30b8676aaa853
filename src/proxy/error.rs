// 中继错误类型 - 在 HTTP 边界转换为状态码和文本响应
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::error::Error as StdError;
use thiserror::Error;

use crate::core::{DecodeError, ProviderError};

pub const AUTH_MISSING_MESSAGE: &str =
    "Proxy may be used until /auth is called with a one time code.";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Invalid urlJSON value: {0}")]
    InvalidTarget(#[from] serde_json::Error),

    #[error("{}", AUTH_MISSING_MESSAGE)]
    AuthMissing,

    #[error("Multiple values for the token cookie")]
    AuthAmbiguous,

    #[error("{0}")]
    AuthInvalid(#[source] ProviderError),

    #[error("User {email} is not allowed access")]
    Forbidden { email: String },

    #[error("Protocol not supported yet. '{0}'")]
    UnsupportedProtocol(String),

    #[error("Relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    MissingTarget(String),

    #[error("Missing one time code")]
    MissingCode,

    #[error("{0}")]
    Provider(#[source] ProviderError),

    #[error("Failed to read asset: {0}")]
    Asset(#[from] std::io::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::AuthMissing | RelayError::AuthInvalid(_) | RelayError::Forbidden { .. } => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            RelayError::AuthAmbiguous => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 渲染错误响应；`debug_errors` 打开时附带调试输出与错误链
    pub fn render(self, debug_errors: bool) -> Response {
        let status = self.status();
        let mut body = self.to_string();

        if debug_errors && status == StatusCode::INTERNAL_SERVER_ERROR {
            body.push('\n');
            body.push_str(&format!("{:?}", self));
            let mut source = self.source();
            while let Some(err) = source {
                body.push_str(&format!("\ncaused by: {}", err));
                source = err.source();
            }
        }

        (status, body).into_response()
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        self.render(false)
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
