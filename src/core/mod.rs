//! 核心模块
//! 与 HTTP 服务无关的解析逻辑、数据模型和外部身份服务

pub mod models;
pub mod query;
pub mod services;
pub mod traits;
pub mod url;

// 重导出常用类型
pub use self::query::{DecodeError, QueryParameters, QueryValue};
pub use self::traits::{IdentityProvider, IdentityRecord, ProviderError};
pub use self::url::{decompose_url, split_path_and_query, UrlComponents};
