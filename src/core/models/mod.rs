//! 核心数据模型

mod config;

pub use config::{Credentials, RelayConfig};
