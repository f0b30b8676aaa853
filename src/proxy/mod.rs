// proxy 模块 - 认证中继管线

pub mod error;
pub mod identity;
pub mod target;
pub mod transform;
pub mod upstream;

pub use error::RelayError;
pub use identity::IdentityGate;
pub use target::resolve_target;
pub use transform::transform;
pub use upstream::{OriginRelay, RelayResponse};
