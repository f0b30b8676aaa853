pub mod api;
pub mod core;
pub mod proxy;
pub mod state;
