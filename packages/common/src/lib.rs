pub mod api;
pub mod cdn;
pub mod config;
pub mod event;

pub use config::CdnConfig;
