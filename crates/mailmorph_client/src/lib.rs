//! MailMorph client: backend calls, client configuration and the request engine.
mod client;
mod config;
mod engine;
mod types;

pub use client::{Backend, ReqwestClient};
pub use config::{
    validate_base_url, ClientConfig, ConfigError, ExtractContract, TransportSettings,
    BASE_URL_ENV, DEFAULT_BASE_URL,
};
pub use engine::{EngineEvent, EngineHandle, RequestSettings};
pub use types::{ExtractOptions, HealthStatus, RequestError};
