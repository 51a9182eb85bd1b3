//! Reqwest-based transport for the hireflow applicant-tracking SDK.
//!
//! This crate implements [`hireflow_core::StageMovementProvider`] over the
//! backend's REST contract.
//!
//! # Example
//!
//! ```rust,ignore
//! use hireflow_reqwest::{ApiClient, ApiClientConfig, StageMovementClient, StaticTokenProvider};
//! use url::Url;
//!
//! let config = ApiClientConfig::new(Url::parse("https://api.example.com/v1/")?);
//! let api = ApiClient::new(config, StaticTokenProvider::new(token))?;
//! let service = StageMovementClient::new(api).into_service();
//!
//! let history = service.stage_history(application_id).await?;
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod auth;
mod client;
mod config;
mod error;
mod movement;

pub use crate::auth::{AuthProvider, StaticTokenProvider};
pub use crate::client::{ApiClient, TRACING_TARGET};
pub use crate::config::{ApiClientConfig, DEFAULT_TIMEOUT};
pub use crate::error::Error;
pub use crate::movement::StageMovementClient;
