//! Typed client for the copyparty file server's HTTP API.
//!
//! Each remote operation is one method on [`CopypartyClient`]: it takes a typed argument record,
//! issues exactly one HTTP request and reshapes the response into a serializable result record.
//! The client holds no mutable state; clone it freely across tasks.
//!
//! This crate is used by `copyparty-mcp`, which exposes the operations as MCP tools.

pub mod body;
pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod info;
pub mod media;
pub mod metadata;
pub mod redact;
pub mod search;
pub mod shares;

pub use body::{Body, Encoding, FilePayload};
pub use config::ConnectionConfig;
pub use error::{CopypartyError, Result};
pub use http::CopypartyClient;
