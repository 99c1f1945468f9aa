//! A small Rust client for the Argovis oceanographic data API.
//!
//! This crate implements an `argovisHelpers`-style flow: issue a query
//! against an Argovis route, let the client absorb the server's rate-limit
//! protocol and slice unbounded time ranges into 30-day requests, then
//! reshape the returned documents into per-level records.
//!
//! ## Quick start
//! - Configure the endpoint and key via environment variables
//!   (`ARGOVIS_API_URL`, `ARGOVIS_API_KEY`) or pass them to [`Client::new`].
//! - Call [`Client::query`] with a route and options, then reshape documents
//!   with [`data_inflate`] / [`units_inflate`].
//!
//! ```no_run
//! use argovis::{Client, QueryOptions, data_inflate};
//! use serde_json::json;
//!
//! fn main() -> argovis::Result<()> {
//!     let client = Client::from_env()?;
//!
//!     let mut options = QueryOptions::new();
//!     options.insert("startDate".to_string(), json!("2023-01-01T00:00:00Z"));
//!     options.insert("endDate".to_string(), json!("2023-01-10T00:00:00Z"));
//!     options.insert(
//!         "polygon".to_string(),
//!         json!([[-34, 16], [-34, 18], [-36, 18], [-36, 16], [-34, 16]]),
//!     );
//!
//!     let profiles = client.query("argo", &options)?;
//!     if let Some(profile) = profiles.first() {
//!         let levels = data_inflate(profile, None)?;
//!         println!("{} level(s)", levels.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For full usage and configuration details, see the crate README.

#![forbid(unsafe_code)]

mod client;
mod config;
mod envelope;
mod error;
mod inflate;
mod routes;
mod time;

pub use client::{Client, ClientConfig, QueryOptions};
pub use error::{Error, Result};
pub use inflate::{data_inflate, find_key, units_inflate};
pub use time::{format_time, parse_time};
