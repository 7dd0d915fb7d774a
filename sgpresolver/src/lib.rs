//! Page resolver for SGPlaylist
//!
//! This crate turns a hosting-site page URL into a direct, playable audio URL.
//! The hosting site offers no structured API, so resolution is a best-effort
//! scrape of the page HTML.
//!
//! # Resolution protocol
//!
//! 1. The page URL must parse and its host must match the allowed domain
//!    suffix (exact match or subdomain, case-insensitive).
//! 2. The page is fetched with a fixed identifying User-Agent.
//! 3. The title comes from the `<title>` element, when present.
//! 4. The audio URL comes from the first of these patterns that matches:
//!    - a bare `.mp3` / `.m4a` / `.ogg` URL anywhere in the page,
//!    - a JSON-style `"url":"…"` pair pointing to such a file,
//!    - the `src` attribute of an `<audio>` element.
//!
//! # Example
//!
//! ```no_run
//! use sgpresolver::ResolverClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ResolverClient::new()?;
//!
//!     let resolution = client.resolve("https://soundgasm.net/u/someone/some-track").await?;
//!     println!("{} ({:?})", resolution.audio_url, resolution.title);
//!
//!     Ok(())
//! }
//! ```
//!
//! # HTTP API
//!
//! [`api::create_router`] exposes the resolver as `GET /resolve?url=…`, with
//! permissive CORS headers on every response so that browser clients hosted
//! elsewhere can call it.

pub mod api;
pub mod client;
pub mod error;
pub mod extract;
pub mod models;

#[cfg(feature = "sgpconfig")]
pub mod config_ext;

#[cfg(feature = "server")]
pub mod server_ext;

// Re-exports
pub use client::{ClientBuilder, ResolverClient};
pub use error::{Error, Result};
pub use extract::{is_direct_audio, Extractor};
pub use models::Resolution;

#[cfg(feature = "sgpconfig")]
pub use config_ext::ResolverConfigExt;

#[cfg(feature = "server")]
pub use server_ext::ResolverServerExt;
