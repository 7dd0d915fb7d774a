//! # sgpserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit une abstraction simple pour héberger des services HTTP
//! avec Axum. Les crates métier (comme `sgpresolver`) y greffent leurs routes
//! via des traits d'extension, sans que `sgpserver` ait besoin de les connaître.
//!
//! ## Fonctionnalités
//!
//! - **Composition de routers** : `add_router()` monte un sous-router à la racine ou sous un préfixe
//! - **Logging** : initialisation du subscriber `tracing` depuis la configuration
//! - **Arrêt gracieux** : gestion propre de l'arrêt sur Ctrl+C
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use sgpserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "127.0.0.1", 8080).build();
//!     server.init_logging();
//!
//!     server
//!         .add_router("/", Router::new().route("/ping", get(|| async { "pong" })))
//!         .await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, init_logging};
pub use server::{Server, ServerBuilder, ServerInfo};
