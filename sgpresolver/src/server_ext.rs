//! Extension sgpserver pour le résolveur
//!
//! `sgpserver` ne connaît pas `sgpresolver` : c'est ce trait qui ajoute la
//! route `/resolve` à un `sgpserver::Server`.
//!
//! ```rust,no_run
//! use sgpresolver::ResolverServerExt;
//! use sgpserver::ServerBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new_configured().build();
//!     server.init_resolver().await?;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

use crate::api::create_router;
use crate::client::ResolverClient;
use crate::config_ext::ResolverConfigExt;
use anyhow::Result;
use sgpserver::Server;
use std::sync::Arc;
use tracing::info;

/// Trait pour étendre sgpserver avec le résolveur de pages
pub trait ResolverServerExt {
    /// Crée un client à partir de la configuration et enregistre `GET /resolve`
    async fn init_resolver(&mut self) -> Result<Arc<ResolverClient>>;

    /// Variante utilisant un client déjà construit
    async fn init_resolver_with_client(
        &mut self,
        client: Arc<ResolverClient>,
    ) -> Result<Arc<ResolverClient>>;
}

impl ResolverServerExt for Server {
    async fn init_resolver(&mut self) -> Result<Arc<ResolverClient>> {
        info!("Initializing resolver API...");

        let client = sgpconfig::get_config()
            .resolver_client_builder()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create resolver client: {}", e))?;

        self.init_resolver_with_client(Arc::new(client)).await
    }

    async fn init_resolver_with_client(
        &mut self,
        client: Arc<ResolverClient>,
    ) -> Result<Arc<ResolverClient>> {
        self.add_router("/", create_router(client.clone())).await;

        info!(
            "Resolver API available at /resolve (allowed hosts: *.{})",
            client.allowed_host_suffix()
        );
        Ok(client)
    }
}
