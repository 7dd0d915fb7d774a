//! Extension pour intégrer le résolveur dans sgpconfig
//!
//! Les réglages vivent sous la clé `resolver` :
//!
//! ```yaml
//! resolver:
//!   allowed_host_suffix: soundgasm.net
//!   user_agent: "Mozilla/5.0 (compatible; SoundgasmResolver/1.0)"
//!   timeout_secs: 30
//! ```

use crate::client::{
    ClientBuilder, DEFAULT_ALLOWED_HOST_SUFFIX, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};
use sgpconfig::Config;
use std::time::Duration;

/// Trait d'extension pour lire la configuration du résolveur
pub trait ResolverConfigExt {
    /// Suffixe de domaine accepté (défaut `soundgasm.net`)
    fn get_resolver_allowed_host_suffix(&self) -> String;

    /// User-Agent envoyé au site hébergeur
    fn get_resolver_user_agent(&self) -> String;

    /// Timeout des requêtes vers le site hébergeur
    fn get_resolver_timeout(&self) -> Duration;

    /// Builder de client pré-rempli avec les valeurs de configuration
    fn resolver_client_builder(&self) -> ClientBuilder {
        ClientBuilder::new()
            .allowed_host_suffix(self.get_resolver_allowed_host_suffix())
            .user_agent(self.get_resolver_user_agent())
            .timeout(self.get_resolver_timeout())
    }
}

impl ResolverConfigExt for Config {
    fn get_resolver_allowed_host_suffix(&self) -> String {
        self.get_string_or(&["resolver", "allowed_host_suffix"], DEFAULT_ALLOWED_HOST_SUFFIX)
    }

    fn get_resolver_user_agent(&self) -> String {
        self.get_string_or(&["resolver", "user_agent"], DEFAULT_USER_AGENT)
    }

    fn get_resolver_timeout(&self) -> Duration {
        Duration::from_secs(
            self.get_u64_or(&["resolver", "timeout_secs"], DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }
}
