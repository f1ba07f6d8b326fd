//! Keyed client registry
//!
//! Applications construct one registry at startup and pass it to call
//! sites (dependency injection). Per-client-code instances are built on
//! first use through the credential resolver and cached, replacing ad hoc
//! client construction scattered through endpoint code.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use crate::client::DataForSeoClient;
use crate::config::ClientConfig;
use crate::credentials::CredentialResolver;
use crate::diagnostics::DiagnosticsLog;
use crate::error::Result;

pub struct ClientRegistry {
    resolver: CredentialResolver,
    config: ClientConfig,
    diagnostics: Arc<DiagnosticsLog>,
    clients: Mutex<HashMap<Option<String>, Arc<DataForSeoClient>>>,
}

impl ClientRegistry {
    pub fn new(
        resolver: CredentialResolver,
        config: ClientConfig,
        diagnostics: Arc<DiagnosticsLog>,
    ) -> Self {
        Self {
            resolver,
            config,
            diagnostics,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// The client for an optional client code, constructing and caching it
    /// on first use. Credential resolution failures surface here as
    /// `NO_CREDENTIALS`/`INVALID_CREDENTIALS` errors.
    pub fn client_for(&self, client_code: Option<&str>) -> Result<Arc<DataForSeoClient>> {
        let key = client_code.map(str::to_string);

        if let Some(client) = self.clients.lock().expect("registry mutex poisoned").get(&key) {
            return Ok(client.clone());
        }

        let credentials = self.resolver.resolve(client_code)?;
        let client = Arc::new(DataForSeoClient::new(
            credentials,
            self.config.clone(),
            self.diagnostics.clone(),
        )?);

        let mut clients = self.clients.lock().expect("registry mutex poisoned");
        Ok(clients.entry(key).or_insert(client).clone())
    }

    pub fn diagnostics(&self) -> &Arc<DiagnosticsLog> {
        &self.diagnostics
    }
}
