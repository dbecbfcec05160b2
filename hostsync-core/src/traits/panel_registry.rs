//! Panel registry trait

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use hostsync_panel::HostingPanel;

/// Panel Registry Trait
///
/// Holds one panel client per physical server, indexed by `server_id`.
/// `InMemoryPanelRegistry` is the default implementation.
#[async_trait]
pub trait PanelRegistry: Send + Sync {
    /// Register (or replace) the client for a server
    async fn register(&self, server_id: i64, panel: Arc<dyn HostingPanel>);

    async fn unregister(&self, server_id: i64);

    async fn get(&self, server_id: i64) -> Option<Arc<dyn HostingPanel>>;

    /// All registered server ids, ascending
    async fn list_server_ids(&self) -> Vec<i64>;
}

/// In-memory panel registry
#[derive(Clone)]
pub struct InMemoryPanelRegistry {
    panels: Arc<RwLock<HashMap<i64, Arc<dyn HostingPanel>>>>,
}

impl InMemoryPanelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            panels: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryPanelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PanelRegistry for InMemoryPanelRegistry {
    async fn register(&self, server_id: i64, panel: Arc<dyn HostingPanel>) {
        self.panels.write().await.insert(server_id, panel);
    }

    async fn unregister(&self, server_id: i64) {
        self.panels.write().await.remove(&server_id);
    }

    async fn get(&self, server_id: i64) -> Option<Arc<dyn HostingPanel>> {
        self.panels.read().await.get(&server_id).cloned()
    }

    async fn list_server_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.panels.read().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
