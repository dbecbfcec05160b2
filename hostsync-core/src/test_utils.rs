//! Test helpers
//!
//! In-memory repositories, a scriptable panel and fixture builders.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hostsync_panel::{
    HostingPanel, PanelDatabase, PanelError, RemoteResource, RemoteResourceData, ResourceKind,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::mappers::mapper_for;
use crate::utils::fingerprint::payload_fingerprint;
use crate::services::{
    HostingAccountService, ReconciliationService, ResourceService, ServiceContext,
};
use crate::traits::{
    HostingAccountRepository, InMemoryPanelRegistry, PanelRegistry, ResourceRepository,
};
use crate::types::{
    DatabasePayload, DomainPayload, FtpAccountPayload, HostingAccount, MailboxPayload,
    ManagedResource, NewHostingAccount, NewManagedResource, ReconcileSettings, ResourcePayload,
    SyncStatus,
};

// ===== MockHostingAccountRepository =====

pub struct MockHostingAccountRepository {
    accounts: RwLock<BTreeMap<i64, HostingAccount>>,
    next_id: AtomicI64,
}

impl MockHostingAccountRepository {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1000),
        }
    }

    pub async fn insert(&self, account: HostingAccount) {
        self.accounts.write().await.insert(account.id, account);
    }
}

#[async_trait]
impl HostingAccountRepository for MockHostingAccountRepository {
    async fn find_all(&self) -> CoreResult<Vec<HostingAccount>> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<HostingAccount>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_server(&self, server_id: i64) -> CoreResult<Vec<HostingAccount>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| a.server_id == server_id)
            .cloned()
            .collect())
    }

    async fn create(&self, account: &NewHostingAccount) -> CoreResult<HostingAccount> {
        let now = Utc::now();
        let created = HostingAccount {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            server_id: account.server_id,
            external_id: account.external_id.clone(),
            customer_id: account.customer_id,
            created_at: now,
            updated_at: now,
        };
        self.insert(created.clone()).await;
        Ok(created)
    }

    async fn update(&self, account: &HostingAccount) -> CoreResult<()> {
        let mut store = self.accounts.write().await;
        if !store.contains_key(&account.id) {
            return Err(CoreError::AccountNotFound(account.id));
        }
        store.insert(account.id, account.clone());
        Ok(())
    }
}

// ===== MockResourceRepository =====

pub struct MockResourceRepository {
    resources: RwLock<BTreeMap<i64, ManagedResource>>,
    next_id: AtomicI64,
    /// Identity keys whose writes fail with `StorageError`
    failing_keys: RwLock<HashSet<String>>,
    /// If Some, `list_by_account` returns this error
    list_error: RwLock<Option<String>>,
    pub writes: AtomicUsize,
}

impl MockResourceRepository {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            failing_keys: RwLock::new(HashSet::new()),
            list_error: RwLock::new(None),
            writes: AtomicUsize::new(0),
        }
    }

    pub async fn fail_writes_for(&self, identity_key: &str) {
        self.failing_keys
            .write()
            .await
            .insert(identity_key.to_string());
    }

    pub async fn set_list_error(&self, err: Option<String>) {
        *self.list_error.write().await = err;
    }

    pub async fn all(&self) -> Vec<ManagedResource> {
        self.resources.read().await.values().cloned().collect()
    }

    pub async fn get(&self, id: i64) -> Option<ManagedResource> {
        self.resources.read().await.get(&id).cloned()
    }

    pub async fn by_key(&self, identity_key: &str) -> Vec<ManagedResource> {
        self.resources
            .read()
            .await
            .values()
            .filter(|r| r.identity_key == identity_key)
            .cloned()
            .collect()
    }

    async fn check_write(&self, identity_key: &str) -> CoreResult<()> {
        if self.failing_keys.read().await.contains(identity_key) {
            return Err(CoreError::StorageError(format!(
                "write rejected for '{identity_key}'"
            )));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ResourceRepository for MockResourceRepository {
    async fn list_by_account(
        &self,
        account_id: i64,
        kind: Option<ResourceKind>,
    ) -> CoreResult<Vec<ManagedResource>> {
        if let Some(ref msg) = *self.list_error.read().await {
            return Err(CoreError::StorageError(msg.clone()));
        }
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.account_id == account_id && kind.is_none_or(|k| k == r.kind))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> CoreResult<Option<ManagedResource>> {
        Ok(self.get(id).await)
    }

    async fn find_by_external_id(
        &self,
        account_id: i64,
        kind: ResourceKind,
        external_id: &str,
    ) -> CoreResult<Option<ManagedResource>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .find(|r| {
                r.account_id == account_id
                    && r.kind == kind
                    && r.external_id.as_deref() == Some(external_id)
            })
            .cloned())
    }

    async fn find_by_identity_key(
        &self,
        account_id: i64,
        kind: ResourceKind,
        identity_key: &str,
    ) -> CoreResult<Vec<ManagedResource>> {
        Ok(self
            .resources
            .read()
            .await
            .values()
            .filter(|r| {
                r.account_id == account_id && r.kind == kind && r.identity_key == identity_key
            })
            .cloned()
            .collect())
    }

    async fn create(&self, resource: &NewManagedResource) -> CoreResult<ManagedResource> {
        self.check_write(&resource.identity_key).await?;
        let now = Utc::now();
        let created = ManagedResource {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            account_id: resource.account_id,
            kind: resource.kind(),
            external_id: resource.external_id.clone(),
            identity_key: resource.identity_key.clone(),
            payload: resource.payload.clone(),
            sync_status: resource.sync_status,
            sync_fingerprint: resource.sync_fingerprint.clone(),
            last_synced_at: resource.last_synced_at,
            created_at: now,
            updated_at: now,
        };
        self.resources
            .write()
            .await
            .insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, resource: &ManagedResource) -> CoreResult<()> {
        self.check_write(&resource.identity_key).await?;
        let mut store = self.resources.write().await;
        if !store.contains_key(&resource.id) {
            return Err(CoreError::ResourceNotFound(resource.id));
        }
        let mut updated = resource.clone();
        updated.updated_at = Utc::now();
        store.insert(resource.id, updated);
        Ok(())
    }

    async fn delete(&self, id: i64) -> CoreResult<()> {
        self.resources.write().await.remove(&id);
        Ok(())
    }
}

// ===== MockPanel =====

/// Scriptable in-memory panel.
pub struct MockPanel {
    accounts: RwLock<HashMap<String, Vec<RemoteResource>>>,
    next_id: AtomicI64,
    /// If Some, every listing fails with this error
    list_error: RwLock<Option<PanelError>>,
    /// Display names whose create/update fails with the given error
    failing_names: RwLock<HashMap<String, PanelError>>,
    /// Sleep before answering a listing
    list_delay: RwLock<Option<Duration>>,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MockPanel {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            list_error: RwLock::new(None),
            failing_names: RwLock::new(HashMap::new()),
            list_delay: RwLock::new(None),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub async fn add_account(&self, account: &str) {
        self.accounts
            .write()
            .await
            .entry(account.to_string())
            .or_default();
    }

    /// Put a resource on the panel under a chosen external id.
    pub async fn seed(&self, account: &str, external_id: &str, payload: &ResourcePayload) {
        let data = mapper_for(payload.kind()).to_remote(payload).unwrap();
        self.accounts
            .write()
            .await
            .entry(account.to_string())
            .or_default()
            .push(RemoteResource {
                external_id: external_id.to_string(),
                data,
            });
    }

    pub async fn set_list_error(&self, err: Option<PanelError>) {
        *self.list_error.write().await = err;
    }

    /// Fail writes of `name` with `QuotaExceeded`.
    pub async fn reject(&self, name: &str) {
        self.fail_on(
            name,
            PanelError::QuotaExceeded {
                panel: "mock".to_string(),
                raw_message: Some("plan limit reached".to_string()),
            },
        )
        .await;
    }

    pub async fn fail_on(&self, name: &str, error: PanelError) {
        self.failing_names
            .write()
            .await
            .insert(name.to_string(), error);
    }

    pub async fn set_list_delay(&self, delay: Option<Duration>) {
        *self.list_delay.write().await = delay;
    }

    pub async fn resources(&self, account: &str) -> Vec<RemoteResource> {
        self.accounts
            .read()
            .await
            .get(account)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn find(&self, account: &str, external_id: &str) -> Option<RemoteResource> {
        self.resources(account)
            .await
            .into_iter()
            .find(|r| r.external_id == external_id)
    }

    fn account_not_found(account: &str) -> PanelError {
        PanelError::AccountNotFound {
            panel: "mock".to_string(),
            account: account.to_string(),
            raw_message: None,
        }
    }

    fn not_found(kind: ResourceKind, external_id: &str) -> PanelError {
        PanelError::ResourceNotFound {
            panel: "mock".to_string(),
            kind,
            external_id: external_id.to_string(),
            raw_message: None,
        }
    }

    async fn check_rejected(&self, data: &RemoteResourceData) -> hostsync_panel::Result<()> {
        match self.failing_names.read().await.get(data.display_name()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HostingPanel for MockPanel {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn validate_credentials(&self) -> hostsync_panel::Result<bool> {
        Ok(true)
    }

    async fn list_resources(
        &self,
        account: &str,
        kind: ResourceKind,
    ) -> hostsync_panel::Result<Vec<RemoteResource>> {
        let delay = *self.list_delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(ref err) = *self.list_error.read().await {
            return Err(err.clone());
        }
        let store = self.accounts.read().await;
        let resources = store
            .get(account)
            .ok_or_else(|| Self::account_not_found(account))?;
        Ok(resources
            .iter()
            .filter(|r| r.kind() == kind)
            .cloned()
            .collect())
    }

    async fn get_resource(
        &self,
        account: &str,
        kind: ResourceKind,
        external_id: &str,
    ) -> hostsync_panel::Result<RemoteResource> {
        self.list_resources(account, kind)
            .await?
            .into_iter()
            .find(|r| r.external_id == external_id)
            .ok_or_else(|| Self::not_found(kind, external_id))
    }

    async fn create_resource(
        &self,
        account: &str,
        data: &RemoteResourceData,
    ) -> hostsync_panel::Result<RemoteResource> {
        self.check_rejected(data).await?;
        let mut store = self.accounts.write().await;
        let resources = store
            .get_mut(account)
            .ok_or_else(|| Self::account_not_found(account))?;
        if resources.iter().any(|r| {
            r.kind() == data.kind()
                && r.data.display_name().eq_ignore_ascii_case(data.display_name())
        }) {
            return Err(PanelError::ResourceExists {
                panel: "mock".to_string(),
                kind: data.kind(),
                name: data.display_name().to_string(),
                raw_message: None,
            });
        }
        let created = RemoteResource {
            external_id: format!(
                "{}-{}",
                data.kind(),
                self.next_id.fetch_add(1, Ordering::SeqCst)
            ),
            data: data.clone(),
        };
        resources.push(created.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(created)
    }

    async fn update_resource(
        &self,
        account: &str,
        external_id: &str,
        data: &RemoteResourceData,
    ) -> hostsync_panel::Result<RemoteResource> {
        self.check_rejected(data).await?;
        let mut store = self.accounts.write().await;
        let resources = store
            .get_mut(account)
            .ok_or_else(|| Self::account_not_found(account))?;
        let existing = resources
            .iter_mut()
            .find(|r| r.external_id == external_id)
            .ok_or_else(|| Self::not_found(data.kind(), external_id))?;
        existing.data = data.clone();
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(existing.clone())
    }

    async fn delete_resource(
        &self,
        account: &str,
        kind: ResourceKind,
        external_id: &str,
    ) -> hostsync_panel::Result<()> {
        let mut store = self.accounts.write().await;
        let resources = store
            .get_mut(account)
            .ok_or_else(|| Self::account_not_found(account))?;
        let before = resources.len();
        resources.retain(|r| r.external_id != external_id);
        if resources.len() == before {
            return Err(Self::not_found(kind, external_id));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ===== Payload fixtures =====

pub fn domain(name: &str) -> ResourcePayload {
    ResourcePayload::Domain(DomainPayload {
        name: name.to_string(),
        document_root: None,
        php_version: None,
        ssl_enabled: false,
    })
}

pub fn database(name: &str) -> ResourcePayload {
    ResourcePayload::Database(DatabasePayload {
        name: name.to_string(),
        charset: None,
    })
}

pub fn mailbox(address: &str, quota_mb: Option<u64>) -> ResourcePayload {
    ResourcePayload::Mailbox(MailboxPayload {
        address: address.to_string(),
        quota_mb,
        suspended: false,
    })
}

pub fn ftp(username: &str, home_dir: &str) -> ResourcePayload {
    ResourcePayload::FtpAccount(FtpAccountPayload {
        username: username.to_string(),
        home_dir: home_dir.to_string(),
        quota_mb: None,
    })
}

/// Unsaved database record on account 42, linked when `external_id` is set.
pub fn database_record(id: i64, name: &str, external_id: Option<&str>) -> ManagedResource {
    let payload = database(name);
    let now = Utc::now();
    ManagedResource {
        id,
        account_id: 42,
        kind: ResourceKind::Database,
        external_id: external_id.map(ToString::to_string),
        identity_key: mapper_for(ResourceKind::Database)
            .identity_key(&payload)
            .unwrap(),
        payload,
        sync_status: if external_id.is_some() {
            SyncStatus::InSync
        } else {
            SyncStatus::LocalOnly
        },
        sync_fingerprint: None,
        last_synced_at: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn remote_database(external_id: &str, name: &str) -> RemoteResource {
    RemoteResource {
        external_id: external_id.to_string(),
        data: RemoteResourceData::Database(PanelDatabase {
            name: name.to_string(),
            charset: None,
        }),
    }
}

pub fn remote_database_with(external_id: &str, name: &str, charset: &str) -> RemoteResource {
    RemoteResource {
        external_id: external_id.to_string(),
        data: RemoteResourceData::Database(PanelDatabase {
            name: name.to_string(),
            charset: Some(charset.to_string()),
        }),
    }
}

// ===== Harness =====

pub const TEST_SERVER: i64 = 1;

/// Services wired to in-memory mocks, with one panel on [`TEST_SERVER`].
pub struct TestHarness {
    pub ctx: Arc<ServiceContext>,
    pub accounts: Arc<MockHostingAccountRepository>,
    pub resources: Arc<MockResourceRepository>,
    pub registry: Arc<InMemoryPanelRegistry>,
    pub panel: Arc<MockPanel>,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_settings(ReconcileSettings::default()).await
    }

    pub async fn with_settings(settings: ReconcileSettings) -> Self {
        let accounts = Arc::new(MockHostingAccountRepository::new());
        let resources = Arc::new(MockResourceRepository::new());
        let registry = Arc::new(InMemoryPanelRegistry::new());
        let panel = Arc::new(MockPanel::new());
        registry.register(TEST_SERVER, panel.clone()).await;

        let ctx = Arc::new(ServiceContext::new(
            accounts.clone(),
            resources.clone(),
            registry.clone(),
            settings,
        ));

        Self {
            ctx,
            accounts,
            resources,
            registry,
            panel,
        }
    }

    /// Account on [`TEST_SERVER`]; a linked account also exists on the panel.
    pub async fn add_account(&self, id: i64, external_id: Option<&str>) -> HostingAccount {
        let now = Utc::now();
        let account = HostingAccount {
            id,
            server_id: TEST_SERVER,
            external_id: external_id.map(ToString::to_string),
            customer_id: 7,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(account.clone()).await;
        if let Some(name) = external_id {
            self.panel.add_account(name).await;
        }
        account
    }

    /// Local record as a user would create it: unlinked, never synced.
    pub async fn add_local(&self, account_id: i64, payload: ResourcePayload) -> ManagedResource {
        let identity_key = mapper_for(payload.kind()).identity_key(&payload).unwrap();
        self.resources
            .create(&NewManagedResource {
                account_id,
                external_id: None,
                identity_key,
                payload,
                sync_status: SyncStatus::LocalOnly,
                sync_fingerprint: None,
                last_synced_at: None,
            })
            .await
            .unwrap()
    }

    /// Record linked to `external_id` and present on the panel in the same
    /// state, as left by a previous successful sync.
    pub async fn add_synced(
        &self,
        account_id: i64,
        account: &str,
        external_id: &str,
        payload: ResourcePayload,
    ) -> ManagedResource {
        self.panel.seed(account, external_id, &payload).await;
        let identity_key = mapper_for(payload.kind()).identity_key(&payload).unwrap();
        let fingerprint = payload_fingerprint(&payload).unwrap();
        self.resources
            .create(&NewManagedResource {
                account_id,
                external_id: Some(external_id.to_string()),
                identity_key,
                payload,
                sync_status: SyncStatus::InSync,
                sync_fingerprint: Some(fingerprint),
                last_synced_at: Some(Utc::now()),
            })
            .await
            .unwrap()
    }

    pub fn reconciliation(&self) -> ReconciliationService {
        ReconciliationService::new(self.ctx.clone())
    }

    pub fn resource_service(&self) -> ResourceService {
        ResourceService::new(self.ctx.clone())
    }

    pub fn account_service(&self) -> HostingAccountService {
        HostingAccountService::new(self.ctx.clone())
    }
}
