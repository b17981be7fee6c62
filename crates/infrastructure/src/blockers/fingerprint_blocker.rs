use super::accelerator::AcceleratorReloader;
use crate::fingerprint::FingerprintStore;
use async_trait::async_trait;
use tfw_guard_application::{Blocker, EnforcementError, PreparationError};
use tfw_guard_domain::{IdentityField, TfHashEntry, User};
use tokio::sync::Mutex;
use tracing::{error, info};

/// §4.D: the TFt and TFh back-ends are the same mechanism — a fingerprint
/// file the accelerator reloads on `apply` — differing only in which
/// identity field they enforce against and which file they own.
pub struct FingerprintBlocker {
    name: &'static str,
    identity_domain: IdentityField,
    store: Mutex<FingerprintStore>,
    reloader: AcceleratorReloader,
}

impl FingerprintBlocker {
    pub fn tft(path: impl Into<std::path::PathBuf>, reloader: AcceleratorReloader) -> Self {
        Self {
            name: "tft",
            identity_domain: IdentityField::Tft,
            store: Mutex::new(FingerprintStore::new(path)),
            reloader,
        }
    }

    pub fn tfh(path: impl Into<std::path::PathBuf>, reloader: AcceleratorReloader) -> Self {
        Self {
            name: "tfh",
            identity_domain: IdentityField::Tfh,
            store: Mutex::new(FingerprintStore::new(path)),
            reloader,
        }
    }

    fn hashes_of(&self, user: &User) -> Vec<std::sync::Arc<str>> {
        match self.identity_domain {
            IdentityField::Tft => user.tft.iter().cloned().collect(),
            IdentityField::Tfh => user.tfh.iter().cloned().collect(),
            IdentityField::Ip => Vec::new(),
        }
    }

    fn user_for_hash(&self, hash: &str, blocked_at: i64) -> User {
        let user = User::new().with_blocked_at(blocked_at);
        match self.identity_domain {
            IdentityField::Tft => user.with_tft(hash),
            IdentityField::Tfh => user.with_tfh(hash),
            IdentityField::Ip => user,
        }
    }
}

#[async_trait]
impl Blocker for FingerprintBlocker {
    fn name(&self) -> &str {
        self.name
    }

    fn identity_domain(&self) -> IdentityField {
        self.identity_domain
    }

    async fn prepare(&self) -> Result<(), PreparationError> {
        let mut store = self.store.lock().await;
        store
            .verify()
            .await
            .map_err(|err| PreparationError::new(self.name, err.to_string()))?;
        store
            .load()
            .await
            .map_err(|err| PreparationError::new(self.name, err.to_string()))
    }

    async fn load(&self, now: i64) -> Result<Vec<User>, EnforcementError> {
        let store = self.store.lock().await;
        Ok(store
            .table()
            .iter()
            .map(|(hash, _)| self.user_for_hash(hash, now))
            .collect())
    }

    async fn block(&self, user: &User) -> Result<(), EnforcementError> {
        let mut store = self.store.lock().await;
        for hash in self.hashes_of(user) {
            store.table_mut().add(hash, TfHashEntry::blocked());
        }
        Ok(())
    }

    async fn release(&self, user: &User) -> Result<(), EnforcementError> {
        let mut store = self.store.lock().await;
        for hash in self.hashes_of(user) {
            store.table_mut().remove(&hash);
        }
        Ok(())
    }

    async fn apply(&self) -> Result<(), EnforcementError> {
        let mut store = self.store.lock().await;
        if !store.table().is_dirty() {
            return Ok(());
        }
        store
            .dump()
            .await
            .map_err(|err| EnforcementError::new(self.name, err.to_string()))?;
        drop(store);
        match self.reloader.reload().await {
            Ok(()) => {
                info!(blocker = self.name, "fingerprint file applied and accelerator reloaded");
                Ok(())
            }
            Err(err) => {
                error!(blocker = self.name, error = %err, "accelerator reload failed after fingerprint dump");
                Ok(())
            }
        }
    }

    async fn info(&self) -> Vec<User> {
        let store = self.store.lock().await;
        store
            .table()
            .iter()
            .map(|(hash, _)| self.user_for_hash(hash, 0))
            .collect()
    }
}
