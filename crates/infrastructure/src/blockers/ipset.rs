use async_trait::async_trait;
use std::net::IpAddr;
use std::str::FromStr;
use tfw_guard_application::{Blocker, EnforcementError, PreparationError};
use tfw_guard_domain::{IdentityField, User};
use tokio::process::Command;
use tracing::debug;

/// §4.D: the kernel ip-set back-end. Unlike the fingerprint blockers,
/// `block`/`release` take effect immediately via the `ipset` CLI — `apply`
/// is a no-op because there is no batched file to flush.
pub struct IpsetBlocker {
    set_name: String,
}

impl IpsetBlocker {
    pub fn new(set_name: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, std::io::Error> {
        Command::new("ipset").args(args).output().await
    }
}

#[async_trait]
impl Blocker for IpsetBlocker {
    fn name(&self) -> &str {
        "ipset"
    }

    fn identity_domain(&self) -> IdentityField {
        IdentityField::Ip
    }

    async fn prepare(&self) -> Result<(), PreparationError> {
        let output = self
            .run(&["create", &self.set_name, "hash:ip", "-exist"])
            .await
            .map_err(|err| PreparationError::new(self.name(), err.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(PreparationError::new(
                self.name(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ))
        }
    }

    async fn load(&self, now: i64) -> Result<Vec<User>, EnforcementError> {
        let output = self
            .run(&["list", &self.set_name, "-output", "plain"])
            .await
            .map_err(|err| EnforcementError::new(self.name(), err.to_string()))?;
        if !output.status.success() {
            return Err(EnforcementError::new(
                self.name(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let mut past_members = false;
        let mut users = Vec::new();
        for line in text.lines() {
            if line.trim() == "Members:" {
                past_members = true;
                continue;
            }
            if !past_members {
                continue;
            }
            if let Ok(ip) = IpAddr::from_str(line.trim()) {
                users.push(User::new().with_ip(ip).with_blocked_at(now));
            }
        }
        Ok(users)
    }

    async fn block(&self, user: &User) -> Result<(), EnforcementError> {
        for ip in &user.ip {
            let output = self
                .run(&["add", &self.set_name, &ip.to_string(), "-exist"])
                .await
                .map_err(|err| EnforcementError::new(self.name(), err.to_string()))?;
            if !output.status.success() {
                return Err(EnforcementError::new(
                    self.name(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                ));
            }
            debug!(ip = %ip, "ipset member added");
        }
        Ok(())
    }

    async fn release(&self, user: &User) -> Result<(), EnforcementError> {
        for ip in &user.ip {
            let output = self
                .run(&["del", &self.set_name, &ip.to_string(), "-exist"])
                .await
                .map_err(|err| EnforcementError::new(self.name(), err.to_string()))?;
            if !output.status.success() {
                return Err(EnforcementError::new(
                    self.name(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                ));
            }
            debug!(ip = %ip, "ipset member removed");
        }
        Ok(())
    }

    async fn apply(&self) -> Result<(), EnforcementError> {
        Ok(())
    }

    async fn info(&self) -> Vec<User> {
        self.load(0).await.unwrap_or_default()
    }
}
