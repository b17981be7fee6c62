use async_trait::async_trait;
use std::net::IpAddr;
use std::str::FromStr;
use tfw_guard_application::{Blocker, EnforcementError, PreparationError};
use tfw_guard_domain::{IdentityField, User};
use tokio::process::Command;
use tracing::debug;

/// §4.D: the nftables back-end, shelling out to the `nft` CLI against one
/// table/set pair. Like [`super::ipset::IpsetBlocker`], `block`/`release`
/// take effect immediately and `apply` is a no-op.
pub struct NftBlocker {
    table: String,
    set: String,
}

impl NftBlocker {
    pub fn new(table: impl Into<String>, set: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            set: set.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output, std::io::Error> {
        Command::new("nft").args(args).output().await
    }
}

fn parse_elements(text: &str) -> Vec<IpAddr> {
    let Some(start) = text.find("elements = {") else {
        return Vec::new();
    };
    let rest = &text[start + "elements = {".len()..];
    let Some(end) = rest.find('}') else {
        return Vec::new();
    };
    rest[..end]
        .split(',')
        .filter_map(|s| IpAddr::from_str(s.trim()).ok())
        .collect()
}

#[async_trait]
impl Blocker for NftBlocker {
    fn name(&self) -> &str {
        "nftables"
    }

    fn identity_domain(&self) -> IdentityField {
        IdentityField::Ip
    }

    async fn prepare(&self) -> Result<(), PreparationError> {
        let _ = self.run(&["add", "table", "inet", &self.table]).await;
        let output = self
            .run(&[
                "add",
                "set",
                "inet",
                &self.table,
                &self.set,
                "{ type ipv4_addr; }",
            ])
            .await
            .map_err(|err| PreparationError::new(self.name(), err.to_string()))?;
        if output.status.success() || String::from_utf8_lossy(&output.stderr).contains("exist") {
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
            .run(&["list", "set", "inet", &self.table, &self.set])
            .await
            .map_err(|err| EnforcementError::new(self.name(), err.to_string()))?;
        if !output.status.success() {
            return Err(EnforcementError::new(
                self.name(),
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(parse_elements(&text)
            .into_iter()
            .map(|ip| User::new().with_ip(ip).with_blocked_at(now))
            .collect())
    }

    async fn block(&self, user: &User) -> Result<(), EnforcementError> {
        for ip in &user.ip {
            let element = format!("{{ {ip} }}");
            let output = self
                .run(&["add", "element", "inet", &self.table, &self.set, &element])
                .await
                .map_err(|err| EnforcementError::new(self.name(), err.to_string()))?;
            if !output.status.success() {
                return Err(EnforcementError::new(
                    self.name(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                ));
            }
            debug!(ip = %ip, "nftables element added");
        }
        Ok(())
    }

    async fn release(&self, user: &User) -> Result<(), EnforcementError> {
        for ip in &user.ip {
            let element = format!("{{ {ip} }}");
            let output = self
                .run(&[
                    "delete", "element", "inet", &self.table, &self.set, &element,
                ])
                .await
                .map_err(|err| EnforcementError::new(self.name(), err.to_string()))?;
            if !output.status.success() {
                return Err(EnforcementError::new(
                    self.name(),
                    String::from_utf8_lossy(&output.stderr).into_owned(),
                ));
            }
            debug!(ip = %ip, "nftables element removed");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_elements_from_list_output() {
        let text = "table inet tfw_guard {\n\tset blocked {\n\t\ttype ipv4_addr\n\t\telements = { 1.2.3.4, 5.6.7.8 }\n\t}\n}\n";
        let parsed = parse_elements(text);
        assert_eq!(
            parsed,
            vec![
                IpAddr::from_str("1.2.3.4").unwrap(),
                IpAddr::from_str("5.6.7.8").unwrap(),
            ]
        );
    }

    #[test]
    fn empty_set_yields_no_elements() {
        assert!(parse_elements("table inet tfw_guard {\n\tset blocked {\n\t\ttype ipv4_addr\n\t}\n}\n").is_empty());
    }
}
