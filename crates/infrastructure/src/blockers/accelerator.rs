use tfw_guard_application::EnforcementError;
use tokio::process::Command;
use tracing::{debug, warn};

/// Reloads the accelerator after a fingerprint-file dump, per §4.D: prefer
/// shelling out to the accelerator's own executable with `--reload`
/// (exporting `TFW_CFG_PATH` so it picks up the dumped config), falling
/// back to a service-manager reload of the `tempesta-fw` unit when the
/// executable path is not usable. A reload failure is logged, not fatal —
/// the fingerprint file itself is already durable on disk.
pub struct AcceleratorReloader {
    executable_path: String,
    config_path: String,
}

impl AcceleratorReloader {
    pub fn new(executable_path: impl Into<String>, config_path: impl Into<String>) -> Self {
        Self {
            executable_path: executable_path.into(),
            config_path: config_path.into(),
        }
    }

    pub async fn reload(&self) -> Result<(), EnforcementError> {
        match self.reload_via_executable().await {
            Ok(()) => Ok(()),
            Err(exec_err) => {
                warn!(error = %exec_err, "accelerator executable reload failed, falling back to service manager");
                self.reload_via_service_manager().await.map_err(|err| {
                    EnforcementError::new("accelerator", format!("{exec_err}; {err}"))
                })
            }
        }
    }

    async fn reload_via_executable(&self) -> Result<(), String> {
        let output = Command::new(&self.executable_path)
            .arg("--reload")
            .env("TFW_CFG_PATH", &self.config_path)
            .output()
            .await
            .map_err(|err| err.to_string())?;
        if output.status.success() {
            debug!(executable = %self.executable_path, "accelerator reloaded");
            Ok(())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).into_owned())
        }
    }

    async fn reload_via_service_manager(&self) -> Result<(), String> {
        let output = Command::new("systemctl")
            .args(["reload", "tempesta-fw"])
            .output()
            .await
            .map_err(|err| err.to_string())?;
        if output.status.success() {
            debug!("accelerator reloaded via systemctl");
            Ok(())
        } else {
            Err(String::from_utf8_lossy(&output.stderr).into_owned())
        }
    }
}
