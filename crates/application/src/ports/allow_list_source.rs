use async_trait::async_trait;

/// Abstracts reading the user-agent allow-list file (component B) so the
/// `UserAgentManager` service stays testable without real filesystem
/// access. The infrastructure crate's implementation reads the file named
/// by `UserAgentsConfig::allow_list_path`.
#[async_trait]
pub trait AllowListFileSource: Send + Sync {
    /// Reads one allow-list entry per non-empty line. Any I/O failure is
    /// surfaced unchanged — the caller (`UserAgentManager::refresh`) is
    /// responsible for logging and skipping per §4.B, not this port.
    async fn read_lines(&self, path: &str) -> std::io::Result<Vec<String>>;
}
