use std::io;
use std::path::{Path, PathBuf};
use tfw_guard_domain::FingerprintTable;
use tokio::fs;
use tracing::warn;

/// File-backed mirror of a TFt/TFh fingerprint file (component C). Owns the
/// in-memory [`FingerprintTable`] and the filesystem path it round-trips
/// against; the blocker that owns one of these decides when to `load` and
/// `dump`.
pub struct FingerprintStore {
    path: PathBuf,
    table: FingerprintTable,
}

impl FingerprintStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: FingerprintTable::new(),
        }
    }

    pub fn table(&self) -> &FingerprintTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut FingerprintTable {
        &mut self.table
    }

    /// One-time startup check (§7.1): the parent directory must exist and
    /// the file itself must exist and be writable, creating it with mode
    /// 0644 when absent.
    pub async fn verify(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && fs::metadata(parent).await.is_err() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("fingerprint directory {} does not exist", parent.display()),
                ));
            }
        }
        if fs::metadata(&self.path).await.is_err() {
            create_with_mode(&self.path).await?;
        }
        let metadata = fs::metadata(&self.path).await?;
        if metadata.permissions().readonly() {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("fingerprint file {} is not writable", self.path.display()),
            ));
        }
        Ok(())
    }

    /// Reloads the table from disk, replacing its contents in full.
    /// Malformed lines are warned about and skipped, per §4.C — a single
    /// bad line never fails the whole load.
    pub async fn load(&mut self) -> io::Result<()> {
        let contents = fs::read_to_string(&self.path).await?;
        let mut entries = indexmap::IndexMap::new();
        for line in contents.lines() {
            if FingerprintTable::is_skippable(line) {
                continue;
            }
            match FingerprintTable::parse_line(line) {
                Some((hash, entry)) => {
                    entries.insert(hash, entry);
                }
                None => warn!(path = %self.path.display(), line, "skipping malformed fingerprint line"),
            }
        }
        self.table.replace_with(entries);
        Ok(())
    }

    /// Rewrites the file with the table's current contents. Done via a
    /// temp-file-then-rename so a crash mid-write never leaves a partially
    /// written fingerprint file behind.
    pub async fn dump(&mut self) -> io::Result<()> {
        if !self.table.is_dirty() {
            return Ok(());
        }
        let rendered = self.table.render();
        let tmp_path = tmp_sibling(&self.path);
        fs::write(&tmp_path, rendered).await?;
        fs::rename(&tmp_path, &self.path).await?;
        self.table.mark_clean();
        Ok(())
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[cfg(unix)]
async fn create_with_mode(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, "").await?;
    let mut perms = fs::metadata(path).await?.permissions();
    perms.set_mode(0o644);
    fs::set_permissions(path, perms).await
}

#[cfg(not(unix))]
async fn create_with_mode(path: &Path) -> io::Result<()> {
    fs::write(path, "").await
}
