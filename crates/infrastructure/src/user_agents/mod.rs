use async_trait::async_trait;
use tfw_guard_application::AllowListFileSource;
use tokio::fs;

/// Reads the user-agent (and persistent-users literal-address) allow-list
/// files: one entry per non-empty, non-comment line.
pub struct FileAllowListSource;

#[async_trait]
impl AllowListFileSource for FileAllowListSource {
    async fn read_lines(&self, path: &str) -> std::io::Result<Vec<String>> {
        let contents = fs::read_to_string(path).await?;
        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn skips_blank_and_comment_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("allow.txt");
        fs::write(&path, "curl/7.0\n\n# comment\nMozilla/5.0\n")
            .await
            .unwrap();
        let source = FileAllowListSource;
        let lines = source.read_lines(path.to_str().unwrap()).await.unwrap();
        assert_eq!(lines, vec!["curl/7.0".to_string(), "Mozilla/5.0".to_string()]);
    }
}
