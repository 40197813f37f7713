//! Temporary on-disk fixtures.

use std::path::{Path, PathBuf};

use tabkey_config::AppConfig;
use tempfile::TempDir;

/// A temp directory holding a `tabkey.toml` and any notes written to it.
///
/// The directory is deleted when this value is dropped, even on panic.
pub struct TestWorkspace {
    pub config: AppConfig,
    pub config_path: PathBuf,
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Write `toml_content` as the config file and load it.
    pub async fn with_toml(toml_content: &str) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("tabkey.toml");
        tokio::fs::write(&config_path, toml_content)
            .await
            .expect("failed to write test config");

        let config = AppConfig::load(&config_path)
            .await
            .expect("failed to parse test config");

        Self {
            config,
            config_path,
            temp_dir,
        }
    }

    pub async fn default_config() -> Self {
        Self::with_toml("").await
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a Markdown note and return its path.
    pub async fn write_note(&self, name: &str, text: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        tokio::fs::write(&path, text)
            .await
            .expect("failed to write note");
        path
    }

    pub async fn read_note(&self, name: &str) -> String {
        tokio::fs::read_to_string(self.temp_dir.path().join(name))
            .await
            .expect("failed to read note")
    }
}
