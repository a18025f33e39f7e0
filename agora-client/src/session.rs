use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Stores the GoRest bearer token in the user's home directory.
///
/// The token lives in `~/.agora/token` with 0600 permissions so only the
/// owner can read it.
#[derive(Debug, Clone)]
pub struct SessionStore {
    file_path: PathBuf,
}

impl SessionStore {
    /// Creates a store pointing at the default `~/.agora/token` path.
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(Self {
            file_path: home_dir.join(".agora").join("token"),
        })
    }

    /// Creates a store at an explicit path. Used by tests.
    pub fn at_path(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    /// Loads the bearer token.
    ///
    /// Returns `Ok(None)` when the file is missing, empty, or obviously
    /// corrupted; only I/O failures are errors.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.file_path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.file_path).context("Failed to read token file")?;
        let token = content.trim();

        if token.is_empty() {
            log::warn!("Token file is empty, treating as signed out");
            return Ok(None);
        }

        if token.chars().any(|c| c.is_control()) {
            log::warn!("Token file contains control characters, treating as corrupted");
            return Ok(None);
        }

        log::debug!("Loaded bearer token from {}", self.file_path.display());
        Ok(Some(token.to_string()))
    }

    /// Saves the bearer token atomically with 0600 permissions.
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).context("Failed to create .agora directory")?;
        }

        let temp_path = self.file_path.with_extension("tmp");
        let mut file =
            fs::File::create(&temp_path).context("Failed to create temporary token file")?;
        file.write_all(token.as_bytes())
            .context("Failed to write bearer token")?;
        file.sync_all().context("Failed to sync token file")?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))
                .context("Failed to set token file permissions")?;
        }

        fs::rename(&temp_path, &self.file_path)
            .context("Failed to rename temporary token file")?;

        log::info!("Saved bearer token to {}", self.file_path.display());
        Ok(())
    }

    /// Deletes the token file. Succeeds when the file is already gone.
    pub fn delete(&self) -> Result<()> {
        if self.file_path.exists() {
            fs::remove_file(&self.file_path).context("Failed to delete token file")?;
            log::info!("Deleted token file at {}", self.file_path.display());
        }
        Ok(())
    }

    pub fn path(&self) -> &PathBuf {
        &self.file_path
    }
}
