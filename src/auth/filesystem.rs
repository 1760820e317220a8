use super::storage::{AuthState, AuthStore};
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const AUTH_STORAGE_FILE: &str = "auth-storage.json";

pub struct FilesystemAuthStore {
    dir: PathBuf,
}

impl FilesystemAuthStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(AUTH_STORAGE_FILE)
    }

    fn ensure_dir(&self) -> Result<&Path> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(&self.dir)
    }
}

impl AuthStore for FilesystemAuthStore {
    fn load(&self) -> Option<AuthState> {
        let content = fs::read_to_string(self.path()).ok()?;
        // A corrupt file is treated as logged out
        serde_json::from_str(&content).ok()
    }

    fn save(&self, state: &AuthState) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(state)?;
        let tmp = self.dir.join(format!("{}.tmp", AUTH_STORAGE_FILE));
        fs::write(&tmp, content)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(tmp, self.path())?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
