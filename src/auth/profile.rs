//! Remember-me storage for the signed-in user profile
//!
//! Only the profile is ever written to disk. The access credential stays in
//! [`CredentialStore`](super::CredentialStore); a restored profile is just a
//! hint that a renewal is worth attempting at startup.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{ClientError, Result};
use crate::types::UserProfile;

const PROFILE_DIR: &str = "expensevista";
const PROFILE_FILE: &str = "profile.json";

/// Profile storage with a durable slot and a process-lifetime slot.
///
/// `save(.., remember = true)` writes the durable slot;
/// `save(.., remember = false)` keeps the profile in memory only. `load`
/// prefers the durable slot, and `clear` empties both.
#[derive(Debug)]
pub struct ProfileStorage {
    path: Option<PathBuf>,
    session: Mutex<Option<UserProfile>>,
}

impl Default for ProfileStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileStorage {
    /// Storage under the platform data directory
    #[must_use]
    pub fn new() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(PROFILE_DIR);

        Self::with_path(data_dir.join(PROFILE_FILE))
    }

    /// Storage with a custom durable path
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            session: Mutex::new(None),
        }
    }

    /// Storage that never touches disk; remembered profiles last for the
    /// process lifetime only
    #[must_use]
    pub fn session_only() -> Self {
        Self {
            path: None,
            session: Mutex::new(None),
        }
    }

    /// Durable path, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Store the profile
    ///
    /// # Errors
    ///
    /// Returns an error if the durable file cannot be written.
    pub fn save(&self, profile: &UserProfile, remember: bool) -> Result<()> {
        match (&self.path, remember) {
            (Some(path), true) => {
                write_private(path, profile)?;
                self.set_session(None);
            }
            _ => {
                self.remove_file()?;
                self.set_session(Some(profile.clone()));
            }
        }
        Ok(())
    }

    /// Load the stored profile, durable slot first
    ///
    /// # Errors
    ///
    /// Returns an error if the durable file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Option<UserProfile>> {
        if let Some(path) = &self.path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let profile = serde_json::from_str(&content).map_err(|e| {
                    ClientError::storage(format!("Corrupt profile at {}: {e}", path.display()))
                })?;
                return Ok(Some(profile));
            }
        }

        Ok(self.session.lock().ok().and_then(|slot| slot.clone()))
    }

    /// Remove the profile from both slots
    ///
    /// # Errors
    ///
    /// Returns an error if the durable file exists but cannot be deleted.
    pub fn clear(&self) -> Result<()> {
        self.set_session(None);
        self.remove_file()
    }

    fn set_session(&self, profile: Option<UserProfile>) {
        if let Ok(mut slot) = self.session.lock() {
            *slot = profile;
        }
    }

    fn remove_file(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        match std::fs::remove_file(path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

fn write_private(path: &Path, profile: &UserProfile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(profile)?;
    std::fs::write(path, &content)?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}
