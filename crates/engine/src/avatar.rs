//! Avatar file naming and media storage.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Avatar every new profile starts with, relative to the media root.
pub const DEFAULT_AVATAR: &str = "system/user-dummy-img.jpg";

/// Derive the storage path of an uploaded avatar.
///
/// The file lands in `users/{username}/avatars/` under a fresh UUID so two
/// uploads never collide. The extension is whatever follows the last `.` of
/// the uploaded name.
pub fn avatar_path(username: &str, filename: &str) -> String {
    avatar_path_with_token(username, filename, Uuid::new_v4())
}

fn avatar_path_with_token(username: &str, filename: &str, token: Uuid) -> String {
    let ext = filename.rsplit('.').next().unwrap_or(filename);
    format!("users/{username}/avatars/{token}.{ext}")
}

/// Media files rooted at a directory on disk.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored media path.
    pub fn resolve(&self, relative: &str) -> ResultEngine<PathBuf> {
        let relative = Path::new(relative);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(EngineError::InvalidId(format!(
                "media path escapes root: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Write `bytes` at `relative`, creating parent directories.
    pub async fn save(&self, relative: &str, bytes: &[u8]) -> ResultEngine<PathBuf> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("stored media file {}", path.display());
        Ok(path)
    }

    /// Remove a previously stored file. Missing files are not an error.
    pub async fn remove(&self, relative: &str) -> ResultEngine<()> {
        let path = self.resolve(relative)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_keeps_extension_and_user_directory() {
        let token = Uuid::nil();
        assert_eq!(
            avatar_path_with_token("jdoe", "me.final.png", token),
            "users/jdoe/avatars/00000000-0000-0000-0000-000000000000.png"
        );
    }

    #[test]
    fn name_without_dot_is_used_as_extension() {
        let token = Uuid::nil();
        assert_eq!(
            avatar_path_with_token("jdoe", "photo", token),
            "users/jdoe/avatars/00000000-0000-0000-0000-000000000000.photo"
        );
    }

    #[test]
    fn fresh_token_per_upload() {
        assert_ne!(avatar_path("jdoe", "a.jpg"), avatar_path("jdoe", "a.jpg"));
    }

    #[test]
    fn resolve_rejects_escaping_paths() {
        let store = MediaStore::new("/srv/media");
        assert!(store.resolve("../etc/passwd").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
        assert_eq!(
            store.resolve("users/a/avatars/x.png").unwrap(),
            PathBuf::from("/srv/media/users/a/avatars/x.png")
        );
    }
}
