//! Where notes live, and how a note's vault-relative path maps to disk.

use std::{
    env,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Publishing only works with notes on the local filesystem.")]
    NotLocal(String),
    #[error("No active note to publish")]
    NoActiveNote,
    #[error("Cannot determine the current directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;

#[derive(PartialEq, Debug, Clone)]
pub enum Vault {
    FileSystem { base_path: PathBuf },
    /// A vault served from somewhere other than the local disk.
    Remote { location: String },
}

impl Vault {
    /// Accepts a plain directory, a `file://` URL, or any other URL, which
    /// is treated as a non-local vault.
    pub fn from_location(location: &str) -> Self {
        if let Some(path) = location.strip_prefix("file://") {
            return Vault::FileSystem {
                base_path: PathBuf::from(path),
            };
        }
        match location.find("://") {
            Some(_) => Vault::Remote {
                location: location.to_owned(),
            },
            None => Vault::FileSystem {
                base_path: PathBuf::from(location),
            },
        }
    }

    pub fn current_dir() -> Result<Self> {
        Ok(Vault::FileSystem {
            base_path: env::current_dir()?,
        })
    }

    pub fn base_path(&self) -> Result<&Path> {
        match self {
            Vault::FileSystem { base_path } => Ok(base_path.as_path()),
            Vault::Remote { location } => Err(VaultError::NotLocal(location.clone())),
        }
    }

    /// Resolves the active note against the vault base. Absolute note paths
    /// are kept as they are.
    pub fn absolute_path<P: AsRef<Path>>(&self, note: Option<P>) -> Result<PathBuf> {
        let base_path = self.base_path()?;
        let note = note.ok_or(VaultError::NoActiveNote)?;
        Ok(base_path.join(note.as_ref()))
    }
}
