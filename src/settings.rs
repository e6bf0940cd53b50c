use directories::ProjectDirs;
use log::debug;
use serde_derive::{Deserialize, Serialize};
#[cfg(test)]
use std::cell::RefCell;
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

pub const DEFAULT_CREDENTIAL: &str = "default";
pub const DEFAULT_PATH_PREFIX: &str = "/paper/";
const SETTINGS_FILENAME: &str = "settings.toml";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot access settings file {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Malformed settings file: {0}")]
    Malformed(#[from] toml::de::Error),
    #[error("Cannot encode settings: {0}")]
    Encoding(#[from] toml::ser::Error),
    #[error("Unknown setting '{0}', expected one of: credential, path-prefix")]
    UnknownField(String),
    #[error("No configuration directory available on this platform")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub credential: String,
    pub path_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            credential: DEFAULT_CREDENTIAL.to_owned(),
            path_prefix: DEFAULT_PATH_PREFIX.to_owned(),
        }
    }
}

impl Settings {
    pub fn is_complete(&self) -> bool {
        !self.credential.is_empty() && !self.path_prefix.is_empty()
    }

    fn merged_with(mut self, persisted: PersistedSettings) -> Self {
        if let Some(credential) = persisted.credential {
            self.credential = credential;
        }
        if let Some(path_prefix) = persisted.path_prefix {
            self.path_prefix = path_prefix;
        }
        self
    }
}

/// Whatever the repository holds; any field may be missing.
#[derive(PartialEq, Eq, Debug, Clone, Default, Deserialize)]
pub struct PersistedSettings {
    pub credential: Option<String>,
    pub path_prefix: Option<String>,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum SettingField {
    Credential,
    PathPrefix,
}

impl FromStr for SettingField {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "credential" | "api-key" | "api_key" => Ok(SettingField::Credential),
            "path-prefix" | "path_prefix" | "prefix" => Ok(SettingField::PathPrefix),
            _ => Err(SettingsError::UnknownField(s.to_owned())),
        }
    }
}

pub trait SettingsRepository {
    /// `None` when nothing was ever persisted.
    fn load(&self) -> Result<Option<PersistedSettings>>;
    fn save(&self, settings: &Settings) -> Result<()>;
}

pub struct TomlFileRepository {
    path: PathBuf,
}

impl TomlFileRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        TomlFileRepository {
            path: path.as_ref().to_owned(),
        }
    }

    pub fn in_config_dir() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "paperpub", "paperpub")
            .ok_or(SettingsError::NoConfigDir)?;
        Ok(TomlFileRepository::new(dirs.config_dir().join(SETTINGS_FILENAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsRepository for TomlFileRepository {
    fn load(&self) -> Result<Option<PersistedSettings>> {
        if !self.path.exists() {
            debug!("No settings file at {}", self.path.display());
            return Ok(None);
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| SettingsError::Io(self.path.clone(), e))?;
        Ok(Some(toml::from_str(&content)?))
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| SettingsError::Io(dir.to_owned(), e))?;
        }
        let content = toml::to_string(settings)?;
        fs::write(&self.path, content).map_err(|e| SettingsError::Io(self.path.clone(), e))?;
        debug!("Settings saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryRepository {
    pub stored: RefCell<Option<PersistedSettings>>,
    pub saves: RefCell<usize>,
}

#[cfg(test)]
impl MemoryRepository {
    pub fn with(persisted: PersistedSettings) -> Self {
        MemoryRepository {
            stored: RefCell::new(Some(persisted)),
            saves: RefCell::new(0),
        }
    }
}

#[cfg(test)]
impl SettingsRepository for MemoryRepository {
    fn load(&self) -> Result<Option<PersistedSettings>> {
        Ok(self.stored.borrow().clone())
    }

    fn save(&self, settings: &Settings) -> Result<()> {
        *self.stored.borrow_mut() = Some(PersistedSettings {
            credential: Some(settings.credential.clone()),
            path_prefix: Some(settings.path_prefix.clone()),
        });
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

pub struct SettingsStore<R: SettingsRepository> {
    settings: Settings,
    repository: R,
}

impl<R: SettingsRepository> SettingsStore<R> {
    /// Persisted values win over defaults, field by field.
    pub fn load(repository: R) -> Result<Self> {
        let settings = match repository.load()? {
            Some(persisted) => Settings::default().merged_with(persisted),
            None => Settings::default(),
        };
        Ok(SettingsStore {
            settings,
            repository,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update(&mut self, field: SettingField, value: &str) -> Result<()> {
        match field {
            SettingField::Credential => self.settings.credential = value.to_owned(),
            SettingField::PathPrefix => self.settings.path_prefix = value.to_owned(),
        }
        self.repository.save(&self.settings)
    }
}
