use std::collections::HashMap;
use std::env;
use std::path::Path;

pub mod profile;
pub mod settings;

pub use profile::MetadataProfile;
pub use settings::Settings;

/// Ошибки конфигурации, при которых поллер не запускается
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API_ENDPOINT must be specified")]
    MissingEndpoint,

    #[error("API_ENDPOINT '{url}' is not a valid http(s) URL: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("OIDS must list at least one OID")]
    EmptyOids,

    #[error("OIDS contains invalid OID '{0}'")]
    InvalidOid(String),

    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("env file: {0}")]
    EnvFile(String),

    #[error("metadata profile: {0}")]
    Profile(String),
}

/// Главная конфигурация приложения
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Базовые настройки
    pub settings: Settings,
    /// Дополнительные OID для резолвера метаданных
    pub profile: Option<MetadataProfile>,
}

impl AppConfig {
    /// Загружает конфигурацию из переменных окружения и `.env` в рабочей директории
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_file(Path::new(".env"), |key| env::var(key).ok())
    }

    /// Значения из `lookup` приоритетнее значений из файла; отсутствующий файл не ошибка
    pub fn from_env_file<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = read_env_file(path)?;
        Self::from_lookup(|key| lookup(key).or_else(|| file.get(key).cloned()))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Settings::from_lookup(lookup)?;
        let profile = settings
            .metadata_profile
            .as_deref()
            .map(MetadataProfile::load)
            .transpose()?;

        Ok(Self { settings, profile })
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|e| ConfigError::EnvFile(format!("{}: {e}", path.display()))),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(ConfigError::EnvFile(format!("{}: {e}", path.display()))),
    }
}
