use std::path::PathBuf;
use std::time::Duration;

use super::ConfigError;
use crate::snmp::parse_oid;

const DEFAULT_TARGET: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 1161;
const DEFAULT_COMMUNITY: &str = "public";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_SNMP_TIMEOUT_SECS: u64 = 3;
const DEFAULT_STORAGE_PATH: &str = "logs/snmp_data.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Базовые настройки поллера
#[derive(Debug, Clone)]
pub struct Settings {
    /// Настройки опроса устройства
    pub snmp: SnmpSettings,
    /// Настройки отправки на коллектор
    pub api: ApiSettings,
    /// Локальный журнал отправленных показаний
    pub storage: StorageSettings,
    /// Обогащать показания метками и единицами измерения
    pub enable_metadata: bool,
    /// Путь к YAML профилю с дополнительными OID
    pub metadata_profile: Option<PathBuf>,
    /// Директива фильтра для tracing
    pub log_level: String,
}

#[derive(Debug, Clone)]
pub struct SnmpSettings {
    pub target: String,
    pub port: u16,
    pub community: String,
    /// OID в порядке опроса
    pub oids: Vec<String>,
    pub poll_interval: Duration,
    /// Таймаут одного SNMP запроса
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Settings {
    /// Собирает настройки из произвольного источника ключ/значение.
    ///
    /// Пустые значения считаются отсутствующими.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint = get("API_ENDPOINT").ok_or(ConfigError::MissingEndpoint)?;
        let endpoint = parse_endpoint(endpoint.trim())?;

        let oids = parse_oid_list(&get("OIDS").unwrap_or_default())?;
        if oids.is_empty() {
            return Err(ConfigError::EmptyOids);
        }

        let snmp = SnmpSettings {
            target: get("SNMP_TARGET").unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            port: parse_number(&get, "SNMP_PORT", DEFAULT_PORT)?,
            community: get("SNMP_COMMUNITY").unwrap_or_else(|| DEFAULT_COMMUNITY.to_string()),
            oids,
            poll_interval: Duration::from_secs(parse_number(
                &get,
                "POLL_INTERVAL",
                DEFAULT_POLL_INTERVAL_SECS,
            )?),
            timeout: Duration::from_secs(parse_number(
                &get,
                "SNMP_TIMEOUT",
                DEFAULT_SNMP_TIMEOUT_SECS,
            )?),
        };

        Ok(Self {
            snmp,
            api: ApiSettings {
                endpoint,
                api_key: get("API_KEY"),
            },
            storage: StorageSettings {
                enabled: get("ENABLE_LOCAL_STORAGE").is_some_and(|v| parse_flag(&v)),
                path: get("STORAGE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_PATH)),
            },
            enable_metadata: get("ENABLE_METADATA").is_none_or(|v| parse_flag(&v)),
            metadata_profile: get("METADATA_PROFILE").map(PathBuf::from),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Адрес устройства в виде host:port
    pub fn target_addr(&self) -> String {
        format!("{}:{}", self.snmp.target, self.snmp.port)
    }
}

/// Коллектор принимает только http(s) URL
fn parse_endpoint(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };

    let url = reqwest::Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }

    Ok(raw.to_string())
}

/// Только "true" (без учета регистра) включает флаг
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn parse_number<T, F>(get: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_oid_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            parse_oid(s)
                .map(|_| s.to_string())
                .map_err(|_| ConfigError::InvalidOid(s.to_string()))
        })
        .collect()
}
