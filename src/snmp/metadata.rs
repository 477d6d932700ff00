use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::oid::base_oid;

pub const UNKNOWN: &str = "unknown";

/// Метка и единица измерения OID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidMetadata {
    pub label: String,
    pub unit: String,
}

impl OidMetadata {
    pub fn unknown() -> Self {
        Self {
            label: UNKNOWN.to_string(),
            unit: UNKNOWN.to_string(),
        }
    }
}

/// Встроенная таблица базовых OID (MIB-2 system и ifTable).
///
/// Скалярные sysDescr.0 и sysUpTime.0 длиннее семи компонентов, поэтому
/// тоже сворачиваются до базы и хранятся здесь без `.0`.
static BUILTIN: LazyLock<HashMap<&'static str, (&'static str, &'static str)>> =
    LazyLock::new(|| {
        HashMap::from([
            ("1.3.6.1.2.1.1.1", ("sysDescr", "string")),
            ("1.3.6.1.2.1.1.3", ("sysUpTime", "timeticks")),
            ("1.3.6.1.2.1.2.2.1.2", ("ifDescr", "string")),
            ("1.3.6.1.2.1.2.2.1.5", ("ifSpeed", "bits/second")),
            ("1.3.6.1.2.1.2.2.1.8", ("ifOperStatus", "enum")),
            ("1.3.6.1.2.1.2.2.1.10", ("ifInOctets", "bytes")),
            ("1.3.6.1.2.1.2.2.1.16", ("ifOutOctets", "bytes")),
        ])
    });

/// Резолвер OID -> {label, unit}. Никогда не возвращает ошибку.
#[derive(Debug, Clone, Default)]
pub struct MetadataResolver {
    /// Записи из профиля, перекрывают встроенную таблицу
    extra: HashMap<String, OidMetadata>,
}

impl MetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra(extra: HashMap<String, OidMetadata>) -> Self {
        Self { extra }
    }

    pub fn resolve(&self, oid: &str) -> OidMetadata {
        let base = base_oid(oid);

        if let Some(meta) = self.extra.get(base) {
            return meta.clone();
        }

        BUILTIN
            .get(base)
            .map(|(label, unit)| OidMetadata {
                label: label.to_string(),
                unit: unit.to_string(),
            })
            .unwrap_or_else(OidMetadata::unknown)
    }
}
