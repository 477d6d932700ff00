use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::snmp::OidMetadata;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataProfile {
    pub name: String, // Название профиля, например "generic-endpoint"
    pub oids: HashMap<String, OidMetadata>, // Базовый OID -> метка и единица измерения
}

impl MetadataProfile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Profile(format!("не удалось прочитать файл {}: {e}", path.display()))
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let profile: MetadataProfile = serde_yml::from_str(content)
            .map_err(|e| ConfigError::Profile(format!("не удалось распарсить YAML: {e}")))?;

        if profile.oids.is_empty() {
            return Err(ConfigError::Profile(format!(
                "профиль '{}' пустой",
                profile.name
            )));
        }

        Ok(profile)
    }
}
