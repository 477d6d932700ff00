use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::collector::Reading;
use crate::config::settings::StorageSettings;
use crate::formatter::JsonFormatter;

/// Локальный журнал отправленных показаний (NDJSON, только дозапись).
///
/// Ошибки записи логируются и не выходят наружу.
#[derive(Debug, Clone, Default)]
pub struct TraceWriter {
    path: Option<PathBuf>,
}

impl TraceWriter {
    pub fn disabled() -> Self {
        Self { path: None }
    }

    /// Создает директорию журнала один раз при старте
    pub fn new(settings: &StorageSettings) -> Self {
        if !settings.enabled {
            return Self::disabled();
        }

        if let Some(dir) = settings.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::error!(dir = %dir.display(), error = %e, "Не удалось создать директорию журнала");
            }
        }

        Self {
            path: Some(settings.path.clone()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub async fn record(&self, reading: &Reading) {
        let Some(path) = &self.path else {
            return;
        };

        if let Err(e) = append_line(path, reading).await {
            tracing::error!(path = %path.display(), error = %e, "Ошибка локальной записи показания");
        }
    }
}

async fn append_line(path: &Path, reading: &Reading) -> Result<()> {
    let line = JsonFormatter::to_json_line(reading).context("Ошибка сериализации в JSON")?;

    // Файл открывается и закрывается на каждую запись
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Не удалось открыть {}", path.display()))?;

    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
