use chrono::Utc;

pub mod types;

pub use types::Reading;

use crate::snmp::{MetadataResolver, OidMetadata, QueryError, SnmpTransport};

/// Клиент опроса устройства: один GETNEXT -> одно показание
pub struct SnmpCollector<T> {
    transport: T,
    source_ip: String,
    source_port: u16,
    /// None = обогащение метаданными выключено
    resolver: Option<MetadataResolver>,
}

impl<T: SnmpTransport> SnmpCollector<T> {
    pub fn new(
        transport: T,
        source_ip: &str,
        source_port: u16,
        resolver: Option<MetadataResolver>,
    ) -> Self {
        Self {
            transport,
            source_ip: source_ip.to_string(),
            source_port,
            resolver,
        }
    }

    /// Опрашивает OID. Ошибка означает "нет данных в этом цикле" и уже залогирована.
    pub async fn query(&self, oid: &str) -> Result<Reading, QueryError> {
        let resp = self
            .transport
            .get_next(oid)
            .await
            .inspect_err(|e| tracing::error!(oid, error = %e, "SNMP опрос не удался"))?;

        if resp.error_status != 0 {
            let err = QueryError::ErrorStatus {
                status: resp.error_status,
                index: resp.error_index,
            };
            tracing::error!(oid, error = %err, "SNMP агент вернул ошибку");
            return Err(err);
        }

        let Some((returned_oid, value)) = resp.varbinds.into_iter().next() else {
            tracing::error!(oid, "SNMP ответ без varbinds");
            return Err(QueryError::EmptyResponse);
        };

        if returned_oid != oid {
            tracing::trace!(requested = oid, returned = %returned_oid, "GETNEXT вернул следующий OID");
        }

        let metadata = self
            .resolver
            .as_ref()
            .map(|r| r.resolve(&returned_oid))
            .unwrap_or_else(OidMetadata::unknown);

        Ok(Reading {
            timestamp: now_secs(),
            source_ip: self.source_ip.clone(),
            source_port: self.source_port,
            oid: returned_oid,
            label: metadata.label,
            value,
            unit: metadata.unit,
        })
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
