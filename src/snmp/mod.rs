use async_trait::async_trait;

pub mod metadata;
pub mod oid;
pub mod v2c;

pub use metadata::{MetadataResolver, OidMetadata};
pub use oid::parse_oid;
pub use v2c::SnmpClientV2c;

/// Причины, по которым опрос OID не дал показания
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("невалидный OID '{0}'")]
    InvalidOid(String),

    #[error("транспорт: {0}")]
    Transport(String),

    #[error("таймаут SNMP запроса")]
    Timeout,

    #[error("SNMP error-status {status} (index {index})")]
    ErrorStatus { status: u32, index: u32 },

    #[error("{oid}: {exception}")]
    NoSuchValue {
        oid: String,
        exception: &'static str,
    },

    #[error("SNMP ответ пустой")]
    EmptyResponse,
}

/// Ответ на GETNEXT с уже строковыми значениями
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetNextResponse {
    pub error_status: u32,
    pub error_index: u32,
    /// (OID, значение)
    pub varbinds: Vec<(String, String)>,
}

/// Внешняя возможность опроса устройства.
///
/// Один вызов = один GETNEXT запрос; возвращаемый OID следующий в дереве
/// устройства, а не запрошенный.
#[async_trait]
pub trait SnmpTransport: Send + Sync {
    async fn get_next(&self, oid: &str) -> Result<GetNextResponse, QueryError>;
}
