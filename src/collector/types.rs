use serde::{Deserialize, Serialize};

/// Одно показание: значение одного OID с одного устройства в момент опроса
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Секунды с начала эпохи
    pub timestamp: f64,
    pub source_ip: String,
    pub source_port: u16,
    /// OID из ответа устройства (после GETNEXT может отличаться от запрошенного)
    pub oid: String,
    pub label: String,
    pub value: String,
    pub unit: String,
}
