//! Агент, который опрашивает SNMP устройство с постоянным периодом и
//! пересылает нормализованные показания на HTTP коллектор.

pub mod collector;
pub mod config;
pub mod formatter;
pub mod forwarder;
pub mod poller;
pub mod snmp;
pub mod storage;
