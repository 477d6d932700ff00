use std::net::Ipv4Addr;
use std::time::Duration;

use async_trait::async_trait;
use snmp2::{AsyncSession, Value};
use tokio::time::timeout;

use super::{GetNextResponse, QueryError, SnmpTransport, parse_oid};

/// SNMPv2c клиент поверх snmp2.
///
/// Сессия открывается на каждый запрос, между вызовами состояние не хранится.
pub struct SnmpClientV2c {
    target: String,
    community: Vec<u8>,
    timeout: Duration,
}

impl SnmpClientV2c {
    pub fn new(target: &str, community: &[u8], timeout: Duration) -> Self {
        Self {
            target: target.to_string(),
            community: community.to_vec(),
            timeout,
        }
    }
}

#[async_trait]
impl SnmpTransport for SnmpClientV2c {
    async fn get_next(&self, oid_str: &str) -> Result<GetNextResponse, QueryError> {
        let oid = parse_oid(oid_str).map_err(|_| QueryError::InvalidOid(oid_str.to_string()))?;

        let work = async {
            let mut session = AsyncSession::new_v2c(self.target.as_str(), &self.community, 2)
                .await
                .map_err(|e| QueryError::Transport(format!("не удалось создать сессию: {e}")))?;

            let resp = session
                .getnext(&oid)
                .await
                .map_err(|e| QueryError::Transport(format!("GETNEXT не удался: {e}")))?;

            let error_status = resp.error_status;
            let error_index = resp.error_index;
            let varbinds = resp
                .varbinds
                .map(|(oid, value)| varbind_to_pair(oid.to_string(), &value))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(GetNextResponse {
                error_status,
                error_index,
                varbinds,
            })
        };

        match timeout(self.timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(QueryError::Timeout),
        }
    }
}

/// Исключения v2c (конец MIB, нет объекта) означают отсутствие данных, а не значение
fn varbind_to_pair(oid: String, value: &Value<'_>) -> Result<(String, String), QueryError> {
    let exception = match value {
        Value::EndOfMibView => "endOfMibView",
        Value::NoSuchObject => "noSuchObject",
        Value::NoSuchInstance => "noSuchInstance",
        _ => return Ok((oid, value_to_string(value))),
    };

    Err(QueryError::NoSuchValue { oid, exception })
}

/// Приводит SNMP значение к строке без обертки типа
pub fn value_to_string(value: &Value<'_>) -> String {
    match value {
        Value::Null => String::new(),
        Value::Boolean(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::OctetString(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Value::ObjectIdentifier(oid) => oid.to_string(),
        Value::IpAddress(octets) => Ipv4Addr::from(*octets).to_string(),
        Value::Counter32(n) | Value::Unsigned32(n) | Value::Timeticks(n) => n.to_string(),
        Value::Counter64(n) => n.to_string(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_common_value_types() {
        assert_eq!(value_to_string(&Value::OctetString(b"Test System")), "Test System");
        assert_eq!(value_to_string(&Value::Integer(-3)), "-3");
        assert_eq!(value_to_string(&Value::Counter32(1500)), "1500");
        assert_eq!(value_to_string(&Value::Timeticks(360000)), "360000");
        assert_eq!(value_to_string(&Value::Counter64(u64::MAX)), u64::MAX.to_string());
        assert_eq!(value_to_string(&Value::IpAddress([10, 0, 0, 1])), "10.0.0.1");
        assert_eq!(value_to_string(&Value::Null), "");
    }

    #[test]
    fn exception_values_are_not_readings() {
        for (value, name) in [
            (Value::EndOfMibView, "endOfMibView"),
            (Value::NoSuchObject, "noSuchObject"),
            (Value::NoSuchInstance, "noSuchInstance"),
        ] {
            let err = varbind_to_pair("1.3.6.1.2.1.1.9.0".to_string(), &value).unwrap_err();
            assert!(
                matches!(err, QueryError::NoSuchValue { ref oid, exception } if oid == "1.3.6.1.2.1.1.9.0" && exception == name),
                "{err}"
            );
        }
    }

    #[test]
    fn regular_values_become_pairs() {
        let pair = varbind_to_pair("1.3.6.1.2.1.1.3.0".to_string(), &Value::Timeticks(42)).unwrap();
        assert_eq!(pair, ("1.3.6.1.2.1.1.3.0".to_string(), "42".to_string()));
    }

    #[tokio::test]
    async fn invalid_oid_fails_before_any_io() {
        let client = SnmpClientV2c::new("127.0.0.1:1161", b"public", Duration::from_secs(3));
        let err = client.get_next("1.3.x").await.unwrap_err();
        assert!(matches!(err, QueryError::InvalidOid(_)));
    }

    #[tokio::test]
    async fn silent_agent_times_out() {
        // UDP сокет, который ничего не отвечает
        let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap().to_string();

        let client = SnmpClientV2c::new(&addr, b"public", Duration::from_millis(200));
        let err = client.get_next("1.3.6.1.2.1.1.1.0").await.unwrap_err();
        assert!(matches!(err, QueryError::Timeout));
    }
}
