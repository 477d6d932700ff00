use anyhow::{Context, Result};
use snmp2::Oid;

/// OID длиннее этого числа компонентов считается строкой таблицы
const MAX_SCALAR_COMPONENTS: usize = 7;

pub fn parse_oid(s: &str) -> Result<Oid<'static>> {
    let parts: Result<Vec<u64>, _> = s
        .trim()
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>())
        .collect();

    let parts = parts.context(format!("Невалидный OID: {}", s))?;
    if parts.is_empty() {
        anyhow::bail!("Пустой OID: {:?}", s);
    }

    Oid::from(&parts).map_err(|e| anyhow::anyhow!("Не удалось создать Oid: {:?}", e))
}

/// Возвращает базовый OID: у табличных OID отбрасывается индекс строки.
pub fn base_oid(oid: &str) -> &str {
    let oid = oid.trim().trim_start_matches('.');
    if oid.split('.').count() > MAX_SCALAR_COMPONENTS {
        oid.rsplit_once('.').map_or(oid, |(base, _)| base)
    } else {
        oid
    }
}
