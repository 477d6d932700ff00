//! Полный проход: агент -> поллер -> HTTP коллектор -> локальный журнал.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::Value;

use snmp_forwarder::collector::{Reading, SnmpCollector};
use snmp_forwarder::config::AppConfig;
use snmp_forwarder::forwarder::{Forwarder, RetryPolicy};
use snmp_forwarder::poller::{CycleReport, Poller};
use snmp_forwarder::snmp::{GetNextResponse, MetadataResolver, QueryError, SnmpTransport};
use snmp_forwarder::storage::TraceWriter;

/// Агент с маленьким деревом; GETNEXT отдает первый OID строго больше запрошенного
struct TreeAgent {
    tree: Vec<(&'static str, &'static str)>,
}

fn arcs(oid: &str) -> Vec<u64> {
    oid.split('.').filter_map(|p| p.parse().ok()).collect()
}

#[async_trait]
impl SnmpTransport for TreeAgent {
    async fn get_next(&self, oid: &str) -> Result<GetNextResponse, QueryError> {
        let requested = arcs(oid);
        let next = self
            .tree
            .iter()
            .find(|(candidate, _)| arcs(candidate) > requested)
            .ok_or_else(|| QueryError::Transport("endOfMibView".to_string()))?;

        Ok(GetNextResponse {
            varbinds: vec![(next.0.to_string(), next.1.to_string())],
            ..Default::default()
        })
    }
}

#[derive(Clone, Default)]
struct Collected {
    bodies: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
}

async fn collect(
    State(state): State<Collected>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    match serde_json::from_str(&body) {
        Ok(json) => {
            state.bodies.lock().unwrap().push((headers, json));
            StatusCode::ACCEPTED
        }
        Err(_) => StatusCode::BAD_REQUEST,
    }
}

async fn spawn_collector() -> (String, Collected) {
    let state = Collected::default();
    let app = Router::new()
        .route("/ingest", post(collect))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/ingest"), state)
}

#[tokio::test]
async fn cycle_forwards_enriched_readings_and_traces_them() {
    let (endpoint, collected) = spawn_collector().await;
    let dir = tempfile::tempdir().unwrap();
    let storage_path = dir.path().join("logs/snmp_data.log");
    let storage_str = storage_path.to_string_lossy().into_owned();

    let config = AppConfig::from_lookup(|key| match key {
        "OIDS" => Some("1.3.6.1.2.1.1.1.0,1.3.6.1.2.1.2.2.1.10,1.3.6.1.2.1.99".to_string()),
        "API_ENDPOINT" => Some(endpoint.clone()),
        "API_KEY" => Some("token-1".to_string()),
        "ENABLE_LOCAL_STORAGE" => Some("true".to_string()),
        "STORAGE_PATH" => Some(storage_str.clone()),
        _ => None,
    })
    .unwrap();
    let settings = &config.settings;

    let agent = TreeAgent {
        tree: vec![
            ("1.3.6.1.2.1.1.1.0", "Test System"),
            ("1.3.6.1.2.1.1.3.0", "360000"),
            ("1.3.6.1.2.1.2.2.1.10.1", "987654"),
        ],
    };
    let collector = SnmpCollector::new(
        agent,
        &settings.snmp.target,
        settings.snmp.port,
        Some(MetadataResolver::new()),
    );
    let forwarder = Forwarder::new(&settings.api, TraceWriter::new(&settings.storage))
        .unwrap()
        .with_retry(RetryPolicy::new(3, Duration::from_millis(10)));
    let poller = Poller::new(
        collector,
        forwarder,
        settings.snmp.oids.clone(),
        settings.snmp.poll_interval,
    );

    let report = poller.run_cycle().await;
    assert_eq!(
        report,
        CycleReport {
            forwarded: 2,
            no_data: 1,
            send_failed: 0
        }
    );

    let bodies = collected.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 2);
    for (headers, _) in bodies.iter() {
        assert_eq!(headers["authorization"], "Bearer token-1");
        assert_eq!(headers["content-type"], "application/json");
    }

    // GETNEXT на sysDescr.0 возвращает sysUpTime.0
    let first: Reading = serde_json::from_value(bodies[0].1.clone()).unwrap();
    assert_eq!(first.oid, "1.3.6.1.2.1.1.3.0");
    assert_eq!(first.label, "sysUpTime");
    assert_eq!(first.unit, "timeticks");
    assert_eq!(first.value, "360000");
    assert_eq!(first.source_ip, "127.0.0.1");
    assert_eq!(first.source_port, 1161);

    let second: Reading = serde_json::from_value(bodies[1].1.clone()).unwrap();
    assert_eq!(second.oid, "1.3.6.1.2.1.2.2.1.10.1");
    assert_eq!(second.label, "ifInOctets");
    assert_eq!(second.unit, "bytes");

    let traced: Vec<Reading> = std::fs::read_to_string(&storage_path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(traced, vec![first, second]);
}
