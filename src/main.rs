use anyhow::{Context, Result};
use tokio::signal;
use tracing_subscriber::EnvFilter;

use snmp_forwarder::collector::SnmpCollector;
use snmp_forwarder::config::AppConfig;
use snmp_forwarder::config::settings::DEFAULT_LOG_LEVEL;
use snmp_forwarder::forwarder::Forwarder;
use snmp_forwarder::poller::Poller;
use snmp_forwarder::snmp::{MetadataResolver, SnmpClientV2c};
use snmp_forwarder::storage::TraceWriter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();

    let log_level = config
        .as_ref()
        .map(|c| c.settings.log_level.as_str())
        .unwrap_or(DEFAULT_LOG_LEVEL);
    init_tracing(log_level);

    let config = config
        .inspect_err(|e| tracing::error!(error = %e, "Конфигурация невалидна"))
        .context("Поллер не запущен")?;

    let poller = build_poller(&config)?;

    tokio::select! {
        _ = poller.run() => Ok(()),
        res = shutdown_signal() => {
            res?;
            tracing::info!("Остановка SNMP поллера...");
            Ok(())
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Собирает цепочку клиент -> отправитель -> планировщик из конфигурации
fn build_poller(config: &AppConfig) -> Result<Poller<SnmpClientV2c, Forwarder>> {
    let settings = &config.settings;

    let resolver = settings.enable_metadata.then(|| match &config.profile {
        Some(profile) => {
            tracing::info!(profile = %profile.name, oids = profile.oids.len(), "Загружен профиль метаданных");
            MetadataResolver::with_extra(profile.oids.clone())
        }
        None => MetadataResolver::new(),
    });

    let transport = SnmpClientV2c::new(
        &settings.target_addr(),
        settings.snmp.community.as_bytes(),
        settings.snmp.timeout,
    );
    let collector = SnmpCollector::new(
        transport,
        &settings.snmp.target,
        settings.snmp.port,
        resolver,
    );

    let trace = TraceWriter::new(&settings.storage);
    tracing::info!(
        device = %settings.target_addr(),
        oids = settings.snmp.oids.len(),
        interval_secs = settings.snmp.poll_interval.as_secs(),
        endpoint = %settings.api.endpoint,
        local_storage = trace.is_enabled(),
        metadata = settings.enable_metadata,
        "Запуск SNMP опроса"
    );

    let forwarder =
        Forwarder::new(&settings.api, trace).context("Не удалось создать HTTP клиент")?;

    Ok(Poller::new(
        collector,
        forwarder,
        settings.snmp.oids.clone(),
        settings.snmp.poll_interval,
    ))
}

/// Ctrl-C или SIGTERM
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Не удалось установить обработчик Ctrl-C") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Не удалось установить обработчик SIGTERM")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res,
        res = terminate => res,
    }
}
