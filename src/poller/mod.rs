use std::time::Duration;

use tokio::time::Instant;
use tracing::Instrument;

use crate::collector::SnmpCollector;
use crate::forwarder::ReadingSink;
use crate::snmp::SnmpTransport;

/// Итог обработки одного OID в цикле
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidOutcome {
    /// Показание получено и отправлено
    Forwarded,
    /// Устройство не дало данных, OID пропущен до следующего цикла
    NoData,
    /// Показание получено, но отправка не удалась после всех попыток
    SendFailed,
}

/// Счетчики одного цикла опроса
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub forwarded: usize,
    pub no_data: usize,
    pub send_failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: OidOutcome) {
        match outcome {
            OidOutcome::Forwarded => self.forwarded += 1,
            OidOutcome::NoData => self.no_data += 1,
            OidOutcome::SendFailed => self.send_failed += 1,
        }
    }

    pub fn attempted(&self) -> usize {
        self.forwarded + self.no_data + self.send_failed
    }
}

/// Пауза до начала следующего цикла, никогда не отрицательная
pub fn cadence_sleep(interval: Duration, elapsed: Duration) -> Duration {
    interval.saturating_sub(elapsed)
}

/// Цикл опрос -> нормализация -> отправка с постоянным периодом
pub struct Poller<T, S> {
    collector: SnmpCollector<T>,
    sink: S,
    oids: Vec<String>,
    interval: Duration,
}

impl<T: SnmpTransport, S: ReadingSink> Poller<T, S> {
    pub fn new(collector: SnmpCollector<T>, sink: S, oids: Vec<String>, interval: Duration) -> Self {
        Self {
            collector,
            sink,
            oids,
            interval,
        }
    }

    pub async fn poll_oid(&self, oid: &str) -> OidOutcome {
        // Ошибка опроса уже залогирована клиентом
        let Ok(reading) = self.collector.query(oid).await else {
            return OidOutcome::NoData;
        };

        match self.sink.forward(&reading).await {
            Ok(()) => OidOutcome::Forwarded,
            Err(e) => {
                tracing::error!(oid, error = %e, "Показание пропущено в этом цикле");
                OidOutcome::SendFailed
            }
        }
    }

    /// Один проход по всем OID строго в заданном порядке
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();

        for oid in &self.oids {
            let outcome = self
                .poll_oid(oid)
                .instrument(tracing::debug_span!("oid", oid = %oid))
                .await;
            report.record(outcome);
        }

        report
    }

    /// Работает до внешнего прерывания
    pub async fn run(&self) {
        let mut cycle: u64 = 0;

        loop {
            cycle += 1;
            let started = Instant::now();

            let report = self
                .run_cycle()
                .instrument(tracing::info_span!("poll_cycle", cycle))
                .await;

            let elapsed = started.elapsed();
            let pause = cadence_sleep(self.interval, elapsed);
            tracing::debug!(
                cycle,
                forwarded = report.forwarded,
                no_data = report.no_data,
                send_failed = report.send_failed,
                elapsed_ms = elapsed.as_millis() as u64,
                sleep_ms = pause.as_millis() as u64,
                "Цикл опроса завершен"
            );
            if pause.is_zero() {
                tracing::warn!(
                    cycle,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Цикл дольше интервала опроса, следующий начинается сразу"
                );
            }

            tokio::time::sleep(pause).await;
        }
    }
}
