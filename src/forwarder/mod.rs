use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

pub mod retry;

pub use retry::RetryPolicy;

use crate::collector::Reading;
use crate::config::settings::ApiSettings;
use crate::formatter::JsonFormatter;
use crate::storage::TraceWriter;

/// Таймаут одной попытки отправки по умолчанию
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("HTTP запрос не удался: {0}")]
    Http(#[from] reqwest::Error),

    #[error("коллектор ответил статусом {0}")]
    Status(u16),

    #[error("ошибка сериализации показания: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ForwardError {
    /// Повторяются только сбои сети и ответы коллектора; ошибки сборки запроса постоянны
    fn is_retryable(&self) -> bool {
        match self {
            ForwardError::Http(e) => !e.is_builder(),
            ForwardError::Status(_) => true,
            ForwardError::Serialize(_) => false,
        }
    }
}

/// Получатель показаний
#[async_trait]
pub trait ReadingSink: Send + Sync {
    async fn forward(&self, reading: &Reading) -> Result<(), ForwardError>;
}

/// Отправка показаний на коллектор по HTTP с повторами
pub struct Forwarder {
    client: reqwest::Client,
    endpoint: String,
    authorization: String,
    retry: RetryPolicy,
    /// Превышение считается сбоем транспорта и повторяется
    timeout: Duration,
    trace: TraceWriter,
}

impl Forwarder {
    pub fn new(api: &ApiSettings, trace: TraceWriter) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder().build()?;

        // Без ключа заголовок отправляется пустым, а не опускается
        let authorization = api
            .api_key
            .as_deref()
            .map(|key| format!("Bearer {key}"))
            .unwrap_or_default();

        Ok(Self {
            client,
            endpoint: api.endpoint.clone(),
            authorization,
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            trace,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build_request(&self, reading: &Reading) -> Result<reqwest::Request, ForwardError> {
        let body = JsonFormatter::to_json_bytes(reading)?;
        let request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.authorization.as_str())
            .timeout(self.timeout)
            .body(body)
            .build()?;
        Ok(request)
    }

    async fn send_once(&self, reading: &Reading) -> Result<(), ForwardError> {
        let request = self.build_request(reading)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReadingSink for Forwarder {
    async fn forward(&self, reading: &Reading) -> Result<(), ForwardError> {
        let mut attempt = 1u32;
        loop {
            match self.send_once(reading).await {
                Ok(()) => {
                    tracing::debug!(oid = %reading.oid, attempt, "Показание отправлено");
                    self.trace.record(reading).await;
                    return Ok(());
                }
                Err(e) => {
                    let delay = self.retry.delay_after(attempt).filter(|_| e.is_retryable());
                    let Some(delay) = delay else {
                        tracing::error!(oid = %reading.oid, attempts = attempt, error = %e, "Отправка не удалась");
                        return Err(e);
                    };

                    tracing::warn!(
                        oid = %reading.oid,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Отправка не удалась, повтор"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
