use crate::catalog::ConsumableKind;
use crate::config::Config;
use crate::printer::{Consumable, Printer, Reading, Status};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How unknown numeric values are written to the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Unknown values become `null`.
    #[default]
    Null,
    /// Unknown values become negative sentinels: -1 unsupported,
    /// -404 timeout, -401 any other failure.
    Legacy,
}

impl WireFormat {
    pub fn encode(&self, reading: &Reading<u64>) -> Option<i64> {
        match reading {
            Reading::Value(value) => Some(i64::try_from(*value).unwrap_or(i64::MAX)),
            _ if *self == WireFormat::Null => None,
            Reading::Unsupported => Some(-1),
            Reading::Timeout => Some(-404),
            Reading::Failed => Some(-401),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConsumableReport {
    pub name: Option<String>,
    pub capacity: Option<i64>,
    pub remaining: Option<i64>,
    #[serde(rename = "type")]
    pub kind: ConsumableKind,
}

impl ConsumableReport {
    fn new(consumable: &Consumable, format: WireFormat) -> Self {
        Self {
            name: consumable.name.value().cloned(),
            capacity: format.encode(&consumable.capacity),
            remaining: format.encode(&consumable.remaining),
            kind: consumable.kind,
        }
    }
}

/// One printer's payload as posted to the backend.
#[derive(Debug, Serialize)]
pub struct PrinterReport {
    pub ip: String,
    pub client: String,
    pub serial: String,
    pub description: String,
    pub variant: String,
    pub version: &'static str,
    pub status: Status,
    pub name: Option<String>,
    pub model: Option<String>,
    pub meta: Option<String>,
    pub print_count: Option<i64>,
    pub print_color: Option<i64>,
    pub print_mono: Option<i64>,
    pub consumables: Vec<ConsumableReport>,
    pub timestamp: DateTime<Utc>,
}

impl PrinterReport {
    pub fn new(printer: &Printer, format: WireFormat, timestamp: DateTime<Utc>) -> Self {
        Self {
            ip: printer.target.address.clone(),
            client: printer.identity.client.clone(),
            serial: printer.identity.serial.clone(),
            description: printer.identity.description.clone(),
            variant: printer.bindings.variant.clone(),
            version: VERSION,
            status: printer.status,
            name: printer.name.value().cloned(),
            model: printer.model.value().cloned(),
            meta: printer.meta.value().cloned(),
            print_count: format.encode(&printer.print_count),
            print_color: format.encode(&printer.print_color),
            print_mono: format.encode(&printer.print_mono),
            consumables: printer
                .consumables
                .iter()
                .map(|c| ConsumableReport::new(c, format))
                .collect(),
            timestamp,
        }
    }
}

/// Posts printer reports to the monitoring backend.
pub struct Reporter {
    client: reqwest::Client,
    backend: String,
}

impl Reporter {
    pub fn new(config: &Config) -> Result<Self> {
        let backend = config
            .backend
            .clone()
            .context("\"backend\" must be set to report printer data")?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Token {token}"))
                .context("API token contains invalid characters")?;
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(format!("printer_monitor/{VERSION}"))
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy).context("Invalid proxy URL")?);
        }

        Ok(Self {
            client: builder.build()?,
            backend,
        })
    }

    /// Sends one report. Returns whether the backend accepted it; transport
    /// failures are returned as errors. Reports are not retried.
    pub async fn send(&self, report: &PrinterReport) -> Result<bool> {
        let response = self.client.post(&self.backend).json(report).send().await?;
        let status = response.status();
        if status.is_success() {
            info!("[<] Report for {} [{}] accepted", report.description, report.ip);
            return Ok(true);
        }

        error!(
            "[<] Report for {} [{}] rejected with HTTP {}",
            report.description, report.ip, status
        );
        let body = response.text().await.unwrap_or_default();
        debug!("Backend response: {body}");
        Ok(false)
    }
}
