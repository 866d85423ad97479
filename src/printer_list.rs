use crate::config::Config;
use crate::printer::{Identity, Printer, Status};
use crate::query_engine::QueryEngine;
use anyhow::{bail, Result};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::{path::Path, sync::Arc};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::error;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrinterTarget {
    #[serde(alias = "ip_address")]
    pub ip: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub description: String,
    pub variant: String,
    #[serde(default)]
    pub community: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Which printers get a full read after the liveness check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadPolicy {
    PingOnly,
    /// Only printers that answered the ping.
    Reachable,
    /// Every printer; unreachable ones mostly return the latched timeout.
    All,
}

impl ReadPolicy {
    fn should_read(self, status: Status) -> bool {
        match self {
            ReadPolicy::PingOnly => false,
            ReadPolicy::Reachable => status == Status::Ok,
            ReadPolicy::All => true,
        }
    }
}

#[derive(Debug)]
pub struct PrinterList {
    pub targets: Vec<PrinterTarget>,
}

impl PrinterList {
    /// Inline printers first, then the CSV list if one is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut targets = config.printers.clone();
        if let Some(filename) = &config.printer_list {
            targets.extend(Self::from_csv(filename)?.targets);
        }
        if targets.is_empty() {
            bail!("No printers configured");
        }
        Ok(Self { targets })
    }

    pub fn from_csv(filename: &str) -> Result<Self> {
        // Check that the file exists
        let path = Path::new(filename);
        if !path.exists() {
            bail!("File {} does not exist", filename);
        }

        let mut targets = Vec::new();

        let mut reader = ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        for line in reader.records() {
            let line = line?;
            let target: PrinterTarget = line.deserialize(Some(&headers))?;
            targets.push(target);
        }

        Ok(Self { targets })
    }

    /// Pings every printer and reads the ones `policy` selects in full.
    /// At most `config.concurrency` printers are polled at once; results
    /// keep the configured order.
    pub async fn poll_all(
        &self,
        config: &Config,
        engine: Arc<dyn QueryEngine>,
        policy: ReadPolicy,
    ) -> Vec<Printer> {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        let mut set = JoinSet::new();
        for (index, target) in self.targets.iter().enumerate() {
            let identity = Identity {
                client: config.client.clone(),
                serial: target.serial.clone(),
                description: target.description.clone(),
            };
            let snmp = config.snmp_target(target);
            let variant = target.variant.clone();
            let engine = engine.clone();
            let semaphore = semaphore.clone();

            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let mut printer = Printer::connect(identity, snmp, &variant, engine).await;
                if policy.should_read(printer.status) {
                    printer.initialize_values().await;
                }
                (index, printer)
            });
        }

        let mut results = Vec::new();
        while let Some(res) = set.join_next().await {
            match res {
                Ok(polled) => results.push(polled),
                Err(e) => error!("JoinSet Error: {:?}", e),
            }
        }
        results.sort_by_key(|(index, _)| *index);

        results.into_iter().map(|(_, printer)| printer).collect()
    }
}
