use crate::printer_list::PrinterTarget;
use crate::query_engine::{SnmpTarget, DEFAULT_PORT};
use crate::report::WireFormat;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

pub const DEFAULT_CONFIG: &str = "printer_monitor.toml";

/// Site configuration, read once at startup.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Client/tenant label attached to every report.
    pub client: String,
    pub backend: Option<String>,
    pub proxy: Option<String>,
    pub token: Option<String>,
    #[serde(default = "default_community")]
    pub community: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retries: u32,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub wire_format: WireFormat,
    /// Optional CSV file with additional printers.
    pub printer_list: Option<String>,
    #[serde(default)]
    pub printers: Vec<PrinterTarget>,
}

fn default_community() -> String {
    "public".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_concurrency() -> usize {
    4
}

impl Config {
    pub fn load(filename: &str) -> Result<Self> {
        let path = Path::new(filename);
        if !path.exists() {
            bail!("Config file {} does not exist", filename);
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {filename}"))?;
        let config = Self::from_toml(&raw).with_context(|| format!("Invalid config file {filename}"))?;

        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw)?;
        if config.client.trim().is_empty() {
            bail!("\"client\" must not be empty");
        }
        if config.concurrency == 0 {
            bail!("\"concurrency\" must be at least 1");
        }
        Ok(config)
    }

    /// SNMP settings for one printer, honouring per-printer overrides.
    pub fn snmp_target(&self, printer: &PrinterTarget) -> SnmpTarget {
        let community = printer.community.as_deref().unwrap_or(&self.community);
        SnmpTarget {
            port: printer.port.unwrap_or(self.port),
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            ..SnmpTarget::new(&printer.ip, community)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SITE: &str = r#"
client = "Acme GmbH"
backend = "https://monitoring.example.com/api/printer/"
token = "secret"
timeout_secs = 2

[[printers]]
ip = "10.0.0.5"
serial = "SN-1"
description = "Front office"
variant = "xeroxbw"

[[printers]]
ip = "10.0.0.6"
serial = "SN-2"
description = "Warehouse"
variant = "hpm426"
community = "private"
port = 1161
"#;

    #[test]
    fn parses_site_config_with_defaults() {
        let config = Config::from_toml(SITE).unwrap();
        assert_eq!(config.client, "Acme GmbH");
        assert_eq!(config.community, "public");
        assert_eq!(config.port, 161);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.wire_format, WireFormat::Null);
        assert_eq!(config.proxy, None);
        assert_eq!(config.printers.len(), 2);
        assert_eq!(config.printers[0].variant, "xeroxbw");
    }

    #[test]
    fn per_printer_overrides_win() {
        let config = Config::from_toml(SITE).unwrap();
        let front = config.snmp_target(&config.printers[0]);
        assert_eq!(front.community, "public");
        assert_eq!(front.port, 161);
        assert_eq!(front.timeout, Duration::from_secs(2));

        let warehouse = config.snmp_target(&config.printers[1]);
        assert_eq!(warehouse.community, "private");
        assert_eq!(warehouse.port, 1161);
    }

    #[test]
    fn legacy_wire_format_is_selectable() {
        let config = Config::from_toml("client = \"x\"\nwire_format = \"legacy\"").unwrap();
        assert_eq!(config.wire_format, WireFormat::Legacy);
    }

    #[test]
    fn rejects_missing_client() {
        assert!(Config::from_toml("backend = \"http://localhost\"").is_err());
        assert!(Config::from_toml("client = \"  \"").is_err());
        assert!(Config::from_toml("client = \"x\"\nconcurrency = 0").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SITE.as_bytes()).unwrap();
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.printers[1].description, "Warehouse");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Config::load("/nonexistent/printer_monitor.toml").is_err());
    }
}
