use crate::config::DEFAULT_CONFIG;
use clap::{ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(version, about = "Reads printer supplies and counters over SNMP", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["report", "debug", "ping"])))]
pub struct Cli {
    /// Read every printer and post the results to the backend
    #[arg(long)]
    pub report: bool,

    /// Read every printer and print a summary plus the payload
    #[arg(long)]
    pub debug: bool,

    /// Only check which printers answer
    #[arg(long)]
    pub ping: bool,

    /// Path to the site configuration
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    pub config: String,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Report,
    Debug,
    Ping,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.report {
            Mode::Report
        } else if self.debug {
            Mode::Debug
        } else {
            Mode::Ping
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_mode_is_required() {
        assert!(Cli::try_parse_from(["printer_monitor"]).is_err());
        assert!(Cli::try_parse_from(["printer_monitor", "--report", "--ping"]).is_err());
    }

    #[test]
    fn parses_mode_and_config() {
        let cli = Cli::try_parse_from(["printer_monitor", "--debug", "-c", "site.toml", "-v"]).unwrap();
        assert_eq!(cli.mode(), Mode::Debug);
        assert_eq!(cli.config, "site.toml");
        assert!(cli.verbose);

        let cli = Cli::try_parse_from(["printer_monitor", "--ping"]).unwrap();
        assert_eq!(cli.mode(), Mode::Ping);
        assert_eq!(cli.config, DEFAULT_CONFIG);
    }
}
