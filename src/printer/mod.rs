use crate::catalog::{Attribute, BindingSet, ConsumableKind, CounterAdjustment, SupplyField, CATALOG};
use crate::error::QueryError;
use crate::query_engine::{QueryEngine, SnmpTarget};
use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::{debug, error, info, warn};
mod consumable;
pub use consumable::{Consumable, Depletion};
mod reading;
pub use reading::Reading;
pub mod summary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Timeout,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => f.write_str("OK"),
            Status::Timeout => f.write_str("TIMEOUT"),
        }
    }
}

/// Fixed metadata from the configuration.
#[derive(Clone, Debug, Default)]
pub struct Identity {
    pub client: String,
    pub serial: String,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReadState {
    Uninitialized,
    Read,
}

/// One configured printer and everything read from it during this cycle.
pub struct Printer {
    pub target: SnmpTarget,
    pub identity: Identity,
    pub bindings: BindingSet,
    pub status: Status,
    pub name: Reading<String>,
    pub model: Reading<String>,
    pub meta: Reading<String>,
    pub print_count: Reading<u64>,
    pub print_color: Reading<u64>,
    pub print_mono: Reading<u64>,
    pub consumables: Vec<Consumable>,
    state: ReadState,
    timed_out: bool,
    engine: Arc<dyn QueryEngine>,
}

impl Printer {
    /// Resolves `variant` in the built-in catalog and pings the device.
    pub async fn connect(
        identity: Identity,
        target: SnmpTarget,
        variant: &str,
        engine: Arc<dyn QueryEngine>,
    ) -> Self {
        let bindings = CATALOG.resolve(variant);
        Self::connect_with(identity, target, bindings, engine).await
    }

    pub async fn connect_with(
        identity: Identity,
        target: SnmpTarget,
        bindings: BindingSet,
        engine: Arc<dyn QueryEngine>,
    ) -> Self {
        let mut printer = Self {
            target,
            identity,
            bindings,
            status: Status::Timeout,
            name: Reading::Unsupported,
            model: Reading::Unsupported,
            meta: Reading::Unsupported,
            print_count: Reading::Unsupported,
            print_color: Reading::Unsupported,
            print_mono: Reading::Unsupported,
            consumables: Vec::new(),
            state: ReadState::Uninitialized,
            timed_out: false,
            engine,
        };
        printer.ping().await;
        printer
    }

    /// Liveness check against the printer-name OID.
    async fn ping(&mut self) -> bool {
        let reading = self.query(Attribute::PrinterName).await;
        if reading.is_known() {
            info!("[>] Printer online, {}", self.label());
            self.status = Status::Ok;
            return true;
        }

        error!(
            "Printer unreachable or printer name not readable, {}",
            self.label()
        );
        self.status = Status::Timeout;
        if matches!(reading, Reading::Timeout | Reading::Failed) {
            self.mark_unread(reading);
        }
        false
    }

    /// Carries a failed liveness check into every measured field, so a
    /// printer that is never read still reports why its values are missing.
    fn mark_unread(&mut self, reason: Reading<String>) {
        let counter = reason.to_count();
        self.name = reason.clone();
        self.model = reason.clone();
        self.meta = reason;
        self.print_count = counter.clone();
        self.print_color = counter.clone();
        self.print_mono = counter;
    }

    /// Reads identity, counters and consumables. Runs at most once per cycle.
    pub async fn initialize_values(&mut self) {
        if self.state == ReadState::Read {
            warn!("Values for {} were already read this cycle", self.label());
            return;
        }
        self.state = ReadState::Read;
        info!("[>] Reading printer {}...", self.label());

        self.name = self.query(Attribute::PrinterName).await;
        self.model = self.query(Attribute::PrinterModel).await;
        self.meta = self.query(Attribute::PrinterMeta).await;
        if self.identity.serial.trim().is_empty() {
            if let Reading::Value(serial) = self.query(Attribute::PrinterSerial).await {
                debug!("Using device reported serial {serial} for {}", self.label());
                self.identity.serial = serial;
            }
        }

        self.read_counters().await;
        self.read_consumables().await;
        self.read_manual_consumables().await;
        if let Some(adjustment) = self.bindings.counter_adjustment {
            self.adjust_counters(adjustment).await;
        }
    }

    async fn read_counters(&mut self) {
        self.print_count = self.query(Attribute::PrintCount).await.to_count();
        self.print_color = self.query(Attribute::PrintColor).await.to_count();
        self.print_mono = self.query(Attribute::PrintMono).await.to_count();

        if !self.print_count.is_known() {
            let color = self.print_color.value().copied().unwrap_or(0);
            let mono = self.print_mono.value().copied().unwrap_or(0);
            let total = color.saturating_add(mono);
            if total > 0 {
                debug!("Derived overall count {total} from color and mono");
                self.print_count = Reading::Value(total);
            }
        }
    }

    async fn read_consumables(&mut self) {
        for kind in ConsumableKind::ALL {
            if !self.bindings.exposes(kind) {
                continue;
            }
            debug!("Detected {kind} as being present in OIDs");
            let name = self.query(Attribute::Consumable(kind, SupplyField::Name)).await;
            let capacity = self.query(Attribute::Consumable(kind, SupplyField::Capacity)).await;
            let remaining = self.query(Attribute::Consumable(kind, SupplyField::Remaining)).await;

            let consumable = Consumable::new(kind, name, capacity, remaining);
            if consumable.is_initialized() {
                self.consumables.push(consumable);
            }
        }
    }

    /// Consumables whose level is only available as a pair of status codes
    /// on an OID the firmware files under another supply.
    async fn read_manual_consumables(&mut self) {
        for kind in self.bindings.manual_consumables.clone() {
            if self.get_consumable(kind).is_some() {
                warn!(
                    "Manual consumable {kind} skipped for {}, it was already read automatically",
                    self.label()
                );
                continue;
            }

            let oids = SupplyField::ALL.map(|field| self.bindings.manual_oid(kind, field).map(str::to_string));
            let [Some(name_oid), Some(capacity_oid), Some(remaining_oid)] = oids else {
                warn!("Manual consumable {kind} has no manual OIDs for variant {}", self.bindings.variant);
                continue;
            };

            let name = self.query_oid(&name_oid).await;
            let depletion = self.read_depletion(&remaining_oid, &capacity_oid).await;
            self.consumables.push(Consumable::manual(kind, name, depletion));
        }
    }

    /// Applies the paired-code rule to codes the device actually returned.
    /// A timeout or failure on either query is passed through instead.
    async fn read_depletion(&mut self, remaining_oid: &str, capacity_oid: &str) -> Reading<Depletion> {
        let codes = self.bindings.depletion_codes;
        let remaining = match self.query_oid(remaining_oid).await {
            Reading::Timeout => return Reading::Timeout,
            Reading::Failed => return Reading::Failed,
            reading => reading.to_code(),
        };
        // the capacity code is only consulted when the remaining code matches
        let capacity = if remaining == Some(codes.remaining) {
            match self.query_oid(capacity_oid).await {
                Reading::Timeout => return Reading::Timeout,
                Reading::Failed => return Reading::Failed,
                reading => reading.to_code(),
            }
        } else {
            None
        };

        Reading::Value(Depletion::from_codes(remaining, capacity, &codes))
    }

    async fn adjust_counters(&mut self, adjustment: CounterAdjustment) {
        match adjustment {
            CounterAdjustment::AddCopies => {
                if let Reading::Value(prints) = self.print_color {
                    if let Reading::Value(copies) = self.query(Attribute::CopiesColor).await.to_count() {
                        self.print_color = Reading::Value(prints.saturating_add(copies));
                    }
                }
                if let Reading::Value(prints) = self.print_mono {
                    if let Reading::Value(copies) = self.query(Attribute::CopiesMono).await.to_count() {
                        self.print_mono = Reading::Value(prints.saturating_add(copies));
                    }
                }
            }
        }
    }

    pub fn get_consumable(&self, kind: ConsumableKind) -> Option<&Consumable> {
        self.consumables.iter().find(|c| c.kind == kind)
    }

    pub fn label(&self) -> String {
        format!("{} [{}]", self.identity.description, self.target.address)
    }

    /// Queries the OID bound to `attribute`. Unbound attributes never hit the network.
    async fn query(&mut self, attribute: Attribute) -> Reading<String> {
        match self.bindings.oid(attribute).map(str::to_string) {
            Some(oid) => self.query_oid(&oid).await,
            None => {
                debug!("{attribute} is not applicable for {}", self.bindings.variant);
                Reading::Unsupported
            }
        }
    }

    async fn query_oid(&mut self, oid: &str) -> Reading<String> {
        if self.timed_out {
            return Reading::Timeout;
        }

        debug!("Querying {oid}...");
        let result = self.engine.query(&self.target, oid).await;
        match &result {
            Ok(Some(value)) => debug!("{oid} = {value}"),
            Ok(None) => debug!("No such object at {oid}"),
            Err(QueryError::Timeout) => {
                error!("Timeout querying {oid} for {}", self.label());
                self.timed_out = true;
            }
            Err(e) => error!("{e} querying {oid} for {}", self.label()),
        }
        Reading::from(result)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory agent: fixed answers per OID, everything else is noSuchObject.
    #[derive(Default)]
    pub(crate) struct ScriptedEngine {
        responses: HashMap<String, Result<Option<String>, QueryError>>,
        fail_all: Option<QueryError>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl ScriptedEngine {
        pub(crate) fn with(mut self, oid: &str, value: &str) -> Self {
            self.responses.insert(oid.to_string(), Ok(Some(value.to_string())));
            self
        }

        pub(crate) fn with_error(mut self, oid: &str, error: QueryError) -> Self {
            self.responses.insert(oid.to_string(), Err(error));
            self
        }

        pub(crate) fn failing(error: QueryError) -> Self {
            Self {
                fail_all: Some(error),
                ..Self::default()
            }
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueryEngine for ScriptedEngine {
        async fn query(&self, _target: &SnmpTarget, oid: &str) -> Result<Option<String>, QueryError> {
            self.calls.lock().unwrap().push(oid.to_string());
            if let Some(error) = &self.fail_all {
                return Err(error.clone());
            }
            self.responses.get(oid).cloned().unwrap_or(Ok(None))
        }
    }

    fn supply(column: u32, index: u32) -> String {
        format!("1.3.6.1.2.1.43.11.1.1.{column}.1.{index}")
    }

    fn identity() -> Identity {
        Identity {
            client: "Acme".to_string(),
            serial: "SN-1".to_string(),
            description: "Front office".to_string(),
        }
    }

    pub(crate) async fn connect(variant: &str, engine: ScriptedEngine) -> (Printer, Arc<ScriptedEngine>) {
        let engine = Arc::new(engine);
        let printer = Printer::connect(
            identity(),
            SnmpTarget::new("10.0.0.5", "public"),
            variant,
            engine.clone(),
        )
        .await;
        (printer, engine)
    }

    pub(crate) fn xeroxbw_agent() -> ScriptedEngine {
        ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.1.0", "Xerox B210")
            .with("1.3.6.1.2.1.25.3.2.1.3.1", "B210")
            .with("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.1", "1200")
            .with("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.34", "1200")
            .with(&supply(6, 1), "Black Toner")
            .with(&supply(8, 1), "3000")
            .with(&supply(9, 1), "750")
            .with(&supply(6, 6), "Drum Cartridge")
            .with(&supply(8, 6), "10000")
            .with(&supply(9, 6), "2000")
    }

    #[tokio::test]
    async fn ping_sets_status_ok() {
        let (printer, engine) = connect("xeroxbw", xeroxbw_agent()).await;
        assert_eq!(printer.status, Status::Ok);
        assert_eq!(engine.calls(), vec!["1.3.6.1.2.1.1.1.0".to_string()]);
    }

    #[tokio::test]
    async fn xeroxbw_reports_black_drum_and_omits_cyan_drum() {
        let (mut printer, _) = connect("XeroxBW", xeroxbw_agent()).await;
        printer.initialize_values().await;

        assert_eq!(printer.bindings.variant, "xeroxbw");
        assert_eq!(printer.name, Reading::Value("Xerox B210".to_string()));
        let drum = printer.get_consumable(ConsumableKind::BlackDrum).unwrap();
        assert_eq!(drum.percentage(), Some(20));
        assert!(printer.get_consumable(ConsumableKind::CyanDrum).is_none());
        assert!(printer.get_consumable(ConsumableKind::BlackToner).is_some());
        // manual fuser: no codes at .40, so not depleted
        let fuser = printer.get_consumable(ConsumableKind::Fuser).unwrap();
        assert_eq!(fuser.remaining, Reading::Value(1));
        assert_eq!(printer.consumables.len(), 3);
    }

    #[tokio::test]
    async fn suppressed_bindings_are_never_queried() {
        let agent = ScriptedEngine::default().with("1.3.6.1.2.1.43.5.1.1.16.1", "LJ M426");
        let (mut printer, engine) = connect("hpm426", agent).await;
        printer.initialize_values().await;

        let calls = engine.calls();
        let supply_calls: Vec<&String> = calls
            .iter()
            .filter(|oid| oid.starts_with("1.3.6.1.2.1.43.11.1.1."))
            .collect();
        assert_eq!(supply_calls.len(), 3);
        assert!(supply_calls.iter().all(|oid| oid.ends_with(".1.1")));
        assert!(!calls.contains(&"1.3.6.1.4.1.11.2.3.9.4.2.1.1.16.1.10.0".to_string()));
        assert_eq!(printer.print_color, Reading::Unsupported);
    }

    #[tokio::test]
    async fn overall_count_falls_back_to_color_plus_mono() {
        let agent = ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.5.0", "office-printer")
            .with("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.33", "100")
            .with("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.34", "50");
        let (mut printer, _) = connect("xerox", agent).await;
        printer.initialize_values().await;

        assert_eq!(printer.print_count, Reading::Value(150));
    }

    #[tokio::test]
    async fn overall_count_stays_unknown_without_sub_counters() {
        let agent = ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.5.0", "office-printer")
            .with("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.33", "0");
        let (mut printer, _) = connect("xerox", agent).await;
        printer.initialize_values().await;

        assert!(!printer.print_count.is_known());
        assert_eq!(printer.print_color, Reading::Value(0));
    }

    #[tokio::test]
    async fn manual_consumable_depleted_on_paired_codes() {
        let agent = xeroxbw_agent()
            .with(&supply(6, 40), "Fuser Kit")
            .with(&supply(9, 40), "-3")
            .with(&supply(8, 40), "-2");
        let (mut printer, _) = connect("xeroxbw", agent).await;
        printer.initialize_values().await;

        let fuser = printer.get_consumable(ConsumableKind::Fuser).unwrap();
        assert_eq!(fuser.name, Reading::Value("Fuser Kit".to_string()));
        assert_eq!(fuser.capacity, Reading::Value(1));
        assert_eq!(fuser.remaining, Reading::Value(0));
    }

    #[tokio::test]
    async fn manual_consumable_other_pairing_not_depleted() {
        let agent = xeroxbw_agent()
            .with(&supply(9, 40), "-2")
            .with(&supply(8, 40), "-3");
        let (mut printer, engine) = connect("xeroxbw", agent).await;
        printer.initialize_values().await;

        let fuser = printer.get_consumable(ConsumableKind::Fuser).unwrap();
        assert_eq!(fuser.remaining, Reading::Value(1));
        // capacity code is not read when the remaining code does not match
        assert!(!engine.calls().contains(&supply(8, 40)));
    }

    #[tokio::test]
    async fn manual_consumable_timeout_is_not_a_reading() {
        let agent = xeroxbw_agent()
            .with_error(&supply(6, 40), QueryError::Timeout)
            .with(&supply(9, 40), "-3")
            .with(&supply(8, 40), "-2");
        let (mut printer, engine) = connect("xeroxbw", agent).await;
        printer.initialize_values().await;

        let fuser = printer.get_consumable(ConsumableKind::Fuser).unwrap();
        assert_eq!(fuser.name, Reading::Timeout);
        assert_eq!(fuser.remaining, Reading::Timeout);
        assert_eq!(fuser.percentage(), None);
        // latched after the name query
        assert!(!engine.calls().contains(&supply(9, 40)));
    }

    #[tokio::test]
    async fn manual_consumable_failed_code_is_not_a_reading() {
        let agent = xeroxbw_agent()
            .with(&supply(6, 40), "Fuser Kit")
            .with(&supply(9, 40), "-3")
            .with_error(&supply(8, 40), QueryError::Transport("bad packet".into()));
        let (mut printer, _) = connect("xeroxbw", agent).await;
        printer.initialize_values().await;

        let fuser = printer.get_consumable(ConsumableKind::Fuser).unwrap();
        assert_eq!(fuser.remaining, Reading::Failed);
    }

    #[tokio::test]
    async fn manual_consumable_conflict_keeps_automatic_reading() {
        let engine = Arc::new(xeroxbw_agent());
        let mut bindings = CATALOG.resolve("xeroxbw");
        bindings.manual_consumables = vec![ConsumableKind::BlackToner];
        let mut printer = Printer::connect_with(
            identity(),
            SnmpTarget::new("10.0.0.5", "public"),
            bindings,
            engine.clone(),
        )
        .await;
        printer.initialize_values().await;

        let toners: Vec<&Consumable> = printer
            .consumables
            .iter()
            .filter(|c| c.kind == ConsumableKind::BlackToner)
            .collect();
        assert_eq!(toners.len(), 1);
        assert_eq!(toners[0].capacity, Reading::Value(3000));
    }

    #[tokio::test]
    async fn dicl_adds_copy_counters() {
        let agent = ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.1.0", "ineo 450")
            .with("1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.2", "100")
            .with("1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.1.2", "50")
            .with("1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.1", "20")
            .with("1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.1.1", "5");
        let (mut printer, _) = connect("dicl", agent).await;
        printer.initialize_values().await;

        assert_eq!(printer.print_color, Reading::Value(120));
        assert_eq!(printer.print_mono, Reading::Value(55));
    }

    #[tokio::test]
    async fn dicl_skips_copies_for_unknown_counters() {
        let agent = ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.1.0", "ineo 450")
            .with("1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.1", "20");
        let (mut printer, engine) = connect("dicl", agent).await;
        printer.initialize_values().await;

        assert!(!printer.print_color.is_known());
        assert!(!engine
            .calls()
            .contains(&"1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.1".to_string()));
    }

    #[tokio::test]
    async fn ping_timeout_latches_for_the_cycle() {
        let (mut printer, engine) = connect("xerox", ScriptedEngine::failing(QueryError::Timeout)).await;
        assert_eq!(printer.status, Status::Timeout);
        assert_eq!(engine.calls().len(), 1);

        printer.initialize_values().await;
        assert_eq!(engine.calls().len(), 1);
        assert_eq!(printer.name, Reading::Timeout);
        assert_eq!(printer.print_count, Reading::Timeout);
        assert!(printer.consumables.is_empty());
    }

    #[tokio::test]
    async fn ping_timeout_marks_fields_as_timed_out() {
        let (printer, _) = connect("xerox", ScriptedEngine::failing(QueryError::Timeout)).await;
        assert_eq!(printer.name, Reading::Timeout);
        assert_eq!(printer.model, Reading::Timeout);
        assert_eq!(printer.print_count, Reading::Timeout);
        assert_eq!(printer.print_color, Reading::Timeout);
        assert_eq!(printer.print_mono, Reading::Timeout);
    }

    #[tokio::test]
    async fn silent_ping_leaves_fields_unsupported() {
        let (printer, _) = connect("xerox", ScriptedEngine::default()).await;
        assert_eq!(printer.status, Status::Timeout);
        assert_eq!(printer.print_count, Reading::Unsupported);
    }

    #[tokio::test]
    async fn counter_sums_saturate() {
        let agent = ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.5.0", "office-printer")
            .with("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.33", &u64::MAX.to_string())
            .with("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.34", "5");
        let (mut printer, _) = connect("xerox", agent).await;
        printer.initialize_values().await;
        assert_eq!(printer.print_count, Reading::Value(u64::MAX));

        let agent = ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.1.0", "ineo 450")
            .with("1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.2", &u64::MAX.to_string())
            .with("1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.1", "20");
        let (mut printer, _) = connect("dicl", agent).await;
        printer.initialize_values().await;
        assert_eq!(printer.print_color, Reading::Value(u64::MAX));
    }

    #[tokio::test]
    async fn transport_errors_do_not_stop_the_read() {
        let (mut printer, engine) = connect(
            "xerox",
            ScriptedEngine::failing(QueryError::Transport("connection refused".into())),
        )
        .await;
        assert_eq!(printer.status, Status::Timeout);

        printer.initialize_values().await;
        assert!(engine.calls().len() > 1);
        assert_eq!(printer.model, Reading::Failed);
    }

    #[tokio::test]
    async fn empty_serial_uses_device_serial() {
        let agent = ScriptedEngine::default()
            .with("1.3.6.1.2.1.1.5.0", "office-printer")
            .with("1.3.6.1.2.1.43.5.1.1.17.1", "XRX-4711");
        let engine = Arc::new(agent);
        let mut printer = Printer::connect(
            Identity {
                serial: String::new(),
                ..identity()
            },
            SnmpTarget::new("10.0.0.5", "public"),
            "xerox",
            engine,
        )
        .await;
        printer.initialize_values().await;

        assert_eq!(printer.identity.serial, "XRX-4711");
    }

    #[tokio::test]
    async fn values_are_read_once_per_cycle() {
        let (mut printer, engine) = connect("xeroxbw", xeroxbw_agent()).await;
        printer.initialize_values().await;
        let after_first = engine.calls().len();
        printer.initialize_values().await;
        assert_eq!(engine.calls().len(), after_first);
    }
}
