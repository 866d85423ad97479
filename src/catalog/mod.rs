//! Printer model catalog.
//!
//! Every model is a diff against the generic printer binding set. Resolving a
//! variant name walks its `extends` chain and applies each diff in order, so
//! the result always carries a binding (OID or "not applicable") for every
//! [`Attribute`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use tracing::warn;
mod variants;
pub use variants::{CounterAdjustment, Override, VariantSpec, VARIANTS};

/// Name reported for printers that fall back to the generic binding set.
pub const BASE_VARIANT: &str = "printer";

/// prtMarkerSuppliesTable columns (RFC 3805).
const SUPPLY_DESCRIPTION: &str = "1.3.6.1.2.1.43.11.1.1.6.1";
const SUPPLY_MAX_CAPACITY: &str = "1.3.6.1.2.1.43.11.1.1.8.1";
const SUPPLY_LEVEL: &str = "1.3.6.1.2.1.43.11.1.1.9.1";

/// Process-wide catalog of built-in variants.
pub static CATALOG: Lazy<Catalog> = Lazy::new(Catalog::builtin);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsumableKind {
    Fuser,
    Cleaner,
    Transfer,
    Waste,
    BlackToner,
    CyanToner,
    MagentaToner,
    YellowToner,
    BlackDrum,
    CyanDrum,
    MagentaDrum,
    YellowDrum,
}

impl ConsumableKind {
    /// Read order of the automatic consumable pass.
    pub const ALL: [ConsumableKind; 12] = [
        ConsumableKind::Fuser,
        ConsumableKind::Cleaner,
        ConsumableKind::Transfer,
        ConsumableKind::Waste,
        ConsumableKind::BlackToner,
        ConsumableKind::CyanToner,
        ConsumableKind::MagentaToner,
        ConsumableKind::YellowToner,
        ConsumableKind::BlackDrum,
        ConsumableKind::CyanDrum,
        ConsumableKind::MagentaDrum,
        ConsumableKind::YellowDrum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumableKind::Fuser => "FUSER",
            ConsumableKind::Cleaner => "CLEANER",
            ConsumableKind::Transfer => "TRANSFER",
            ConsumableKind::Waste => "WASTE",
            ConsumableKind::BlackToner => "BLACK_TONER",
            ConsumableKind::CyanToner => "CYAN_TONER",
            ConsumableKind::MagentaToner => "MAGENTA_TONER",
            ConsumableKind::YellowToner => "YELLOW_TONER",
            ConsumableKind::BlackDrum => "BLACK_DRUM",
            ConsumableKind::CyanDrum => "CYAN_DRUM",
            ConsumableKind::MagentaDrum => "MAGENTA_DRUM",
            ConsumableKind::YellowDrum => "YELLOW_DRUM",
        }
    }

    /// Row of the generic printer's prtMarkerSuppliesTable for this kind.
    fn base_supply_index(&self) -> u32 {
        match self {
            ConsumableKind::BlackToner => 1,
            ConsumableKind::CyanToner => 2,
            ConsumableKind::MagentaToner => 3,
            ConsumableKind::YellowToner => 4,
            ConsumableKind::BlackDrum => 5,
            ConsumableKind::CyanDrum => 6,
            ConsumableKind::MagentaDrum => 7,
            ConsumableKind::YellowDrum => 8,
            ConsumableKind::Fuser => 9,
            ConsumableKind::Waste => 10,
            ConsumableKind::Cleaner => 11,
            ConsumableKind::Transfer => 12,
        }
    }
}

impl fmt::Display for ConsumableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SupplyField {
    Name,
    Capacity,
    Remaining,
}

impl SupplyField {
    pub const ALL: [SupplyField; 3] = [SupplyField::Name, SupplyField::Capacity, SupplyField::Remaining];

    fn supply_oid(&self, index: u32) -> String {
        let column = match self {
            SupplyField::Name => SUPPLY_DESCRIPTION,
            SupplyField::Capacity => SUPPLY_MAX_CAPACITY,
            SupplyField::Remaining => SUPPLY_LEVEL,
        };
        format!("{column}.{index}")
    }
}

/// Every logical value a variant can bind to an OID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    PrinterName,
    PrinterModel,
    PrinterMeta,
    PrinterSerial,
    PrintCount,
    PrintColor,
    PrintMono,
    CopiesColor,
    CopiesMono,
    Consumable(ConsumableKind, SupplyField),
}

impl Attribute {
    #[cfg(test)]
    pub fn all() -> Vec<Attribute> {
        let mut all = vec![
            Attribute::PrinterName,
            Attribute::PrinterModel,
            Attribute::PrinterMeta,
            Attribute::PrinterSerial,
            Attribute::PrintCount,
            Attribute::PrintColor,
            Attribute::PrintMono,
            Attribute::CopiesColor,
            Attribute::CopiesMono,
        ];
        for kind in ConsumableKind::ALL {
            for field in SupplyField::ALL {
                all.push(Attribute::Consumable(kind, field));
            }
        }
        all
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::PrinterName => f.write_str("printer_name"),
            Attribute::PrinterModel => f.write_str("printer_model"),
            Attribute::PrinterMeta => f.write_str("printer_meta"),
            Attribute::PrinterSerial => f.write_str("printer_serial"),
            Attribute::PrintCount => f.write_str("print_count"),
            Attribute::PrintColor => f.write_str("print_color"),
            Attribute::PrintMono => f.write_str("print_mono"),
            Attribute::CopiesColor => f.write_str("copies_color"),
            Attribute::CopiesMono => f.write_str("copies_mono"),
            Attribute::Consumable(kind, field) => {
                let field = match field {
                    SupplyField::Name => "name",
                    SupplyField::Capacity => "capacity",
                    SupplyField::Remaining => "remaining",
                };
                write!(f, "{}_{field}", kind.as_str().to_lowercase())
            }
        }
    }
}

/// Status codes that, read together from a manual consumable's remaining and
/// capacity OIDs, mark it as depleted. Neither code means anything alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepletionCodes {
    pub remaining: i64,
    pub capacity: i64,
}

impl Default for DepletionCodes {
    fn default() -> Self {
        Self {
            remaining: -3,
            capacity: -2,
        }
    }
}

/// Fully resolved OID bindings for one variant.
#[derive(Clone, Debug)]
pub struct BindingSet {
    pub variant: String,
    bindings: HashMap<Attribute, Option<String>>,
    manual: HashMap<(ConsumableKind, SupplyField), String>,
    pub manual_consumables: Vec<ConsumableKind>,
    pub counter_adjustment: Option<CounterAdjustment>,
    pub depletion_codes: DepletionCodes,
}

impl BindingSet {
    /// The generic printer: standard Printer-MIB supplies plus Xerox usage counters.
    pub fn base() -> Self {
        let mut bindings: HashMap<Attribute, Option<String>> = HashMap::new();
        let mut bind = |attribute: Attribute, oid: Option<&str>| {
            bindings.insert(attribute, oid.map(str::to_string));
        };

        bind(Attribute::PrinterName, Some("1.3.6.1.2.1.1.5.0"));
        bind(Attribute::PrinterModel, Some("1.3.6.1.2.1.25.3.2.1.3.1"));
        bind(Attribute::PrinterMeta, Some("1.3.6.1.2.1.1.1.0"));
        bind(Attribute::PrinterSerial, Some("1.3.6.1.2.1.43.5.1.1.17.1"));
        bind(Attribute::PrintCount, Some("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.1"));
        bind(Attribute::PrintColor, Some("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.33"));
        bind(Attribute::PrintMono, Some("1.3.6.1.4.1.253.8.53.13.2.1.6.1.20.34"));
        bind(Attribute::CopiesColor, None);
        bind(Attribute::CopiesMono, None);

        let mut base = Self {
            variant: BASE_VARIANT.to_string(),
            bindings,
            manual: HashMap::new(),
            manual_consumables: Vec::new(),
            counter_adjustment: None,
            depletion_codes: DepletionCodes::default(),
        };
        for kind in ConsumableKind::ALL {
            base.bind_supply(kind, kind.base_supply_index());
        }
        base
    }

    /// OID bound to `attribute`, or `None` when the variant marks it not applicable.
    pub fn oid(&self, attribute: Attribute) -> Option<&str> {
        self.bindings.get(&attribute).and_then(|oid| oid.as_deref())
    }

    /// Whether the automatic consumable pass should read `kind` at all.
    pub fn exposes(&self, kind: ConsumableKind) -> bool {
        self.oid(Attribute::Consumable(kind, SupplyField::Capacity)).is_some()
    }

    /// Alternate OID consulted only by the manual consumable derivation.
    pub fn manual_oid(&self, kind: ConsumableKind, field: SupplyField) -> Option<&str> {
        self.manual.get(&(kind, field)).map(String::as_str)
    }

    fn bind_supply(&mut self, kind: ConsumableKind, index: u32) {
        for field in SupplyField::ALL {
            self.bindings
                .insert(Attribute::Consumable(kind, field), Some(field.supply_oid(index)));
        }
    }

    fn apply(&mut self, spec: &VariantSpec) {
        for rule in spec.overrides {
            match *rule {
                Override::Set(attribute, oid) => {
                    self.bindings.insert(attribute, Some(oid.to_string()));
                }
                Override::Null(attribute) => {
                    self.bindings.insert(attribute, None);
                }
                Override::Supply(kind, index) => self.bind_supply(kind, index),
                Override::Suppress(kind) => {
                    for field in SupplyField::ALL {
                        self.bindings.insert(Attribute::Consumable(kind, field), None);
                    }
                }
                Override::Manual(kind, index) => {
                    for field in SupplyField::ALL {
                        self.manual.insert((kind, field), field.supply_oid(index));
                    }
                }
            }
        }
        if let Some(kinds) = spec.manual_consumables {
            self.manual_consumables = kinds.to_vec();
        }
        if spec.counter_adjustment.is_some() {
            self.counter_adjustment = spec.counter_adjustment;
        }
        if let Some(codes) = spec.depletion_codes {
            self.depletion_codes = codes;
        }
        self.variant = spec.name.to_string();
    }
}

/// Lookup table from lower-case variant name to its diff.
pub struct Catalog {
    variants: HashMap<String, &'static VariantSpec>,
}

impl Catalog {
    pub fn builtin() -> Self {
        Self::from_specs(VARIANTS)
    }

    pub fn from_specs(specs: &'static [VariantSpec]) -> Self {
        let variants = specs
            .iter()
            .map(|spec| (spec.name.to_lowercase(), spec))
            .collect();
        Self { variants }
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.variants.values().map(|spec| spec.name).collect();
        names.sort_unstable();
        names
    }

    /// Resolves `name` case-insensitively. Unknown names degrade to the
    /// generic printer with a warning.
    pub fn resolve(&self, name: &str) -> BindingSet {
        match self.lookup(name) {
            Some(bindings) => bindings,
            None => {
                warn!(
                    "Unknown printer variant \"{name}\", falling back to generic printer. Known variants: {}",
                    self.names().join(", ")
                );
                BindingSet::base()
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<BindingSet> {
        let spec = self.variants.get(&name.trim().to_lowercase())?;

        // Walk up the extends chain, then apply from the root down.
        let mut chain = vec![*spec];
        let mut current = *spec;
        while let Some(parent) = current.extends {
            match self.variants.get(&parent.to_lowercase()) {
                Some(parent) if !chain.iter().any(|seen| seen.name == parent.name) => {
                    chain.push(*parent);
                    current = *parent;
                }
                Some(_) => {
                    warn!("Variant \"{}\" has a cyclic extends chain", spec.name);
                    break;
                }
                None => {
                    warn!("Variant \"{}\" extends unknown variant \"{parent}\"", current.name);
                    break;
                }
            }
        }

        let mut bindings = BindingSet::base();
        for spec in chain.iter().rev() {
            bindings.apply(spec);
        }
        bindings.variant = spec.name.to_string();
        Some(bindings)
    }
}
