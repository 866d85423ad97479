use super::{Attribute, ConsumableKind, DepletionCodes};
use super::ConsumableKind::*;

const SYS_DESCR: &str = "1.3.6.1.2.1.1.1.0";
const PRT_MARKER_LIFE_COUNT: &str = "1.3.6.1.2.1.43.10.2.1.4.1.1";
const HP_PRINTER_NAME: &str = "1.3.6.1.2.1.43.5.1.1.16.1";
const HP_TOTAL_COUNT: &str = "1.3.6.1.4.1.11.2.3.9.4.2.1.1.16.1.9.0";
const HP_COLOR_COUNT: &str = "1.3.6.1.4.1.11.2.3.9.4.2.1.1.16.1.10.0";
const HP_MONO_COUNT: &str = "1.3.6.1.4.1.11.2.3.9.4.2.1.1.16.1.11.0";
const KYOCERA_TOTAL_COUNT: &str = "1.3.6.1.4.1.1347.42.2.1.1.1.6.1.1";

/// One change applied on top of the inherited bindings.
#[derive(Clone, Copy, Debug)]
pub enum Override {
    Set(Attribute, &'static str),
    /// Marks the attribute not applicable; it is never queried.
    Null(Attribute),
    /// Points a consumable's name/capacity/remaining at another supplies row.
    Supply(ConsumableKind, u32),
    /// Marks all three OIDs of a consumable not applicable.
    Suppress(ConsumableKind),
    /// Supplies row read only by the manual consumable derivation.
    Manual(ConsumableKind, u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterAdjustment {
    /// Adds the copier counters into the print counters.
    AddCopies,
}

#[derive(Debug)]
pub struct VariantSpec {
    pub name: &'static str,
    pub extends: Option<&'static str>,
    pub overrides: &'static [Override],
    /// Replaces the inherited list when set.
    pub manual_consumables: Option<&'static [ConsumableKind]>,
    pub counter_adjustment: Option<CounterAdjustment>,
    pub depletion_codes: Option<DepletionCodes>,
}

impl VariantSpec {
    pub const EMPTY: VariantSpec = VariantSpec {
        name: "",
        extends: None,
        overrides: &[],
        manual_consumables: None,
        counter_adjustment: None,
        depletion_codes: None,
    };
}

pub static VARIANTS: &[VariantSpec] = &[
    // Reference Xerox, identical to the generic printer
    VariantSpec {
        name: "xerox",
        ..VariantSpec::EMPTY
    },
    // AltaLink C8130
    VariantSpec {
        name: "xeroxc8130",
        overrides: &[
            Override::Supply(Waste, 9),
            Override::Supply(Cleaner, 10),
            Override::Supply(Transfer, 11),
        ],
        ..VariantSpec::EMPTY
    },
    // Monochrome Xerox
    VariantSpec {
        name: "xeroxbw",
        overrides: &[
            Override::Set(Attribute::PrinterName, SYS_DESCR),
            Override::Suppress(Fuser),
            Override::Manual(Fuser, 40),
            Override::Supply(BlackDrum, 6),
            Override::Suppress(Waste),
            Override::Suppress(Cleaner),
            Override::Suppress(Transfer),
            Override::Suppress(CyanToner),
            Override::Suppress(MagentaToner),
            Override::Suppress(YellowToner),
            Override::Suppress(CyanDrum),
            Override::Suppress(MagentaDrum),
            Override::Suppress(YellowDrum),
        ],
        manual_consumables: Some(&[Fuser]),
        ..VariantSpec::EMPTY
    },
    // WorkCentre 3225
    VariantSpec {
        name: "xeroxwc3225",
        overrides: &[Override::Supply(BlackDrum, 2), Override::Supply(CyanToner, 5)],
        ..VariantSpec::EMPTY
    },
    // VersaLink B400 / B405, maintenance kit on the fuser row
    VariantSpec {
        name: "xeroxvlb405",
        extends: Some("xeroxbw"),
        overrides: &[Override::Manual(Cleaner, 40)],
        manual_consumables: Some(&[Cleaner]),
        ..VariantSpec::EMPTY
    },
    // VersaLink C405
    VariantSpec {
        name: "xeroxvlc405",
        overrides: &[
            Override::Supply(CyanToner, 4),
            Override::Supply(YellowToner, 2),
            Override::Suppress(Fuser),
            Override::Manual(Fuser, 12),
            Override::Suppress(Waste),
            Override::Manual(Waste, 5),
            Override::Suppress(Cleaner),
            Override::Manual(Cleaner, 39),
            Override::Suppress(Transfer),
            Override::Supply(BlackDrum, 41),
            Override::Suppress(CyanDrum),
            Override::Suppress(MagentaDrum),
            Override::Suppress(YellowDrum),
        ],
        manual_consumables: Some(&[Fuser, Cleaner, Waste]),
        ..VariantSpec::EMPTY
    },
    // VersaLink C505S, feed roller reported as transfer
    VariantSpec {
        name: "xeroxvlc505s",
        extends: Some("xeroxvlc405"),
        overrides: &[
            Override::Manual(Transfer, 18),
            Override::Supply(BlackDrum, 6),
            Override::Supply(YellowDrum, 7),
            Override::Supply(MagentaDrum, 8),
            Override::Supply(CyanDrum, 9),
        ],
        manual_consumables: Some(&[Fuser, Cleaner, Waste, Transfer]),
        ..VariantSpec::EMPTY
    },
    // Phaser 7760
    VariantSpec {
        name: "xeroxphaser",
        overrides: &[
            Override::Supply(Fuser, 6),
            Override::Supply(Waste, 7),
            Override::Supply(Cleaner, 13),
            Override::Supply(Transfer, 5),
            Override::Supply(CyanToner, 1),
            Override::Supply(MagentaToner, 2),
            Override::Supply(YellowToner, 3),
            Override::Supply(BlackToner, 4),
            Override::Supply(BlackDrum, 11),
            Override::Supply(CyanDrum, 8),
            Override::Supply(MagentaDrum, 9),
            Override::Supply(YellowDrum, 10),
        ],
        ..VariantSpec::EMPTY
    },
    // LaserJet Color
    VariantSpec {
        name: "hp",
        overrides: &[
            Override::Set(Attribute::PrinterName, HP_PRINTER_NAME),
            Override::Set(Attribute::PrintCount, HP_TOTAL_COUNT),
            Override::Set(Attribute::PrintColor, HP_COLOR_COUNT),
            Override::Set(Attribute::PrintMono, HP_MONO_COUNT),
        ],
        ..VariantSpec::EMPTY
    },
    // Monochrome LaserJet
    VariantSpec {
        name: "hpbw",
        overrides: &[
            Override::Set(Attribute::PrintCount, HP_TOTAL_COUNT),
            Override::Null(Attribute::PrintColor),
            Override::Supply(Fuser, 2),
            Override::Suppress(CyanToner),
            Override::Suppress(MagentaToner),
            Override::Suppress(YellowToner),
            Override::Suppress(BlackDrum),
            Override::Suppress(CyanDrum),
            Override::Suppress(MagentaDrum),
            Override::Suppress(YellowDrum),
        ],
        ..VariantSpec::EMPTY
    },
    VariantSpec {
        name: "hpmfp",
        extends: Some("hp"),
        overrides: &[
            Override::Set(Attribute::PrintCount, PRT_MARKER_LIFE_COUNT),
            Override::Set(Attribute::PrintMono, PRT_MARKER_LIFE_COUNT),
        ],
        ..VariantSpec::EMPTY
    },
    // LaserJet MFP M426, toner only
    VariantSpec {
        name: "hpm426",
        extends: Some("hp"),
        overrides: &[
            Override::Set(Attribute::PrintCount, PRT_MARKER_LIFE_COUNT),
            Override::Null(Attribute::PrintColor),
            Override::Set(Attribute::PrintMono, PRT_MARKER_LIFE_COUNT),
            Override::Suppress(Fuser),
            Override::Suppress(Waste),
            Override::Suppress(Cleaner),
            Override::Suppress(Transfer),
            Override::Suppress(CyanToner),
            Override::Suppress(MagentaToner),
            Override::Suppress(YellowToner),
            Override::Suppress(BlackDrum),
            Override::Suppress(CyanDrum),
            Override::Suppress(MagentaDrum),
            Override::Suppress(YellowDrum),
        ],
        ..VariantSpec::EMPTY
    },
    // LaserJet M725, the cleaner row holds the maintenance kit
    VariantSpec {
        name: "hpm725bw",
        extends: Some("hpbw"),
        overrides: &[Override::Suppress(Cleaner)],
        ..VariantSpec::EMPTY
    },
    // Kyocera monochrome
    VariantSpec {
        name: "kcsw",
        overrides: &[
            Override::Set(Attribute::PrintCount, KYOCERA_TOTAL_COUNT),
            Override::Set(Attribute::PrintMono, KYOCERA_TOTAL_COUNT),
            Override::Null(Attribute::PrintColor),
            Override::Suppress(CyanToner),
            Override::Suppress(MagentaToner),
            Override::Suppress(YellowToner),
            Override::Suppress(BlackDrum),
            Override::Suppress(CyanDrum),
            Override::Suppress(MagentaDrum),
            Override::Suppress(YellowDrum),
            Override::Suppress(Cleaner),
        ],
        ..VariantSpec::EMPTY
    },
    // Develop ineo 450 and equivalent Konica Minolta devices
    VariantSpec {
        name: "dicl",
        overrides: &[
            Override::Set(Attribute::PrinterName, SYS_DESCR),
            Override::Set(Attribute::PrintCount, PRT_MARKER_LIFE_COUNT),
            Override::Set(Attribute::PrintColor, "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.2"),
            Override::Set(Attribute::PrintMono, "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.1.2"),
            Override::Set(Attribute::CopiesColor, "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.2.1"),
            Override::Set(Attribute::CopiesMono, "1.3.6.1.4.1.18334.1.1.1.5.7.2.2.1.5.1.1"),
            Override::Suppress(Waste),
            Override::Manual(Waste, 13),
            Override::Supply(Cleaner, 16),
            Override::Supply(Fuser, 14),
            Override::Supply(Transfer, 15),
            Override::Supply(BlackToner, 4),
            Override::Supply(CyanToner, 1),
            Override::Supply(MagentaToner, 2),
            Override::Supply(YellowToner, 3),
            Override::Supply(BlackDrum, 11),
            Override::Supply(CyanDrum, 5),
            Override::Supply(MagentaDrum, 7),
            Override::Supply(YellowDrum, 9),
        ],
        manual_consumables: Some(&[Waste]),
        counter_adjustment: Some(CounterAdjustment::AddCopies),
        ..VariantSpec::EMPTY
    },
    VariantSpec {
        name: "oki",
        overrides: &[
            Override::Set(Attribute::PrintCount, "1.3.6.1.4.1.2001.1.1.1.1.11.1.10.150.1.6.102"),
            Override::Set(Attribute::PrintColor, "1.3.6.1.4.1.2001.1.1.1.1.11.1.10.170.1.6.1"),
            Override::Set(Attribute::PrintMono, "1.3.6.1.4.1.2001.1.1.1.1.11.1.10.170.1.7.1"),
            Override::Supply(Fuser, 10),
            // transfer belt sits on the waste row
            Override::Supply(Transfer, 9),
            Override::Suppress(Waste),
            Override::Suppress(Cleaner),
        ],
        ..VariantSpec::EMPTY
    },
    VariantSpec {
        name: "okic911",
        overrides: &[
            Override::Supply(Waste, 11),
            Override::Supply(Fuser, 10),
            Override::Supply(Transfer, 9),
            Override::Suppress(Cleaner),
        ],
        ..VariantSpec::EMPTY
    },
];
