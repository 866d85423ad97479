use super::reading::Reading;
use crate::catalog::{ConsumableKind, DepletionCodes};
use std::fmt;
use tracing::{debug, warn};

/// A supply with its capacity and fill level as read from the device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Consumable {
    pub kind: ConsumableKind,
    pub name: Reading<String>,
    pub capacity: Reading<u64>,
    pub remaining: Reading<u64>,
}

/// Outcome of the paired-code rule for manual consumables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Depletion {
    Depleted,
    NotDepleted,
}

impl Depletion {
    /// Applies the paired comparison. A missing or different code on either
    /// side counts as not depleted.
    pub fn from_codes(remaining: Option<i64>, capacity: Option<i64>, codes: &DepletionCodes) -> Self {
        if remaining == Some(codes.remaining) && capacity == Some(codes.capacity) {
            Depletion::Depleted
        } else {
            Depletion::NotDepleted
        }
    }

    fn remaining(self) -> u64 {
        match self {
            Depletion::Depleted => 0,
            Depletion::NotDepleted => MANUAL_CAPACITY,
        }
    }
}

/// Manual consumables only report presence, so capacity is fixed.
pub const MANUAL_CAPACITY: u64 = 1;

impl Consumable {
    pub fn new(
        kind: ConsumableKind,
        name: Reading<String>,
        capacity: Reading<String>,
        remaining: Reading<String>,
    ) -> Self {
        let consumable = Self {
            kind,
            name,
            capacity: capacity.to_count(),
            remaining: remaining.to_count(),
        };
        debug!("|--> {consumable}");
        if !consumable.is_initialized() {
            warn!("{kind} did not initialize properly");
        }
        consumable
    }

    pub fn manual(kind: ConsumableKind, name: Reading<String>, depletion: Reading<Depletion>) -> Self {
        let consumable = Self {
            kind,
            name,
            capacity: Reading::Value(MANUAL_CAPACITY),
            remaining: depletion.and_then(|d| Reading::Value(d.remaining())),
        };
        debug!("|--> {consumable} (manual)");
        consumable
    }

    /// Only consumables with a known capacity are reported.
    pub fn is_initialized(&self) -> bool {
        self.capacity.is_known()
    }

    /// Remaining supply in whole percent.
    ///
    /// Some firmware swaps capacity and level, which shows up as a ratio
    /// above one; that ratio is inverted before rounding.
    pub fn percentage(&self) -> Option<u8> {
        let capacity = *self.capacity.value()?;
        let remaining = *self.remaining.value()?;
        if capacity == 0 {
            return None;
        }

        let mut ratio = remaining as f64 / capacity as f64;
        if !(0.0..=1.0).contains(&ratio) {
            ratio = capacity as f64 / remaining as f64;
        }
        Some((ratio * 100.0).round() as u8)
    }
}

impl fmt::Display for Consumable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(capacity), Some(remaining), Some(percentage)) =
            (self.capacity.value(), self.remaining.value(), self.percentage())
        else {
            return write!(f, "[{}] - no data -", self.kind);
        };
        let name = self.name.value().map(String::as_str).unwrap_or("unnamed");
        write!(f, "[{}] {name} ({remaining}/{capacity}) {percentage}%", self.kind)
    }
}
