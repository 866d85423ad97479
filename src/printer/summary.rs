use super::{Printer, Reading};
use crate::catalog::ConsumableKind;
use std::fmt::Write;

const NOT_CONFIGURED: &str = "- not configured -";

/// Human readable report used by `--debug`.
pub fn render(printer: &Printer) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_summary(&mut out, printer);
    out
}

fn write_summary(out: &mut String, printer: &Printer) -> std::fmt::Result {
    writeln!(out, "########## Report for {} ##########", printer.identity.description)?;
    writeln!(out, "[i] Printer Overview")?;
    writeln!(out, " |-- Status: {}", printer.status)?;
    writeln!(out, " |-- Variant: {}", printer.bindings.variant)?;
    writeln!(out, " |-- Name: {}", text(&printer.name))?;
    writeln!(out, " |-- Model: {}", text(&printer.model))?;
    writeln!(out, " |-- IP address: {}", printer.target.address)?;
    writeln!(out, " |-- Serial number: {}", printer.identity.serial)?;
    writeln!(out, " |-- Client: {}", printer.identity.client)?;
    writeln!(out, " |-- Description: {}", printer.identity.description)?;

    writeln!(out, "[i] Printer statistics")?;
    writeln!(out, " |-- Mono: {}", count(&printer.print_mono))?;
    writeln!(out, " |-- Color: {}", count(&printer.print_color))?;
    writeln!(out, " |-- Total: {}", count(&printer.print_count))?;

    writeln!(out, "[i] Toner values (TONER)")?;
    for (tag, kind) in [
        ("C", ConsumableKind::CyanToner),
        ("M", ConsumableKind::MagentaToner),
        ("Y", ConsumableKind::YellowToner),
        ("K", ConsumableKind::BlackToner),
    ] {
        writeln!(out, " |-- [{tag}] {}", consumable(printer, kind))?;
    }

    writeln!(out, "[i] Drum values (DRUM)")?;
    for (tag, kind) in [
        ("C", ConsumableKind::CyanDrum),
        ("M", ConsumableKind::MagentaDrum),
        ("Y", ConsumableKind::YellowDrum),
        ("K", ConsumableKind::BlackDrum),
    ] {
        writeln!(out, " |-- [{tag}] {}", consumable(printer, kind))?;
    }

    writeln!(out, "[i] Misc")?;
    for kind in [
        ConsumableKind::Cleaner,
        ConsumableKind::Fuser,
        ConsumableKind::Waste,
        ConsumableKind::Transfer,
    ] {
        writeln!(out, " |-- {kind} {}", consumable(printer, kind))?;
    }
    Ok(())
}

fn consumable(printer: &Printer, kind: ConsumableKind) -> String {
    printer
        .get_consumable(kind)
        .map(|c| c.to_string())
        .unwrap_or_else(|| NOT_CONFIGURED.to_string())
}

fn text(reading: &Reading<String>) -> &str {
    match reading {
        Reading::Value(value) => value.as_str(),
        Reading::Unsupported => "-",
        Reading::Timeout => "(timeout)",
        Reading::Failed => "(error)",
    }
}

fn count(reading: &Reading<u64>) -> String {
    group_thousands(reading.value().copied().unwrap_or(0))
}

/// `1234567` -> `1,234,567`
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
