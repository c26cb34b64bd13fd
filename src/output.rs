//! Output formatting for human and JSON modes
//!
//! Every API item can be rendered either as human-readable text or as
//! machine-parseable JSON. Human output colors candidate scores by band.

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::api::{CandidateItem, DonationItem, MatchItem, RequestItem};
use crate::core::models::ScoreBand;

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Something with a human-readable rendering
pub trait HumanReadable {
    /// Multi-line text for a terminal
    fn to_human(&self) -> String;
}

/// Format a value for the given mode
#[must_use]
pub fn format<T: Serialize + HumanReadable + ?Sized>(value: &T, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => value.to_human(),
        OutputMode::Json => serde_json::to_string_pretty(value).unwrap_or_default(),
    }
}

/// Print a value for the given mode
pub fn render<T: Serialize + HumanReadable + ?Sized>(value: &T, mode: OutputMode) {
    println!("{}", format(value, mode));
}

fn band_colored(score: u8) -> ColoredString {
    let text = format!("{score:>3}");
    match ScoreBand::of(score) {
        ScoreBand::Strong => text.green().bold(),
        ScoreBand::Moderate => text.yellow(),
        ScoreBand::Weak => text.red(),
    }
}

fn status_colored(status: &str) -> ColoredString {
    match status {
        "active" | "available" => status.green(),
        "fulfilled" | "reserved" | "completed" => status.blue(),
        "cancelled" | "consumed" => status.dimmed(),
        _ => status.normal(),
    }
}

fn resource_label(kind: &str, blood_type: Option<&str>, organ_type: Option<&str>) -> String {
    blood_type.or(organ_type).map_or_else(|| kind.to_string(), |t| format!("{kind} {t}"))
}

fn quantity_label(quantity: Option<u32>, unit: &str) -> String {
    quantity.map_or_else(String::new, |q| format!(", {q} {unit}"))
}

impl HumanReadable for RequestItem {
    fn to_human(&self) -> String {
        let mut out = format!(
            "#{} {} [{}] {} urgency{}\n    {}\n    at {} since {}",
            self.id,
            resource_label(&self.kind, self.blood_type.as_deref(), self.organ_type.as_deref()).bold(),
            status_colored(&self.status),
            self.urgency,
            quantity_label(self.quantity, &self.unit),
            self.medical_justification,
            self.location,
            self.created_at.format("%Y-%m-%d"),
        );
        if let Some(date) = self.required_by_date {
            out.push_str(&format!("\n    required by {date}"));
        }
        if let Some(extra) = &self.special_requirements {
            out.push_str(&format!("\n    requirements: {extra}"));
        }
        out
    }
}

impl HumanReadable for DonationItem {
    fn to_human(&self) -> String {
        let mut out = format!(
            "#{} {} [{}] {} urgency{}\n    at {} since {}",
            self.id,
            resource_label(&self.kind, self.blood_type.as_deref(), self.organ_type.as_deref()).bold(),
            status_colored(&self.status),
            self.urgency,
            quantity_label(self.quantity, &self.unit),
            self.location,
            self.created_at.format("%Y-%m-%d"),
        );
        if let Some(date) = self.available_until {
            out.push_str(&format!("\n    available until {date}"));
        }
        out
    }
}

impl HumanReadable for MatchItem {
    fn to_human(&self) -> String {
        format!(
            "match #{} [{}] donation #{} -> request #{} score {} {:.1} km",
            self.id,
            status_colored(&self.status),
            self.donation_id,
            self.request_id,
            band_colored(self.compatibility_score),
            self.distance,
        )
    }
}

impl HumanReadable for CandidateItem {
    fn to_human(&self) -> String {
        let donation = &self.donation;
        format!(
            "{} {} donation #{} {}{}\n      {} ({}) {:.1} km, {} urgency{}",
            band_colored(self.compatibility_score),
            self.band,
            self.donation_id,
            resource_label(&donation.kind, donation.blood_type.as_deref(), donation.organ_type.as_deref())
                .bold(),
            quantity_label(donation.quantity, &donation.unit),
            self.donor.name,
            self.donor.location,
            self.distance,
            donation.urgency,
            self.donor.phone.as_ref().map_or_else(String::new, |p| format!(", contact {p}")),
        )
    }
}

impl<T: HumanReadable> HumanReadable for [T] {
    fn to_human(&self) -> String {
        if self.is_empty() {
            return "Nothing to show.".to_string();
        }
        self.iter().map(HumanReadable::to_human).collect::<Vec<_>>().join("\n")
    }
}

impl<T: HumanReadable> HumanReadable for Vec<T> {
    fn to_human(&self) -> String {
        self.as_slice().to_human()
    }
}
