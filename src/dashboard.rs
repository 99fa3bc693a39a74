//! Read-only funding dashboard over a JSON list of representatives.
//!
//! Two files are understood: a flat list (`congress-data.json`) and a
//! state-name → list map (`politicians-by-state.json`). Both use the same record shape.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use studio_compose::amount::format_dollars;

use crate::error::{StudioError, StudioResult};

/// Shown when a record has no `yearsActive`.
pub const DEFAULT_YEARS_ACTIVE: &str = "1990-2024";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Representative {
    pub id: i64,
    pub name: String,
    /// `"D"`, `"R"`, anything else is treated as independent.
    pub party: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    /// Whole dollars.
    pub amount: u64,
    #[serde(default)]
    pub years_active: Option<String>,
    #[serde(default)]
    pub pacs: String,
}

impl Representative {
    pub fn years_active(&self) -> &str {
        self.years_active.as_deref().unwrap_or(DEFAULT_YEARS_ACTIVE)
    }

    pub fn is_senator(&self) -> bool {
        self.district.as_deref() == Some("SEN") || self.name.contains("Senator")
    }
}

/// Dashboard tabs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Category {
    #[default]
    All,
    Democrats,
    Republicans,
    Senate,
}

impl Category {
    pub fn matches(self, rep: &Representative) -> bool {
        match self {
            Category::All => true,
            Category::Democrats => rep.party == "D",
            Category::Republicans => rep.party == "R",
            Category::Senate => rep.is_senator(),
        }
    }
}

pub fn load_records(path: &Path) -> StudioResult<Vec<Representative>> {
    let text = std::fs::read_to_string(path).map_err(|e| StudioError::io("read records", e))?;
    Ok(serde_json::from_str(&text)?)
}

pub fn load_by_state(path: &Path) -> StudioResult<BTreeMap<String, Vec<Representative>>> {
    let text = std::fs::read_to_string(path).map_err(|e| StudioError::io("read state map", e))?;
    Ok(serde_json::from_str(&text)?)
}

/// Highest amount first; equal amounts keep their input order.
pub fn sorted_by_amount(records: &[Representative]) -> Vec<Representative> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
    sorted
}

pub fn filter(records: &[Representative], category: Category) -> Vec<Representative> {
    records.iter().filter(|r| category.matches(r)).cloned().collect()
}

/// Case-insensitive name substring match. An empty term matches everything.
pub fn search(records: &[Representative], term: &str) -> Vec<Representative> {
    let term = term.trim().to_lowercase();
    records
        .iter()
        .filter(|r| term.is_empty() || r.name.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// `(count, total dollars)`.
pub fn state_summary(records: &[Representative]) -> (usize, u64) {
    (records.len(), records.iter().map(|r| r.amount).sum())
}

/// `$1.2B`, `$5M`, `$3K`, `$999`.
pub fn format_compact(amount: u64) -> String {
    let value = amount as f64;
    if amount >= 1_000_000_000 {
        format!("${:.1}B", (value / 1e8).round() / 10.0)
    } else if amount >= 1_000_000 {
        format!("${}M", (value / 1e6).round() as u64)
    } else if amount >= 1_000 {
        format!("${}K", (value / 1e3).round() as u64)
    } else {
        format_dollars(amount)
    }
}

/// First letters of the first two words, upper-cased.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

pub fn party_name(code: &str) -> &'static str {
    match code {
        "D" => "Democrat",
        "R" => "Republican",
        _ => "Independent",
    }
}

/// Three-letter badge used in the state panel.
pub fn party_badge(code: &str) -> &'static str {
    match code {
        "D" => "DEM",
        "R" => "REP",
        _ => "IND",
    }
}
