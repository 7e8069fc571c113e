//! Translation table from source-specific keys to canonical field names

use crate::model::Metric;
use std::collections::HashMap;

/// A canonical field a raw key can be renamed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    /// The period label, used as the merge and ordering key
    Quarter,
    /// One of the metric columns
    Metric(Metric),
}

impl CanonicalField {
    /// Canonical name as it appears in serialized records
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quarter => "quarter",
            Self::Metric(metric) => metric.key(),
        }
    }

    /// Field whose canonical name is `name`
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "quarter" {
            return Some(Self::Quarter);
        }
        Metric::ALL
            .into_iter()
            .find(|m| m.key() == name)
            .map(Self::Metric)
    }
}

/// Where a raw key ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    /// Renamed to a canonical field
    Canonical(CanonicalField),
    /// Renamed but kept as a pass-through column
    Rename(String),
}

/// Raw-key translation table
///
/// Canonical names always resolve to themselves, so an empty map is the
/// identity map and already-normalized rows pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    aliases: HashMap<String, FieldTarget>,
}

impl FieldMap {
    /// The identity map: only canonical names are recognised
    pub fn identity() -> Self {
        Self::default()
    }

    /// Map a raw key onto a canonical field
    pub fn alias(mut self, raw: impl Into<String>, field: CanonicalField) -> Self {
        self.aliases
            .insert(raw.into(), FieldTarget::Canonical(field));
        self
    }

    /// Map a raw key onto a metric
    pub fn metric(self, raw: impl Into<String>, metric: Metric) -> Self {
        self.alias(raw, CanonicalField::Metric(metric))
    }

    /// Map a raw key onto the period label
    pub fn period(self, raw: impl Into<String>) -> Self {
        self.alias(raw, CanonicalField::Quarter)
    }

    /// Rename a raw key without giving it canonical meaning
    pub fn rename(mut self, raw: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases
            .insert(raw.into(), FieldTarget::Rename(to.into()));
        self
    }

    /// Resolve a raw key; `None` means pass through unchanged
    pub fn resolve(&self, key: &str) -> Option<FieldTarget> {
        self.aliases
            .get(key)
            .cloned()
            .or_else(|| CanonicalField::from_name(key).map(FieldTarget::Canonical))
    }

    /// Number of explicit aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Yahoo Finance statement and earnings vocabulary
    ///
    /// "Earnings" on the legacy earnings tab is net income, yet it has always
    /// been shown as EPS; the mapping keeps that behaviour.
    pub fn yahoo() -> Self {
        Self::identity()
            .period("Quarter")
            .period("asOfDate")
            .metric("Total Revenue", Metric::Sales)
            .metric("Operating Income", Metric::OperatingProfit)
            .metric("Net Income", Metric::NetProfit)
            .metric("Diluted EPS", Metric::Eps)
            .metric("Earnings", Metric::Eps)
            .rename("Revenue", "Sales (Earnings Tab)")
    }

    /// Alpha Vantage `INCOME_STATEMENT` and `EARNINGS` vocabulary
    pub fn alpha_vantage() -> Self {
        Self::identity()
            .period("fiscalDateEnding")
            .metric("totalRevenue", Metric::Sales)
            .metric("operatingIncome", Metric::OperatingProfit)
            .metric("netIncome", Metric::NetProfit)
            .metric("reportedEPS", Metric::Eps)
    }

    /// Consolidated-results vocabulary ("Sales", "Operating Profit"), where
    /// operating profit is before depreciation and tax. A reported "OPM %"
    /// passes through; the canonical margin is always recomputed.
    pub fn consolidated_results() -> Self {
        Self::identity()
            .period("Quarter")
            .metric("Sales", Metric::Sales)
            .metric("Operating Profit", Metric::OperatingProfit)
            .metric("Net Profit", Metric::NetProfit)
            .metric("EPS in Rs", Metric::Eps)
    }
}
