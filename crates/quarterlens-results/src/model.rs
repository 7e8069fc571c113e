//! Canonical quarterly records and the ordered result set

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One of the five plotted metrics, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Sales,
    OperatingProfit,
    OperatingMarginPct,
    NetProfit,
    Eps,
}

impl Metric {
    /// Every metric, in the order the dashboard shows them
    pub const ALL: [Self; 5] = [
        Self::Sales,
        Self::OperatingProfit,
        Self::OperatingMarginPct,
        Self::NetProfit,
        Self::Eps,
    ];

    /// Column heading
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sales => "Sales",
            Self::OperatingProfit => "Operating Profit",
            Self::OperatingMarginPct => "OPM%",
            Self::NetProfit => "Net Profit",
            Self::Eps => "EPS",
        }
    }

    /// Canonical field name
    pub fn key(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::OperatingProfit => "operatingProfit",
            Self::OperatingMarginPct => "operatingMarginPct",
            Self::NetProfit => "netProfit",
            Self::Eps => "eps",
        }
    }

    /// Decimal places used when displaying the metric
    pub fn decimals(&self) -> usize {
        match self {
            Self::OperatingMarginPct | Self::Eps => 2,
            _ => 0,
        }
    }
}

/// One reporting period with canonical field names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyRecord {
    /// Period label as reported by the source
    pub quarter: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_profit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_profit: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,

    /// Derived: operating profit as a percentage of sales
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_margin_pct: Option<f64>,

    /// Raw fields the field map did not recognise, under their raw names
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl QuarterlyRecord {
    /// Create an empty record for a period
    pub fn new(quarter: impl Into<String>) -> Self {
        Self {
            quarter: quarter.into(),
            ..Default::default()
        }
    }

    /// Value of a metric, if present
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Sales => self.sales,
            Metric::OperatingProfit => self.operating_profit,
            Metric::OperatingMarginPct => self.operating_margin_pct,
            Metric::NetProfit => self.net_profit,
            Metric::Eps => self.eps,
        }
    }

    pub(crate) fn slot_mut(&mut self, metric: Metric) -> &mut Option<f64> {
        match metric {
            Metric::Sales => &mut self.sales,
            Metric::OperatingProfit => &mut self.operating_profit,
            Metric::OperatingMarginPct => &mut self.operating_margin_pct,
            Metric::NetProfit => &mut self.net_profit,
            Metric::Eps => &mut self.eps,
        }
    }

    /// Fill every absent field from `other`; present fields are kept
    pub(crate) fn absorb(&mut self, other: Self) {
        for metric in Metric::ALL {
            let slot = self.slot_mut(metric);
            if slot.is_none() {
                *slot = other.value(metric);
            }
        }
        for (key, value) in other.extra {
            self.extra.entry(key).or_insert(value);
        }
    }

    pub(crate) fn derive_margin(&mut self) {
        self.operating_margin_pct = operating_margin(self.operating_profit, self.sales);
    }

    /// Serialize back into a raw row under canonical names
    pub fn to_raw(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// `operating_profit / sales * 100`, absent when either input is absent or sales is zero
pub fn operating_margin(operating_profit: Option<f64>, sales: Option<f64>) -> Option<f64> {
    match (operating_profit, sales) {
        (Some(profit), Some(sales)) if sales != 0.0 => {
            Some(profit / sales * 100.0).filter(|m| m.is_finite())
        }
        _ => None,
    }
}

/// Chronologically ordered quarters, oldest first, no duplicate periods
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: Vec<QuarterlyRecord>,
}

impl ResultSet {
    pub(crate) fn from_ordered(records: Vec<QuarterlyRecord>) -> Self {
        Self { records }
    }

    /// An empty set means "no data available", not an error
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[QuarterlyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuarterlyRecord> {
        self.records.iter()
    }

    /// Period labels in order
    pub fn quarters(&self) -> Vec<String> {
        self.records.iter().map(|r| r.quarter.clone()).collect()
    }

    /// One metric across all periods; absent values stay `None`
    pub fn series(&self, metric: Metric) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.value(metric)).collect()
    }

    /// Whether any period carries the metric
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.records.iter().any(|r| r.value(metric).is_some())
    }

    /// Most recent period
    pub fn latest(&self) -> Option<&QuarterlyRecord> {
        self.records.last()
    }

    /// Rows in canonical raw form, suitable for feeding back into the normalizer
    pub fn to_raw_rows(&self) -> Vec<Value> {
        self.records.iter().map(QuarterlyRecord::to_raw).collect()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a QuarterlyRecord;
    type IntoIter = std::slice::Iter<'a, QuarterlyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
