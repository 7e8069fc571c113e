//! Raw quarterly rows to a canonical [`ResultSet`]
//!
//! Rows from one or more sources are renamed through a [`FieldMap`],
//! outer-merged on their period key, ordered oldest first, truncated to the
//! most recent quarters and given a derived operating margin.

mod field_map;
mod period;
mod value;

pub use field_map::{CanonicalField, FieldMap, FieldTarget};
pub use period::PeriodKey;
pub use value::{coerce_number, period_label};

use crate::model::{Metric, QuarterlyRecord, ResultSet};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, warn};

/// Number of quarters kept by default
pub const DEFAULT_MAX_QUARTERS: usize = 10;

/// Normalizes raw per-quarter rows
#[derive(Debug, Clone)]
pub struct ResultNormalizer {
    field_map: FieldMap,
    max_quarters: usize,
}

impl ResultNormalizer {
    pub fn new(field_map: FieldMap) -> Self {
        Self {
            field_map,
            max_quarters: DEFAULT_MAX_QUARTERS,
        }
    }

    /// Keep at most `max_quarters` of the most recent periods
    pub fn with_max_quarters(mut self, max_quarters: usize) -> Self {
        self.max_quarters = max_quarters;
        self
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    pub fn max_quarters(&self) -> usize {
        self.max_quarters
    }

    /// Normalize and outer-merge any number of raw sources
    ///
    /// Earlier sources win when two sources report the same field for the
    /// same period; fields missing from one are filled from the other. Rows
    /// that are not objects or carry no period label are skipped.
    pub fn normalize<'a, I>(&self, sources: I) -> ResultSet
    where
        I: IntoIterator<Item = &'a [Value]>,
    {
        let mut merged: BTreeMap<PeriodKey, QuarterlyRecord> = BTreeMap::new();

        for (source, rows) in sources.into_iter().enumerate() {
            for (index, row) in rows.iter().enumerate() {
                let Some(record) = self.map_row(row) else {
                    warn!(source, index, "Skipping malformed quarterly row");
                    continue;
                };
                match merged.entry(PeriodKey::parse(&record.quarter)) {
                    Entry::Occupied(mut existing) => existing.get_mut().absorb(record),
                    Entry::Vacant(slot) => {
                        slot.insert(record);
                    }
                }
            }
        }

        let skip = merged.len().saturating_sub(self.max_quarters);
        debug!(periods = merged.len(), kept = merged.len() - skip, "Merged quarterly rows");

        let records = merged
            .into_values()
            .skip(skip)
            .map(|mut record| {
                record.derive_margin();
                record
            })
            .collect();
        ResultSet::from_ordered(records)
    }

    fn map_row(&self, row: &Value) -> Option<QuarterlyRecord> {
        let Value::Object(fields) = row else {
            return None;
        };

        let mut quarter = None;
        let mut record = QuarterlyRecord::default();

        for (key, value) in fields {
            match self.field_map.resolve(key) {
                Some(FieldTarget::Canonical(CanonicalField::Quarter)) => {
                    if quarter.is_none() {
                        quarter = period_label(value);
                    } else {
                        debug!(key = key.as_str(), "Dropping duplicate period field");
                    }
                }
                // Always derived from sales and operating profit
                Some(FieldTarget::Canonical(CanonicalField::Metric(
                    Metric::OperatingMarginPct,
                ))) => {}
                Some(FieldTarget::Canonical(CanonicalField::Metric(metric))) => {
                    let slot = record.slot_mut(metric);
                    if slot.is_none() {
                        *slot = coerce_number(value);
                    } else {
                        debug!(
                            key = key.as_str(),
                            field = metric.key(),
                            "Dropping duplicate metric field"
                        );
                    }
                }
                // A pass-through column must never shadow a canonical field
                Some(FieldTarget::Rename(name)) if CanonicalField::from_name(&name).is_some() => {
                    debug!(
                        key = key.as_str(),
                        to = name.as_str(),
                        "Ignoring rename onto a canonical name"
                    );
                }
                Some(FieldTarget::Rename(name)) => {
                    record.extra.entry(name).or_insert_with(|| value.clone());
                }
                None => {
                    record
                        .extra
                        .entry(key.clone())
                        .or_insert_with(|| value.clone());
                }
            }
        }

        record.quarter = quarter?;
        Some(record)
    }
}

impl Default for ResultNormalizer {
    fn default() -> Self {
        Self::new(FieldMap::identity())
    }
}

/// Normalize a single raw source
pub fn normalize(raw: &[Value], field_map: &FieldMap) -> ResultSet {
    ResultNormalizer::new(field_map.clone()).normalize([raw])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn yahoo_rows() -> Vec<Value> {
        vec![
            json!({"quarter": "Q1", "Total Revenue": 100, "Operating Income": 20}),
            json!({"quarter": "Q2", "Total Revenue": 200, "Operating Income": 50}),
        ]
    }

    #[test]
    fn test_margin_scenario() {
        let results = normalize(&yahoo_rows(), &FieldMap::yahoo());

        assert_eq!(results.quarters(), ["Q1", "Q2"]);
        let q1 = &results.records()[0];
        assert_eq!(q1.sales, Some(100.0));
        assert_eq!(q1.operating_profit, Some(20.0));
        assert_eq!(q1.operating_margin_pct, Some(20.0));
        let q2 = &results.records()[1];
        assert_eq!(q2.sales, Some(200.0));
        assert_eq!(q2.operating_profit, Some(50.0));
        assert_eq!(q2.operating_margin_pct, Some(25.0));
    }

    #[test]
    fn test_empty_input() {
        let results = normalize(&[], &FieldMap::yahoo());
        assert!(results.is_empty());
        assert_eq!(results.len(), 0);
    }

    #[test]
    fn test_zero_sales_leaves_margin_absent() {
        let rows = vec![json!({"quarter": "Q1", "sales": 0, "operatingProfit": 10})];
        let results = normalize(&rows, &FieldMap::identity());
        assert_eq!(results.records()[0].operating_margin_pct, None);
        assert_eq!(results.records()[0].operating_profit, Some(10.0));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let rows = vec![
            json!(42),
            json!("Q1"),
            json!(["Q1", 100]),
            Value::Null,
            json!({"Total Revenue": 100}),
            json!({"quarter": null, "Total Revenue": 100}),
            json!({"quarter": "Q3", "Total Revenue": "n/a"}),
        ];
        let results = normalize(&rows, &FieldMap::yahoo());
        assert_eq!(results.quarters(), ["Q3"]);
        assert_eq!(results.records()[0].sales, None);
    }

    #[test]
    fn test_outer_merge_of_two_sources() {
        let financials = vec![
            json!({"asOfDate": "2024-03-31", "Total Revenue": 100, "Net Income": 9}),
            json!({"asOfDate": "2024-06-30", "Total Revenue": 120, "Net Income": 11}),
        ];
        let earnings = vec![
            json!({"asOfDate": "2024-06-30", "Diluted EPS": 1.1, "Net Income": 99}),
            json!({"asOfDate": "2024-09-30", "Diluted EPS": 1.3}),
        ];

        let normalizer = ResultNormalizer::new(FieldMap::yahoo());
        let results = normalizer.normalize([financials.as_slice(), earnings.as_slice()]);

        assert_eq!(results.quarters(), ["2024-03-31", "2024-06-30", "2024-09-30"]);
        let q2 = &results.records()[1];
        assert_eq!(q2.sales, Some(120.0));
        assert_eq!(q2.net_profit, Some(11.0));
        assert_eq!(q2.eps, Some(1.1));
        let q3 = &results.records()[2];
        assert_eq!(q3.sales, None);
        assert_eq!(q3.eps, Some(1.3));
        assert_eq!(results.records()[0].eps, None);
    }

    #[test]
    fn test_mixed_period_formats_merge() {
        let financials = vec![json!({"Quarter": "Q1 2024", "Total Revenue": 100})];
        let earnings = vec![json!({"Quarter": "2024-03-31", "Earnings": 3})];
        let results = ResultNormalizer::new(FieldMap::yahoo())
            .normalize([financials.as_slice(), earnings.as_slice()]);

        assert_eq!(results.len(), 1);
        assert_eq!(results.records()[0].quarter, "Q1 2024");
        assert_eq!(results.records()[0].eps, Some(3.0));
    }

    #[test]
    fn test_truncates_to_most_recent() {
        let rows: Vec<Value> = (0..15)
            .rev()
            .map(|i| json!({"quarter": format!("{}Q{}", 2020 + i / 4, i % 4 + 1), "sales": i}))
            .collect();
        let results = normalize(&rows, &FieldMap::identity());

        assert_eq!(results.len(), 10);
        assert_eq!(results.records()[0].quarter, "2021Q2");
        assert_eq!(results.latest().map(|r| r.quarter.as_str()), Some("2023Q3"));
        let sales: Vec<_> = results.series(Metric::Sales).into_iter().flatten().collect();
        assert_eq!(sales, (5..15).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_custom_quarter_limit() {
        let results = ResultNormalizer::new(FieldMap::yahoo())
            .with_max_quarters(1)
            .normalize([yahoo_rows().as_slice()]);
        assert_eq!(results.quarters(), ["Q2"]);
    }

    #[test]
    fn test_unrecognized_keys_pass_through() {
        let rows = vec![json!({
            "Quarter": "2024-03-31",
            "Revenue": 500,
            "Basic EPS": 2.5,
            "currencyCode": "INR",
            "OPM %": "18%",
        })];
        let results = normalize(&rows, &FieldMap::yahoo());
        let record = &results.records()[0];

        assert_eq!(record.extra["Sales (Earnings Tab)"], json!(500));
        assert_eq!(record.extra["Basic EPS"], json!(2.5));
        assert_eq!(record.extra["currencyCode"], json!("INR"));
        assert_eq!(record.extra["OPM %"], json!("18%"));
        assert_eq!(record.sales, None);
        assert_eq!(record.operating_margin_pct, None);
    }

    #[test]
    fn test_reported_margin_is_recomputed() {
        let rows = vec![json!({
            "quarter": "Q1",
            "sales": 200,
            "operatingProfit": 30,
            "operatingMarginPct": 99.0,
        })];
        let results = normalize(&rows, &FieldMap::identity());
        assert_eq!(results.records()[0].operating_margin_pct, Some(15.0));
    }

    #[test]
    fn test_alpha_vantage_strings() {
        let rows = vec![json!({
            "fiscalDateEnding": "2024-03-31",
            "totalRevenue": "14462000000",
            "operatingIncome": "2171000000",
            "netIncome": "1605000000",
            "reportedCurrency": "USD",
        })];
        let results = normalize(&rows, &FieldMap::alpha_vantage());
        let record = &results.records()[0];
        assert_eq!(record.sales, Some(14_462_000_000.0));
        assert_eq!(record.net_profit, Some(1_605_000_000.0));
        let margin = record.operating_margin_pct.unwrap();
        assert!((margin - 15.011_754_9).abs() < 1e-6);
    }

    #[test]
    fn test_second_pass_is_identity() {
        let first = normalize(&yahoo_rows(), &FieldMap::yahoo());
        let second = normalize(&first.to_raw_rows(), &FieldMap::identity());
        assert_eq!(first, second);
    }

    #[test]
    fn test_colliding_keys_keep_first_value() {
        let rows = vec![json!({"Quarter": "Q1", "quarter": "Q9", "Total Revenue": 100, "sales": 5})];
        let first = normalize(&rows, &FieldMap::yahoo());
        let record = &first.records()[0];

        assert_eq!(record.quarter, "Q1");
        assert_eq!(record.sales, Some(100.0));
        assert!(record.extra.is_empty());

        let text = serde_json::to_string(&first).unwrap();
        assert_eq!(text, r#"[{"quarter":"Q1","sales":100.0}]"#);

        let second = normalize(&first.to_raw_rows(), &FieldMap::identity());
        assert_eq!(first, second);
    }

    #[test]
    fn test_rename_onto_canonical_name_is_ignored() {
        let map = FieldMap::identity().rename("Revenue", "sales");
        let rows = vec![json!({"quarter": "Q1", "Revenue": 7, "Other": 1})];
        let results = normalize(&rows, &map);
        let record = &results.records()[0];

        assert_eq!(record.sales, None);
        assert!(!record.extra.contains_key("sales"));
        assert_eq!(record.extra["Other"], json!(1));
    }

    fn cell() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            Just(json!("N/A")),
            Just(json!("")),
            Just(json!(0)),
            (-1.0e9..1.0e9f64).prop_map(|n| json!(n)),
            (-1.0e6..1.0e6f64).prop_map(|n| json!(format!("{n:.2}"))),
            any::<bool>().prop_map(Value::from),
        ]
    }

    fn row() -> impl Strategy<Value = Value> {
        let record = (0..12u32, cell(), cell(), cell(), cell(), cell()).prop_map(
            |(q, sales, op, net, eps, other)| {
                json!({
                    "Quarter": format!("{}Q{}", 2021 + q / 4, q % 4 + 1),
                    "Total Revenue": sales,
                    "Operating Income": op,
                    "Net Income": net,
                    "Diluted EPS": eps,
                    "Some Other Line": other,
                })
            },
        );
        // Raw keys that share a canonical field with an aliased key
        let collisions = (
            prop::option::of(0..12u32),
            prop::option::of(cell()),
            prop::option::of(cell()),
        );
        let record = (record, collisions).prop_map(|(mut row, (quarter, sales, eps))| {
            if let Value::Object(fields) = &mut row {
                if let Some(q) = quarter {
                    fields.insert("quarter".into(), json!(format!("{}Q{}", 2021 + q / 4, q % 4 + 1)));
                }
                if let Some(sales) = sales {
                    fields.insert("sales".into(), sales);
                }
                if let Some(eps) = eps {
                    fields.insert("eps".into(), eps);
                }
            }
            row
        });
        prop_oneof![
            4 => record,
            1 => cell(),
            1 => Just(json!({"Total Revenue": 1})),
        ]
    }

    proptest! {
        #[test]
        fn prop_margin_is_finite_and_consistent(rows in prop::collection::vec(row(), 0..30)) {
            let results = normalize(&rows, &FieldMap::yahoo());
            prop_assert!(results.len() <= DEFAULT_MAX_QUARTERS);
            for record in &results {
                for metric in Metric::ALL {
                    if let Some(v) = record.value(metric) {
                        prop_assert!(v.is_finite());
                    }
                }
                match (record.operating_profit, record.sales) {
                    (Some(op), Some(sales)) if sales != 0.0 => {
                        let expected = op / sales * 100.0;
                        if expected.is_finite() {
                            prop_assert_eq!(record.operating_margin_pct, Some(expected));
                        }
                    }
                    _ => prop_assert_eq!(record.operating_margin_pct, None),
                }
            }
        }

        #[test]
        fn prop_second_pass_is_identity(rows in prop::collection::vec(row(), 0..30)) {
            let first = normalize(&rows, &FieldMap::yahoo());
            let second = normalize(&first.to_raw_rows(), &FieldMap::identity());
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_keeps_most_recent_in_order(
            order in Just((0..25u32).collect::<Vec<_>>()).prop_shuffle(),
            count in 0..25usize,
        ) {
            let rows: Vec<Value> = order
                .iter()
                .filter(|q| (**q as usize) < count)
                .map(|q| json!({"quarter": format!("{}Q{}", 2015 + q / 4, q % 4 + 1), "sales": q}))
                .collect();
            let results = normalize(&rows, &FieldMap::identity());

            let expected: Vec<f64> = (count.saturating_sub(DEFAULT_MAX_QUARTERS)..count)
                .map(|q| q as f64)
                .collect();
            let sales: Vec<f64> = results.series(Metric::Sales).into_iter().flatten().collect();
            prop_assert_eq!(sales, expected);
        }

        #[test]
        fn prop_outer_merge_keeps_every_period(
            left in prop::collection::btree_set(0..8u32, 0..8),
            right in prop::collection::btree_set(0..8u32, 0..8),
        ) {
            let label = |q: &u32| format!("{}-Q{}", 2020 + q / 4, q % 4 + 1);
            let financials: Vec<Value> = left.iter().map(|q| json!({"quarter": label(q), "sales": 1})).collect();
            let earnings: Vec<Value> = right.iter().map(|q| json!({"quarter": label(q), "eps": 1})).collect();

            let results = ResultNormalizer::new(FieldMap::identity())
                .normalize([financials.as_slice(), earnings.as_slice()]);

            let union: std::collections::BTreeSet<_> = left.union(&right).collect();
            prop_assert_eq!(results.len(), union.len());
            for (record, q) in results.iter().zip(union) {
                prop_assert_eq!(record.sales.is_some(), left.contains(q));
                prop_assert_eq!(record.eps.is_some(), right.contains(q));
            }
        }
    }
}
