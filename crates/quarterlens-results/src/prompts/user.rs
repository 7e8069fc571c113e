//! User message templates

/// Commentary request over the quarterly results table
///
/// Variables: `symbol`, `quarters`, `first`, `last`, `table`, `has_missing`
pub const RESULTS_ANALYSIS: &str = r"Analyze the last {{ quarters }} consolidated quarters of {{ symbol }} ({{ first }} to {{ last }}) based on this dataset:

{{ table }}
{% if has_missing %}
Cells marked N/A were not reported by the data source.
{% endif %}
Provide insights for:
- Sales growth
- Operating Profit trends
- OPM% margins
- Net Profit performance
- EPS movement

Highlight positives & negatives in simple words.";
