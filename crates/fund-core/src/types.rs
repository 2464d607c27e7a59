use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One monthly row of the fund report time series.
///
/// `month` is the first reportable day of the reported month. A record whose
/// source cell held no parseable date keeps `month = None`: it stays in the
/// set but drops out of date-dependent lookups (windows, anchors).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    pub month: Option<NaiveDate>,

    /// Fractional returns (0.0123 = 1.23%), single month in isolation.
    pub fund_monthly_return: Option<f64>,
    pub benchmark_monthly_return: Option<f64>,
    pub risk_free_monthly_return: Option<f64>,

    /// Fractional returns accumulated since the series' inception.
    pub fund_accumulated_return: Option<f64>,
    pub benchmark_accumulated_return: Option<f64>,
    pub risk_free_accumulated_return: Option<f64>,

    pub annualized_volatility: Option<f64>,

    /// Fundamentals. Absent means "not reported", never coerced to zero.
    pub dividend_yield: Option<f64>,
    pub risk_gap: Option<f64>,

    /// Raw index/quote levels, used only for year-to-date recomputation
    /// against a prior year-end anchor (the accumulated field would
    /// double-compound rounding drift).
    pub fund_quote_value: Option<f64>,
    pub benchmark_points: Option<f64>,
    pub risk_free_index_base: Option<f64>,
}

impl FundRecord {
    /// Calendar year of the reported month, if the month is known.
    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.month.map(|m| m.year())
    }
}

/// Display coloring class for a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellTone {
    Positive,
    Negative,
    Neutral,
}

impl CellTone {
    /// Classify a fractional value (0.01 = one percentage point). The
    /// one-point dead zone around zero is deliberate: moves under a point
    /// read as flat.
    pub fn classify(fraction: f64) -> Self {
        if fraction >= 0.01 {
            CellTone::Positive
        } else if fraction <= -0.01 {
            CellTone::Negative
        } else {
            CellTone::Neutral
        }
    }
}

/// One computed table cell: numeric value in percentage points plus its
/// display string and tone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceCell {
    pub value: f64,
    pub display: String,
    pub tone: CellTone,
}

/// Month / year-to-date / since-inception cells for a single series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub month: PerformanceCell,
    pub year_to_date: PerformanceCell,
    pub since_inception: PerformanceCell,
}

/// The three-series performance table. Always computed over the full record
/// set; the time-window filter never affects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceTable {
    pub fund: PerformanceRow,
    pub benchmark: PerformanceRow,
    pub risk_free: PerformanceRow,
}

/// Headline figures taken from the last record of the filtered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Latest accumulated fund return, fractional.
    pub fund_performance: f64,
    /// Fund minus benchmark accumulated return, fractional.
    pub benchmark_delta: f64,
    /// Passed through as reported; `None` renders as the "--" placeholder.
    pub dividend_yield: Option<f64>,
    pub volatility: f64,
}

/// `KpiSummary` with the display formatting applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedKpis {
    pub fund_performance: String,
    pub benchmark_delta: String,
    pub dividend_yield: String,
    pub volatility: String,
}

/// Chart-ready series over the filtered view: accumulated performance for
/// the three series plus the volatility overlay, all in percentage points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSeries {
    pub labels: Vec<String>,
    pub fund_accumulated: Vec<f64>,
    pub benchmark_accumulated: Vec<f64>,
    pub risk_free_accumulated: Vec<f64>,
    pub volatility: Vec<f64>,
}

/// Fundamentals chart series, restricted to months where both dividend
/// yield and risk gap were reported. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsSeries {
    pub labels: Vec<String>,
    pub dividend_yield: Vec<f64>,
    pub risk_gap: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tone_dead_zone() {
        assert_eq!(CellTone::classify(0.009), CellTone::Neutral);
        assert_eq!(CellTone::classify(0.01), CellTone::Positive);
        assert_eq!(CellTone::classify(-0.015), CellTone::Negative);
        assert_eq!(CellTone::classify(0.0), CellTone::Neutral);
        assert_eq!(CellTone::classify(-0.009), CellTone::Neutral);
        assert_eq!(CellTone::classify(5.23), CellTone::Positive);
    }
}
