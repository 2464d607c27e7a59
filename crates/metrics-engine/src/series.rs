use fund_core::{format_month_label, FundRecord, FundamentalsSeries, PerformanceSeries};

/// Chart-ready accumulated-performance series over the windowed view, in
/// percentage points. Absent values chart as 0 so the lines stay aligned
/// with the label axis.
pub fn performance_series(view: &[FundRecord]) -> PerformanceSeries {
    PerformanceSeries {
        labels: view.iter().map(|r| format_month_label(r.month)).collect(),
        fund_accumulated: points(view, |r| r.fund_accumulated_return),
        benchmark_accumulated: points(view, |r| r.benchmark_accumulated_return),
        risk_free_accumulated: points(view, |r| r.risk_free_accumulated_return),
        volatility: points(view, |r| r.annualized_volatility),
    }
}

/// Fundamentals series restricted to months where both dividend yield and
/// risk gap were reported. An empty result is valid; the renderer shows
/// its placeholder.
pub fn fundamentals_series(view: &[FundRecord]) -> FundamentalsSeries {
    let reported: Vec<&FundRecord> = view
        .iter()
        .filter(|r| {
            r.dividend_yield.is_some_and(f64::is_finite)
                && r.risk_gap.is_some_and(f64::is_finite)
        })
        .collect();

    FundamentalsSeries {
        labels: reported.iter().map(|r| format_month_label(r.month)).collect(),
        dividend_yield: reported
            .iter()
            .map(|r| r.dividend_yield.unwrap_or(0.0) * 100.0)
            .collect(),
        risk_gap: reported
            .iter()
            .map(|r| r.risk_gap.unwrap_or(0.0) * 100.0)
            .collect(),
    }
}

fn points(view: &[FundRecord], value: impl Fn(&FundRecord) -> Option<f64>) -> Vec<f64> {
    view.iter().map(|r| value(r).unwrap_or(0.0) * 100.0).collect()
}
