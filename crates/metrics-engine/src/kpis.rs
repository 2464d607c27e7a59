use fund_core::{format_percentage, FormattedKpis, FundRecord, KpiSummary};

/// Compute the headline KPIs from the last record of the windowed view.
/// Returns `None` on an empty view; the caller guards, nothing renders.
pub fn kpi_summary(view: &[FundRecord]) -> Option<KpiSummary> {
    let last = view.last()?;

    let fund_performance = last.fund_accumulated_return.unwrap_or(0.0);
    let benchmark = last.benchmark_accumulated_return.unwrap_or(0.0);

    Some(KpiSummary {
        fund_performance,
        benchmark_delta: fund_performance - benchmark,
        // Absent stays absent; the formatter shows the placeholder.
        dividend_yield: last.dividend_yield,
        volatility: last.annualized_volatility.unwrap_or(0.0),
    })
}

/// Display strings for the KPI cards. The benchmark delta carries an
/// explicit sign; a missing dividend yield shows the placeholder, never 0%.
pub fn format_kpis(summary: &KpiSummary) -> FormattedKpis {
    FormattedKpis {
        fund_performance: format_percentage(Some(summary.fund_performance), false),
        benchmark_delta: format_percentage(Some(summary.benchmark_delta), true),
        dividend_yield: format_percentage(summary.dividend_yield, false),
        volatility: format_percentage(Some(summary.volatility), false),
    }
}
