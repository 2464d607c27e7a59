use chrono::Datelike;
use fund_core::{
    format_percentage, CellTone, FundRecord, PerformanceCell, PerformanceRow, PerformanceTable,
};

/// Compute the month / year-to-date / since-inception table.
///
/// Always runs over the full, unfiltered set: the time-window filter is a
/// chart concern and must not move this table. Returns `None` when the set
/// is empty or no record carries a month.
pub fn performance_table(full_set: &[FundRecord]) -> Option<PerformanceTable> {
    let last = full_set.iter().rev().find(|r| r.month.is_some())?;
    let current_year = last.month?.year();
    let anchor = year_end_anchor(full_set, current_year - 1);

    if anchor.is_none() {
        tracing::debug!(
            anchor_year = current_year - 1,
            "no year-end anchor, year-to-date falls back to zero"
        );
    }

    Some(PerformanceTable {
        fund: series_row(
            last,
            anchor,
            |r| r.fund_monthly_return,
            |r| r.fund_accumulated_return,
            |r| r.fund_quote_value,
        ),
        benchmark: series_row(
            last,
            anchor,
            |r| r.benchmark_monthly_return,
            |r| r.benchmark_accumulated_return,
            |r| r.benchmark_points,
        ),
        risk_free: series_row(
            last,
            anchor,
            |r| r.risk_free_monthly_return,
            |r| r.risk_free_accumulated_return,
            |r| r.risk_free_index_base,
        ),
    })
}

/// Year-end anchor lookup: the last December record of `year` in
/// chronological order, else the chronologically last record of `year`,
/// else absent.
pub fn year_end_anchor(records: &[FundRecord], year: i32) -> Option<&FundRecord> {
    let december = records
        .iter()
        .filter(|r| {
            r.month
                .is_some_and(|m| m.year() == year && m.month() == 12)
        })
        .last();
    if december.is_some() {
        return december;
    }

    records
        .iter()
        .filter(|r| r.month.is_some_and(|m| m.year() == year))
        .last()
}

fn series_row(
    last: &FundRecord,
    anchor: Option<&FundRecord>,
    monthly: impl Fn(&FundRecord) -> Option<f64>,
    accumulated: impl Fn(&FundRecord) -> Option<f64>,
    level: impl Fn(&FundRecord) -> Option<f64>,
) -> PerformanceRow {
    PerformanceRow {
        month: cell(monthly(last).unwrap_or(0.0) * 100.0),
        year_to_date: cell(year_to_date(last, anchor, &level)),
        since_inception: cell(accumulated(last).unwrap_or(0.0) * 100.0),
    }
}

/// Year-to-date from raw levels: `(last - anchor) / anchor * 100`. The raw
/// level avoids the double-compounding drift of the accumulated field. An
/// anchor level of zero (or a missing level on either side) makes the
/// anchor unusable for this series only: the value falls back to 0.
fn year_to_date(
    last: &FundRecord,
    anchor: Option<&FundRecord>,
    level: impl Fn(&FundRecord) -> Option<f64>,
) -> f64 {
    let Some(anchor) = anchor else { return 0.0 };
    match (level(last), level(anchor)) {
        (Some(current), Some(base)) if base != 0.0 => (current - base) / base * 100.0,
        _ => 0.0,
    }
}

fn cell(percentage_points: f64) -> PerformanceCell {
    PerformanceCell {
        value: percentage_points,
        display: format_percentage(Some(percentage_points / 100.0), true),
        tone: CellTone::classify(percentage_points / 100.0),
    }
}
