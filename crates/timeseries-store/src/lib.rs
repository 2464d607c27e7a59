//! Owns the full ordered record set plus the windowed view the KPIs and
//! charts read. The full set is replaced wholesale by a successful load;
//! filtering recomputes the view and never touches the full set.

use chrono::{Months, NaiveDate, Utc};
use fund_core::FundRecord;
use serde::{Deserialize, Serialize};

/// Time window selector sent by the UI: everything, or the last n calendar
/// months counted back from today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Window {
    All,
    MonthsBack(u32),
}

impl Window {
    /// Parse the UI's filter value: `"all"` or an integer month count.
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("all") {
            Some(Window::All)
        } else {
            value.trim().parse::<u32>().ok().map(Window::MonthsBack)
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Window::All
    }
}

/// In-memory store for one loaded report.
#[derive(Debug, Default)]
pub struct SeriesStore {
    full: Vec<FundRecord>,
    filtered: Vec<FundRecord>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full set with a freshly built one and reset the view.
    /// The caller validates before this point; load itself cannot fail.
    pub fn load(&mut self, records: Vec<FundRecord>) {
        tracing::info!(records = records.len(), "record set replaced");
        self.filtered = records.clone();
        self.full = records;
    }

    /// The complete, unfiltered record set. The performance table always
    /// reads this one.
    pub fn full_set(&self) -> &[FundRecord] {
        &self.full
    }

    /// The most recently computed windowed view.
    pub fn filtered_view(&self) -> &[FundRecord] {
        &self.filtered
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    /// Recompute the view for a window measured back from today.
    pub fn filter_by_window(&mut self, window: Window) -> &[FundRecord] {
        self.filter_by_window_at(Utc::now().date_naive(), window)
    }

    /// Window filtering with an explicit "today", cutoff inclusive.
    /// Records without a month drop out of any bounded window. An empty
    /// store yields an empty view, not an error.
    pub fn filter_by_window_at(&mut self, today: NaiveDate, window: Window) -> &[FundRecord] {
        self.filtered = match window {
            Window::All => self.full.clone(),
            Window::MonthsBack(n) => match today.checked_sub_months(Months::new(n)) {
                Some(cutoff) => self
                    .full
                    .iter()
                    .filter(|r| r.month.is_some_and(|m| m >= cutoff))
                    .cloned()
                    .collect(),
                // A window reaching past the calendar keeps everything.
                None => self.full.clone(),
            },
        };
        &self.filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, month: u32) -> FundRecord {
        FundRecord {
            month: NaiveDate::from_ymd_opt(year, month, 1),
            fund_accumulated_return: Some(0.05),
            ..Default::default()
        }
    }

    fn monthly_series(today: NaiveDate, count: u32) -> Vec<FundRecord> {
        use chrono::Datelike;
        (0..count)
            .map(|i| {
                let d = today.checked_sub_months(Months::new(count - 1 - i)).unwrap();
                record(d.year(), d.month())
            })
            .collect()
    }

    #[test]
    fn test_parse_window() {
        assert_eq!(Window::parse("all"), Some(Window::All));
        assert_eq!(Window::parse("All"), Some(Window::All));
        assert_eq!(Window::parse("12"), Some(Window::MonthsBack(12)));
        assert_eq!(Window::parse("banana"), None);
    }

    #[test]
    fn test_all_window_equals_full_set() {
        let mut store = SeriesStore::new();
        store.load(vec![record(2024, 1), record(2024, 2), record(2024, 3)]);
        let view = store.filter_by_window(Window::All).to_vec();
        assert_eq!(view, store.full_set());
    }

    #[test]
    fn test_load_resets_view_to_full() {
        let mut store = SeriesStore::new();
        store.load(vec![record(2020, 1), record(2024, 1)]);
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        store.filter_by_window_at(today, Window::MonthsBack(3));
        assert_eq!(store.filtered_view().len(), 1);

        store.load(vec![record(2020, 1), record(2024, 1)]);
        assert_eq!(store.filtered_view().len(), 2);
    }

    #[test]
    fn test_months_back_cutoff_inclusive() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut store = SeriesStore::new();
        store.load(vec![record(2025, 3), record(2025, 4), record(2025, 6)]);
        // Cutoff is exactly 2025-03-01; the March record stays.
        let view = store.filter_by_window_at(today, Window::MonthsBack(3));
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_months_back_drops_older_records() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let mut store = SeriesStore::new();
        store.load(monthly_series(today, 24));
        for n in [0u32, 1, 3, 6, 12, 999] {
            let cutoff = today.checked_sub_months(Months::new(n)).unwrap();
            let view = store.filter_by_window_at(today, Window::MonthsBack(n));
            assert!(
                view.iter().all(|r| r.month.unwrap() >= cutoff),
                "window {n} kept a record before {cutoff}"
            );
        }
        // 999 months reaches past the whole series.
        let view = store.filter_by_window_at(today, Window::MonthsBack(999));
        assert_eq!(view.len(), 24);
    }

    #[test]
    fn test_undated_records_drop_out_of_bounded_windows() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut store = SeriesStore::new();
        store.load(vec![FundRecord::default(), record(2025, 5)]);
        let view = store.filter_by_window_at(today, Window::MonthsBack(6));
        assert_eq!(view.len(), 1);
        let view = store.filter_by_window_at(today, Window::All);
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn test_empty_store_filters_to_empty_view() {
        let mut store = SeriesStore::new();
        let view = store.filter_by_window(Window::MonthsBack(6));
        assert!(view.is_empty());
    }

    #[test]
    fn test_filtering_never_mutates_full_set() {
        let mut store = SeriesStore::new();
        store.load(vec![record(2020, 1), record(2025, 1)]);
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        store.filter_by_window_at(today, Window::MonthsBack(1));
        assert_eq!(store.full_set().len(), 2);
    }
}
