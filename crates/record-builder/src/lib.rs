//! Turns a decoded sheet into the validated, typed, sorted record set.
//!
//! Header names bind to record fields through an explicit lookup table
//! resolved once per parse. Rows with unparseable dates are kept with the
//! month unset; only missing required columns or an empty dataset reject
//! the whole sheet.

use std::collections::HashMap;

use chrono::NaiveDate;
use fund_core::{BuildError, FundRecord};
use sheet_decoder::{Cell, RawSheet};

/// Record fields a spreadsheet column can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Month,
    FundMonthly,
    BenchmarkMonthly,
    RiskFreeMonthly,
    FundAccumulated,
    BenchmarkAccumulated,
    RiskFreeAccumulated,
    Volatility,
    DividendYield,
    RiskGap,
    FundQuote,
    BenchmarkPoints,
    RiskFreeIndexBase,
}

/// Header-string to field bindings, as named in the source report. The
/// unaccented `IBOV (mes)` is how the report actually spells that column.
const BINDINGS: &[(&str, Field, bool)] = &[
    ("Mês", Field::Month, true),
    ("MLUCA (acc)", Field::FundAccumulated, true),
    ("IBOV (acc)", Field::BenchmarkAccumulated, true),
    ("CDI (acc)", Field::RiskFreeAccumulated, true),
    ("Vol (ano)", Field::Volatility, true),
    ("MLUCA (mês)", Field::FundMonthly, false),
    ("IBOV (mes)", Field::BenchmarkMonthly, false),
    ("CDI (mês)", Field::RiskFreeMonthly, false),
    ("DY(%)", Field::DividendYield, false),
    ("GAP (risco)", Field::RiskGap, false),
    ("MLUCA (cota)", Field::FundQuote, false),
    ("IBOV (pts)", Field::BenchmarkPoints, false),
    ("CDI (100)", Field::RiskFreeIndexBase, false),
];

/// Column positions resolved against one header row.
#[derive(Debug)]
pub struct ColumnSchema {
    index_of: HashMap<Field, usize>,
}

impl ColumnSchema {
    /// Resolve the fixed binding table against a header row.
    ///
    /// Every missing required column is reported, not just the first. A
    /// header appearing twice is ambiguous and rejected outright.
    pub fn resolve(headers: &[String]) -> Result<Self, BuildError> {
        let mut index_of = HashMap::new();
        let mut missing = Vec::new();

        for (name, field, required) in BINDINGS {
            let mut positions = headers
                .iter()
                .enumerate()
                .filter(|(_, h)| h.as_str() == *name);
            match positions.next() {
                Some((idx, _)) => {
                    if positions.next().is_some() {
                        return Err(BuildError::AmbiguousColumn(name.to_string()));
                    }
                    index_of.insert(*field, idx);
                }
                None if *required => missing.push(name.to_string()),
                None => {}
            }
        }

        if !missing.is_empty() {
            return Err(BuildError::MissingColumns(missing));
        }

        Ok(Self { index_of })
    }

    fn cell<'a>(&self, row: &'a [Cell], field: Field) -> Option<&'a Cell> {
        self.index_of.get(&field).and_then(|idx| row.get(*idx))
    }
}

/// Build the full record set from a decoded sheet: validate the header row,
/// map every data row, sort ascending by month.
///
/// The sort is stable, so duplicate months keep their source order and
/// "last record of a month" means the later source row.
pub fn build_records(sheet: &RawSheet) -> Result<Vec<FundRecord>, BuildError> {
    let schema = ColumnSchema::resolve(&sheet.headers)?;

    if sheet.rows.is_empty() {
        return Err(BuildError::EmptyDataset);
    }

    let mut records: Vec<FundRecord> = sheet
        .rows
        .iter()
        .map(|row| build_record(&schema, row))
        .collect();

    records.sort_by(|a, b| a.month.cmp(&b.month));

    tracing::debug!(records = records.len(), "built record set");
    Ok(records)
}

fn build_record(schema: &ColumnSchema, row: &[Cell]) -> FundRecord {
    FundRecord {
        month: schema.cell(row, Field::Month).and_then(parse_month),
        fund_monthly_return: number(schema, row, Field::FundMonthly),
        benchmark_monthly_return: number(schema, row, Field::BenchmarkMonthly),
        risk_free_monthly_return: number(schema, row, Field::RiskFreeMonthly),
        fund_accumulated_return: number(schema, row, Field::FundAccumulated),
        benchmark_accumulated_return: number(schema, row, Field::BenchmarkAccumulated),
        risk_free_accumulated_return: number(schema, row, Field::RiskFreeAccumulated),
        annualized_volatility: number(schema, row, Field::Volatility),
        dividend_yield: number(schema, row, Field::DividendYield),
        risk_gap: number(schema, row, Field::RiskGap),
        fund_quote_value: number(schema, row, Field::FundQuote),
        benchmark_points: number(schema, row, Field::BenchmarkPoints),
        risk_free_index_base: number(schema, row, Field::RiskFreeIndexBase),
    }
}

fn number(schema: &ColumnSchema, row: &[Cell], field: Field) -> Option<f64> {
    schema.cell(row, field).and_then(parse_number)
}

/// Accept a native date or a parseable date string. Anything else leaves
/// the month unset; the row itself is still kept.
fn parse_month(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date_text(s),
        _ => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    // `yyyy-mm` means the first reportable day of that month.
    NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d").ok()
}

/// Accept a native number or numeric text, tolerating a comma decimal
/// separator. Junk becomes an absent field, never zero.
fn parse_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) => Some(*n),
        Cell::Text(s) => s.replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn required_headers() -> Vec<String> {
        headers(&["Mês", "MLUCA (acc)", "IBOV (acc)", "CDI (acc)", "Vol (ano)"])
    }

    fn text_row(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect()
    }

    #[test]
    fn test_missing_columns_all_reported() {
        let sheet = RawSheet {
            headers: headers(&["Mês", "MLUCA (acc)", "Vol (ano)"]),
            rows: vec![text_row(&["2025-01-01", "0.05", "0.12"])],
        };
        let err = build_records(&sheet).unwrap_err();
        match err {
            BuildError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["IBOV (acc)", "CDI (acc)"]);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_single_column_named_exactly() {
        let sheet = RawSheet {
            headers: headers(&["Mês", "MLUCA (acc)", "IBOV (acc)", "Vol (ano)"]),
            rows: vec![text_row(&["2025-01-01", "0.05", "0.03", "0.12"])],
        };
        match build_records(&sheet).unwrap_err() {
            BuildError::MissingColumns(cols) => assert_eq!(cols, vec!["CDI (acc)"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_sheet() {
        let sheet = RawSheet {
            headers: required_headers(),
            rows: vec![],
        };
        assert!(matches!(
            build_records(&sheet).unwrap_err(),
            BuildError::EmptyDataset
        ));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let mut hs = required_headers();
        hs.push("Mês".to_string());
        let sheet = RawSheet {
            headers: hs,
            rows: vec![text_row(&["2025-01-01", "0.05", "0.03", "0.04", "0.12", "x"])],
        };
        assert!(matches!(
            build_records(&sheet).unwrap_err(),
            BuildError::AmbiguousColumn(name) if name == "Mês"
        ));
    }

    #[test]
    fn test_rows_sorted_ascending_by_month() {
        let sheet = RawSheet {
            headers: required_headers(),
            rows: vec![
                text_row(&["2025-03-01", "0.08", "0.05", "0.04", "0.12"]),
                text_row(&["2025-01-01", "0.05", "0.03", "0.01", "0.11"]),
                text_row(&["2025-02-01", "0.06", "0.04", "0.02", "0.10"]),
            ],
        };
        let records = build_records(&sheet).unwrap();
        let months: Vec<_> = records.iter().filter_map(|r| r.month).collect();
        assert!(months.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(records[0].fund_accumulated_return, Some(0.05));
    }

    #[test]
    fn test_bad_date_keeps_row_with_unset_month() {
        let sheet = RawSheet {
            headers: required_headers(),
            rows: vec![
                text_row(&["2025-01-01", "0.05", "0.03", "0.01", "0.11"]),
                text_row(&["not a date", "0.06", "0.04", "0.02", "0.10"]),
            ],
        };
        let records = build_records(&sheet).unwrap();
        assert_eq!(records.len(), 2);
        // Undated rows sort before dated ones.
        assert_eq!(records[0].month, None);
        assert_eq!(records[0].fund_accumulated_return, Some(0.06));
        assert!(records[1].month.is_some());
    }

    #[test]
    fn test_native_date_cell() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut row = text_row(&["", "0.05", "0.03", "0.01", "0.11"]);
        row[0] = Cell::Date(date);
        let sheet = RawSheet {
            headers: required_headers(),
            rows: vec![row],
        };
        let records = build_records(&sheet).unwrap();
        assert_eq!(records[0].month, Some(date));
    }

    #[test]
    fn test_date_string_formats() {
        assert_eq!(
            parse_date_text("2025-06-01"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(
            parse_date_text("01/06/2025"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(
            parse_date_text("2025-06"),
            NaiveDate::from_ymd_opt(2025, 6, 1)
        );
        assert_eq!(parse_date_text("junho"), None);
    }

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(parse_number(&Cell::Text("0,0523".to_string())), Some(0.0523));
        assert_eq!(parse_number(&Cell::Text("abc".to_string())), None);
        assert_eq!(parse_number(&Cell::Empty), None);
    }

    #[test]
    fn test_optional_fields_absent_stay_absent() {
        let mut hs = required_headers();
        hs.push("DY(%)".to_string());
        let sheet = RawSheet {
            headers: hs,
            rows: vec![text_row(&["2025-01-01", "0.05", "0.03", "0.01", "0.11", ""])],
        };
        let records = build_records(&sheet).unwrap();
        assert_eq!(records[0].dividend_yield, None);
        assert_eq!(records[0].risk_gap, None);
    }

    #[test]
    fn test_duplicate_months_keep_source_order() {
        let sheet = RawSheet {
            headers: required_headers(),
            rows: vec![
                text_row(&["2025-01-01", "0.05", "0.03", "0.01", "0.11"]),
                text_row(&["2025-01-01", "0.06", "0.04", "0.02", "0.10"]),
            ],
        };
        let records = build_records(&sheet).unwrap();
        assert_eq!(records[0].fund_accumulated_return, Some(0.05));
        assert_eq!(records[1].fund_accumulated_return, Some(0.06));
    }
}
