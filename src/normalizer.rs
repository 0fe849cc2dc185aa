use chrono::{Datelike, NaiveDate};

use crate::frame::Frame;
use crate::models::NormalizedRow;

/// Fallback for blank or unparsable numeric cells.
pub const DEFAULT_AMOUNT: f64 = 0.0;
/// Month/Day reported for unparsable dates.
pub const UNKNOWN_MONTH: u32 = 0;
pub const UNKNOWN_DAY: u32 = 0;

/// The two decimal-mark conventions in circulation. The anomaly path
/// treats commas as thousands grouping; the category path treats a
/// comma as the decimal mark. The asymmetry is deliberate and each
/// pipeline must keep its own style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalStyle {
    /// `,` strips out, `.` is the decimal mark: "1,234.56" -> 1234.56
    GroupedComma,
    /// `,` becomes `.`: "12,5" -> 12.5 (and "1,234.56" fails to 0.0)
    DecimalComma,
}

/// Parse-or-default numeric coercion. Blank, unparsable, and non-finite
/// values all collapse to `DEFAULT_AMOUNT` so a bad cell never fails
/// the row.
pub fn parse_amount(raw: &str, style: DecimalStyle) -> f64 {
    let cleaned: String = match style {
        DecimalStyle::GroupedComma => raw
            .chars()
            .filter(|c| *c != ',' && !c.is_whitespace())
            .collect(),
        DecimalStyle::DecimalComma => raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| if c == ',' { '.' } else { c })
            .collect(),
    };
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(DEFAULT_AMOUNT)
}

// Statement exports write dates day-first; ISO sneaks in from re-saved
// files, so it is accepted as a fallback.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%Y-%m-%d"];

pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Normalize a whole batch. Pure: no side effects, identical input
/// yields identical rows, and no single bad row ever fails the batch.
pub fn normalize(frame: &Frame, style: DecimalStyle) -> Vec<NormalizedRow> {
    (0..frame.len())
        .map(|i| normalize_row(frame, i, style))
        .collect()
}

fn normalize_row(frame: &Frame, i: usize, style: DecimalStyle) -> NormalizedRow {
    let withdrawal = parse_amount(frame.cell(i, "Withdrawal"), style);
    let deposit = parse_amount(frame.cell(i, "Deposit"), style);
    let balance = parse_amount(frame.cell(i, "Balance"), style);
    let amount = deposit - withdrawal;

    // Prefer the secondary date cell; a blank one falls back to the
    // primary for that row only.
    let date_cell = {
        let secondary = frame.cell(i, "Date.1");
        if frame.has_column("Date.1") && !secondary.trim().is_empty() {
            secondary
        } else {
            frame.cell(i, "Date")
        }
    };
    let (month, day) = match parse_day_first(date_cell) {
        Some(d) => (d.month(), d.day()),
        None => (UNKNOWN_MONTH, UNKNOWN_DAY),
    };

    let ref_no = frame.cell(i, "RefNo").to_string();
    NormalizedRow {
        withdrawal,
        deposit,
        balance,
        amount,
        month,
        day,
        ref_text: ref_no.clone(),
        date: frame.cell(i, "Date").to_string(),
        category: frame.cell(i, "Category").to_string(),
        ref_no,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_grouped_comma() {
        assert_eq!(parse_amount("1,234.56", DecimalStyle::GroupedComma), 1234.56);
        assert_eq!(parse_amount("1,234", DecimalStyle::GroupedComma), 1234.0);
        assert_eq!(parse_amount("1234", DecimalStyle::GroupedComma), 1234.0);
        assert_eq!(parse_amount("1 234", DecimalStyle::GroupedComma), 1234.0);
        assert_eq!(parse_amount("", DecimalStyle::GroupedComma), 0.0);
        assert_eq!(parse_amount("n/a", DecimalStyle::GroupedComma), 0.0);
    }

    #[test]
    fn test_parse_amount_decimal_comma() {
        assert_eq!(parse_amount("12,5", DecimalStyle::DecimalComma), 12.5);
        assert_eq!(parse_amount("1234", DecimalStyle::DecimalComma), 1234.0);
        assert_eq!(parse_amount("", DecimalStyle::DecimalComma), 0.0);
        // A grouped-comma value is unparsable under this convention and
        // falls back to the default. The two styles must stay divergent.
        assert_eq!(parse_amount("1,234.56", DecimalStyle::DecimalComma), 0.0);
    }

    #[test]
    fn test_parse_amount_rejects_non_finite() {
        assert_eq!(parse_amount("inf", DecimalStyle::GroupedComma), 0.0);
        assert_eq!(parse_amount("NaN", DecimalStyle::GroupedComma), 0.0);
    }

    #[test]
    fn test_parse_amount_idempotent_on_normalized_strings() {
        for raw in ["1,234.56", "500", "0.25"] {
            let once = parse_amount(raw, DecimalStyle::GroupedComma);
            let twice = parse_amount(&once.to_string(), DecimalStyle::GroupedComma);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_parse_day_first() {
        let d = parse_day_first("05/03/2024").unwrap();
        assert_eq!((d.day(), d.month(), d.year()), (5, 3, 2024));
        let iso = parse_day_first("2024-03-05").unwrap();
        assert_eq!((iso.day(), iso.month()), (5, 3));
        assert!(parse_day_first("").is_none());
        assert!(parse_day_first("not a date").is_none());
        assert!(parse_day_first("32/01/2024").is_none());
    }

    fn frame(csv: &str) -> Frame {
        Frame::from_csv_str(csv).unwrap()
    }

    #[test]
    fn test_normalize_amount_identity() {
        let f = frame(
            "Date,Category,RefNo,Date.1,Withdrawal,Deposit,Balance\n\
             01/02/2024,Rent,R1,01/02/2024,\"1,000\",250,\"5,250\"\n",
        );
        let rows = normalize(&f, DecimalStyle::GroupedComma);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.withdrawal, 1000.0);
        assert_eq!(r.deposit, 250.0);
        assert_eq!(r.balance, 5250.0);
        assert_eq!(r.amount, r.deposit - r.withdrawal);
    }

    #[test]
    fn test_normalize_prefers_secondary_date() {
        let f = frame(
            "Date,Category,RefNo,Date.1,Withdrawal,Deposit,Balance\n\
             01/01/2024,Rent,R1,15/06/2024,0,0,0\n",
        );
        let rows = normalize(&f, DecimalStyle::GroupedComma);
        assert_eq!(rows[0].month, 6);
        assert_eq!(rows[0].day, 15);
        // Echo field keeps the raw primary cell.
        assert_eq!(rows[0].date, "01/01/2024");
    }

    #[test]
    fn test_normalize_blank_secondary_falls_back_to_primary() {
        let f = frame(
            "Date,Category,RefNo,Date.1,Withdrawal,Deposit,Balance\n\
             10/04/2024,Rent,R1,,0,0,0\n",
        );
        let rows = normalize(&f, DecimalStyle::GroupedComma);
        assert_eq!(rows[0].month, 4);
        assert_eq!(rows[0].day, 10);
    }

    #[test]
    fn test_normalize_unparsable_date_defaults_to_zero() {
        let f = frame(
            "Date,Category,RefNo,Date.1,Withdrawal,Deposit,Balance\n\
             garbage,Rent,R1,also garbage,0,0,0\n",
        );
        let rows = normalize(&f, DecimalStyle::GroupedComma);
        assert_eq!(rows[0].month, UNKNOWN_MONTH);
        assert_eq!(rows[0].day, UNKNOWN_DAY);
    }

    #[test]
    fn test_normalize_ref_text_never_null() {
        let f = frame("Date,Category,Withdrawal,Deposit,Balance\n01/02/2024,Rent,1,2,3\n");
        let rows = normalize(&f, DecimalStyle::GroupedComma);
        assert_eq!(rows[0].ref_text, "");
        assert_eq!(rows[0].ref_no, "");
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let f = frame(
            "Date,Category,RefNo,Date.1,Withdrawal,Deposit,Balance\n\
             01/02/2024,Rent,R1,01/02/2024,\"1,000\",250,\"5,250\"\n",
        );
        let a = normalize(&f, DecimalStyle::GroupedComma);
        let b = normalize(&f, DecimalStyle::GroupedComma);
        assert_eq!(a, b);
    }
}
