//! Value normalizer: one [`CellValue`] to one display string.
//!
//! | Kind        | Output                                   |
//! |-------------|------------------------------------------|
//! | `Missing`   | `""`                                     |
//! | `Temporal`  | `DD-MM-YYYY`                             |
//! | `Numeric`   | two fractional digits (`5` → `5.00`)     |
//! | `Text`      | trimmed                                  |
//!
//! Numbers recognised inside text cells are reformatted as well, so an
//! all-digit code such as `"1234"` becomes `"1234.00"`. Fields that must keep
//! their literal form go through [`normalize_identifier`] instead.

use crate::types::CellValue;

/// Day-month-year with four-digit year.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Render a cell as canonical display text. Never fails.
pub fn normalize(value: &CellValue) -> String {
    match value {
        CellValue::Missing => String::new(),
        CellValue::Temporal(dt) => dt.format(DATE_FORMAT).to_string(),
        CellValue::Numeric { value, .. } => format!("{value:.2}"),
        CellValue::Text(s) => s.trim().to_owned(),
    }
}

/// Render a cell verbatim, for identifier-typed fields.
///
/// Numbers read from text keep their literal; integral numbers drop the
/// fraction; everything else matches [`normalize`].
pub fn normalize_identifier(value: &CellValue) -> String {
    match value {
        CellValue::Numeric { literal: Some(lit), .. } => lit.clone(),
        CellValue::Numeric { value, literal: None }
            if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 =>
        {
            format!("{value:.0}")
        }
        other => normalize(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> CellValue {
        CellValue::Temporal(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(13, 45, 0)
                .unwrap(),
        )
    }

    #[rstest]
    #[case(CellValue::Missing, "")]
    #[case(CellValue::from_text(""), "")]
    #[case(CellValue::number(5.0), "5.00")]
    #[case(CellValue::from_text("3.14159"), "3.14")]
    #[case(CellValue::from_text(" 42 "), "42.00")]
    #[case(CellValue::from_text("1234"), "1234.00")]
    #[case(CellValue::from_text("-0.5"), "-0.50")]
    #[case(CellValue::from_text("1e3"), "1000.00")]
    #[case(CellValue::from_text("  Pune North  "), "Pune North")]
    #[case(CellValue::from_text("WO-17"), "WO-17")]
    #[case(CellValue::from_text("   "), "")]
    fn normalize_cases(#[case] input: CellValue, #[case] expected: &str) {
        assert_eq!(normalize(&input), expected);
    }

    #[rstest]
    #[case(2024, 3, 7, "07-03-2024")]
    #[case(1999, 12, 31, "31-12-1999")]
    #[case(2025, 1, 1, "01-01-2025")]
    fn dates_are_day_month_year(
        #[case] y: i32,
        #[case] m: u32,
        #[case] d: u32,
        #[case] expected: &str,
    ) {
        assert_eq!(normalize(&date(y, m, d)), expected);
    }

    #[test]
    fn numeric_output_has_exactly_two_decimals() {
        for raw in ["0", "7", "2.5", "99.999", "-13.3333", "100000.004"] {
            let out = normalize(&CellValue::from_text(raw));
            let (_, frac) = out.split_once('.').expect("decimal point");
            assert_eq!(frac.len(), 2, "{raw} -> {out}");
        }
    }

    #[test]
    fn renormalizing_numeric_output_is_stable() {
        for raw in ["5", "3.14159", "0.1", "-2.675", "1e2"] {
            let once = normalize(&CellValue::from_text(raw));
            let twice = normalize(&CellValue::from_text(&once));
            assert_eq!(once, twice, "{raw}");
        }
    }

    #[test]
    fn identifier_keeps_literal_and_drops_integral_fraction() {
        assert_eq!(normalize_identifier(&CellValue::from_text(" 0042 ")), "0042");
        assert_eq!(normalize_identifier(&CellValue::number(1234.0)), "1234");
        assert_eq!(normalize_identifier(&CellValue::number(12.5)), "12.50");
        assert_eq!(normalize_identifier(&CellValue::from_text(" WO-9 ")), "WO-9");
        assert_eq!(normalize_identifier(&CellValue::Missing), "");
    }
}
