// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use super::exchange_rates::RateTable;
use crate::error::ConvertError;

pub const DEFAULT_AMOUNT: f64 = 1.0;

/// Significant fraction digits used when grouping numbers for display.
const DISPLAY_FRACTION_DIGITS: usize = 3;

/// Amount as typed, and the value actually used for conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAmount {
    pub value: f64,
    /// Text the amount input should show afterwards.
    pub display: String,
}

/// Parse user input into a positive amount.
///
/// A leading numeric prefix is accepted ("12abc" is 12) and the input is
/// rewritten to that number. Anything that does not yield a positive finite
/// number becomes 1. Input that parses as a whole keeps its text.
pub fn normalize_amount(input: &str) -> NormalizedAmount {
    let trimmed = input.trim();
    match leading_number(trimmed) {
        Some(value) if value.is_finite() && value > 0.0 => NormalizedAmount {
            value,
            // "12." parses as a whole, so partial decimals keep their text
            display: if trimmed.parse::<f64>().is_ok() {
                trimmed.to_string()
            } else {
                value.to_string()
            },
        },
        _ => NormalizedAmount {
            value: DEFAULT_AMOUNT,
            display: DEFAULT_AMOUNT.to_string(),
        },
    }
}

fn leading_number(input: &str) -> Option<f64> {
    let boundaries = input
        .char_indices()
        .map(|(i, _)| i)
        .skip(1)
        .chain(std::iter::once(input.len()));
    let ends: Vec<usize> = boundaries.collect();

    ends.into_iter()
        .rev()
        .find_map(|end| input[..end].parse::<f64>().ok())
        // "inf"/"nan" parse in Rust but are not amounts
        .filter(|value| !value.is_nan())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: &'static str,
    pub to: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub amount: f64,
    pub from: &'static str,
    pub to: &'static str,
    /// `amount * rate`, rounded to 4 fractional digits.
    pub converted_amount: f64,
    /// Rate for one unit of `from`, rounded to 6 fractional digits.
    pub unit_rate: f64,
}

impl ConversionResult {
    /// "10 USD = 831.2 INR"
    pub fn amount_line(&self) -> String {
        format!(
            "{} {} = {} {}",
            format_grouped(self.amount),
            self.from,
            format_grouped(self.converted_amount),
            self.to
        )
    }

    /// "1 USD = 83.120000 INR"
    pub fn rate_line(&self) -> String {
        format!("1 {} = {:.6} {}", self.from, self.unit_rate, self.to)
    }
}

pub fn present(request: &ConversionRequest, rates: &RateTable) -> Result<ConversionResult, ConvertError> {
    let rate = rates
        .rate(request.to)
        .ok_or_else(|| ConvertError::MissingRate {
            base: rates.base.clone(),
            target: request.to.to_string(),
        })?;

    Ok(ConversionResult {
        amount: request.amount,
        from: request.from,
        to: request.to,
        converted_amount: round_to(request.amount * rate, 4),
        unit_rate: round_to(rate, 6),
    })
}

pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

/// Group the integer part with commas and keep at most three fraction
/// digits, trailing zeros dropped ("1234567.891" -> "1,234,567.891").
pub fn format_grouped(value: f64) -> String {
    let fixed = format!("{:.*}", DISPLAY_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn table(base: &str, pairs: &[(&str, f64)]) -> RateTable {
        let rates: HashMap<String, f64> = pairs.iter().map(|(c, r)| (c.to_string(), *r)).collect();
        RateTable::new(base, rates)
    }

    #[test]
    fn test_usd_to_inr_scenario() {
        let request = ConversionRequest { amount: 10.0, from: "USD", to: "INR" };
        let result = present(&request, &table("USD", &[("INR", 83.12)])).unwrap();

        assert_relative_eq!(result.converted_amount, 831.2, epsilon = 1e-9);
        assert_relative_eq!(result.unit_rate, 83.12, epsilon = 1e-9);
        assert_eq!(result.amount_line(), "10 USD = 831.2 INR");
        assert_eq!(result.rate_line(), "1 USD = 83.120000 INR");
    }

    #[test]
    fn test_present_rounds() {
        let amounts = [0.5, 1.0, 3.3333, 250.0, 99_999.99];
        let rates = [0.0068, 1.08, 83.123456789, 149.5];
        for amount in amounts {
            for rate in rates {
                let request = ConversionRequest { amount, from: "EUR", to: "JPY" };
                let result = present(&request, &table("EUR", &[("JPY", rate)])).unwrap();
                assert_eq!(result.converted_amount, round_to(amount * rate, 4));
                assert_eq!(result.unit_rate, round_to(rate, 6));
            }
        }
    }

    #[test]
    fn test_missing_rate() {
        let request = ConversionRequest { amount: 1.0, from: "USD", to: "INR" };
        let err = present(&request, &table("USD", &[("EUR", 0.92)])).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MissingRate { base: "USD".to_string(), target: "INR".to_string() }
        );
    }

    #[test]
    fn test_normalize_amount() {
        let negative = normalize_amount("-5");
        assert_eq!(negative.value, 1.0);
        assert_eq!(negative.display, "1");

        assert_eq!(normalize_amount("").value, 1.0);
        assert_eq!(normalize_amount("abc").display, "1");
        assert_eq!(normalize_amount("0").value, 1.0);
        assert_eq!(normalize_amount("inf").value, 1.0);

        let typed = normalize_amount("12.");
        assert_eq!(typed.value, 12.0);
        assert_eq!(typed.display, "12.");

        let prefixed = normalize_amount("12abc");
        assert_eq!(prefixed.value, 12.0);
        assert_eq!(prefixed.display, "12");

        let grouped = normalize_amount("1,000");
        assert_eq!(grouped.value, 1.0);
        assert_eq!(grouped.display, "1");

        let trailing_sign = normalize_amount("10-");
        assert_eq!(trailing_sign.value, 10.0);
        assert_eq!(trailing_sign.display, "10");

        assert_eq!(normalize_amount("1e3").display, "1e3");
        assert_eq!(normalize_amount(" 2.50 ").display, "2.50");
        assert_eq!(normalize_amount(" 2.5 ").value, 2.5);
        assert_eq!(normalize_amount(".5").value, 0.5);
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(10.0), "10");
        assert_eq!(format_grouped(831.2), "831.2");
        assert_eq!(format_grouped(1234567.891), "1,234,567.891");
        assert_eq!(format_grouped(1000.0), "1,000");
        assert_eq!(format_grouped(0.12345), "0.123");
        assert_eq!(format_grouped(999.9996), "1,000");
        assert_eq!(format_grouped(-1234.5), "-1,234.5");
        assert_eq!(format_grouped(-0.0001), "0");
    }
}
