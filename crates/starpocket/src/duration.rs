//! Parsing of Go-style duration strings such as `1h30m` or `90s`.

use std::time::Duration;

use snafu::{OptionExt as _, Snafu, ensure};

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum FrequencyParseError {
    #[snafu(display("Duration is empty"))]
    Empty,
    #[snafu(display("Invalid number in duration {input:?}"))]
    InvalidNumber { input: String },
    #[snafu(display("Missing unit in duration {input:?}"))]
    MissingUnit { input: String },
    #[snafu(display("Unknown unit {unit:?} in duration {input:?}"))]
    UnknownUnit { input: String, unit: String },
    #[snafu(display("Duration {input:?} is not positive"))]
    NotPositive { input: String },
    #[snafu(display("Duration {input:?} is too large"))]
    Overflow { input: String },
}

pub type FrequencyParseResult<T> = std::result::Result<T, FrequencyParseError>;

const NANOS_PER_UNIT: &[(&str, f64)] = &[
    ("ns", 1.0),
    ("us", 1e3),
    ("µs", 1e3),
    ("μs", 1e3),
    ("ms", 1e6),
    ("s", 1e9),
    ("m", 60e9),
    ("h", 3600e9),
];

/// Parse a sequence of `<decimal><unit>` terms and sum them.
///
/// A sign is rejected, and so is a total of zero: a schedule period has to be
/// positive.
pub fn parse_frequency(input: &str) -> FrequencyParseResult<Duration> {
    let trimmed = input.trim();
    ensure!(!trimmed.is_empty(), EmptySnafu);
    ensure!(
        !trimmed.starts_with(['-', '+']),
        NotPositiveSnafu { input }
    );

    let mut rest = trimmed;
    let mut total_nanos = 0f64;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, tail) = rest.split_at(number_len);
        ensure!(
            !number.is_empty() && number != ".",
            InvalidNumberSnafu { input }
        );
        let value: f64 = number
            .parse()
            .ok()
            .context(InvalidNumberSnafu { input })?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        ensure!(!unit.is_empty(), MissingUnitSnafu { input });
        let (_, nanos_per_unit) = NANOS_PER_UNIT
            .iter()
            .find(|(name, _)| *name == unit)
            .context(UnknownUnitSnafu { input, unit })?;

        total_nanos += value * nanos_per_unit;
        rest = tail;
    }

    ensure!(total_nanos < u64::MAX as f64, OverflowSnafu { input });
    let nanos = total_nanos.round() as u64;
    ensure!(0 < nanos, NotPositiveSnafu { input });

    Ok(Duration::from_nanos(nanos))
}
