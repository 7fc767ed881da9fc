use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// A parsed number format.
///
/// Two notations are understood:
/// - digit groups, e.g. `({3}) {3}-{4}`: every `{n}` consumes the next `n`
///   digits of the input, everything else is copied literally;
/// - decimal patterns, e.g. `#,##0.00`: `0` is a mandatory digit, `#` an
///   optional one, `,` marks the grouping size and `.` the fraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberPattern {
    DigitGroups(Vec<PatternPart>),
    Decimal(DecimalPattern),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternPart {
    Literal(String),
    Digits(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalPattern {
    pub grouping: Option<usize>,
    pub min_integer: usize,
    pub min_fraction: usize,
    pub max_fraction: u32,
}

impl NumberPattern {
    pub fn parse(pattern: &str) -> Option<Self> {
        if pattern.contains('{') {
            parse_digit_groups(pattern).map(NumberPattern::DigitGroups)
        } else {
            parse_decimal(pattern).map(NumberPattern::Decimal)
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            NumberPattern::DigitGroups(parts) => apply_digit_groups(parts, value),
            NumberPattern::Decimal(pattern) => pattern.apply(value),
        }
    }
}

fn parse_digit_groups(pattern: &str) -> Option<Vec<PatternPart>> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars();

    while let Some(ch) = chars.next() {
        if ch != '{' {
            literal.push(ch);
            continue;
        }

        let mut count = String::new();
        let mut closed = false;
        for inner in chars.by_ref() {
            if inner == '}' {
                closed = true;
                break;
            }
            count.push(inner);
        }
        if !closed {
            return None;
        }

        let count: usize = count.parse().ok().filter(|count| *count > 0)?;
        if !literal.is_empty() {
            parts.push(PatternPart::Literal(std::mem::take(&mut literal)));
        }
        parts.push(PatternPart::Digits(count));
    }

    if !literal.is_empty() {
        parts.push(PatternPart::Literal(literal));
    }
    // Groups whose sizes overflow can never be filled
    digit_total(&parts)?;
    Some(parts)
}

/// Digits needed to fill every group, or `None` when the sum overflows
fn digit_total(parts: &[PatternPart]) -> Option<usize> {
    parts.iter().try_fold(0usize, |total, part| match part {
        PatternPart::Digits(count) => total.checked_add(*count),
        PatternPart::Literal(_) => Some(total),
    })
}

fn apply_digit_groups(parts: &[PatternPart], value: &str) -> String {
    let Some(expected) = digit_total(parts) else {
        return value.to_string();
    };

    let mut digits: String = value.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    digits.truncate(expected);

    // Not enough digits yet to fill every group
    if digits.len() < expected {
        return value.to_string();
    }

    let mut out = String::new();
    let mut remaining = digits.as_str();
    for part in parts {
        match part {
            PatternPart::Literal(text) => out.push_str(text),
            PatternPart::Digits(count) => {
                let (head, tail) = remaining.split_at(*count);
                out.push_str(head);
                remaining = tail;
            }
        }
    }
    out
}

fn parse_decimal(pattern: &str) -> Option<DecimalPattern> {
    if pattern.is_empty() || !pattern.chars().all(|ch| matches!(ch, '#' | '0' | ',' | '.')) {
        return None;
    }

    let (integer, fraction) = pattern.split_once('.').unwrap_or((pattern, ""));
    if fraction.contains(['.', ',']) || !integer.contains(['#', '0']) {
        return None;
    }

    let grouping = match integer.rfind(',') {
        Some(position) => {
            let size = integer.len() - position - 1;
            if size == 0 {
                return None;
            }
            Some(size)
        }
        None => None,
    };

    Some(DecimalPattern {
        grouping,
        min_integer: integer.chars().filter(|ch| *ch == '0').count(),
        min_fraction: fraction.chars().filter(|ch| *ch == '0').count(),
        max_fraction: fraction.len() as u32,
    })
}

impl DecimalPattern {
    pub fn apply(&self, value: &str) -> String {
        let trimmed = value.trim();
        let negative = trimmed.starts_with('-');

        let mut cleaned = String::new();
        let mut seen_point = false;
        for ch in trimmed.chars() {
            if ch.is_ascii_digit() {
                cleaned.push(ch);
            } else if ch == '.' && !seen_point {
                seen_point = true;
                cleaned.push(ch);
            }
        }

        let cleaned = cleaned.trim_end_matches('.');
        if !cleaned.chars().any(|ch| ch.is_ascii_digit()) {
            return value.to_string();
        }
        let normalized = if cleaned.starts_with('.') {
            format!("0{cleaned}")
        } else {
            cleaned.to_string()
        };

        let Ok(number) = Decimal::from_str(&normalized) else {
            return value.to_string();
        };
        let rounded =
            number.round_dp_with_strategy(self.max_fraction, RoundingStrategy::MidpointAwayFromZero);

        let text = rounded.to_string();
        let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut fraction = fraction.to_string();
        while fraction.len() > self.min_fraction && fraction.ends_with('0') {
            fraction.pop();
        }
        while fraction.len() < self.min_fraction {
            fraction.push('0');
        }

        let mut integer = integer.trim_start_matches('0').to_string();
        while integer.len() < self.min_integer {
            integer.insert(0, '0');
        }
        if integer.is_empty() && fraction.is_empty() {
            integer.push('0');
        }

        let mut out = String::new();
        if negative && !rounded.is_zero() {
            out.push('-');
        }
        match self.grouping {
            Some(size) => out.push_str(&group_digits(&integer, size)),
            None => out.push_str(&integer),
        }
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(&fraction);
        }
        out
    }
}

fn group_digits(integer: &str, size: usize) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / size);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (len - index) % size == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
