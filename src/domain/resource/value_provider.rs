use std::collections::HashSet;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternPart {
    Literal(String),
    /// Fixed-width run of decimal digits.
    Digits(u32),
}

/// A value pattern such as `950{digit:3}`, which expands to `950000` ... `950999`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuePattern {
    source: String,
    parts: Vec<PatternPart>,
}

impl ValuePattern {
    /// Parses a pattern. Supported placeholders: `{digit:N}` with `1 <= N <= 18`.
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after_open = &rest[open + 1..];
            let close = after_open
                .find('}')
                .ok_or_else(|| Error::InvalidValuePattern(pattern.to_string(), "unterminated placeholder".to_string()))?;
            let placeholder = &after_open[..close];
            let width = placeholder
                .strip_prefix("digit:")
                .and_then(|width| width.parse::<u32>().ok())
                .filter(|width| (1..=18).contains(width))
                .ok_or_else(|| Error::InvalidValuePattern(pattern.to_string(), format!("unsupported placeholder '{{{}}}'", placeholder)))?;

            if !literal.is_empty() {
                parts.push(PatternPart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(PatternPart::Digits(width));
            rest = &after_open[close + 1..];
        }
        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(PatternPart::Literal(literal));
        }
        if parts.is_empty() {
            return Err(Error::InvalidValuePattern(pattern.to_string(), "pattern is empty".to_string()));
        }

        Ok(Self { source: pattern.to_string(), parts })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of distinct values the pattern expands to.
    pub fn capacity(&self) -> u64 {
        self.parts.iter().fold(1u64, |acc, part| match part {
            PatternPart::Literal(_) => acc,
            PatternPart::Digits(width) => acc.saturating_mul(10u64.saturating_pow(*width)),
        })
    }

    /// Value at position `index` of the expansion. The last placeholder varies fastest.
    fn value_at(&self, mut index: u64) -> String {
        let mut digits: Vec<String> = Vec::new();
        for part in self.parts.iter().rev() {
            if let PatternPart::Digits(width) = part {
                let radix = 10u64.saturating_pow(*width);
                digits.push(format!("{:0width$}", index % radix, width = *width as usize));
                index /= radix;
            }
        }

        let mut value = String::new();
        for part in &self.parts {
            match part {
                PatternPart::Literal(text) => value.push_str(text),
                PatternPart::Digits(_) => value.push_str(&digits.pop().unwrap_or_default()),
            }
        }
        value
    }

    pub fn values(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.capacity()).map(move |index| self.value_at(index))
    }

    pub fn matches(&self, value: &str) -> bool {
        let mut rest = value;
        for part in &self.parts {
            match part {
                PatternPart::Literal(text) => match rest.strip_prefix(text.as_str()) {
                    Some(remaining) => rest = remaining,
                    None => return false,
                },
                PatternPart::Digits(width) => {
                    let width = *width as usize;
                    if rest.len() < width || !rest.as_bytes()[..width].iter().all(|b| b.is_ascii_digit()) {
                        return false;
                    }
                    rest = &rest[width..];
                }
            }
        }
        rest.is_empty()
    }
}

/// Source of unique values (numbers, names) for alias providers.
///
/// Values are handed out in pattern order, the first free value wins. A requested value has to
/// match one of the patterns unless `allow_any_requested_value` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueProvider {
    patterns: Vec<ValuePattern>,
    allow_any_requested_value: bool,
}

impl ValueProvider {
    pub fn new(patterns: Vec<ValuePattern>, allow_any_requested_value: bool) -> Self {
        Self { patterns, allow_any_requested_value }
    }

    pub fn from_patterns(patterns: &[String], allow_any_requested_value: bool) -> Result<Self> {
        let patterns = patterns.iter().map(|pattern| ValuePattern::parse(pattern)).collect::<Result<Vec<_>>>()?;
        Ok(Self::new(patterns, allow_any_requested_value))
    }

    pub fn patterns(&self) -> &[ValuePattern] {
        &self.patterns
    }

    pub fn capacity(&self) -> u64 {
        self.patterns.iter().fold(0u64, |acc, pattern| acc.saturating_add(pattern.capacity()))
    }

    pub fn values(&self) -> impl Iterator<Item = String> + '_ {
        self.patterns.iter().flat_map(|pattern| pattern.values())
    }

    /// Returns `true` if `value` may be requested from this provider.
    pub fn accepts(&self, value: &str) -> bool {
        self.allow_any_requested_value || self.patterns.iter().any(|pattern| pattern.matches(value))
    }

    /// First value (in pattern order) not contained in `used`.
    pub fn first_free(&self, used: &HashSet<String>) -> Option<String> {
        self.values().find(|value| !used.contains(value))
    }
}
