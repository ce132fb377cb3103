// SPDX-License-Identifier: Apache-2.0

//! Parser for the benchmark stdout contract.
//!
//! Benchmarks emit one informative line of whitespace-separated
//! `key=value` tokens. The only required key is `per_second`; every
//! other key is optional and retained for forward compatibility.

use std::collections::HashMap;

use crate::error::{HarnessError, HarnessResult};

/// Key carrying the measured throughput.
pub const PER_SECOND_KEY: &str = "per_second";

/// Key carrying the library version string, when present.
pub const VERSION_KEY: &str = "version";

/// One parsed benchmark result line.
///
/// Immutable once parsed; no identity beyond its values.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkRecord {
    fields: HashMap<String, String>,
    per_second: f64,
}

impl BenchmarkRecord {
    /// Parse one line of benchmark output.
    ///
    /// Tokens without `=` are ignored, not rejected. Unknown keys are
    /// kept. Fails with `MalformedOutput` when no `per_second` token is
    /// present, and with `InvalidRate` when its value is not a
    /// non-negative number.
    pub fn parse(line: &str) -> HarnessResult<Self> {
        let mut fields = HashMap::new();
        for token in line.split_whitespace() {
            if let Some((key, value)) = token.split_once('=') {
                fields.insert(key.to_string(), value.to_string());
            }
        }

        let raw = fields
            .get(PER_SECOND_KEY)
            .ok_or_else(|| HarnessError::MalformedOutput {
                line: line.trim().to_string(),
            })?;

        let per_second: f64 = raw.parse().map_err(|_| HarnessError::InvalidRate {
            value: raw.clone(),
        })?;
        if !per_second.is_finite() || per_second < 0.0 {
            return Err(HarnessError::InvalidRate { value: raw.clone() });
        }

        Ok(Self { fields, per_second })
    }

    /// Measured throughput in operations per second.
    pub fn per_second(&self) -> f64 {
        self.per_second
    }

    /// Library version string, if the benchmark reported one.
    pub fn version(&self) -> Option<&str> {
        self.fields.get(VERSION_KEY).map(String::as_str)
    }

    /// Raw value of an arbitrary field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Number of well-formed `key=value` tokens retained.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_line() {
        let record = BenchmarkRecord::parse("per_second=1234.5").unwrap();
        assert_eq!(record.per_second(), 1234.5);
        assert_eq!(record.version(), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_parse_full_line() {
        let record =
            BenchmarkRecord::parse("name=timer_bench iterations=200000 per_second=81234.7 version=4.33")
                .unwrap();
        assert_eq!(record.per_second(), 81234.7);
        assert_eq!(record.version(), Some("4.33"));
        assert_eq!(record.get("name"), Some("timer_bench"));
        assert_eq!(record.get("iterations"), Some("200000"));
    }

    #[test]
    fn test_unknown_keys_are_retained() {
        let record = BenchmarkRecord::parse("per_second=10 future_field=abc").unwrap();
        assert_eq!(record.get("future_field"), Some("abc"));
    }

    #[test]
    fn test_tokens_without_equals_are_ignored() {
        let record = BenchmarkRecord::parse("warmup done per_second=42").unwrap();
        assert_eq!(record.per_second(), 42.0);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_value_may_contain_equals() {
        // Only the first '=' splits key from value.
        let record = BenchmarkRecord::parse("per_second=5 note=a=b").unwrap();
        assert_eq!(record.get("note"), Some("a=b"));
    }

    #[test]
    fn test_per_second_string_preserved_exactly() {
        let record = BenchmarkRecord::parse("per_second=0700.50").unwrap();
        assert_eq!(record.get(PER_SECOND_KEY), Some("0700.50"));
        assert_eq!(record.per_second(), 700.5);
    }

    #[test]
    fn test_missing_per_second_is_malformed() {
        let err = BenchmarkRecord::parse("iterations=1000 version=4.33").unwrap_err();
        assert!(matches!(err, HarnessError::MalformedOutput { .. }));
    }

    #[test]
    fn test_empty_line_is_malformed() {
        assert!(matches!(
            BenchmarkRecord::parse(""),
            Err(HarnessError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn test_zero_rate_is_valid() {
        let record = BenchmarkRecord::parse("per_second=0").unwrap();
        assert_eq!(record.per_second(), 0.0);
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        assert!(matches!(
            BenchmarkRecord::parse("per_second=-1"),
            Err(HarnessError::InvalidRate { .. })
        ));
    }

    #[test]
    fn test_non_numeric_rate_is_rejected() {
        assert!(matches!(
            BenchmarkRecord::parse("per_second=fast"),
            Err(HarnessError::InvalidRate { .. })
        ));
    }
}
