//! Time budget requested by the user

use crate::error::BudgetError;
use std::fmt;
use std::str::FromStr;

/// Unit a budget amount is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    pub fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Hours => 3600.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Seconds => 1.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(TimeUnit::Hours),
            "m" | "min" | "mins" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            other => Err(BudgetError::UnknownUnit(other.to_string())),
        }
    }
}

/// Target cumulative audio duration, in seconds
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Budget(f64);

impl Budget {
    /// Raw seconds, not validated. The selector treats anything non-positive as empty.
    pub fn from_secs(seconds: f64) -> Self {
        Self(seconds)
    }

    pub fn from_unit(amount: f64, unit: TimeUnit) -> Result<Self, BudgetError> {
        if amount.is_nan() || amount <= 0.0 {
            return Err(BudgetError::NotPositive(amount));
        }
        let seconds = amount * unit.seconds();
        if !seconds.is_finite() {
            return Err(BudgetError::TooLarge(amount));
        }
        Ok(Self(seconds))
    }

    /// Parse free text such as `1.5h`, `90 min`, `3600s` or `2 hours`.
    ///
    /// A bare number is read as hours.
    pub fn parse(text: &str) -> Result<Self, BudgetError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BudgetError::Empty);
        }

        let split = text
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (number, unit) = text.split_at(split);

        let amount: f64 = number
            .trim()
            .parse()
            .map_err(|_| BudgetError::NotANumber(number.trim().to_string()))?;

        let unit = if unit.trim().is_empty() {
            TimeUnit::Hours
        } else {
            unit.parse()?
        };

        Self::from_unit(amount, unit)
    }

    pub fn as_secs(&self) -> f64 {
        self.0
    }

    /// True when there is something to select at all
    pub fn is_positive(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}

impl FromStr for Budget {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Budget::parse(s)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_duration(self.0))
    }
}

/// Human-readable duration, e.g. `1h 2m 3s`
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.round() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(Budget::parse("1.5h").unwrap().as_secs(), 5400.0);
        assert_eq!(Budget::parse("90m").unwrap().as_secs(), 5400.0);
        assert_eq!(Budget::parse("90 min").unwrap().as_secs(), 5400.0);
        assert_eq!(Budget::parse("2 hours").unwrap().as_secs(), 7200.0);
        assert_eq!(Budget::parse("45s").unwrap().as_secs(), 45.0);
        assert_eq!(Budget::parse(" 2 ").unwrap().as_secs(), 7200.0);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(Budget::parse(""), Err(BudgetError::Empty));
        assert_eq!(Budget::parse("0h"), Err(BudgetError::NotPositive(0.0)));
        assert_eq!(Budget::parse("-3m"), Err(BudgetError::NotPositive(-3.0)));
        assert_eq!(
            Budget::parse("two hours"),
            Err(BudgetError::NotANumber(String::new()))
        );
        assert_eq!(
            Budget::parse("3 days"),
            Err(BudgetError::UnknownUnit("days".to_string()))
        );
    }

    #[test]
    fn test_overflowing_amount_is_too_large() {
        assert_eq!(
            Budget::from_unit(1e306, TimeUnit::Hours),
            Err(BudgetError::TooLarge(1e306))
        );
        let huge = format!("1{}", "0".repeat(310));
        assert!(matches!(
            Budget::parse(&format!("{}m", huge)),
            Err(BudgetError::TooLarge(_))
        ));
        assert!(Budget::from_unit(1e300, TimeUnit::Seconds).is_ok());
    }

    #[test]
    fn test_from_secs_is_unchecked() {
        assert!(!Budget::from_secs(0.0).is_positive());
        assert!(!Budget::from_secs(-1.0).is_positive());
        assert!(!Budget::from_secs(f64::NAN).is_positive());
        assert!(Budget::from_secs(0.5).is_positive());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0s");
        assert_eq!(format_duration(59.4), "59s");
        assert_eq!(format_duration(61.0), "1m 1s");
        assert_eq!(format_duration(3723.0), "1h 2m 3s");
        assert_eq!(Budget::parse("1.5h").unwrap().to_string(), "1h 30m 0s");
    }
}
