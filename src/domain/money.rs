use thiserror::Error;

use super::AccountNumber;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 50.00 = 5000 cents.
pub type Cents = i64;

/// A sum of amounts left the range of `Cents`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountOverflow {
    #[error("Total for account {0} does not fit in 64-bit cents")]
    Account(AccountNumber),

    #[error("Grand total does not fit in 64-bit cents")]
    Total,
}

/// Format cents as a decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Sum optional amounts, counting absent ones as zero.
/// Returns `None` if the total does not fit in `Cents`.
pub fn sum_amounts<I>(amounts: I) -> Option<Cents>
where
    I: IntoIterator<Item = Option<Cents>>,
{
    amounts
        .into_iter()
        .try_fold(0, |acc: Cents, amount| acc.checked_add(amount.unwrap_or(0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
        assert_eq!(format_cents(Cents::MIN), "-92233720368547758.08");
    }

    #[test]
    fn test_sum_amounts_treats_absent_as_zero() {
        assert_eq!(sum_amounts([Some(50), None, Some(-20)]), Some(30));
        assert_eq!(sum_amounts(std::iter::empty()), Some(0));
    }

    #[test]
    fn test_sum_amounts_detects_overflow() {
        assert_eq!(sum_amounts([Some(Cents::MAX), Some(1)]), None);
        assert_eq!(sum_amounts([Some(Cents::MIN), Some(-1)]), None);
        assert_eq!(sum_amounts([Some(Cents::MAX), Some(-1), Some(1)]), Some(Cents::MAX));
    }
}
