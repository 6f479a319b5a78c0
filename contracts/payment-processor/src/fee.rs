//! Platform fee arithmetic.

use crate::error::ProcessorError;

/// Splits `amount` into `(fee, net)` at `fee_bps / max_bps`.
///
/// The fee is truncated toward zero and `net` is its exact complement, so
/// `fee + net == amount` always holds. `fee_bps <= max_bps` is enforced when
/// the rate is configured, not here.
pub fn split(amount: i128, fee_bps: u32, max_bps: u32) -> Result<(i128, i128), ProcessorError> {
    if amount < 0 || max_bps == 0 {
        return Err(ProcessorError::InvalidAmount);
    }
    let fee = amount
        .checked_mul(fee_bps as i128)
        .ok_or(ProcessorError::InvalidAmount)?
        / max_bps as i128;
    Ok((fee, amount - fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MAX_BPS;
    use proptest::prelude::*;

    #[test]
    fn test_two_percent_of_hundred_units() {
        let amount = 100_000_000; // 100 units at 6 decimals
        assert_eq!(split(amount, 2_000, MAX_BPS), Ok((2_000_000, 98_000_000)));
    }

    #[test]
    fn test_fee_truncates_toward_zero() {
        // 1 * 1 / 100_000 = 0.00001
        assert_eq!(split(1, 1, MAX_BPS), Ok((0, 1)));
        assert_eq!(split(99_999, 1, MAX_BPS), Ok((0, 99_999)));
        assert_eq!(split(100_001, 1, MAX_BPS), Ok((1, 100_000)));
    }

    #[test]
    fn test_zero_and_full_rate() {
        assert_eq!(split(12_345, 0, MAX_BPS), Ok((0, 12_345)));
        assert_eq!(split(12_345, MAX_BPS, MAX_BPS), Ok((12_345, 0)));
    }

    #[test]
    fn test_overflow_is_rejected() {
        assert_eq!(
            split(i128::MAX, MAX_BPS, MAX_BPS),
            Err(ProcessorError::InvalidAmount)
        );
    }

    proptest! {
        #[test]
        fn fee_and_net_sum_to_amount(
            amount in 0i128..=1_000_000_000_000_000_000,
            fee_bps in 0u32..=MAX_BPS,
        ) {
            let (fee, net) = split(amount, fee_bps, MAX_BPS).unwrap();
            prop_assert_eq!(fee + net, amount);
            prop_assert!(fee >= 0 && net >= 0);
            prop_assert!(fee <= amount);
        }

        #[test]
        fn fee_is_monotonic_in_rate(
            amount in 0i128..=1_000_000_000_000_000,
            low in 0u32..=MAX_BPS,
            high in 0u32..=MAX_BPS,
        ) {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            let (fee_low, _) = split(amount, low, MAX_BPS).unwrap();
            let (fee_high, _) = split(amount, high, MAX_BPS).unwrap();
            prop_assert!(fee_low <= fee_high);
        }
    }
}
