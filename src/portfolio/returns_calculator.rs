use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::properties::Candle;

const HUNDRED: Decimal = dec!(100);

/// Price movement between the last two samples, as a percentage of the older
/// one. Zero when fewer than two samples exist (boundary, not an error).
pub fn change_percent_24h(candles: &[Candle]) -> Decimal {
    match candles {
        [.., second_last, last] if !second_last.price.is_zero() => {
            (last.price - second_last.price) / second_last.price * HUNDRED
        }
        _ => Decimal::ZERO,
    }
}

/// Absolute price movement between the last two samples
pub fn change_24h(candles: &[Candle]) -> Decimal {
    match candles {
        [.., second_last, last] => last.price - second_last.price,
        _ => Decimal::ZERO,
    }
}

/// One-day return on a holding of `quantity` shares: absolute and percentage.
/// Both zero when fewer than two samples exist.
pub fn one_day_return(candles: &[Candle], quantity: Decimal) -> (Decimal, Decimal) {
    (change_24h(candles) * quantity, change_percent_24h(candles))
}

/// Return since the first recorded sample: absolute (scaled by the held
/// quantity) and percentage. Both zero when fewer than two samples exist.
pub fn total_return(candles: &[Candle], quantity: Decimal) -> (Decimal, Decimal) {
    match candles {
        [first, .., last] => {
            let delta = last.price - first.price;
            let percent = if first.price.is_zero() {
                Decimal::ZERO
            } else {
                delta / first.price * HUNDRED
            };
            (delta * quantity, percent)
        }
        _ => (Decimal::ZERO, Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn candles(prices: &[Decimal]) -> Vec<Candle> {
        let start = Utc::now().naive_utc();
        prices
            .iter()
            .enumerate()
            .map(|(i, price)| Candle {
                sampled_at: start + Duration::days(i as i64),
                price: *price,
            })
            .collect()
    }

    #[test]
    fn change_percent_uses_last_two_samples() {
        let series = candles(&[dec!(80), dec!(100), dec!(110)]);
        assert_eq!(change_percent_24h(&series), dec!(10));
        assert_eq!(change_24h(&series), dec!(10));
    }

    #[test]
    fn short_series_yields_zero_change() {
        assert_eq!(change_percent_24h(&[]), Decimal::ZERO);
        let single = candles(&[dec!(100)]);
        assert_eq!(change_percent_24h(&single), Decimal::ZERO);
        assert_eq!(change_24h(&single), Decimal::ZERO);
    }

    #[test]
    fn zero_baseline_price_does_not_divide() {
        let series = candles(&[dec!(0), dec!(50)]);
        assert_eq!(change_percent_24h(&series), Decimal::ZERO);
        let (_, total_percent) = total_return(&series, dec!(1));
        assert_eq!(total_percent, Decimal::ZERO);
    }

    #[test]
    fn one_day_return_scales_by_quantity() {
        let series = candles(&[dec!(100), dec!(110)]);
        let (abs, percent) = one_day_return(&series, dec!(3));
        assert_eq!(abs, dec!(30));
        assert_eq!(percent, dec!(10));
    }

    #[test]
    fn total_return_compares_first_and_last() {
        let series = candles(&[dec!(50), dec!(80), dec!(75)]);
        let (abs, percent) = total_return(&series, dec!(2));
        assert_eq!(abs, dec!(50));
        assert_eq!(percent, dec!(50));
    }

    #[test]
    fn total_return_on_short_series_is_zero() {
        let single = candles(&[dec!(100)]);
        assert_eq!(total_return(&single, dec!(5)), (Decimal::ZERO, Decimal::ZERO));
    }
}
