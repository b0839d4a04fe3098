//! Shared position sizing.

use rust_decimal::Decimal;
use warden_core::{Price, Qty};

/// Fraction of equity a single entry may risk.
const EQUITY_FRACTION: Decimal = Decimal::from_parts(2, 0, 0, false, 2); // 0.02

/// Size an entry: `max(1, floor(min(max_notional, 0.02 × equity) / price))`.
///
/// Returns zero when the price is not positive; the engines treat that as
/// untradeable rather than guessing a share count.
pub fn position_qty(equity: Decimal, max_notional: Decimal, price: Price) -> Qty {
    if !price.is_positive() {
        return Qty::ZERO;
    }
    let budget = max_notional.min(EQUITY_FRACTION * equity);
    let shares = (budget / price.inner()).floor();
    Qty::new(shares.max(Decimal::ONE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sizing_uses_equity_fraction() {
        // 2% of 100k = 2000; 2000 / 50 = 40 shares.
        let qty = position_qty(dec!(100000), dec!(10000), Price::new(dec!(50)));
        assert_eq!(qty, Qty::new(dec!(40)));
    }

    #[test]
    fn test_sizing_caps_at_max_notional() {
        // 2% of 1M = 20k but the cap is 1000; 1000 / 50 = 20 shares.
        let qty = position_qty(dec!(1000000), dec!(1000), Price::new(dec!(50)));
        assert_eq!(qty, Qty::new(dec!(20)));
    }

    #[test]
    fn test_sizing_floor_is_one_share() {
        // Budget smaller than one share still sizes one share.
        let qty = position_qty(dec!(1000), dec!(10), Price::new(dec!(500)));
        assert_eq!(qty, Qty::ONE);
    }

    #[test]
    fn test_sizing_zero_price_is_untradeable() {
        assert_eq!(position_qty(dec!(1000), dec!(10), Price::ZERO), Qty::ZERO);
    }
}
