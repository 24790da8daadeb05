use crate::models::CnyRounding;

/// Currencies that get ".99" psychological pricing.
const PSYCH_CURRENCIES: [&str; 6] = ["USD", "CAD", "EUR", "GBP", "SGD", "HKD"];

/// The canonical rounding policy, applied uniformly at every call site.
///
/// CNY rounds per the configured mode (nearest whole yuan or nearest 50
/// minor units) with no ".99" adjustment. The psychological set rounds to
/// the nearest 100 minor units and subtracts 1, floored at 0. Everything
/// else passes through unrounded.
pub fn psych_round(cents: i64, currency: &str, cny_mode: CnyRounding) -> i64 {
    if currency == "CNY" {
        let step = match cny_mode {
            CnyRounding::Yuan => 100,
            CnyRounding::Half => 50,
        };
        return round_to_nearest(cents, step);
    }
    if PSYCH_CURRENCIES.contains(&currency) {
        return (round_to_nearest(cents, 100) - 1).max(0);
    }
    cents
}

fn round_to_nearest(value: i64, step: i64) -> i64 {
    ((value + step / 2) / step) * step
}
