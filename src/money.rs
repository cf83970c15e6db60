use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Smallest currency unit we track. Also the tolerance used when validating
/// split totals and when deciding whether a balance is already settled.
pub const CENT: Decimal = dec!(0.01);

pub const HUNDRED: Decimal = dec!(100);

/// Largest amount accepted for a single expense, share or settlement. Keeps
/// running totals far away from the limits of `Decimal`.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn floor_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::ToNegativeInfinity)
}

pub fn round_percent(percentage: Decimal) -> Decimal {
    percentage.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Whether two amounts are equal within one cent.
pub fn within_cent(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= CENT
}

/// Positive, in whole cents and no larger than [`MAX_AMOUNT`].
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_AMOUNT && amount.normalize().scale() <= 2
}
