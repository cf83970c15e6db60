//! Dividing an expense amount among its participants.
//!
//! Every policy either returns shares that add up to the expense amount or
//! rejects the input. Nothing is ever renormalized behind the caller's back.
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{floor_cents, round_cents, within_cent, CENT, HUNDRED, MAX_AMOUNT};
use crate::schemas::{MemberId, Split};

#[derive(Error, Debug, PartialEq)]
pub enum SplitError {
    #[error("an expense needs at least one participant")]
    NoParticipants,
    #[error("amount {0} is outside the supported range")]
    AmountOutOfRange(Decimal),
    #[error("percentage for `{member_id}` must be between 0 and 100, got {percentage}")]
    InvalidPercentage { member_id: MemberId, percentage: Decimal },
    #[error("share for `{member_id}` must not be negative or above the supported maximum, got {amount}")]
    InvalidShare { member_id: MemberId, amount: Decimal },
    #[error("percentages must sum to 100, got {0}")]
    PercentageTotal(Decimal),
    #[error("split amounts must equal the total amount: expected {expected}, got {actual}")]
    AmountTotal { expected: Decimal, actual: Decimal },
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PercentageShare {
    pub member_id: MemberId,
    pub percentage: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExactShare {
    pub member_id: MemberId,
    pub amount: Decimal,
}

/// How an expense is divided, as chosen when the expense is created.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitPolicy {
    Equal { members: Vec<MemberId> },
    Percentage { shares: Vec<PercentageShare> },
    Exact { shares: Vec<ExactShare> },
}

impl SplitPolicy {
    pub fn apply(&self, amount: Decimal) -> Result<Vec<Split>, SplitError> {
        match self {
            SplitPolicy::Equal { members } => split_equally(amount, members),
            SplitPolicy::Percentage { shares } => split_by_percentage(amount, shares),
            SplitPolicy::Exact { shares } => split_by_amount(amount, shares),
        }
    }

    pub fn participants(&self) -> Vec<&str> {
        match self {
            SplitPolicy::Equal { members } => members.iter().map(String::as_str).collect(),
            SplitPolicy::Percentage { shares } => {
                shares.iter().map(|s| s.member_id.as_str()).collect()
            }
            SplitPolicy::Exact { shares } => shares.iter().map(|s| s.member_id.as_str()).collect(),
        }
    }
}

fn check_amount(amount: Decimal) -> Result<(), SplitError> {
    if amount <= Decimal::ZERO || amount > MAX_AMOUNT {
        return Err(SplitError::AmountOutOfRange(amount));
    }
    Ok(())
}

fn total(splits: &[Split]) -> Decimal {
    splits.iter().map(|split| split.amount).sum()
}

/// Everybody pays the same share rounded down to the cent, and the first
/// participant absorbs whatever is left over.
pub fn split_equally(amount: Decimal, member_ids: &[MemberId]) -> Result<Vec<Split>, SplitError> {
    if member_ids.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    check_amount(amount)?;
    let count = Decimal::from(member_ids.len());
    let base = floor_cents(amount / count);
    let remainder = round_cents(amount - base * count);

    Ok(member_ids
        .iter()
        .enumerate()
        .map(|(index, member_id)| {
            let share = if index == 0 { base + remainder } else { base };
            Split::new(member_id.clone(), share)
        })
        .collect())
}

/// Each share is `amount * percentage / 100` rounded to the cent.
///
/// Percentages may miss 100 by a hundredth, but only as long as that costs
/// less than a cent of the amount. Rounding leftovers are then handed out one
/// cent at a time starting from the first participant, so the shares always
/// add up to the amount.
pub fn split_by_percentage(
    amount: Decimal,
    shares: &[PercentageShare],
) -> Result<Vec<Split>, SplitError> {
    if shares.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    check_amount(amount)?;
    if let Some(share) = shares
        .iter()
        .find(|share| share.percentage < Decimal::ZERO || share.percentage > HUNDRED)
    {
        return Err(SplitError::InvalidPercentage {
            member_id: share.member_id.clone(),
            percentage: share.percentage,
        });
    }
    let percent_total: Decimal = shares.iter().map(|share| share.percentage).sum();
    if !within_cent(percent_total, HUNDRED) {
        return Err(SplitError::PercentageTotal(percent_total));
    }
    let covered = amount * percent_total / HUNDRED;
    if !within_cent(covered, amount) {
        return Err(SplitError::AmountTotal {
            expected: amount,
            actual: round_cents(covered),
        });
    }

    let mut splits: Vec<Split> = shares
        .iter()
        .map(|share| Split {
            member_id: share.member_id.clone(),
            amount: round_cents(amount * share.percentage / HUNDRED),
            percentage: Some(share.percentage),
            is_paid: false,
        })
        .collect();
    let residual = round_cents(amount) - total(&splits);
    spread_cents(&mut splits, residual);
    Ok(splits)
}

/// Adds (or takes back) `residual`, a whole number of cents, one cent per
/// share in participant order. A share is never pushed below zero.
fn spread_cents(splits: &mut [Split], mut residual: Decimal) {
    let mut index = 0;
    while !residual.is_zero() {
        let step = if residual > Decimal::ZERO { CENT } else { -CENT };
        let split = &mut splits[index % splits.len()];
        if split.amount + step >= Decimal::ZERO {
            split.amount += step;
            residual -= step;
        }
        index += 1;
    }
}

/// Shares are taken as given. They may miss the total by up to a cent, in
/// which case the first participant whose share can absorb the difference
/// does so.
pub fn split_by_amount(total_amount: Decimal, shares: &[ExactShare]) -> Result<Vec<Split>, SplitError> {
    if shares.is_empty() {
        return Err(SplitError::NoParticipants);
    }
    check_amount(total_amount)?;
    if let Some(share) = shares
        .iter()
        .find(|share| share.amount < Decimal::ZERO || share.amount > MAX_AMOUNT)
    {
        return Err(SplitError::InvalidShare {
            member_id: share.member_id.clone(),
            amount: share.amount,
        });
    }
    let actual: Decimal = shares.iter().map(|share| share.amount).sum();
    let mismatch = SplitError::AmountTotal {
        expected: total_amount,
        actual,
    };
    if !within_cent(actual, total_amount) {
        return Err(mismatch);
    }

    let mut splits: Vec<Split> = shares
        .iter()
        .map(|share| Split::new(share.member_id.clone(), share.amount))
        .collect();
    let residual = total_amount - actual;
    if !residual.is_zero() {
        let absorber = splits
            .iter_mut()
            .find(|split| split.amount + residual >= Decimal::ZERO)
            .ok_or(mismatch)?;
        absorber.amount += residual;
    }
    Ok(splits)
}
