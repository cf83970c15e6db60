use rust_decimal::Decimal;

use crate::money::{round_cents, CENT};
use crate::schemas::{Balance, MemberId, SuggestedSettlement};

#[derive(Clone, Debug)]
struct PersonalBalance {
    id: MemberId,
    remaining: Decimal,
}

/// Splits balances into creditors and debtors, both as positive amounts and
/// sorted largest first. Balances within a cent of zero are already settled.
/// The sort is stable, so equal amounts keep their input order.
fn partition(balances: &[Balance]) -> (Vec<PersonalBalance>, Vec<PersonalBalance>) {
    let mut creditors = Vec::new();
    let mut debtors = Vec::new();

    for balance in balances {
        let person = PersonalBalance {
            id: balance.member_id.clone(),
            remaining: balance.amount.abs(),
        };
        if balance.amount > CENT {
            creditors.push(person);
        } else if balance.amount < -CENT {
            debtors.push(person);
        }
    }

    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    (creditors, debtors)
}

/// Greedy matching of the largest creditor with the largest debtor.
///
/// Uses at most `creditors + debtors - 1` payments. It is not guaranteed to
/// find the smallest possible number of payments.
pub fn suggest_settlements(balances: &[Balance], group_id: &str) -> Vec<SuggestedSettlement> {
    let (mut creditors, mut debtors) = partition(balances);
    let mut settlements = Vec::new();

    let (mut i, mut j) = (0, 0);
    while i < creditors.len() && j < debtors.len() {
        let creditor = &mut creditors[i];
        let debtor = &mut debtors[j];
        let amount = creditor.remaining.min(debtor.remaining);

        // Amounts are exact cents, so anything from one cent up is a real payment
        if amount >= CENT {
            settlements.push(SuggestedSettlement {
                group_id: group_id.to_string(),
                from: debtor.id.clone(),
                to: creditor.id.clone(),
                amount: round_cents(amount),
            });
        }

        creditor.remaining -= amount;
        debtor.remaining -= amount;

        if creditor.remaining < CENT {
            i += 1;
        }
        if debtor.remaining < CENT {
            j += 1;
        }
    }

    tracing::debug!(
        group_id,
        creditors = creditors.len(),
        debtors = debtors.len(),
        settlements = settlements.len(),
        "computed suggested settlements"
    );
    settlements
}
