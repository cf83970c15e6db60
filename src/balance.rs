use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::money::round_cents;
use crate::schemas::{Balance, Expense, Member};

/// Net balance of every member, in member order.
///
/// The payer is credited the full amount of each expense and every split is
/// debited from its member. Splits already marked as paid are still debited:
/// balances reflect the original obligation, while actual payments are
/// tracked through settlements.
pub fn compute_balances(expenses: &[Expense], members: &[Member]) -> Vec<Balance> {
    let mut running: HashMap<&str, Decimal> = members
        .iter()
        .map(|member| (member.id.as_str(), Decimal::ZERO))
        .collect();

    for expense in expenses {
        *running.entry(expense.paid_by.as_str()).or_default() += expense.amount;
        for split in &expense.split_between {
            *running.entry(split.member_id.as_str()).or_default() -= split.amount;
        }
    }

    members
        .iter()
        .map(|member| Balance {
            member_id: member.id.clone(),
            member_name: member.name.clone(),
            amount: round_cents(running.get(member.id.as_str()).copied().unwrap_or_default()),
        })
        .collect()
}
