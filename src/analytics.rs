//! Read-only summaries over a group's expenses.
use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{round_cents, round_percent, HUNDRED};
use crate::schemas::{Expense, ExpenseCategory, Member, MemberId};

pub const DEFAULT_TREND_MONTHS: u32 = 6;
pub const DEFAULT_TOP_SPENDERS: usize = 5;
/// Longest monthly trend that will be produced, ten years.
pub const MAX_TREND_MONTHS: u32 = 120;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub label: String,
    pub amount: Decimal,
    pub percentage: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Spender {
    pub member_id: MemberId,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Analytics {
    pub total_spent: Decimal,
    pub expense_count: usize,
    pub average_expense: Decimal,
    pub category_breakdown: Vec<CategoryTotal>,
    pub monthly_trend: Vec<MonthTotal>,
    pub top_spenders: Vec<Spender>,
}

/// Summarizes `expenses` as of `today`: per-category totals, the last
/// `months` calendar months (oldest first, capped at [`MAX_TREND_MONTHS`])
/// and the `top` biggest payers.
pub fn summarize(
    expenses: &[Expense],
    members: &[Member],
    today: NaiveDate,
    months: u32,
    top: usize,
) -> Analytics {
    if expenses.is_empty() {
        return Analytics::default();
    }

    let total: Decimal = expenses.iter().map(|expense| expense.amount).sum();

    Analytics {
        total_spent: round_cents(total),
        expense_count: expenses.len(),
        average_expense: round_cents(total / Decimal::from(expenses.len())),
        category_breakdown: category_breakdown(expenses, total),
        monthly_trend: monthly_trend(expenses, today, months),
        top_spenders: top_spenders(expenses, members, top),
    }
}

fn category_breakdown(expenses: &[Expense], total: Decimal) -> Vec<CategoryTotal> {
    // Vec keeps first-seen order for categories with the same total
    let mut totals: Vec<(ExpenseCategory, Decimal)> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|(category, _)| *category == expense.category) {
            Some((_, amount)) => *amount += expense.amount,
            None => totals.push((expense.category, expense.amount)),
        }
    }

    let mut breakdown: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, amount)| CategoryTotal {
            category,
            label: category.label().to_string(),
            amount: round_cents(amount),
            percentage: round_percent(amount / total * HUNDRED),
        })
        .collect();
    breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));
    breakdown
}

fn monthly_trend(expenses: &[Expense], today: NaiveDate, months: u32) -> Vec<MonthTotal> {
    let mut by_month: HashMap<(i32, u32), Decimal> = HashMap::new();
    for expense in expenses {
        *by_month
            .entry((expense.date.year(), expense.date.month()))
            .or_default() += expense.amount;
    }

    (0..months.min(MAX_TREND_MONTHS))
        .rev()
        .filter_map(|back| today.checked_sub_months(Months::new(back)))
        .map(|day| {
            let key = (day.year(), day.month());
            MonthTotal {
                year: key.0,
                month: key.1,
                label: day.format("%b").to_string(),
                amount: round_cents(by_month.get(&key).copied().unwrap_or_default()),
            }
        })
        .collect()
}

fn top_spenders(expenses: &[Expense], members: &[Member], top: usize) -> Vec<Spender> {
    let mut totals: Vec<(&str, Decimal)> = Vec::new();
    for expense in expenses {
        match totals.iter_mut().find(|(id, _)| *id == expense.paid_by) {
            Some((_, amount)) => *amount += expense.amount,
            None => totals.push((expense.paid_by.as_str(), expense.amount)),
        }
    }
    totals.sort_by(|a, b| b.1.cmp(&a.1));

    totals
        .into_iter()
        .take(top)
        .map(|(id, amount)| Spender {
            member_id: id.to_string(),
            name: members
                .iter()
                .find(|member| member.id == id)
                .map_or_else(|| "Unknown".to_string(), |member| member.name.clone()),
            amount: round_cents(amount),
        })
        .collect()
}
