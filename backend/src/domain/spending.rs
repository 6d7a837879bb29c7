//! Spending totals over the expenses logged in one group.
//!
//! The ledger only keeps net debts; these totals come from the expense and
//! share rows themselves and back the per-member summary.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::{Balance, MemberId, Money, MoneyError};

/// What one member paid for and was allocated across a group's expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSpending {
    pub member_id: MemberId,
    /// Sum of the expenses this member paid.
    pub paid: Money,
    /// Sum of this member's share rows.
    pub share: Money,
}

/// Spending aggregated over every expense in a group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSpending {
    pub expense_count: u64,
    pub total_spend: Money,
    /// Members with at least one payment or share, in no particular order.
    pub members: Vec<MemberSpending>,
}

impl GroupSpending {
    /// Totals for one member; zero when they have no spending.
    #[must_use]
    pub fn for_member(&self, member_id: MemberId) -> MemberSpending {
        self.members
            .iter()
            .find(|spending| spending.member_id == member_id)
            .copied()
            .unwrap_or(MemberSpending {
                member_id,
                paid: Money::ZERO,
                share: Money::ZERO,
            })
    }
}

/// Fold payments `(payer, expense amount)` and shares `(member, share amount)`
/// into group totals.
pub fn tally_spending(
    payments: impl IntoIterator<Item = (MemberId, Money)>,
    shares: impl IntoIterator<Item = (MemberId, Money)>,
) -> Result<GroupSpending, MoneyError> {
    let mut expense_count = 0_u64;
    let mut total_spend = Money::ZERO;
    let mut totals: HashMap<MemberId, (Money, Money)> = HashMap::new();

    for (payer, amount) in payments {
        expense_count += 1;
        total_spend = total_spend.checked_add(amount)?;
        let entry = totals.entry(payer).or_default();
        entry.0 = entry.0.checked_add(amount)?;
    }
    for (member, amount) in shares {
        let entry = totals.entry(member).or_default();
        entry.1 = entry.1.checked_add(amount)?;
    }

    Ok(GroupSpending {
        expense_count,
        total_spend,
        members: totals
            .into_iter()
            .map(|(member_id, (paid, share))| MemberSpending {
                member_id,
                paid,
                share,
            })
            .collect(),
    })
}

/// Group-level figures shown alongside the member summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotals {
    pub expense_count: u64,
    pub total_spend: Money,
    /// Mean expense amount rounded to the cent; zero without expenses.
    pub average_expense: Money,
    /// Sum of every outstanding balance row.
    pub outstanding_total: Money,
    pub active_balances: u64,
}

impl GroupTotals {
    /// Combine spending totals with the current balance rows.
    pub fn new(spending: &GroupSpending, balances: &[Balance]) -> Result<Self, MoneyError> {
        let average_expense = if spending.expense_count == 0 {
            Money::ZERO
        } else {
            let mean = spending
                .total_spend
                .to_decimal()
                .checked_div(Decimal::from(spending.expense_count))
                .ok_or(MoneyError::OutOfRange)?;
            Money::from_decimal(mean)?
        };
        let outstanding_total = balances
            .iter()
            .try_fold(Money::ZERO, |sum, balance| sum.checked_add(balance.amount()))?;

        Ok(Self {
            expense_count: spending.expense_count,
            total_spend: spending.total_spend,
            average_expense,
            outstanding_total,
            active_balances: u64::try_from(balances.len()).unwrap_or(u64::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::{BalanceKey, GroupId};

    #[rstest]
    fn tallies_payments_and_shares_per_member() {
        let (a, b, c) = (MemberId::random(), MemberId::random(), MemberId::random());
        let spending = tally_spending(
            [(a, Money::from_cents(3000)), (b, Money::from_cents(2000))],
            [
                (a, Money::from_cents(1000)),
                (b, Money::from_cents(1000)),
                (c, Money::from_cents(1000)),
                (a, Money::from_cents(1000)),
                (b, Money::from_cents(1000)),
            ],
        )
        .expect("no overflow");

        assert_eq!(spending.expense_count, 2);
        assert_eq!(spending.total_spend, Money::from_cents(5000));
        assert_eq!(
            spending.for_member(a),
            MemberSpending {
                member_id: a,
                paid: Money::from_cents(3000),
                share: Money::from_cents(2000),
            }
        );
        assert_eq!(spending.for_member(c).paid, Money::ZERO);
        assert_eq!(spending.for_member(c).share, Money::from_cents(1000));
    }

    #[rstest]
    fn unknown_members_have_no_spending() {
        let member = MemberId::random();
        let spending = GroupSpending::default().for_member(member);
        assert_eq!(spending.paid, Money::ZERO);
        assert_eq!(spending.share, Money::ZERO);
    }

    #[rstest]
    #[case(&[], 0)]
    #[case(&[1000, 2000], 1500)]
    #[case(&[100, 100, 101], 100)]
    #[case(&[1, 2], 2)]
    fn averages_round_to_the_nearest_cent(#[case] amounts: &[i64], #[case] expected: i64) {
        let payer = MemberId::random();
        let spending = tally_spending(
            amounts.iter().map(|cents| (payer, Money::from_cents(*cents))),
            std::iter::empty(),
        )
        .expect("no overflow");

        let totals = GroupTotals::new(&spending, &[]).expect("no overflow");
        assert_eq!(totals.average_expense, Money::from_cents(expected));
        assert_eq!(totals.outstanding_total, Money::ZERO);
    }

    #[rstest]
    fn outstanding_total_sums_balance_rows() {
        let group = GroupId::random();
        let now = Utc::now();
        let balances = vec![
            Balance::new(
                BalanceKey::new(group, MemberId::random(), MemberId::random()),
                Money::from_cents(1000),
                now,
            )
            .expect("valid balance"),
            Balance::new(
                BalanceKey::new(group, MemberId::random(), MemberId::random()),
                Money::from_cents(250),
                now,
            )
            .expect("valid balance"),
        ];

        let totals = GroupTotals::new(&GroupSpending::default(), &balances).expect("no overflow");
        assert_eq!(totals.outstanding_total, Money::from_cents(1250));
        assert_eq!(totals.active_balances, 2);
        assert_eq!(totals.expense_count, 0);
    }
}
