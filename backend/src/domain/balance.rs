//! Net-simplified debt edges between members of one group.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{GroupId, GroupSpending, MemberId, Money, MoneyError};

/// Validation failures raised while building a [`Balance`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceValidationError {
    #[error("balance amount must be greater than zero, got {amount}")]
    NonPositiveAmount { amount: Money },
    #[error("a member cannot owe themselves")]
    SelfDebt,
}

/// Directed pair key: `debtor` owes `creditor` within `group`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceKey {
    pub group_id: GroupId,
    pub creditor_id: MemberId,
    pub debtor_id: MemberId,
}

impl BalanceKey {
    /// Key for "`debtor_id` owes `creditor_id`" in `group_id`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use splitledger::domain::{BalanceKey, GroupId, MemberId};
    /// let (group, alice, bob) = (GroupId::random(), MemberId::random(), MemberId::random());
    /// let key = BalanceKey::new(group, alice, bob);
    /// assert_eq!(key.reversed(), BalanceKey::new(group, bob, alice));
    /// ```
    #[must_use]
    pub fn new(group_id: GroupId, creditor_id: MemberId, debtor_id: MemberId) -> Self {
        Self {
            group_id,
            creditor_id,
            debtor_id,
        }
    }

    /// The same pair in the opposite direction.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            group_id: self.group_id,
            creditor_id: self.debtor_id,
            debtor_id: self.creditor_id,
        }
    }
}

/// "`debtor` owes `creditor` `amount`" within one group.
///
/// ## Invariants
/// - `amount` is strictly positive; a settled pair has no row at all.
/// - `creditor_id != debtor_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    group_id: GroupId,
    creditor_id: MemberId,
    debtor_id: MemberId,
    amount: Money,
    updated_at: DateTime<Utc>,
}

impl Balance {
    /// Validate and build a balance row.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chrono::Utc;
    /// # use splitledger::domain::{Balance, BalanceKey, GroupId, MemberId, Money};
    /// let (group, alice, bob) = (GroupId::random(), MemberId::random(), MemberId::random());
    /// let key = BalanceKey::new(group, alice, bob);
    /// let balance = Balance::new(key, Money::from_cents(1250), Utc::now())?;
    /// assert_eq!(balance.key(), key);
    /// assert_eq!(balance.creditor_id(), alice);
    /// assert_eq!(balance.debtor_id(), bob);
    /// assert_eq!(balance.amount().to_string(), "12.50");
    ///
    /// assert!(Balance::new(key, Money::ZERO, Utc::now()).is_err());
    /// # Ok::<(), splitledger::domain::BalanceValidationError>(())
    /// ```
    pub fn new(
        key: BalanceKey,
        amount: Money,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, BalanceValidationError> {
        if key.creditor_id == key.debtor_id {
            return Err(BalanceValidationError::SelfDebt);
        }
        if !amount.is_positive() {
            return Err(BalanceValidationError::NonPositiveAmount { amount });
        }
        Ok(Self {
            group_id: key.group_id,
            creditor_id: key.creditor_id,
            debtor_id: key.debtor_id,
            amount,
            updated_at,
        })
    }

    /// Directed pair this row belongs to.
    #[must_use]
    pub fn key(&self) -> BalanceKey {
        BalanceKey::new(self.group_id, self.creditor_id, self.debtor_id)
    }

    /// Owning group.
    #[must_use]
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Member who is owed.
    #[must_use]
    pub fn creditor_id(&self) -> MemberId {
        self.creditor_id
    }

    /// Member who owes.
    #[must_use]
    pub fn debtor_id(&self) -> MemberId {
        self.debtor_id
    }

    /// Outstanding amount, always positive.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Time of the posting that last changed this row.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Order balances largest first, then by creditor and debtor id.
pub fn sort_for_display(balances: &mut [Balance]) {
    balances.sort_by(|left, right| {
        right
            .amount
            .cmp(&left.amount)
            .then_with(|| left.creditor_id.cmp(&right.creditor_id))
            .then_with(|| left.debtor_id.cmp(&right.debtor_id))
    });
}

/// Per-member totals derived from the balance rows and logged expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPosition {
    pub member_id: MemberId,
    /// Total other members owe this member.
    pub owed: Money,
    /// Total this member owes other members.
    pub owes: Money,
    /// Sum of the expenses this member paid.
    pub paid: Money,
    /// Sum of this member's shares across all expenses.
    pub share: Money,
}

impl MemberPosition {
    /// Net position: positive means the member should collect.
    pub fn net(&self) -> Result<Money, MoneyError> {
        self.owed.checked_sub(self.owes)
    }

    /// What the member paid beyond their own shares.
    ///
    /// Matches [`Self::net`] whenever the ledger is consistent with the
    /// expenses it was built from.
    pub fn spending_net(&self) -> Result<Money, MoneyError> {
        self.paid.checked_sub(self.share)
    }

    /// Percentage of the member's shares covered by what they paid, capped at
    /// 100 and rounded down. Members without shares count as fully covered.
    #[must_use]
    pub fn settled_percent(&self) -> u8 {
        let share = i128::from(self.share.cents());
        if share <= 0 {
            return 100;
        }
        let paid = i128::from(self.paid.cents().max(0));
        let percent = (paid * 100).checked_div(share).unwrap_or(100).min(100);
        u8::try_from(percent).unwrap_or(100)
    }

    /// True when the member neither owes nor is owed anything.
    ///
    /// # Examples
    ///
    /// ```
    /// # use splitledger::domain::{MemberId, MemberPosition, Money};
    /// let position = MemberPosition {
    ///     member_id: MemberId::random(),
    ///     owed: Money::ZERO,
    ///     owes: Money::ZERO,
    ///     paid: Money::from_cents(500),
    ///     share: Money::from_cents(1500),
    /// };
    /// assert!(position.is_settled());
    /// assert_eq!(position.settled_percent(), 33);
    /// ```
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.owed == Money::ZERO && self.owes == Money::ZERO
    }
}

/// Summarise balances and spending per member, in roster order.
///
/// Members without any balance row are reported as settled.
pub fn summarise_positions(
    member_ids: &[MemberId],
    balances: &[Balance],
    spending: &GroupSpending,
) -> Result<Vec<MemberPosition>, MoneyError> {
    member_ids
        .iter()
        .map(|member_id| {
            let totals = spending.for_member(*member_id);
            let mut position = MemberPosition {
                member_id: *member_id,
                owed: Money::ZERO,
                owes: Money::ZERO,
                paid: totals.paid,
                share: totals.share,
            };
            for balance in balances {
                if balance.creditor_id == *member_id {
                    position.owed = position.owed.checked_add(balance.amount)?;
                }
                if balance.debtor_id == *member_id {
                    position.owes = position.owes.checked_add(balance.amount)?;
                }
            }
            Ok(position)
        })
        .collect()
}
