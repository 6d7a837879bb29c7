//! Even split of an expense amount into integer-cent shares.
//!
//! Every participant but the last receives `floor(cents / n)`; the last
//! participant absorbs the remainder. Remainder placement is deliberately
//! order-dependent and must stay bit-exact with ledgers written earlier, so
//! callers are responsible for passing a stable participant order.

use std::collections::HashSet;

use super::{MemberId, Money};

/// Reasons a split cannot be computed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("amount to split must be greater than zero, got {amount}")]
    InvalidAmount { amount: Money },
    #[error("at least one participant is required")]
    EmptyParticipantSet,
    #[error("participant {member_id} appears more than once")]
    DuplicateParticipant { member_id: MemberId },
}

/// A participant's computed share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareAllocation {
    pub member_id: MemberId,
    pub amount: Money,
}

/// Split `total` across `participants`, preserving their order.
///
/// The returned shares always sum to `total` exactly.
///
/// # Examples
/// ```
/// use splitledger::domain::{MemberId, Money, split_evenly};
///
/// let members = [MemberId::random(), MemberId::random(), MemberId::random()];
/// let shares = split_evenly(Money::from_cents(1000), &members).expect("valid split");
/// let cents: Vec<i64> = shares.iter().map(|share| share.amount.cents()).collect();
/// assert_eq!(cents, vec![333, 333, 334]);
/// ```
pub fn split_evenly(
    total: Money,
    participants: &[MemberId],
) -> Result<Vec<ShareAllocation>, SplitError> {
    if !total.is_positive() {
        return Err(SplitError::InvalidAmount { amount: total });
    }
    let Some((last, leading)) = participants.split_last() else {
        return Err(SplitError::EmptyParticipantSet);
    };

    let mut seen = HashSet::with_capacity(participants.len());
    if let Some(duplicate) = participants.iter().find(|id| !seen.insert(**id)) {
        return Err(SplitError::DuplicateParticipant {
            member_id: *duplicate,
        });
    }

    // The last share is computed by subtraction, so the total holds even if
    // the count saturates.
    let count = i64::try_from(participants.len()).unwrap_or(i64::MAX);
    let cents = total.cents();
    let base = cents.div_euclid(count);
    let leading_total = base * (count - 1);

    let mut shares: Vec<ShareAllocation> = leading
        .iter()
        .map(|member_id| ShareAllocation {
            member_id: *member_id,
            amount: Money::from_cents(base),
        })
        .collect();
    shares.push(ShareAllocation {
        member_id: *last,
        amount: Money::from_cents(cents - leading_total),
    });
    Ok(shares)
}
