//! Domain primitives, services, and ports for the shared-expense ledger.
//!
//! Purpose: keep splitting, reconciliation, and validation free of transport
//! and storage concerns. Inbound adapters call the driving ports in
//! [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - [`Money`] — integer-cent amounts parsed from decimal strings.
//! - [`split_evenly`] — deterministic even split with the remainder on the
//!   last participant.
//! - [`apply_debt`] / [`post_expense`] — net-simplifying balance updates run
//!   inside a [`ports::LedgerUnitOfWork`].
//! - [`ExpenseCommandService`] / [`LedgerQueryService`] — driving port
//!   implementations.
//! - [`Error`] / [`ErrorCode`] — transport-agnostic failures.

pub mod balance;
pub mod error;
pub mod expense;
pub mod expense_ledger_service;
pub mod expense_splitter;
pub mod group;
pub mod ledger_reconciler;
pub mod money;
pub mod ports;
pub mod spending;
pub mod trace_id;

pub use self::balance::{
    Balance, BalanceKey, BalanceValidationError, MemberPosition, sort_for_display,
    summarise_positions,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::expense::{
    CurrencyCode, DESCRIPTION_MAX, Expense, ExpenseDraft, ExpenseEntry, ExpenseId, ExpenseShare,
    ExpenseValidationError,
};
pub use self::expense_ledger_service::{ExpenseCommandService, LedgerQueryService};
pub use self::expense_splitter::{ShareAllocation, SplitError, split_evenly};
pub use self::group::{GroupId, GroupRoster, MemberId};
pub use self::ledger_reconciler::{DebtOutcome, LedgerPostingError, apply_debt, post_expense};
pub use self::money::{MAX_EXPENSE_CENTS, Money, MoneyError};
pub use self::spending::{GroupSpending, GroupTotals, MemberSpending, tally_spending};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
