//! Diesel table definitions for the ledger schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Expense-sharing groups. Read-only for the ledger.
    groups (id) {
        id -> Uuid,
        /// Display name (max 120 characters).
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Group members. Roster order is `created_at`, then `id`.
    members (id) {
        id -> Uuid,
        group_id -> Uuid,
        name -> Varchar,
        email -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Write-once expense records.
    expenses (id) {
        id -> Uuid,
        group_id -> Uuid,
        description -> Text,
        /// Positive amount in cents.
        amount_cents -> Int8,
        currency -> Varchar,
        expense_date -> Date,
        paid_by_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Write-once per-participant shares. `position` preserves split order.
    expense_shares (id) {
        id -> Uuid,
        expense_id -> Uuid,
        member_id -> Uuid,
        position -> Int4,
        amount_cents -> Int8,
    }
}

diesel::table! {
    /// Net debt edges: `debtor_id` owes `creditor_id` within `group_id`.
    ///
    /// Unique on `(group_id, creditor_id, debtor_id)`; amounts are strictly
    /// positive and a settled pair has no row.
    balances (id) {
        id -> Uuid,
        group_id -> Uuid,
        creditor_id -> Uuid,
        debtor_id -> Uuid,
        amount_cents -> Int8,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(members -> groups (group_id));
diesel::joinable!(expenses -> groups (group_id));
diesel::joinable!(expense_shares -> expenses (expense_id));
diesel::joinable!(balances -> groups (group_id));

diesel::allow_tables_to_appear_in_same_query!(groups, members, expenses, expense_shares, balances);
