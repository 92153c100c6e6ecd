//! Definitions shared by [`Income`] and [`Expense`] ledger entries.
//!
//! [`Expense`]: super::Expense
//! [`Income`]: super::Income

use common::define_kind;

use super::define_text;

define_kind! {
    #[doc = "Method a ledger entry was paid with."]
    enum Method {
        #[doc = "Cash payment."]
        Cash = 1,

        #[doc = "Bank transfer."]
        Transfer = 2,

        #[doc = "Card payment."]
        Card = 3,

        #[doc = "Direct debit."]
        DirectDebit = 4,
    }
}

define_text! {
    /// Free-text description of a ledger entry.
    Description, max = 1024
}
