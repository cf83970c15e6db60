//! Expense sharing for groups: splitting expenses, net balances per member and
//! suggested payments that settle everybody up.
//!
//! The computations in [`split`], [`balance`], [`exchange`] and [`analytics`]
//! are plain functions over the data in [`schemas`]. [`ledger`] applies them
//! to a single group's [`GroupBook`](schemas::GroupBook), and [`routes`]
//! exposes that over HTTP with the books kept in a [`store::Store`].
pub mod analytics;
pub mod balance;
pub mod error;
pub mod exchange;
pub mod ledger;
pub mod money;
pub mod reminder;
pub mod routes;
pub mod schemas;
pub mod settings;
pub mod settlement;
pub mod split;
pub mod store;

pub use balance::compute_balances;
pub use error::LedgerError;
pub use exchange::suggest_settlements;
pub use split::{split_by_amount, split_by_percentage, split_equally, SplitError, SplitPolicy};
