//! Cached wrappers over the group, transaction and notification endpoints.
//!
//! Each service keeps the last list it saw. Writes are last-write-wins; there
//! is no request fencing between concurrent refreshes.

pub mod groups;
pub mod notifications;
pub mod transactions;

pub use groups::GroupService;
pub use notifications::NotificationService;
pub use transactions::TransactionService;
