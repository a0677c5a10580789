//! File-backed stores.
//!
//! Each store owns one JSON document and exposes load/mutate/persist as a
//! single operation per run. Single-writer access is assumed; there is no
//! file locking.

pub mod activity;
pub mod history;
pub mod queue;

pub use activity::ActivityStore;
pub use history::HistoryStore;
pub use queue::{DeliveryReport, NotificationQueue};
