//! Query modules for the price tracker.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and exposes methods returning
//! `Result<T>` with typed model payloads.

pub mod history;
pub mod ownership;

pub use history::PriceHistoryQuery;
pub use ownership::{FanOutReport, OwnershipQuery};
