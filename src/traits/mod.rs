//! Trait definitions for Snyk operations.
//!
//! Service handles implement the traits they support, encapsulating the
//! differences between the REST and v1 endpoints behind them.

mod get;
mod list;

pub use get::Get;
pub use list::List;
