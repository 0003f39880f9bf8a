#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Reading and writing ledger files, and the load/save policy between them
pub mod io;
/// The minimal JSON snapshot codec
pub mod json;
/// Business logic for deposits, withdrawals and history recording
mod ops;
/// Data types used throughout Passbook
pub mod types;
