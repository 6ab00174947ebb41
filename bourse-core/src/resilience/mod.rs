//! Fault handling
//!
//! Thread panics are the only fault the venue recovers from; everything else
//! is an outcome value or a setup error.

pub mod panic;

pub use panic::{install_panic_handler, panic_message};
