//! Shared setup for the bourse binaries

pub mod common;
