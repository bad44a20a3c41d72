//! Crate-level handshake and BDD tests.

mod support;
mod unit;
