//! fibfork Core: Fibonacci terms on a fixed-width integer
//!
//! This crate holds the pure half of fibfork: the term generator and the
//! routine that prints terms. It performs no process or OS calls, so it can be
//! exercised directly in unit tests and reused outside the process demo.
//!
//! Key design principles:
//! - Terms are `i32`, matching the native signed integer the demo always used
//! - Overflow is explicit: wraparound by default, saturation on request
//! - The generator is lazy and finite; every call starts from `(0, 1)`
//!
//! # Modules
//!
//! - `fibonacci`: `Fibonacci` iterator, `Overflow` policy, and `emit`

pub mod fibonacci;

pub use fibonacci::{Fibonacci, HEADER, Overflow, emit};
