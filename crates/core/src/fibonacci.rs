//! Fibonacci term generation
//!
//! `Fibonacci` yields the first `n` terms of 0, 1, 1, 2, 3, 5, ... using two
//! `i32` accumulators advanced by simultaneous assignment:
//!
//! ```text
//! (current, next) <- (next, current + next)
//! ```
//!
//! The addition follows an [`Overflow`] policy. `Wrap` is the default and
//! reproduces two's complement wraparound explicitly; `Saturate` clamps at the
//! `i32` bounds instead.
//!
//! A term count of zero or less produces no terms.

use serde::Deserialize;
use std::io::{self, Write};
use std::iter::FusedIterator;

/// Header line printed before the term list
pub const HEADER: &str = "Fibonacci sequence:";

/// How the recurrence behaves once a term no longer fits in `i32`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Two's complement wraparound
    #[default]
    Wrap,
    /// Clamp at `i32::MIN` / `i32::MAX`
    Saturate,
}

impl Overflow {
    fn add(self, a: i32, b: i32) -> i32 {
        match self {
            Overflow::Wrap => a.wrapping_add(b),
            Overflow::Saturate => a.saturating_add(b),
        }
    }
}

/// Lazy, finite generator over the first `n` Fibonacci terms
#[derive(Debug, Clone)]
pub struct Fibonacci {
    current: i32,
    next: i32,
    remaining: u32,
    overflow: Overflow,
}

impl Fibonacci {
    /// Create a generator for `n` terms. Negative counts yield nothing.
    pub fn new(n: i32, overflow: Overflow) -> Self {
        Fibonacci {
            current: 0,
            next: 1,
            remaining: n.max(0) as u32,
            overflow,
        }
    }
}

impl Iterator for Fibonacci {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let term = self.current;
        let advanced = self.overflow.add(self.current, self.next);
        self.current = self.next;
        self.next = advanced;
        Some(term)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Fibonacci {}

impl FusedIterator for Fibonacci {}

/// Print the header line, then every term followed by a space, then a newline
///
/// Output for `n = 5`:
///
/// ```text
/// Fibonacci sequence:
/// 0 1 1 2 3
/// ```
///
/// (each term, including the last, is followed by one space)
///
/// Nothing is flushed; the caller decides when the output leaves its buffer.
pub fn emit<W: Write>(out: &mut W, n: i32, overflow: Overflow) -> io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    for term in Fibonacci::new(n, overflow) {
        write!(out, "{} ", term)?;
    }
    writeln!(out)
}
