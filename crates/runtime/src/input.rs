//! Term count input
//!
//! The term count is the first whitespace-delimited token on standard input.
//! It is read like `%d`: an optional sign and a run of decimal digits, with
//! anything after the digits in the same token ignored (`12abc` reads as 12).
//!
//! Reading never fails the run. Missing or unreadable input and tokens without
//! leading digits are logged and read as 0, which prints an empty sequence.
//! Values too large for `i32` are clamped to the `i64` range and truncated to
//! 32 bits, the way a `long` result lands in an `int`.

use std::io::BufRead;
use tracing::{debug, warn};

/// Read one term count, skipping blank lines
pub fn read_term_count<R: BufRead>(mut reader: R) -> i32 {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) => {
                warn!("no term count on standard input, using 0");
                return 0;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("failed to read term count, using 0: {}", e);
                return 0;
            }
        }
        if let Some(token) = line.split_whitespace().next() {
            let n = parse_term_count(token).unwrap_or_else(|| {
                warn!("term count is not an integer: '{}', using 0", token);
                0
            });
            debug!(n, "term count read");
            return n;
        }
    }
}

/// Parse the leading signed integer of a token; `None` if it has no digits
pub fn parse_term_count(token: &str) -> Option<i32> {
    let sign_len = usize::from(token.starts_with(['+', '-']));
    let digits = token[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }

    let negative = token.starts_with('-');
    let wide = token[..sign_len + digits]
        .parse::<i64>()
        .unwrap_or(if negative { i64::MIN } else { i64::MAX });
    Some(wide as i32)
}
