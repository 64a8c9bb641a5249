//! Sort key normalisation for rendered page file names.
//!
//! Rasterisers name pages `page_1.png`, `page_2.png`, ..., `page_10.png`.
//! Plain string order puts `page_10` before `page_2`; ordering by
//! [`page_order_key`] recovers document order.

/// Width digit runs are padded to.
const DIGIT_WIDTH: usize = 6;

/// Normalise a file name into a lexicographically-sortable string.
///
/// Input: `"page_2.png"`, `"Page_10.PNG"`
/// Output: `"page_000002.png"`, `"page_000010.png"`
///
/// Every run of ASCII digits is zero-padded to six places (longer runs are
/// kept whole, leading zeros stripped); everything else is lowercased.
pub fn page_order_key(name: &str) -> String {
    let name = name.trim();
    let mut out = String::with_capacity(name.len() + DIGIT_WIDTH);
    let mut digits = String::new();

    for ch in name.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        flush_digits(&mut out, &mut digits);
        out.extend(ch.to_lowercase());
    }
    flush_digits(&mut out, &mut digits);
    out
}

fn flush_digits(out: &mut String, digits: &mut String) {
    if digits.is_empty() {
        return;
    }
    let trimmed = digits.trim_start_matches('0');
    let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
    out.push_str(&format!("{:0>width$}", trimmed, width = DIGIT_WIDTH));
    digits.clear();
}
