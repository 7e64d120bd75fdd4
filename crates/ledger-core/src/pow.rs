//! Leading-zero-bit checks on hex digests.

/// Number of leading zero bits in the binary expansion of a hex digest.
///
/// Each hex character contributes four bits. Counting stops at the first
/// non-zero nibble, or at the first character that is not a hex digit, so
/// placeholder hashes such as the genesis one never count as mined.
pub fn leading_zero_bits(hash: &str) -> u32 {
    let mut total = 0u32;
    for c in hash.chars() {
        match c.to_digit(16) {
            Some(0) => total += 4,
            Some(nibble) => {
                total += nibble.leading_zeros() - (u32::BITS - 4);
                break;
            }
            None => break,
        }
    }
    total
}

/// True if the first `difficulty` bits of `hash` are all zero.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    leading_zero_bits(hash) >= difficulty
}
