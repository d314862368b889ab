//! Base-128 varint sizing and zig-zag mapping.

/// The most bytes a varint encoded `u32` may take.
pub const MAX_VARINT32_BYTES: usize = 5;

/// The most bytes a varint encoded `u64` may take.
pub const MAX_VARINT64_BYTES: usize = 10;

/// Map a signed integer to an unsigned one so that values with a small magnitude stay small:
/// `0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...`
#[inline]
pub fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
pub fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

#[inline]
pub fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Encoded size of `value` in bytes.
#[inline]
pub fn varint32_len(value: u32) -> usize {
    varint64_len(u64::from(value))
}

/// Encoded size of `value` in bytes.
#[inline]
pub fn varint64_len(value: u64) -> usize {
    // every byte carries 7 payload bits, zero still takes one byte
    let used = 64 - (value | 1).leading_zeros() as usize;
    used.div_ceil(7)
}
