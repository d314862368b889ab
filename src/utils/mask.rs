/// Masks with the low `n` bits set, `MASK_TABLE[n] == (1 << n) - 1`.
pub(crate) const MASK_TABLE: [u32; 33] = {
    let mut table = [0; 33];
    let mut i = 1;
    while i < 33 {
        table[i] = u32::MAX >> (32 - i);
        i += 1;
    }
    table
};

/// Whether `value` is representable in `bits` unsigned bits.
#[inline]
pub(crate) fn fits_unsigned(value: u32, bits: u32) -> bool {
    bits >= 32 || value >> bits == 0
}
