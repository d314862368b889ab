use crate::codec::decoder::BitReader;
use crate::codec::varint::{varint32_len, varint64_len, zigzag_encode32, zigzag_encode64};
use crate::codec::{
    bit_byte, split_coord, CoordType, Vector3, COORD_DENOMINATOR, COORD_FRACTIONAL_BITS,
    COORD_INTEGER_BITS, COORD_INTEGER_BITS_MP, COORD_RESOLUTION, NORMAL_DENOMINATOR,
    NORMAL_FRACTIONAL_BITS, NORMAL_RESOLUTION,
};
use crate::errors::{CodecError, ErrorKind};
use crate::opts::Config;
use crate::utils::{fits_unsigned, MASK_TABLE};

/// Sequential, bounds checked writer mirroring [`BitReader`].
///
/// Bits are gathered in a machine word and stored into the destination a byte at a time once
/// the word fills, so the destination is only consistent after [`BitWriter::flush`],
/// [`BitWriter::finish`], [`BitWriter::data`] or dropping the writer.
///
/// A write that does not fit is dropped as a whole: the overflow flag is set, the cursor is
/// parked at [`BitWriter::total_bits`] and the prefix written so far stays intact. Bytes
/// outside the destination slice are never touched.
#[derive(Debug)]
pub struct BitWriter<'a> {
    data: &'a mut [u8],
    data_bits: usize,
    cur_bit: usize,
    /// Pending bits, the lowest one lands on bit 0 of `data[out_byte]`
    out_word: u64,
    out_bits: u32,
    out_byte: usize,
    overflow: bool,
    config: Config,
}

impl<'a> BitWriter<'a> {
    /// Write into all `data.len() * 8` bits of `data`.
    pub fn new(data: &'a mut [u8]) -> Self {
        let data_bits = data.len() * 8;
        Self {
            data,
            data_bits,
            cur_bit: 0,
            out_word: 0,
            out_bits: 0,
            out_byte: 0,
            overflow: false,
            config: Config::default(),
        }
    }

    /// Limit the writable bits, it should not exceed `data.len() * 8`.
    pub fn with_bits(mut self, bits: usize) -> Self {
        let max = self.data.len() * 8;
        debug_assert!(bits <= max, "{bits} bits exceed the {max} bits of the buffer");
        debug_assert!(self.cur_bit <= bits, "cannot limit a writer below its cursor");
        self.data_bits = bits.min(max);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Restart writing from the first bit and clear the overflow flag.
    pub fn reset(&mut self) {
        self.cur_bit = 0;
        self.out_word = 0;
        self.out_bits = 0;
        self.out_byte = 0;
        self.overflow = false;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn debug_name(&self) -> Option<&'static str> {
        self.config.name()
    }

    pub fn total_bits(&self) -> usize {
        self.data_bits
    }

    pub fn bits_written(&self) -> usize {
        self.cur_bit
    }

    pub fn bytes_written(&self) -> usize {
        bit_byte(self.cur_bit)
    }

    pub fn bits_left(&self) -> usize {
        self.data_bits - self.cur_bit
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// Put the writer into the overflow state.
    pub fn set_overflow(&mut self) {
        if !self.overflow {
            self.overflow = true;
            self.config.overflowed();
        }
    }

    /// Turn the overflow flag into an error.
    ///
    /// # Errors
    /// [`CodecError::Overflow`] if any write so far did not fit.
    pub fn check(&self) -> Result<(), CodecError> {
        if self.overflow {
            return Err(CodecError::Overflow {
                name: self.config.display_name(),
                total: self.data_bits,
            });
        }
        Ok(())
    }

    /// Store every completed byte of the word buffer.
    #[inline]
    fn drain(&mut self) {
        while self.out_bits >= 8 {
            self.data[self.out_byte] = self.out_word as u8;
            self.out_word >>= 8;
            self.out_bits -= 8;
            self.out_byte += 1;
        }
    }

    /// Store all pending bits. The bits of a trailing partial byte above the cursor keep
    /// whatever the destination held.
    pub fn flush(&mut self) {
        self.drain();
        if self.out_bits != 0 {
            let keep = self.data[self.out_byte] & !(MASK_TABLE[self.out_bits as usize] as u8);
            self.data[self.out_byte] = keep | self.out_word as u8;
        }
    }

    /// Flush and return the number of bytes written.
    pub fn finish(&mut self) -> usize {
        self.flush();
        self.bytes_written()
    }

    /// Flush and borrow the written bytes.
    pub fn data(&mut self) -> &[u8] {
        self.flush();
        let written = self.bytes_written();
        &self.data[..written]
    }

    /// Move the cursor to `bit`, bits before it keep their written value.
    pub fn seek_to_bit(&mut self, bit: usize) -> bool {
        if bit > self.data_bits {
            self.overrun();
            return false;
        }
        self.flush();
        self.cur_bit = bit;
        self.out_byte = bit >> 3;
        self.out_bits = (bit & 7) as u32;
        self.out_word = if self.out_bits == 0 {
            0
        } else {
            u64::from(self.data[self.out_byte] & MASK_TABLE[self.out_bits as usize] as u8)
        };
        true
    }

    fn overrun(&mut self) {
        self.flush();
        self.cur_bit = self.data_bits;
        self.set_overflow();
    }

    /// Returns true (and overflows) if `bits` more bits cannot be written.
    #[inline]
    fn check_for_overflow(&mut self, bits: usize) -> bool {
        if !self.overflow && self.cur_bit + bits > self.data_bits {
            self.overrun();
        }
        self.overflow
    }

    /// Append the low `bits` (<= 32) bits of `value`, the caller checked the capacity.
    #[inline]
    fn put(&mut self, value: u32, bits: u32) {
        self.out_word |= u64::from(value & MASK_TABLE[bits as usize]) << self.out_bits;
        self.out_bits += bits;
        self.cur_bit += bits as usize;
        if self.out_bits >= 32 {
            self.drain();
        }
    }

    #[inline]
    fn put_checked(&mut self, value: u32, bits: u32) {
        assert!(bits <= 32, "cannot write {bits} bits at once");
        if self.check_for_overflow(bits as usize) {
            return;
        }
        self.put(value, bits);
    }

    #[inline]
    pub fn write_bit(&mut self, value: bool) {
        self.put_checked(u32::from(value), 1);
    }

    /// Write the low `bits` bits of `value`. A value wider than `bits` is truncated and
    /// reported to the debug error handler.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    #[inline]
    pub fn write_bits(&mut self, value: u32, bits: u32) {
        self.check_range(value, bits);
        self.put_checked(value, bits);
    }

    /// Write `value` as a `bits` wide two's complement integer.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    pub fn write_signed_bits(&mut self, value: i32, bits: u32) {
        let fits = bits >= 32 || (bits > 0 && matches!(value >> (bits - 1), 0 | -1));
        if !fits && !(bits == 0 && value == 0) {
            self.config.report(ErrorKind::ValueOutOfRange);
        }
        self.put_checked(value as u32, bits);
    }

    /// Write an unsigned integer with the narrowest variable bit length class.
    pub fn write_variable_uint(&mut self, value: u32) {
        let (class, extra) = match value {
            0..=15 => (0, 0),
            16..=255 => (1, 4),
            256..=4095 => (2, 8),
            _ => (3, 32 - 4),
        };
        if self.check_for_overflow(6 + extra as usize) {
            return;
        }
        self.put((value & 15) | (class << 4), 6);
        if extra != 0 {
            self.put(value >> 4, extra);
        }
    }

    /// Write a base-128 varint, the whole value or nothing.
    pub fn write_varint32(&mut self, mut value: u32) {
        if self.check_for_overflow(varint32_len(value) * 8) {
            return;
        }
        while value > 0x7f {
            self.put((value & 0x7f) | 0x80, 8);
            value >>= 7;
        }
        self.put(value, 8);
    }

    /// Write a base-128 varint, the whole value or nothing.
    pub fn write_varint64(&mut self, mut value: u64) {
        if self.check_for_overflow(varint64_len(value) * 8) {
            return;
        }
        while value > 0x7f {
            self.put(((value & 0x7f) | 0x80) as u32, 8);
            value >>= 7;
        }
        self.put(value as u32, 8);
    }

    pub fn write_zigzag32(&mut self, value: i32) {
        self.write_varint32(zigzag_encode32(value));
    }

    pub fn write_zigzag64(&mut self, value: i64) {
        self.write_varint64(zigzag_encode64(value));
    }

    /// Write the raw IEEE-754 bits of `value`.
    pub fn write_bit_float(&mut self, value: f32) {
        self.put_checked(value.to_bits(), 32);
    }

    /// Write a group of `(value, bits)` fields as one, either all of them or none.
    /// Zero width fields are skipped.
    fn put_all(&mut self, fields: &[(u32, u32)]) {
        let bits = fields.iter().map(|(_, bits)| *bits as usize).sum();
        if self.check_for_overflow(bits) {
            return;
        }
        for &(value, bits) in fields {
            self.put(value, bits);
        }
    }

    /// Report `value` if it does not fit in `bits` unsigned bits.
    #[inline]
    fn check_range(&self, value: u32, bits: u32) {
        if !fits_unsigned(value, bits) {
            self.config.report(ErrorKind::ValueOutOfRange);
        }
    }

    fn normal_fields(value: f32) -> [(u32, u32); 2] {
        let negative = value <= -NORMAL_RESOLUTION;
        let fraction = ((value * NORMAL_DENOMINATOR as f32) as i32)
            .unsigned_abs()
            .min(NORMAL_DENOMINATOR);
        [(u32::from(negative), 1), (fraction, NORMAL_FRACTIONAL_BITS)]
    }

    fn coord_fields(&self, value: f32) -> [(u32, u32); 5] {
        let negative = value <= -COORD_RESOLUTION;
        let (int_part, fraction) = split_coord(value, COORD_DENOMINATOR);
        let (has_int, has_fraction) = (int_part != 0, fraction != 0);
        if has_int {
            self.check_range(int_part - 1, COORD_INTEGER_BITS);
        }
        let width = |present: bool, bits: u32| if present { bits } else { 0 };
        [
            (u32::from(has_int), 1),
            (u32::from(has_fraction), 1),
            (u32::from(negative), width(has_int || has_fraction, 1)),
            (int_part.wrapping_sub(1), width(has_int, COORD_INTEGER_BITS)),
            (fraction, width(has_fraction, COORD_FRACTIONAL_BITS)),
        ]
    }

    /// Write a normal component in `[-1, 1]`, larger magnitudes are clamped.
    pub fn write_bit_normal(&mut self, value: f32) {
        self.put_all(&Self::normal_fields(value));
    }

    /// Write a world coordinate, the fraction is truncated to 1/32.
    pub fn write_bit_coord(&mut self, value: f32) {
        let fields = self.coord_fields(value);
        self.put_all(&fields);
    }

    /// Write a multiplayer coordinate, see [`CoordType`] for the precision modes.
    pub fn write_bit_coord_mp(&mut self, value: f32, coord_type: CoordType) {
        let negative = value <= -coord_type.resolution();
        let (int_part, fraction) = split_coord(value, coord_type.denominator());
        let has_int = int_part != 0;
        let in_bounds = int_part < (1 << COORD_INTEGER_BITS_MP);
        let int_bits = if in_bounds {
            COORD_INTEGER_BITS_MP
        } else {
            COORD_INTEGER_BITS
        };
        if has_int {
            self.check_range(int_part - 1, int_bits);
        }
        let int_width = if has_int { int_bits } else { 0 };

        if coord_type == CoordType::Integral {
            self.put_all(&[
                (u32::from(in_bounds), 1),
                (u32::from(has_int), 1),
                (u32::from(negative), u32::from(has_int)),
                (int_part.wrapping_sub(1), int_width),
            ]);
            return;
        }

        self.put_all(&[
            (u32::from(in_bounds), 1),
            (u32::from(has_int), 1),
            (u32::from(negative), 1),
            (int_part.wrapping_sub(1), int_width),
            (fraction, coord_type.fractional_bits()),
        ]);
    }

    /// Write a cell coordinate as a `bits` wide integer and, unless integral, a fraction.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    pub fn write_bit_cell_coord(&mut self, value: f32, bits: u32, coord_type: CoordType) {
        assert!(bits <= 32, "cannot write {bits} bits at once");
        let (int_part, fraction) = split_coord(value, coord_type.denominator());
        self.check_range(int_part, bits);
        let fraction_bits = if coord_type == CoordType::Integral {
            0
        } else {
            coord_type.fractional_bits()
        };
        self.put_all(&[(int_part, bits), (fraction, fraction_bits)]);
    }

    /// Write an angle in degrees quantized to `bits` bits, it wraps around at 360.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    pub fn write_bit_angle(&mut self, angle: f32, bits: u32) {
        assert!(bits <= 32, "cannot write {bits} bits at once");
        let steps = 1_u64 << bits;
        let quantized = ((f64::from(angle) / 360.0) * steps as f64) as i64;
        self.put_checked(quantized as u32, bits);
    }

    /// Write three presence bits and a coordinate for every component that is not zero at
    /// coordinate resolution. The vector is written whole or not at all.
    pub fn write_vector3_coord(&mut self, v: Vector3) {
        let present = |c: f32| c >= COORD_RESOLUTION || c <= -COORD_RESOLUTION;
        let mut fields = [(0, 0); 3 + 3 * 5];
        for (i, c) in [v.x, v.y, v.z].into_iter().enumerate() {
            if present(c) {
                fields[i] = (1, 1);
                let at = 3 + i * 5;
                fields[at..at + 5].copy_from_slice(&self.coord_fields(c));
            } else {
                fields[i] = (0, 1);
            }
        }
        self.put_all(&fields);
    }

    /// Write a unit vector: x and y with presence bits, z as its sign only.
    /// The vector is written whole or not at all.
    pub fn write_vector3_normal(&mut self, v: Vector3) {
        let present = |c: f32| c >= NORMAL_RESOLUTION || c <= -NORMAL_RESOLUTION;
        let mut fields = [(0, 0); 2 + 2 * 2 + 1];
        for (i, c) in [v.x, v.y].into_iter().enumerate() {
            if present(c) {
                fields[i] = (1, 1);
                let at = 2 + i * 2;
                fields[at..at + 2].copy_from_slice(&Self::normal_fields(c));
            } else {
                fields[i] = (0, 1);
            }
        }
        fields[6] = (u32::from(v.z <= -NORMAL_RESOLUTION), 1);
        self.put_all(&fields);
    }

    /// Write euler angles with the layout of [`BitWriter::write_vector3_coord`].
    pub fn write_angles(&mut self, angles: Vector3) {
        self.write_vector3_coord(angles);
    }

    pub fn write_char(&mut self, value: i8) {
        self.write_signed_bits(i32::from(value), 8);
    }

    pub fn write_byte(&mut self, value: u8) {
        self.write_bits(u32::from(value), 8);
    }

    pub fn write_short(&mut self, value: i16) {
        self.write_signed_bits(i32::from(value), 16);
    }

    pub fn write_word(&mut self, value: u16) {
        self.write_bits(u32::from(value), 16);
    }

    pub fn write_long(&mut self, value: i32) {
        self.write_signed_bits(value, 32);
    }

    /// Write a 64 bit integer, low word first.
    pub fn write_long_long(&mut self, value: i64) {
        if self.check_for_overflow(64) {
            return;
        }
        self.put(value as u32, 32);
        self.put((value >> 32) as u32, 32);
    }

    pub fn write_float(&mut self, value: f32) {
        self.write_bit_float(value);
    }

    /// Write the first `bits` bits of `src`, returns false if the writer overflowed.
    ///
    /// # Panics
    /// It will panic if `src` is shorter than `bits` rounded up to bytes.
    pub fn write_bits_from_slice(&mut self, src: &[u8], bits: usize) -> bool {
        assert!(
            bit_byte(bits) <= src.len(),
            "{bits} bits exceed the {} bytes source",
            src.len()
        );
        if self.check_for_overflow(bits) {
            return false;
        }
        let whole = bits >> 3;
        for byte in &src[..whole] {
            self.put(u32::from(*byte), 8);
        }
        let rest = (bits & 7) as u32;
        if rest != 0 {
            self.put(u32::from(src[whole]), rest);
        }
        true
    }

    /// Write all of `bytes`, returns false if the writer overflowed.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> bool {
        self.write_bits_from_slice(bytes, bytes.len() * 8)
    }

    /// Copy `bits` bits out of `reader`, advancing it.
    /// Returns false if either buffer overflowed.
    pub fn write_bits_from_reader(&mut self, reader: &mut BitReader<'_>, mut bits: usize) -> bool {
        while bits > 32 {
            let value = reader.read_bits(32);
            self.put_checked(value, 32);
            bits -= 32;
        }
        let value = reader.read_bits(bits as u32);
        self.put_checked(value, bits as u32);
        !self.overflow && !reader.is_overflowed()
    }

    /// Write a string followed by a null terminator, an interior null ends the string early.
    /// Either the whole string is written or nothing, returns false if the writer overflowed.
    pub fn write_string(&mut self, s: impl AsRef<[u8]>) -> bool {
        let bytes = s.as_ref();
        let len = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        if self.check_for_overflow((len + 1) * 8) {
            return false;
        }
        for byte in &bytes[..len] {
            self.put(u32::from(*byte), 8);
        }
        self.put(0, 8);
        true
    }
}

impl Drop for BitWriter<'_> {
    fn drop(&mut self) {
        self.flush();
    }
}
