use crate::codec::varint::{
    zigzag_decode32, zigzag_decode64, MAX_VARINT32_BYTES, MAX_VARINT64_BYTES,
};
use crate::codec::{
    bit_byte, CoordType, Vector3, COORD_FRACTIONAL_BITS, COORD_INTEGER_BITS,
    COORD_INTEGER_BITS_MP, COORD_RESOLUTION, MAX_OWNED_STRING, NORMAL_FRACTIONAL_BITS,
    NORMAL_RESOLUTION,
};
use crate::errors::CodecError;
use crate::opts::Config;
use crate::utils::MASK_TABLE;

/// Outcome of [`BitReader::read_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringRead {
    /// Bytes copied into the destination, terminator excluded
    pub len: usize,
    /// The whole string fit in the destination and the buffer did not overflow
    pub complete: bool,
}

/// Sequential, bounds checked reader over a packed bitstream.
///
/// Bits are consumed least significant first within each byte, so a 32 bit read at a byte
/// aligned position is a little endian `u32`.
///
/// Reading past the end never touches memory outside the borrowed slice: the reader enters
/// a sticky overflow state, the cursor is parked at [`BitReader::total_bits`] and every read
/// returns the zero value of its type until [`BitReader::reset`]. Check
/// [`BitReader::is_overflowed`] (or [`BitReader::check`]) once after a sequence of reads.
#[derive(Debug, Clone)]
#[allow(missing_copy_implementations)]
pub struct BitReader<'a> {
    data: &'a [u8],
    data_bits: usize,
    cur_bit: usize,
    overflow: bool,
    config: Config,
}

impl<'a> BitReader<'a> {
    /// Read all `data.len() * 8` bits of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            data_bits: data.len() * 8,
            cur_bit: 0,
            overflow: false,
            config: Config::default(),
        }
    }

    /// Limit the readable bits, it should not exceed `data.len() * 8`.
    pub fn with_bits(mut self, bits: usize) -> Self {
        let max = self.data.len() * 8;
        debug_assert!(bits <= max, "{bits} bits exceed the {max} bits of the buffer");
        self.data_bits = bits.min(max);
        self.cur_bit = self.cur_bit.min(self.data_bits);
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Restart reading from the first bit and clear the overflow flag.
    pub fn reset(&mut self) {
        self.cur_bit = 0;
        self.overflow = false;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn debug_name(&self) -> Option<&'static str> {
        self.config.name()
    }

    /// The underlying buffer
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn total_bits(&self) -> usize {
        self.data_bits
    }

    pub fn total_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn bits_read(&self) -> usize {
        self.cur_bit
    }

    pub fn bytes_read(&self) -> usize {
        bit_byte(self.cur_bit)
    }

    pub fn bits_left(&self) -> usize {
        self.data_bits - self.cur_bit
    }

    pub fn bytes_left(&self) -> usize {
        self.bits_left() >> 3
    }

    pub fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// Put the reader into the overflow state.
    pub fn set_overflow(&mut self) {
        if !self.overflow {
            self.overflow = true;
            self.config.overflowed();
        }
    }

    /// Turn the overflow flag into an error, useful at message boundaries.
    ///
    /// # Errors
    /// [`CodecError::Overflow`] if any read so far ran out of bits.
    pub fn check(&self) -> Result<(), CodecError> {
        if self.overflow {
            return Err(CodecError::Overflow {
                name: self.config.display_name(),
                total: self.data_bits,
            });
        }
        Ok(())
    }

    /// Seek to a specific bit, returns false and overflows if `bit` is out of range.
    pub fn seek(&mut self, bit: usize) -> bool {
        if bit > self.data_bits {
            self.cur_bit = self.data_bits;
            self.set_overflow();
            return false;
        }
        self.cur_bit = bit;
        true
    }

    /// Seek to an offset from the current position.
    pub fn seek_relative(&mut self, delta: isize) -> bool {
        match self.cur_bit.checked_add_signed(delta) {
            Some(bit) => self.seek(bit),
            None => {
                self.cur_bit = self.data_bits;
                self.set_overflow();
                false
            }
        }
    }

    /// Returns true (and parks the cursor at the end) if `bits` more bits cannot be read.
    #[inline]
    fn check_for_overflow(&mut self, bits: usize) -> bool {
        if !self.overflow && self.cur_bit + bits > self.data_bits {
            self.cur_bit = self.data_bits;
            self.set_overflow();
        }
        self.overflow
    }

    /// Load `bits` (<= 32) bits starting at `bit`, the caller ensures they are in range.
    #[inline]
    fn load(&self, bit: usize, bits: u32) -> u32 {
        if bits == 0 {
            return 0;
        }
        let first = bit >> 3;
        let last = (bit + bits as usize - 1) >> 3;
        // at most 5 bytes: 7 bits of skew plus 32 bits of payload
        let mut word = 0_u64;
        for (i, byte) in self.data[first..=last].iter().enumerate() {
            word |= u64::from(*byte) << (i * 8);
        }
        ((word >> (bit & 7)) as u32) & MASK_TABLE[bits as usize]
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> bool {
        if self.check_for_overflow(1) {
            return false;
        }
        let bit = self.data[self.cur_bit >> 3] & (1 << (self.cur_bit & 7));
        self.cur_bit += 1;
        bit != 0
    }

    /// Read `bits` bits as an unsigned integer.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    #[inline]
    pub fn read_bits(&mut self, bits: u32) -> u32 {
        assert!(bits <= 32, "cannot read {bits} bits at once");
        if self.check_for_overflow(bits as usize) {
            return 0;
        }
        let value = self.load(self.cur_bit, bits);
        self.cur_bit += bits as usize;
        value
    }

    /// Read `bits` bits and sign extend them from the highest one.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    pub fn read_signed_bits(&mut self, bits: u32) -> i32 {
        let value = self.read_bits(bits);
        if bits == 0 {
            return 0;
        }
        let shift = 32 - bits;
        ((value << shift) as i32) >> shift
    }

    /// Read `bits` bits without moving the cursor.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    pub fn peek_bits(&mut self, bits: u32) -> u32 {
        let saved = self.cur_bit;
        let value = self.read_bits(bits);
        self.cur_bit = saved;
        value
    }

    /// Read an unsigned integer with a variable bit length.
    ///
    /// A 6 bit header carries the low nibble of the value and a 2 bit size class above it,
    /// the classes 1, 2 and 3 are followed by 4, 8 and 28 more bits of the value.
    pub fn read_variable_uint(&mut self) -> u32 {
        let header = self.read_bits(6);
        let low = header & 15;
        let value = match header >> 4 {
            0 => low,
            1 => low | (self.read_bits(4) << 4),
            2 => low | (self.read_bits(8) << 4),
            _ => low | (self.read_bits(32 - 4) << 4),
        };
        self.or_zero(value)
    }

    /// `value` unless the field being read ran out of bits.
    #[inline]
    fn or_zero<T: Default>(&self, value: T) -> T {
        if self.overflow {
            T::default()
        } else {
            value
        }
    }

    /// Read a base-128 varint of at most 5 bytes.
    pub fn read_varint32(&mut self) -> u32 {
        let mut result = 0_u32;
        for count in 0..MAX_VARINT32_BYTES {
            let byte = self.read_bits(8);
            result |= (byte & 0x7f) << (7 * count);
            if byte & 0x80 == 0 {
                break;
            }
        }
        self.or_zero(result)
    }

    /// Read a base-128 varint of at most 10 bytes.
    pub fn read_varint64(&mut self) -> u64 {
        let mut result = 0_u64;
        for count in 0..MAX_VARINT64_BYTES {
            let byte = self.read_bits(8);
            result |= u64::from(byte & 0x7f) << (7 * count);
            if byte & 0x80 == 0 {
                break;
            }
        }
        self.or_zero(result)
    }

    /// Read a zig-zag encoded varint.
    pub fn read_zigzag32(&mut self) -> i32 {
        zigzag_decode32(self.read_varint32())
    }

    /// Read a zig-zag encoded varint.
    pub fn read_zigzag64(&mut self) -> i64 {
        zigzag_decode64(self.read_varint64())
    }

    /// Reinterpret the next 32 bits as an IEEE-754 float.
    pub fn read_bit_float(&mut self) -> f32 {
        f32::from_bits(self.read_bits(32))
    }

    /// Read a normal component: a sign bit and 11 fractional bits.
    pub fn read_bit_normal(&mut self) -> f32 {
        let negative = self.read_bit();
        let fraction = self.read_bits(NORMAL_FRACTIONAL_BITS);
        let value = fraction as f32 * NORMAL_RESOLUTION;
        self.or_zero(if negative { -value } else { value })
    }

    /// Read a world coordinate, integer and fraction are each preceded by a presence bit.
    pub fn read_bit_coord(&mut self) -> f32 {
        let has_int = self.read_bit();
        let has_fraction = self.read_bit();
        if !has_int && !has_fraction {
            return 0.0;
        }
        let negative = self.read_bit();
        let int_part = if has_int {
            self.read_bits(COORD_INTEGER_BITS) + 1
        } else {
            0
        };
        let fraction = if has_fraction {
            self.read_bits(COORD_FRACTIONAL_BITS)
        } else {
            0
        };
        self.signed_coord(negative, int_part, fraction, COORD_RESOLUTION)
    }

    /// Read a multiplayer coordinate, see [`CoordType`] for the precision modes.
    pub fn read_bit_coord_mp(&mut self, coord_type: CoordType) -> f32 {
        let in_bounds = self.read_bit();
        let has_int = self.read_bit();
        let int_bits = if in_bounds {
            COORD_INTEGER_BITS_MP
        } else {
            COORD_INTEGER_BITS
        };

        if coord_type == CoordType::Integral {
            if !has_int {
                return 0.0;
            }
            let negative = self.read_bit();
            let int_part = self.read_bits(int_bits) + 1;
            return self.signed_coord(negative, int_part, 0, COORD_RESOLUTION);
        }

        let negative = self.read_bit();
        let int_part = if has_int {
            self.read_bits(int_bits) + 1
        } else {
            0
        };
        let fraction = self.read_bits(coord_type.fractional_bits());
        self.signed_coord(negative, int_part, fraction, coord_type.resolution())
    }

    /// Read a cell coordinate: a fixed width integer, followed by a fraction unless integral.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    pub fn read_bit_cell_coord(&mut self, bits: u32, coord_type: CoordType) -> f32 {
        let int_part = self.read_bits(bits);
        let fraction = if coord_type == CoordType::Integral {
            0
        } else {
            self.read_bits(coord_type.fractional_bits())
        };
        self.signed_coord(false, int_part, fraction, coord_type.resolution())
    }

    #[inline]
    fn signed_coord(&self, negative: bool, int_part: u32, fraction: u32, resolution: f32) -> f32 {
        if self.overflow {
            return 0.0;
        }
        let value = int_part as f32 + fraction as f32 * resolution;
        if negative {
            -value
        } else {
            value
        }
    }

    /// Read an angle in degrees quantized to `bits` bits.
    ///
    /// # Panics
    /// It will panic if `bits` is greater than 32.
    pub fn read_bit_angle(&mut self, bits: u32) -> f32 {
        let value = self.read_bits(bits);
        let steps = (1_u64 << bits) as f32;
        value as f32 * (360.0 / steps)
    }

    /// Read three presence bits followed by a coordinate for every present component.
    pub fn read_vector3_coord(&mut self) -> Vector3 {
        let has_x = self.read_bit();
        let has_y = self.read_bit();
        let has_z = self.read_bit();
        let mut v = Vector3::ZERO;
        if has_x {
            v.x = self.read_bit_coord();
        }
        if has_y {
            v.y = self.read_bit_coord();
        }
        if has_z {
            v.z = self.read_bit_coord();
        }
        self.or_zero(v)
    }

    /// Read a unit vector: x and y are sent, z is rebuilt from them and a sign bit.
    pub fn read_vector3_normal(&mut self) -> Vector3 {
        let has_x = self.read_bit();
        let has_y = self.read_bit();
        let mut v = Vector3::ZERO;
        if has_x {
            v.x = self.read_bit_normal();
        }
        if has_y {
            v.y = self.read_bit_normal();
        }
        let z_negative = self.read_bit();
        let xy = v.x * v.x + v.y * v.y;
        if xy < 1.0 {
            v.z = (1.0 - xy).sqrt();
        }
        if z_negative {
            v.z = -v.z;
        }
        self.or_zero(v)
    }

    /// Read euler angles, they share the wire layout of [`BitReader::read_vector3_coord`].
    pub fn read_angles(&mut self) -> Vector3 {
        self.read_vector3_coord()
    }

    pub fn read_char(&mut self) -> i8 {
        self.read_signed_bits(8) as i8
    }

    pub fn read_byte(&mut self) -> u8 {
        self.read_bits(8) as u8
    }

    pub fn read_short(&mut self) -> i16 {
        self.read_signed_bits(16) as i16
    }

    pub fn read_word(&mut self) -> u16 {
        self.read_bits(16) as u16
    }

    pub fn read_long(&mut self) -> i32 {
        self.read_bits(32) as i32
    }

    /// Read a 64 bit integer, low word first.
    pub fn read_long_long(&mut self) -> i64 {
        let low = u64::from(self.read_bits(32));
        let high = u64::from(self.read_bits(32));
        self.or_zero(((high << 32) | low) as i64)
    }

    pub fn read_float(&mut self) -> f32 {
        self.read_bit_float()
    }

    /// Copy `bits` bits into `out`, byte by byte.
    ///
    /// # Panics
    /// It will panic if `out` is shorter than `bits` rounded up to bytes.
    pub fn read_bits_into(&mut self, out: &mut [u8], bits: usize) {
        assert!(
            bit_byte(bits) <= out.len(),
            "{bits} bits do not fit in {} bytes",
            out.len()
        );
        if self.check_for_overflow(bits) {
            return;
        }
        let whole = bits >> 3;
        for byte in &mut out[..whole] {
            *byte = self.read_bits(8) as u8;
        }
        let rest = (bits & 7) as u32;
        if rest != 0 {
            out[whole] = self.read_bits(rest) as u8;
        }
    }

    /// Fill `out` with the following bytes, returns false if the buffer overflowed.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> bool {
        let bits = out.len() * 8;
        self.read_bits_into(out, bits);
        !self.overflow
    }

    /// Read a null terminated string into `buf`.
    ///
    /// It always consumes the whole string so the next field can be read, stopping at a null
    /// or, with `stop_at_newline`, at a `\n`. At most `buf.len() - 1` bytes are copied and
    /// the copied bytes are always null terminated (unless `buf` is empty).
    pub fn read_string(&mut self, buf: &mut [u8], stop_at_newline: bool) -> StringRead {
        let mut len = 0;
        let mut too_small = false;
        loop {
            // an overflowed buffer reads zeros, which terminates the loop
            let byte = self.read_byte();
            if byte == 0 || (stop_at_newline && byte == b'\n') {
                break;
            }
            if len + 1 < buf.len() {
                buf[len] = byte;
                len += 1;
            } else {
                too_small = true;
            }
        }
        if let Some(end) = buf.get_mut(len) {
            *end = 0;
        }
        StringRead {
            len,
            complete: !self.overflow && !too_small,
        }
    }

    /// Read a null terminated UTF-8 string of at most [`MAX_OWNED_STRING`] bytes.
    ///
    /// # Errors
    /// [`CodecError::Overflow`] if the buffer ran out before the terminator,
    /// [`CodecError::StringTooLong`] if the string exceeds the limit (it is still consumed) and
    /// [`CodecError::InvalidString`] if it is not valid UTF-8.
    pub fn read_owned_string(&mut self) -> Result<String, CodecError> {
        let mut buf = [0_u8; MAX_OWNED_STRING + 1];
        let read = self.read_string(&mut buf, false);
        self.check()?;
        if !read.complete {
            return Err(CodecError::StringTooLong(MAX_OWNED_STRING));
        }
        Ok(std::str::from_utf8(&buf[..read.len])?.to_owned())
    }
}
