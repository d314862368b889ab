mod decoder;
mod encoder;
pub mod varint;

pub use self::decoder::{BitReader, StringRead};
pub use self::encoder::BitWriter;

/// Integer bits of a general purpose coordinate
pub const COORD_INTEGER_BITS: u32 = 14;
/// Fractional bits of a general purpose coordinate
pub const COORD_FRACTIONAL_BITS: u32 = 5;
pub const COORD_DENOMINATOR: u32 = 1 << COORD_FRACTIONAL_BITS;
pub const COORD_RESOLUTION: f32 = 1.0 / COORD_DENOMINATOR as f32;

/// Integer bits of an in-bounds multiplayer origin
pub const COORD_INTEGER_BITS_MP: u32 = 11;
/// Fractional bits of a low precision multiplayer origin
pub const COORD_FRACTIONAL_BITS_MP_LOWPRECISION: u32 = 3;
pub const COORD_DENOMINATOR_LOWPRECISION: u32 = 1 << COORD_FRACTIONAL_BITS_MP_LOWPRECISION;
pub const COORD_RESOLUTION_LOWPRECISION: f32 = 1.0 / COORD_DENOMINATOR_LOWPRECISION as f32;

/// Fractional bits of a normal component
pub const NORMAL_FRACTIONAL_BITS: u32 = 11;
pub const NORMAL_DENOMINATOR: u32 = (1 << NORMAL_FRACTIONAL_BITS) - 1;
pub const NORMAL_RESOLUTION: f32 = 1.0 / NORMAL_DENOMINATOR as f32;

/// Longest string `BitReader::read_owned_string` accepts, terminator excluded.
pub const MAX_OWNED_STRING: usize = 2048;

/// Precision mode of the multiplayer and cell coordinate encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordType {
    /// Integer part plus a full precision (5 bits) fraction
    #[default]
    Unconstrained,
    /// Integer part plus a low precision (3 bits) fraction
    LowPrecision,
    /// Integer part only
    Integral,
}

impl CoordType {
    pub(crate) fn fractional_bits(self) -> u32 {
        match self {
            CoordType::LowPrecision => COORD_FRACTIONAL_BITS_MP_LOWPRECISION,
            _ => COORD_FRACTIONAL_BITS,
        }
    }

    pub(crate) fn resolution(self) -> f32 {
        match self {
            CoordType::LowPrecision => COORD_RESOLUTION_LOWPRECISION,
            _ => COORD_RESOLUTION,
        }
    }

    pub(crate) fn denominator(self) -> u32 {
        match self {
            CoordType::LowPrecision => COORD_DENOMINATOR_LOWPRECISION,
            _ => COORD_DENOMINATOR,
        }
    }
}

/// Three component vector used for world coordinates, normals and euler angles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vector3> for [f32; 3] {
    fn from(v: Vector3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// Number of bytes needed to hold `bits` bits.
#[inline]
pub fn bit_byte(bits: usize) -> usize {
    (bits + 7) >> 3
}

/// Integer and fractional parts of `|f|` as the coordinate encoders split them.
/// Both parts truncate toward zero, the fraction keeps `frac_bits` bits.
#[inline]
pub(crate) fn split_coord(f: f32, denominator: u32) -> (u32, u32) {
    let int_part = f.abs() as u32;
    let frac_part = ((f * denominator as f32) as i32).unsigned_abs() & (denominator - 1);
    (int_part, frac_part)
}
