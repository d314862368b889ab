use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::codec::varint::varint32_len;
use crate::codec::{BitReader, BitWriter, CoordType, Vector3, COORD_RESOLUTION};
use crate::errors::CodecError;
use crate::opts::Config;

fn init_logger() {
    let _ignore = env_logger::builder().is_test(true).try_init();
}

fn quiet(name: &'static str) -> Config {
    Config::new().debug_name(name).error_handler(None)
}

fn mask(bits: u32) -> u32 {
    if bits == 32 {
        u32::MAX
    } else {
        (1 << bits) - 1
    }
}

#[test]
fn test_unsigned_round_trip_every_width() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(114514);
    let mut buf = [0_u8; 1024];
    let mut values = Vec::new();
    {
        let mut writer = BitWriter::new(&mut buf).with_config(quiet("unsigned"));
        for bits in 1..=32 {
            for _ in 0..4 {
                let value = rng.r#gen::<u32>() & mask(bits);
                writer.write_bits(value, bits);
                values.push((value, bits));
            }
            // the extremes of every width
            writer.write_bits(mask(bits), bits);
            values.push((mask(bits), bits));
        }
        assert!(!writer.is_overflowed());
    }

    let mut reader = BitReader::new(&buf).with_config(quiet("unsigned"));
    for (value, bits) in values {
        assert_eq!(reader.read_bits(bits), value, "width {bits}");
    }
    assert!(!reader.is_overflowed());
}

#[test]
fn test_signed_round_trip_every_width() {
    let mut rng = StdRng::seed_from_u64(1919810);
    let mut buf = [0_u8; 1024];
    let mut values = Vec::new();
    {
        let mut writer = BitWriter::new(&mut buf).with_config(quiet("signed"));
        for bits in 1..=32_u32 {
            let min = if bits == 32 {
                i32::MIN
            } else {
                -(1 << (bits - 1))
            };
            let max = if bits == 32 {
                i32::MAX
            } else {
                (1 << (bits - 1)) - 1
            };
            for value in [min, max, rng.gen_range(min..=max)] {
                writer.write_signed_bits(value, bits);
                values.push((value, bits));
            }
        }
        assert!(!writer.is_overflowed());
    }

    let mut reader = BitReader::new(&buf).with_config(quiet("signed"));
    for (value, bits) in values {
        assert_eq!(reader.read_signed_bits(bits), value, "width {bits}");
    }
}

#[test]
fn test_variable_uint_round_trip() {
    let values = [0, 15, 16, 255, 256, 4095, 4096, u32::MAX];
    let mut buf = [0_u8; 64];
    {
        let mut writer = BitWriter::new(&mut buf);
        for value in values {
            writer.write_variable_uint(value);
        }
        // 6 + 6 + 10 + 10 + 14 + 14 + 34 + 34 bits
        assert_eq!(writer.bits_written(), 128);
    }
    let mut reader = BitReader::new(&buf);
    for value in values {
        assert_eq!(reader.read_variable_uint(), value);
    }
    assert_eq!(reader.bits_read(), 128);
}

#[test]
fn test_varint_round_trip_and_length() {
    let values = [0, 127, 128, 16383, 16384, u32::MAX];
    for value in values {
        let mut buf = [0_u8; 8];
        let written = {
            let mut writer = BitWriter::new(&mut buf);
            writer.write_varint32(value);
            writer.finish()
        };
        assert_eq!(written, varint32_len(value));
        let mut reader = BitReader::new(&buf[..written]);
        assert_eq!(reader.read_varint32(), value);
        assert!(!reader.is_overflowed());
    }

    let mut buf = [0_u8; 16];
    {
        let mut writer = BitWriter::new(&mut buf);
        writer.write_varint64(u64::MAX);
        assert_eq!(writer.bytes_written(), 10);
    }
    assert_eq!(BitReader::new(&buf).read_varint64(), u64::MAX);
}

#[test]
fn test_zigzag_round_trip() {
    let values = [0, -1, 1, -2, i32::MAX, i32::MIN];
    let mut buf = [0_u8; 64];
    {
        let mut writer = BitWriter::new(&mut buf);
        for value in values {
            writer.write_zigzag32(value);
            writer.write_zigzag64(i64::from(value) * 3);
        }
    }
    let mut reader = BitReader::new(&buf);
    for value in values {
        assert_eq!(reader.read_zigzag32(), value);
        assert_eq!(reader.read_zigzag64(), i64::from(value) * 3);
    }
}

#[test]
fn test_overflow_preserves_prefix() {
    init_logger();
    let mut buf = [0xff_u8; 4];
    {
        let mut writer = BitWriter::new(&mut buf[..3]).with_config(quiet("prefix"));
        writer.write_bits(0x1234, 16);
        writer.write_bits(0x3f, 12);
        assert!(writer.is_overflowed());
        assert_eq!(writer.bits_written(), 24);
        // sticky, even for writes that would fit
        writer.write_bit(true);
        assert!(writer.is_overflowed());
        assert_eq!(
            writer.check(),
            Err(CodecError::Overflow {
                name: "prefix",
                total: 24
            })
        );
    }
    assert_eq!(&buf[..2], &[0x34, 0x12]);
    // nothing past the destination is touched
    assert_eq!(buf[3], 0xff);

    let mut reader = BitReader::new(&buf[..2]);
    assert_eq!(reader.read_word(), 0x1234);
}

#[test]
fn test_peek_never_advances() {
    let mut rng = StdRng::seed_from_u64(42);
    let data: Vec<u8> = (0..16).map(|_| rng.r#gen()).collect();
    let mut reader = BitReader::new(&data);
    for bits in [1, 7, 13, 32, 3, 32] {
        let at = reader.bits_read();
        let peeked = reader.peek_bits(bits);
        assert_eq!(reader.bits_read(), at);
        assert_eq!(reader.read_bits(bits), peeked);
    }
    assert!(!reader.is_overflowed());
}

#[test]
fn test_zero_coord_is_two_bits() {
    let mut buf = [0_u8; 4];
    {
        let mut writer = BitWriter::new(&mut buf);
        writer.write_bit_coord(0.0);
        assert_eq!(writer.bits_written(), 2);
        writer.write_bit_coord(-0.0);
        assert_eq!(writer.bits_written(), 4);
    }
    let mut reader = BitReader::new(&buf);
    let zero = reader.read_bit_coord();
    assert_eq!(zero.to_bits(), 0.0_f32.to_bits());
    assert_eq!(reader.bits_read(), 2);
}

#[test]
fn test_exhausted_buffer_reads_zero() {
    let data = [0xff_u8; 2];
    let mut reader = BitReader::new(&data).with_config(quiet("exhausted"));
    assert_eq!(reader.read_bits(16), 0xffff);
    assert!(!reader.read_bit());
    assert!(reader.is_overflowed());
    assert_eq!(reader.read_bits(8), 0);
    assert_eq!(reader.read_varint32(), 0);
    assert_eq!(reader.read_long_long(), 0);
    assert_eq!(reader.read_bit_coord().to_bits(), 0);
    assert_eq!(reader.read_vector3_coord(), Vector3::ZERO);
    assert_eq!(reader.read_vector3_normal(), Vector3::ZERO);
    assert_eq!(reader.read_variable_uint(), 0);
    assert_eq!(reader.bits_read(), 16);

    reader.reset();
    assert!(!reader.is_overflowed());
    assert_eq!(reader.read_byte(), 0xff);
}

/// Encoded width of one value written as a coordinate and as the three MP coordinate modes.
fn coord_group_bits(value: f32) -> usize {
    let int_part = value.abs() as u32;
    let fraction = ((value * 32.0) as i32).unsigned_abs() & 31;
    let coord = match (int_part != 0, fraction != 0) {
        (false, false) => 2,
        (has_int, has_fraction) => 3 + usize::from(has_int) * 14 + usize::from(has_fraction) * 5,
    };
    let int_bits = if int_part < 2048 { 11 } else { 14 };
    let int_width = if int_part != 0 { int_bits } else { 0 };
    let unconstrained = 3 + int_width + 5;
    let low_precision = 3 + int_width + 3;
    let integral = if int_part != 0 { 3 + int_bits } else { 2 };
    coord + unconstrained + low_precision + integral
}

#[test]
fn test_coord_round_trip_within_resolution() {
    let mut rng = StdRng::seed_from_u64(7);
    let values: Vec<f32> = (0..64).map(|_| rng.gen_range(-16000.0..16000.0)).collect();
    let mut buf = [0_u8; 2048];
    {
        let mut writer = BitWriter::new(&mut buf);
        for value in &values {
            writer.write_bit_coord(*value);
            writer.write_bit_coord_mp(*value, CoordType::Unconstrained);
            writer.write_bit_coord_mp(*value, CoordType::LowPrecision);
            writer.write_bit_coord_mp(*value, CoordType::Integral);
        }
        assert!(!writer.is_overflowed());
        let expected: usize = values.iter().map(|v| coord_group_bits(*v)).sum();
        assert_eq!(writer.bits_written(), expected);
    }

    let mut reader = BitReader::new(&buf);
    for value in values {
        let coord = reader.read_bit_coord();
        assert!((coord - value).abs() <= COORD_RESOLUTION, "{coord} vs {value}");
        let mp = reader.read_bit_coord_mp(CoordType::Unconstrained);
        assert!((mp - value).abs() <= COORD_RESOLUTION, "{mp} vs {value}");
        let low = reader.read_bit_coord_mp(CoordType::LowPrecision);
        assert!((low - value).abs() <= 0.125, "{low} vs {value}");
        let integral = reader.read_bit_coord_mp(CoordType::Integral);
        assert!((integral - value).abs() < 1.0, "{integral} vs {value}");
    }
    assert!(!reader.is_overflowed());
}

#[test]
fn test_vectors_round_trip() {
    let origin = Vector3::new(-1024.5, 0.0, 3.75);
    let angles = Vector3::new(90.0, -45.25, 0.0);
    let normal = Vector3::new(0.6, -0.48, -0.64);
    let mut buf = [0_u8; 64];
    {
        let mut writer = BitWriter::new(&mut buf);
        writer.write_vector3_coord(origin);
        writer.write_angles(angles);
        writer.write_vector3_normal(normal);
        writer.write_bit_angle(123.0, 16);
    }

    let mut reader = BitReader::new(&buf);
    assert_eq!(reader.read_vector3_coord(), origin);
    assert_eq!(reader.read_angles(), angles);
    let decoded = reader.read_vector3_normal();
    assert!((decoded.x - normal.x).abs() < 1e-3);
    assert!((decoded.y - normal.y).abs() < 1e-3);
    assert!((decoded.z - normal.z).abs() < 1e-2);
    assert!((reader.read_bit_angle(16) - 123.0).abs() < 360.0 / 65536.0);
    assert!(!reader.is_overflowed());
}

#[test]
fn test_mixed_stream() {
    init_logger();
    let mut buf = [0_u8; 128];
    let written = {
        let mut writer = BitWriter::new(&mut buf).with_config(quiet("mixed"));
        writer.write_bit(true);
        writer.write_byte(0xab);
        writer.write_string("hello");
        writer.write_bits(5, 3);
        writer.write_float(1.5);
        writer.write_long_long(-2);
        writer.write_bit_normal(-0.5);
        writer.write_bit_cell_coord(17.5, 5, CoordType::Unconstrained);
        writer.check().unwrap();
        writer.finish()
    };

    let mut reader = BitReader::new(&buf[..written]).with_config(quiet("mixed"));
    assert!(reader.read_bit());
    assert_eq!(reader.read_byte(), 0xab);
    assert_eq!(reader.read_owned_string().unwrap(), "hello");
    assert_eq!(reader.read_bits(3), 5);
    assert!((reader.read_float() - 1.5).abs() < f32::EPSILON);
    assert_eq!(reader.read_long_long(), -2);
    assert!((reader.read_bit_normal() + 0.5).abs() < 1e-3);
    assert!((reader.read_bit_cell_coord(5, CoordType::Unconstrained) - 17.5).abs() < 1e-6);
    reader.check().unwrap();
    assert!(reader.bits_left() < 8);
}
