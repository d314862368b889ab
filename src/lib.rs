//! Bit-packed network buffers of the Source engine by rust
//!
//! [`BitReader`] and [`BitWriter`] read and write values at arbitrary bit offsets of a byte
//! slice, least significant bit first. On top of plain bit fields they carry the engine's
//! compact encodings: variable length integers, world coordinates, unit normals, angles and
//! null terminated strings.

#![warn(
    clippy::cognitive_complexity,
    clippy::dbg_macro,
    clippy::debug_assert_with_mut_call,
    clippy::doc_link_with_quotes,
    clippy::doc_markdown,
    clippy::empty_line_after_outer_attr,
    clippy::empty_structs_with_brackets,
    clippy::float_cmp,
    clippy::float_cmp_const,
    clippy::float_equality_without_abs,
    keyword_idents,
    missing_copy_implementations,
    missing_debug_implementations,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    non_ascii_idents,
    noop_method_call,
    clippy::option_if_let_else,
    clippy::print_stderr,
    clippy::print_stdout,
    clippy::semicolon_if_nothing_returned,
    clippy::unseparated_literal_suffix,
    clippy::shadow_unrelated,
    clippy::similar_names,
    clippy::suspicious_operation_groupings,
    unused_extern_crates,
    unused_import_braces,
    clippy::unused_self,
    clippy::use_debug,
    clippy::used_underscore_binding,
    clippy::useless_let_if_seq,
    clippy::wildcard_dependencies,
    clippy::wildcard_imports
)]

/// Bit buffer codec
mod codec;

/// Errors
mod errors;

/// Buffer options
mod opts;

/// Utils
mod utils;

/// Engine user messages
pub mod message;

/// Unit tests
#[cfg(test)]
mod tests;

pub use self::codec::varint;
pub use self::codec::{
    bit_byte, BitReader, BitWriter, CoordType, StringRead, Vector3, COORD_DENOMINATOR,
    COORD_DENOMINATOR_LOWPRECISION, COORD_FRACTIONAL_BITS, COORD_FRACTIONAL_BITS_MP_LOWPRECISION,
    COORD_INTEGER_BITS, COORD_INTEGER_BITS_MP, COORD_RESOLUTION, COORD_RESOLUTION_LOWPRECISION,
    MAX_OWNED_STRING, NORMAL_DENOMINATOR, NORMAL_FRACTIONAL_BITS, NORMAL_RESOLUTION,
};
pub use self::errors::{CodecError, Error, ErrorKind, Result};
pub use self::opts::{Config, ErrorHandler};
