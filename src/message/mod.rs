mod say_text;

use bytes::BytesMut;
use log::trace;

pub use self::say_text::SayText2;
use crate::codec::{BitReader, BitWriter};
use crate::errors::{CodecError, Result};
use crate::opts::Config;

/// A typed engine user message carried in a bit buffer.
pub trait UserMessage: Sized {
    /// The message type id the engine dispatches on
    const MSG_TYPE: u8;

    /// Upper bound of the encoded size in bytes
    const MAX_SIZE: usize;

    /// Decode the message, the reader is checked for overflow before returning.
    ///
    /// # Errors
    /// Any [`CodecError`] raised while decoding the fields.
    fn read(reader: &mut BitReader<'_>) -> Result<Self>;

    /// Encode the message.
    ///
    /// # Errors
    /// Fields that cannot be represented on the wire, the writer's overflow is checked by the
    /// caller.
    fn write(&self, writer: &mut BitWriter<'_>) -> Result<()>;

    /// Append the encoded message to `dst`, `dst` is left untouched on error.
    ///
    /// # Errors
    /// See [`UserMessage::write`] and [`CodecError::Overflow`].
    fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();
        dst.resize(start + Self::MAX_SIZE, 0);
        let written = {
            let mut writer = BitWriter::new(&mut dst[start..])
                .with_config(Config::new().debug_name("user message"));
            self.write(&mut writer).and_then(|()| {
                writer.check()?;
                Ok(writer.finish())
            })
        };
        match written {
            Ok(len) => {
                dst.truncate(start + len);
                Ok(())
            }
            Err(err) => {
                dst.truncate(start);
                Err(err)
            }
        }
    }
}

/// Read a null terminated string field that must fit in `N - 1` bytes.
pub(crate) fn read_field<const N: usize>(
    reader: &mut BitReader<'_>,
    name: &'static str,
) -> Result<String> {
    let mut buf = [0_u8; N];
    let read = reader.read_string(&mut buf, false);
    reader.check()?;
    if !read.complete {
        return Err(CodecError::StringTruncated(name).into());
    }
    let field = std::str::from_utf8(&buf[..read.len]).map_err(CodecError::from)?;
    Ok(field.to_owned())
}

/// Write a string field that must fit in `max - 1` bytes once read back.
pub(crate) fn write_field(
    writer: &mut BitWriter<'_>,
    field: &str,
    max: usize,
    name: &'static str,
) -> Result<()> {
    if field.len() >= max || field.as_bytes().contains(&0) {
        return Err(CodecError::StringTruncated(name).into());
    }
    writer.write_string(field);
    Ok(())
}

/// Message type id of `SayText`, it is decoded with the [`SayText2`] layout.
pub const SAY_TEXT: u8 = 3;

/// User messages this crate understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    SayText2(SayText2),
}

impl Message {
    pub fn msg_type(&self) -> u8 {
        match self {
            Message::SayText2(_) => SayText2::MSG_TYPE,
        }
    }

    /// Decode a dispatched user message, unknown types are skipped with `Ok(None)`.
    ///
    /// # Errors
    /// A known message type whose payload is malformed.
    pub fn read(msg_type: u8, data: &[u8]) -> Result<Option<Self>> {
        let mut reader =
            BitReader::new(data).with_config(Config::new().debug_name("user message"));
        let message = match msg_type {
            SAY_TEXT | SayText2::MSG_TYPE => {
                Message::SayText2(SayText2::read(&mut reader)?)
            }
            _ => {
                trace!("[message] skip unknown user message type {msg_type}");
                return Ok(None);
            }
        };
        trace!("[message] decoded user message: {:?}", message);
        Ok(Some(message))
    }

    /// Append the encoded payload to `dst`.
    ///
    /// # Errors
    /// See [`UserMessage::encode`].
    pub fn encode(&self, dst: &mut BytesMut) -> Result<()> {
        match self {
            Message::SayText2(msg) => msg.encode(dst),
        }
    }
}

impl From<SayText2> for Message {
    fn from(value: SayText2) -> Self {
        Message::SayText2(value)
    }
}
