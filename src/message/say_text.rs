use crate::codec::{BitReader, BitWriter};
use crate::errors::Result;
use crate::message::{read_field, write_field, UserMessage};

const MSG_NAME_LEN: usize = 50;
const PLAYER_NAME_LEN: usize = 128;
const TEXT_LEN: usize = 127;

/// Chat line broadcast by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SayText2 {
    /// Entity index of the speaker
    pub entity: u8,
    pub chat: bool,
    /// Localization token of the chat format
    pub msg_name: String,
    pub player_name: String,
    pub text: String,
    pub all_chat: bool,
}

impl UserMessage for SayText2 {
    const MAX_SIZE: usize = 1 + 2 + MSG_NAME_LEN + PLAYER_NAME_LEN + TEXT_LEN + 2;
    const MSG_TYPE: u8 = 4;

    fn read(reader: &mut BitReader<'_>) -> Result<Self> {
        let entity = reader.read_byte();
        let chat = reader.read_short() != 0;
        let msg_name = read_field::<MSG_NAME_LEN>(reader, "msg_name")?;
        let player_name = read_field::<PLAYER_NAME_LEN>(reader, "player_name")?;
        let text = read_field::<TEXT_LEN>(reader, "text")?;
        let all_chat = reader.read_short() != 0;
        reader.check()?;
        Ok(Self {
            entity,
            chat,
            msg_name,
            player_name,
            text,
            all_chat,
        })
    }

    fn write(&self, writer: &mut BitWriter<'_>) -> Result<()> {
        writer.write_byte(self.entity);
        writer.write_short(i16::from(self.chat));
        write_field(writer, &self.msg_name, MSG_NAME_LEN, "msg_name")?;
        write_field(writer, &self.player_name, PLAYER_NAME_LEN, "player_name")?;
        write_field(writer, &self.text, TEXT_LEN, "text")?;
        writer.write_short(i16::from(self.all_chat));
        Ok(())
    }
}
