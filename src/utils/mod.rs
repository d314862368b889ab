mod log;
mod mask;

pub(crate) use self::log::*;
pub(crate) use self::mask::*;
