use log::warn;

use crate::errors::ErrorKind;

/// The default bit buffer error handler, it logs the error and the buffer name.
pub(crate) fn log_error(kind: ErrorKind, debug_name: Option<&str>) {
    match debug_name {
        Some(name) => warn!("[bitbuf] {kind} in {name}"),
        None => warn!("[bitbuf] {kind}"),
    }
}
