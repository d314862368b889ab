use crate::errors::ErrorKind;
use crate::utils::log_error;

/// Diagnostic callback invoked on out-of-range writes and buffer overruns.
pub type ErrorHandler = fn(ErrorKind, Option<&str>);

/// Per-buffer diagnostics options.
///
/// Every [`BitReader`](crate::BitReader) and [`BitWriter`](crate::BitWriter) carries its own
/// copy, so two buffers never share an error handler or a debug name.
///
/// The error handler is a development aid: it is only called in builds with
/// `debug_assertions`, and it never changes what the codec reads or writes.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Name that gets reported if the buffer overflows
    debug_name: Option<&'static str>,
    /// Trip a debug assertion when the buffer overflows
    assert_on_overflow: bool,
    /// Called with the error category and the debug name, `None` disables it
    error_handler: Option<ErrorHandler>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            debug_name: None,
            assert_on_overflow: false,
            error_handler: Some(log_error),
        }
    }

    /// Set the debug name
    /// The default value is empty
    pub fn debug_name(mut self, name: &'static str) -> Self {
        self.debug_name = Some(name);
        self
    }

    /// Enable or disable assertion on overflow. Most of the time an overflow is a bug that
    /// needs to be caught, but some buffers are allowed to overflow gracefully.
    /// The default value is false
    pub fn assert_on_overflow(mut self, assert: bool) -> Self {
        self.assert_on_overflow = assert;
        self
    }

    /// Install an error handler, `None` uninstalls it.
    /// The default handler logs through [`log`].
    pub fn error_handler(mut self, handler: Option<ErrorHandler>) -> Self {
        self.error_handler = handler;
        self
    }

    pub(crate) fn name(&self) -> Option<&'static str> {
        self.debug_name
    }

    pub(crate) fn display_name(&self) -> &'static str {
        self.debug_name.unwrap_or("<unnamed>")
    }

    /// Report an error to the installed handler, a no-op in release builds.
    #[inline]
    pub(crate) fn report(&self, kind: ErrorKind) {
        if !cfg!(debug_assertions) {
            return;
        }
        if let Some(handler) = self.error_handler {
            handler(kind, self.debug_name);
        }
    }

    /// Called when a buffer transitions into the overflow state.
    pub(crate) fn overflowed(&self) {
        log::debug!("[bitbuf] {} overflowed", self.display_name());
        debug_assert!(
            !self.assert_on_overflow,
            "bit buffer {} overflowed",
            self.display_name()
        );
        self.report(ErrorKind::BufferOverrun);
    }
}
