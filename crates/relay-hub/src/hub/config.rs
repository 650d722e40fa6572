//! Hub configuration

/// Options recognized at hub construction.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Initial capacity, in bytes, of the per-message fragment assembly
    /// buffer.
    pub read_buffer_size: usize,

    /// Whether a decode error on receive terminates the connection
    /// (`true`) or skips the offending frame (`false`).
    pub close_on_decode_error: bool,

    /// Subprotocol name the host advertises during the transport upgrade.
    /// The hub itself only carries the value; the upgrade is the host's.
    pub subprotocol: Option<String>,
}

/// Default fragment assembly buffer capacity.
const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            close_on_decode_error: true,
            subprotocol: None,
        }
    }
}

impl HubConfig {
    /// Set the fragment assembly buffer capacity.
    #[must_use]
    pub fn with_read_buffer_size(mut self, bytes: usize) -> Self {
        self.read_buffer_size = bytes;
        self
    }

    /// Set whether decode errors are fatal to the connection.
    #[must_use]
    pub fn with_close_on_decode_error(mut self, close: bool) -> Self {
        self.close_on_decode_error = close;
        self
    }

    /// Set the advertised subprotocol name.
    #[must_use]
    pub fn with_subprotocol(mut self, name: impl Into<String>) -> Self {
        self.subprotocol = Some(name.into());
        self
    }
}
