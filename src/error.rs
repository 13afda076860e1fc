/// Errors returned by playlist construction, mutation, and decoding.
///
/// The taxonomy is closed: every failure mode of the crate maps onto one of
/// these variants. Encoding never fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structurally broken input: missing `#EXTM3U`, malformed `#EXTINF`,
    /// unparseable numbers, or an attribute list that cannot be recovered.
    #[error("bad playlist format: {0}")]
    BadFormat(String),

    /// An `#EXT...` tag that is neither built in nor covered by a registered
    /// custom decoder. Only raised in strict mode.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// A feature was observed that requires a higher protocol version than
    /// the playlist declares.
    #[error("playlist version mismatch: {description} (actual {actual}, required {required})")]
    VersionMismatch {
        actual: u8,
        required: u8,
        description: String,
    },

    /// Append on a ring buffer that already holds `capacity` segments.
    #[error("playlist is full")]
    PlaylistFull,

    /// Remove or a per-segment mutator on a playlist with no segments.
    #[error("playlist is empty")]
    PlaylistEmpty,

    /// Constructor or `set_winsize` arguments violate `winsize <= capacity`.
    #[error("invalid size: winsize must not exceed capacity")]
    InvalidSize,

    /// Out-of-range parameter: negative or non-finite duration, skip count
    /// beyond the stored window, mutation of a closed playlist.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Surfaced from the underlying reader during `decode_from`.
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
