//! Error types for the compression stream.

use thiserror::Error;

/// Everything that can go wrong while producing a bzip2 stream.
///
/// Configuration and state errors are raised before any byte is touched.
/// I/O errors from the sink propagate verbatim and leave the encoder
/// unusable; partial output must be discarded by the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested block size is outside the supported 1-9 range.
    #[error("block size {0} out of range, must be 1-9 (100k-900k)")]
    BlockSize(usize),

    /// The stream was already finished; no further writes are accepted.
    #[error("compression stream already finished")]
    Finished,

    /// A segmented-output producer overflowed a segment length field.
    /// Never produced by single-stream compression.
    #[error("output segment length overflow")]
    SegmentOverflow,

    /// The underlying sink rejected a write.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(io_err) => io_err,
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
