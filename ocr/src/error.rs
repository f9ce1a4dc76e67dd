use thiserror::Error;

/// Errors produced while building or searching the token table.
///
/// A needle that simply is not present is not an error; the search methods
/// return `None`/empty for that.
#[derive(Debug, Error)]
pub enum Error {
    /// Search offsets that do not address the reconstructed text.
    #[error(
        "invalid search range {start}..{end} for text of {len} bytes \
         (offsets must lie on char boundaries)"
    )]
    InvalidRange {
        start: usize,
        end: usize,
        len: usize,
    },

    /// The recognizer collaborator failed; its error passes through unchanged.
    #[error(transparent)]
    Recognizer(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
