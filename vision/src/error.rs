use thiserror::Error;

use crate::geometry::Region;

/// Errors produced while addressing or searching images.
#[derive(Debug, Error)]
pub enum Error {
    /// A requested child or sibling region falls outside the parent image.
    ///
    /// Raised before any node is constructed; a failed framing leaves no
    /// partial state behind.
    #[error("region {requested} is out of bounds for a {width}x{height} image")]
    OutOfBounds {
        requested: Region,
        width: u32,
        height: u32,
    },

    /// A required visual match did not reach the score threshold anywhere.
    #[error(
        "{needle_width}x{needle_height} needle not found in \
         {haystack_width}x{haystack_height} haystack (threshold {threshold})"
    )]
    NeedleNotFound {
        needle_width: u32,
        needle_height: u32,
        haystack_width: u32,
        haystack_height: u32,
        threshold: f64,
    },

    /// An overlap mode name other than `"any"` or `"all"`.
    #[error("unsupported overlap mode {0:?}; expected \"any\" or \"all\"")]
    InvalidOverlap(String),

    /// The correlation collaborator failed; its error passes through unchanged.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
