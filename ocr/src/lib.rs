//! Token-level text search over recognized screen text.
//!
//! A [`TextMatcher`] feeds one raster through a [`TextRecognizer`] and
//! rebuilds the recognized tokens into a single searchable string, inserting
//! synthetic separators between words, lines, and paragraphs. Every byte of
//! that string maps back to a [`Region`](vision::Region) through an ordered
//! [`OcrMatch`] table, so a literal or regex [`Needle`] resolves to the
//! merged bounding box and confidence of the tokens it touches, even when
//! the match spans a separator.

mod error;
mod matcher;
mod token;

pub use error::{Error, Result};
pub use matcher::{Needle, SpanHit, TextMatcher};
pub use token::{OcrMatch, TextRecognizer, Token};
