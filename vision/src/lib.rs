//! Locating visual patterns within captured screen rasters.
//!
//! A captured raster becomes the root [`Image`]; callers frame regions of
//! interest with [`Image::get_child_region`] or derive sibling regions with
//! [`Image::region_left`]/[`Image::region_above`], then search inside a view
//! with [`Image::find_image`]. Results come back as [`Region`]s plus a
//! confidence score, with [`Image::absolute_region`] translating any view
//! into root-raster coordinates for an input-injection collaborator to act
//! on.
//!
//! Pixel correlation itself lives behind the [`TemplateScorer`] trait;
//! [`NormalizedCorrelation`] is the bundled implementation.

mod error;
mod geometry;
mod search;
mod view;

pub use error::{Error, Result};
pub use geometry::{Overlap, Point, Region};
pub use search::{
    DEFAULT_MATCH_THRESHOLD, ImageMatch, NormalizedCorrelation, ScoreMap, TemplateScorer,
};
pub use view::Image;
