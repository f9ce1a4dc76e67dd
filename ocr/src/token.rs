use image::RgbaImage;
use vision::Region;

/// One recognized word, tagged with its place in the document structure.
///
/// Grouping ids follow the recognizer's document order: tokens sharing
/// `(page, block, paragraph)` belong to one paragraph, and `line` orders the
/// lines within it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    /// Bounding box in the recognized raster's frame.
    pub region: Region,
    /// Engine confidence in `[0, 100]`.
    pub confidence: f32,
    pub page: u32,
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

/// One entry of the reconstructed text's index table.
///
/// `index_start..index_end` is a half-open byte range; the ordered entry
/// list for one raster partitions the reconstructed string exactly.
/// Synthetic separators carry `None` confidence and a gap box spanning from
/// the preceding token's right edge to the following token's left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrMatch {
    pub index_start: usize,
    pub index_end: usize,
    pub region: Region,
    /// `None` for synthetic separators; engine confidence scaled to `[0, 1]`
    /// for real tokens.
    pub confidence: Option<f32>,
}

/// The OCR engine collaborator.
///
/// Returns the flat token table in document order. Failures on unreadable
/// input propagate unchanged; identical input fails identically, so retrying
/// belongs to the caller, not here.
pub trait TextRecognizer {
    fn recognize(
        &self,
        image: &RgbaImage,
        language: Option<&str>,
    ) -> anyhow::Result<Vec<Token>>;
}
