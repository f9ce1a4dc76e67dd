use std::cell::OnceCell;

use image::RgbaImage;
use regex::Regex;
use tracing::debug;
use vision::Region;

use crate::error::{Error, Result};
use crate::token::{OcrMatch, TextRecognizer, Token};

/// What to look for in the reconstructed text.
#[derive(Debug, Clone)]
pub enum Needle {
    /// First literal occurrence.
    Literal(String),
    /// First regex match.
    Pattern(Regex),
}

impl Needle {
    /// Leftmost match within `text`, as byte offsets local to it.
    fn first_match(&self, text: &str) -> Option<(usize, usize)> {
        match self {
            Needle::Literal(literal) => text
                .find(literal.as_str())
                .map(|start| (start, start + literal.len())),
            Needle::Pattern(regex) => regex.find(text).map(|m| (m.start(), m.end())),
        }
    }
}

impl From<&str> for Needle {
    fn from(literal: &str) -> Self {
        Needle::Literal(literal.to_string())
    }
}

impl From<String> for Needle {
    fn from(literal: String) -> Self {
        Needle::Literal(literal)
    }
}

impl From<Regex> for Needle {
    fn from(regex: Regex) -> Self {
        Needle::Pattern(regex)
    }
}

/// A found span resolved to the table entries that cover it.
///
/// The entries are whole tokens, so they may overshoot a span that starts
/// or ends inside one.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanHit {
    pub index_start: usize,
    pub index_end: usize,
    pub segments: Vec<OcrMatch>,
}

/// The reconstructed string and its ordered entry table.
#[derive(Debug)]
struct TokenTable {
    text: String,
    segments: Vec<OcrMatch>,
}

/// Searches recognized text within one raster.
///
/// The raster goes through the recognizer once, lazily on first use; the
/// reconstructed string and its index table are immutable afterwards.
/// Between tokens the reconstruction inserts a single space, between lines
/// of a paragraph the line break, and between paragraphs the paragraph
/// break, so a needle may span those synthetic separators.
pub struct TextMatcher<R> {
    image: RgbaImage,
    recognizer: R,
    language: Option<String>,
    line_break: String,
    paragraph_break: String,
    table: OnceCell<TokenTable>,
}

impl<R: TextRecognizer> TextMatcher<R> {
    pub fn new(image: RgbaImage, recognizer: R) -> Self {
        Self {
            image,
            recognizer,
            language: None,
            line_break: "\n".to_string(),
            paragraph_break: "\n\n".to_string(),
            table: OnceCell::new(),
        }
    }

    /// Language hint passed through to the recognizer.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Separator emitted between lines of one paragraph (default `"\n"`).
    pub fn with_line_break(mut self, line_break: impl Into<String>) -> Self {
        self.line_break = line_break.into();
        self
    }

    /// Separator emitted between paragraphs (default `"\n\n"`).
    pub fn with_paragraph_break(mut self, paragraph_break: impl Into<String>) -> Self {
        self.paragraph_break = paragraph_break.into();
        self
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// The reconstructed text, running recognition on first use.
    pub fn text(&self) -> Result<&str> {
        Ok(self.table()?.text.as_str())
    }

    fn table(&self) -> Result<&TokenTable> {
        if let Some(table) = self.table.get() {
            return Ok(table);
        }
        let built = self.build_table()?;
        Ok(self.table.get_or_init(|| built))
    }

    fn build_table(&self) -> Result<TokenTable> {
        let tokens = self
            .recognizer
            .recognize(&self.image, self.language.as_deref())?;
        let kept: Vec<Token> = tokens.into_iter().filter(usable).collect();

        let mut text = String::new();
        let mut segments: Vec<OcrMatch> = Vec::new();
        let mut previous: Option<&Token> = None;
        for token in &kept {
            if let Some(prev) = previous {
                let same_paragraph = (prev.page, prev.block, prev.paragraph)
                    == (token.page, token.block, token.paragraph);
                let break_text = if !same_paragraph {
                    self.paragraph_break.as_str()
                } else if prev.line != token.line {
                    self.line_break.as_str()
                } else {
                    " "
                };
                // The gap box runs from the previous token's right edge to
                // this token's left edge; overlapping boxes clamp to zero
                // width. It preserves reading order, not exact pixels.
                let gap = Region::from_coordinates(
                    prev.region.right(),
                    prev.region.top,
                    token.region.left,
                    prev.region.bottom(),
                );
                segments.push(OcrMatch {
                    index_start: text.len(),
                    index_end: text.len() + break_text.len(),
                    region: gap,
                    confidence: None,
                });
                text.push_str(break_text);
            }
            segments.push(OcrMatch {
                index_start: text.len(),
                index_end: text.len() + token.text.len(),
                region: token.region,
                confidence: Some(token.confidence / 100.0),
            });
            text.push_str(&token.text);
            previous = Some(token);
        }

        debug!(
            tokens = kept.len(),
            entries = segments.len(),
            bytes = text.len(),
            "token table built"
        );
        Ok(TokenTable { text, segments })
    }

    /// Resolve the first occurrence of `needle` within `text[start..end]`
    /// (`end` defaults to the full length) to the table entries covering it.
    ///
    /// Offsets are bytes into the reconstructed text and must lie on char
    /// boundaries. Returns `None` when the needle does not occur; textual
    /// absence is an expected outcome, not an error.
    ///
    /// The entry containing the match start is always whole, so a match
    /// beginning mid-token reports the full token's box; a match ending
    /// mid-token within a multi-entry span stops at the last entry it fully
    /// covers. Both are long-standing observed behavior that callers depend
    /// on.
    pub fn find_bounding_boxes(
        &self,
        needle: &Needle,
        start: usize,
        end: Option<usize>,
    ) -> Result<Option<SpanHit>> {
        let table = self.table()?;
        let end = end.unwrap_or(table.text.len());
        let window = table
            .text
            .get(start..end)
            .ok_or(Error::InvalidRange {
                start,
                end,
                len: table.text.len(),
            })?;

        let Some((local_start, local_end)) = needle.first_match(window) else {
            return Ok(None);
        };
        let index_start = start + local_start;
        let index_end = start + local_end;

        let Some(first) = table
            .segments
            .iter()
            .position(|seg| seg.index_start <= index_start && index_start < seg.index_end)
        else {
            return Ok(None);
        };

        let mut segments = Vec::new();
        if index_end <= table.segments[first].index_end {
            segments.push(table.segments[first].clone());
        } else {
            let mut i = first;
            while i < table.segments.len() && index_end >= table.segments[i].index_end {
                segments.push(table.segments[i].clone());
                i += 1;
            }
        }

        Ok(Some(SpanHit {
            index_start,
            index_end,
            segments,
        }))
    }

    /// Every occurrence in order, each search resuming at the previous
    /// span's end, so the results never overlap.
    pub fn find_bounding_boxes_all(
        &self,
        needle: &Needle,
        start: usize,
        end: Option<usize>,
    ) -> Result<Vec<SpanHit>> {
        let text_len = self.table()?.text.len();
        let limit = end.unwrap_or(text_len);

        let mut results = Vec::new();
        let mut cursor = start;
        while cursor <= limit {
            let Some(hit) = self.find_bounding_boxes(needle, cursor, end)? else {
                break;
            };
            // A zero-width regex match would resume where it started; step
            // over one char so the scan always terminates.
            cursor = if hit.index_end > cursor {
                hit.index_end
            } else {
                next_char_boundary(self.table()?.text.as_str(), hit.index_end)
            };
            results.push(hit);
        }
        Ok(results)
    }

    /// The first occurrence of `needle` as one merged entry: the smallest
    /// box covering every resolved segment, and the lowest real-token
    /// confidence among them. Separators neither crash the aggregation nor
    /// count as zero; a span crossing only separators has `None` confidence.
    pub fn find(
        &self,
        needle: &Needle,
        start: usize,
        end: Option<usize>,
    ) -> Result<Option<OcrMatch>> {
        let hit = self.find_bounding_boxes(needle, start, end)?;
        Ok(hit.as_ref().and_then(merge_hit))
    }

    /// Every merged occurrence in order; see [`TextMatcher::find`].
    pub fn find_all(
        &self,
        needle: &Needle,
        start: usize,
        end: Option<usize>,
    ) -> Result<Vec<OcrMatch>> {
        Ok(self
            .find_bounding_boxes_all(needle, start, end)?
            .iter()
            .filter_map(merge_hit)
            .collect())
    }
}

/// Tokens with empty text or unusable confidence never reach the table.
fn usable(token: &Token) -> bool {
    !token.text.is_empty() && token.confidence.is_finite() && token.confidence >= 0.0
}

fn next_char_boundary(text: &str, index: usize) -> usize {
    match text[index..].chars().next() {
        Some(c) => index + c.len_utf8(),
        None => index + 1,
    }
}

fn merge_hit(hit: &SpanHit) -> Option<OcrMatch> {
    let first = hit.segments.first()?;
    let mut left = first.region.left;
    let mut top = first.region.top;
    let mut right = first.region.right();
    let mut bottom = first.region.bottom();
    for segment in &hit.segments[1..] {
        left = left.min(segment.region.left);
        top = top.min(segment.region.top);
        right = right.max(segment.region.right());
        bottom = bottom.max(segment.region.bottom());
    }
    let confidence = hit
        .segments
        .iter()
        .filter_map(|segment| segment.confidence)
        .reduce(f32::min);
    Some(OcrMatch {
        index_start: hit.index_start,
        index_end: hit.index_end,
        region: Region::from_coordinates(left, top, right, bottom),
        confidence,
    })
}
