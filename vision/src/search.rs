use image::{GrayImage, RgbaImage};
use imageproc::template_matching::{match_template, MatchTemplateMethod};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Overlap, Region};
use crate::view::Image;

/// Score a candidate offset must reach before it counts as an occurrence.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.99;

/// Dense per-offset similarity grid over a haystack's coordinate space.
///
/// Offset `(x, y)` scores the needle placed with its top-left corner there,
/// so the grid is `haystack - needle + 1` cells in each dimension.
pub struct ScoreMap {
    width: u32,
    height: u32,
    scores: Vec<f32>,
}

impl ScoreMap {
    pub fn new(width: u32, height: u32, scores: Vec<f32>) -> Self {
        debug_assert_eq!(scores.len(), (width * height) as usize);
        Self {
            width,
            height,
            scores,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.scores[(y * self.width + x) as usize]
    }
}

/// The correlation collaborator: scores the needle at every integer offset
/// of the haystack. Implementations own the actual correlation math; the
/// search engine only consumes the resulting grid.
pub trait TemplateScorer {
    fn score_map(&self, needle: &RgbaImage, haystack: &RgbaImage) -> anyhow::Result<ScoreMap>;
}

/// Normalized cross-correlation over a grayscale conversion.
///
/// A needle larger than the haystack in either dimension yields an empty
/// grid rather than an error; the caller decides whether absence matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizedCorrelation;

impl TemplateScorer for NormalizedCorrelation {
    fn score_map(&self, needle: &RgbaImage, haystack: &RgbaImage) -> anyhow::Result<ScoreMap> {
        if needle.width() > haystack.width() || needle.height() > haystack.height() {
            return Ok(ScoreMap::new(0, 0, Vec::new()));
        }
        let needle = to_gray(needle);
        let haystack = to_gray(haystack);
        let scored = match_template(
            &haystack,
            &needle,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );
        let (width, height) = scored.dimensions();
        Ok(ScoreMap::new(width, height, scored.into_raw()))
    }
}

fn to_gray(image: &RgbaImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// One accepted occurrence: the matched area framed as a child of the
/// searched view, plus the score that accepted it.
#[derive(Debug, Clone)]
pub struct ImageMatch {
    pub image: Image,
    pub score: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    region: Region,
    score: f64,
}

/// Collapse the cluster of near-duplicate offsets around each true
/// occurrence to a single candidate: accept the best remaining score (the
/// input's scan order breaks ties), drop everything overlapping it, repeat.
fn dedup_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut accepted = Vec::new();
    while !candidates.is_empty() {
        let mut best = 0;
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.score > candidates[best].score {
                best = i;
            }
        }
        let winner = candidates[best];
        accepted.push(winner);
        candidates.retain(|c| !winner.region.contains(c.region, Overlap::Any));
    }
    accepted
}

impl Image {
    /// Every occurrence of `needle` within this view, one match per true
    /// occurrence, ordered best score first.
    ///
    /// Sub-pixel shifts make a genuine occurrence score high at several
    /// neighboring offsets; those near-duplicates collapse to the single
    /// best-scoring offset, with scan order (top-to-bottom, then
    /// left-to-right) breaking score ties.
    pub fn find_image_all<S>(
        &self,
        needle: &Image,
        scorer: &S,
        threshold: f64,
    ) -> Result<Vec<ImageMatch>>
    where
        S: TemplateScorer + ?Sized,
    {
        let needle_buffer = needle.to_buffer();
        let haystack_buffer = self.to_buffer();
        let scores = scorer.score_map(&needle_buffer, &haystack_buffer)?;

        let mut candidates = Vec::new();
        for y in 0..scores.height() {
            for x in 0..scores.width() {
                let score = f64::from(scores.get(x, y));
                if score.is_finite() && score >= threshold {
                    candidates.push(Candidate {
                        region: Region::new(x as i32, y as i32, needle.width(), needle.height()),
                        score,
                    });
                }
            }
        }

        let total = candidates.len();
        let accepted = dedup_candidates(candidates);
        debug!(
            total,
            accepted = accepted.len(),
            threshold,
            "template candidates deduplicated"
        );

        accepted
            .into_iter()
            .map(|candidate| {
                Ok(ImageMatch {
                    image: self.get_child_region(candidate.region)?,
                    score: candidate.score,
                })
            })
            .collect()
    }

    /// The single best occurrence of `needle` within this view.
    ///
    /// Fails with [`Error::NeedleNotFound`] when no offset reaches
    /// `threshold`.
    pub fn find_image<S>(&self, needle: &Image, scorer: &S, threshold: f64) -> Result<ImageMatch>
    where
        S: TemplateScorer + ?Sized,
    {
        self.find_image_all(needle, scorer, threshold)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NeedleNotFound {
                needle_width: needle.width(),
                needle_height: needle.height(),
                haystack_width: self.width(),
                haystack_height: self.height(),
                threshold,
            })
    }
}
