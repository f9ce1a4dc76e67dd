use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An absolute screen coordinate in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    ///
    /// Symmetric, and zero exactly when the points coincide.
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// How much of the other region must fall inside for [`Region::contains`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Any shared pixel counts; touching edges count too.
    Any,
    /// The other region must lie entirely within (edges may touch).
    All,
}

impl FromStr for Overlap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            other => Err(Error::InvalidOverlap(other.to_string())),
        }
    }
}

/// An axis-aligned rectangle in pixels.
///
/// Width and height are non-negative by construction; `right`/`bottom` are
/// derived as `left + width` / `top + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Build a region from any two diagonally opposite corners.
    ///
    /// The result is the same regardless of which corner comes first.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    /// Build a region from its four edges.
    ///
    /// A crossed pair (right left of left, or bottom above top) clamps to
    /// zero width/height; OCR gap boxes between horizontally overlapping
    /// tokens rely on this.
    pub fn from_coordinates(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            width: (right - left).max(0) as u32,
            height: (bottom - top).max(0) as u32,
        }
    }

    pub fn right(self) -> i32 {
        self.left + self.width as i32
    }

    pub fn bottom(self) -> i32 {
        self.top + self.height as i32
    }

    /// The midpoint, rounded down to whole pixels.
    pub fn center(self) -> Point {
        Point::new(
            self.left + (self.width / 2) as i32,
            self.top + (self.height / 2) as i32,
        )
    }

    /// Whether the point lies inside the region; edges and corners count.
    pub fn contains_point(self, p: Point) -> bool {
        self.left <= p.x && p.x <= self.right() && self.top <= p.y && p.y <= self.bottom()
    }

    /// Whether this region contains `other` under the given overlap policy.
    ///
    /// [`Overlap::All`] requires every edge of `other` to be within or on
    /// this region's edges. [`Overlap::Any`] requires the horizontal and
    /// vertical intervals to overlap, edge-touching included.
    pub fn contains(self, other: Region, overlap: Overlap) -> bool {
        match overlap {
            Overlap::All => {
                self.left <= other.left
                    && other.right() <= self.right()
                    && self.top <= other.top
                    && other.bottom() <= self.bottom()
            }
            Overlap::Any => {
                self.left <= other.right()
                    && other.left <= self.right()
                    && self.top <= other.bottom()
                    && other.top <= self.bottom()
            }
        }
    }

    /// The same region shifted by an offset.
    pub fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}
