use std::sync::Arc;

use image::RgbaImage;

use crate::error::{Error, Result};
use crate::geometry::Region;

/// One node of a view tree: the root raster, or a framed sub-region of its
/// parent. Links point rootward only, and the pixel buffer is shared, so a
/// child keeps the raster alive for as long as it exists.
#[derive(Debug)]
struct Node {
    buffer: Arc<RgbaImage>,
    parent: Option<Arc<Node>>,
    /// The node's region in its parent's local frame. For the root this is
    /// the whole raster anchored at the origin.
    region: Region,
}

/// A view into a captured screen raster.
///
/// The root view owns the pixels; descendants created with
/// [`Image::get_child_region`] address sub-regions of their parent without
/// copying. Cloning a view is cheap and refers to the same node.
#[derive(Debug, Clone)]
pub struct Image {
    node: Arc<Node>,
}

impl PartialEq for Image {
    /// Views compare by node identity: two handles to the same framing are
    /// equal, while re-framing the same region yields a distinct view.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for Image {}

impl Image {
    /// Wrap a raster as the root of a new view tree.
    pub fn new(buffer: RgbaImage) -> Self {
        let region = Region::new(0, 0, buffer.width(), buffer.height());
        Self {
            node: Arc::new(Node {
                buffer: Arc::new(buffer),
                parent: None,
                region,
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.node.region.width
    }

    pub fn height(&self) -> u32 {
        self.node.region.height
    }

    /// The view's region in its parent's local frame.
    pub fn region(&self) -> Region {
        self.node.region
    }

    /// The view's region in the root raster's frame, composed by walking the
    /// chain of parent offsets.
    pub fn absolute_region(&self) -> Region {
        let mut region = self.node.region;
        let mut parent = self.node.parent.as_deref();
        while let Some(node) = parent {
            region = region.translate(node.region.left, node.region.top);
            parent = node.parent.as_deref();
        }
        region
    }

    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    pub fn parent(&self) -> Option<Image> {
        self.node
            .parent
            .as_ref()
            .map(|node| Image { node: Arc::clone(node) })
    }

    /// Frame a sub-region of this view, expressed in this view's local frame.
    ///
    /// Fails with [`Error::OutOfBounds`] if any edge of `region` falls
    /// outside this view; the check happens before anything is constructed.
    pub fn get_child_region(&self, region: Region) -> Result<Image> {
        if region.left < 0
            || region.top < 0
            || region.right() > self.width() as i32
            || region.bottom() > self.height() as i32
        {
            return Err(Error::OutOfBounds {
                requested: region,
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(Image {
            node: Arc::new(Node {
                buffer: Arc::clone(&self.node.buffer),
                parent: Some(Arc::clone(&self.node)),
                region,
            }),
        })
    }

    fn own_region(&self, absolute: bool) -> Region {
        if absolute {
            self.absolute_region()
        } else {
            self.region()
        }
    }

    /// The sibling region directly left of this view, in the local or
    /// absolute frame per the flag.
    ///
    /// With `size`, the region is exactly that wide and flush against this
    /// view's left edge. Without, it fills from coordinate 0 of the chosen
    /// frame up to this view's left edge; for a nested view the local
    /// frame's origin is not the root's edge. No bounds validation happens
    /// here; it occurs if the result is later framed with
    /// [`Image::get_child_region`].
    pub fn region_left(&self, size: Option<u32>, absolute: bool) -> Region {
        let own = self.own_region(absolute);
        match size {
            Some(size) => Region::new(own.left - size as i32, own.top, size, own.height),
            None => Region::new(0, own.top, own.left.max(0) as u32, own.height),
        }
    }

    /// [`Image::region_left`] transposed onto the vertical axis.
    pub fn region_above(&self, size: Option<u32>, absolute: bool) -> Region {
        let own = self.own_region(absolute);
        match size {
            Some(size) => Region::new(own.left, own.top - size as i32, own.width, size),
            None => Region::new(own.left, 0, own.width, own.top.max(0) as u32),
        }
    }

    /// Materialize this view's pixels as an owned raster.
    ///
    /// Collaborators (correlation scorers, OCR engines) consume rasters
    /// rather than views, so searching starts here.
    pub fn to_buffer(&self) -> RgbaImage {
        let abs = self.absolute_region();
        image::imageops::crop_imm(
            self.node.buffer.as_ref(),
            abs.left as u32,
            abs.top as u32,
            abs.width,
            abs.height,
        )
        .to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any_root() -> Image {
        // A root large enough for the nesting fixtures below.
        Image::new(RgbaImage::new(1313, 817))
    }

    fn child(image: &Image, region: Region) -> Image {
        image.get_child_region(region).expect("region in bounds")
    }

    #[test]
    fn root_dimensions_match_the_buffer() {
        let root = any_root();
        assert_eq!(root.width(), 1313);
        assert_eq!(root.height(), 817);
        assert_eq!(root.region(), Region::new(0, 0, 1313, 817));
        assert_eq!(root.absolute_region(), root.region());
        assert!(root.is_root());
    }

    #[test]
    fn child_keeps_its_local_region_and_dimensions() {
        let root = any_root();
        let region = Region::new(10, 30, 100, 400);
        let child = child(&root, region);

        assert_eq!(child.width(), 100);
        assert_eq!(child.height(), 400);
        assert_eq!(child.region(), region);
        assert_eq!(child.absolute_region(), region);
        assert_eq!(child.parent().unwrap(), root);
    }

    #[test]
    fn grandchild_composes_absolute_region_up_the_chain() {
        let root = any_root();
        let child = child(&root, Region::new(10, 30, 100, 400));
        let grandchild_region = Region::new(3, 5, 20, 100);
        let grandchild = child.get_child_region(grandchild_region).unwrap();

        assert_eq!(grandchild.region(), grandchild_region);
        assert_eq!(grandchild.absolute_region(), Region::new(13, 35, 20, 100));
    }

    #[test]
    fn out_of_bounds_framing_is_rejected_on_every_edge() {
        let root = any_root();
        let rejected = [
            Region::new(-1, 30, 100, 400),
            Region::new(10, -1, 100, 400),
            Region::new(10, 30, 10_000, 400),
            Region::new(10, 30, 100, 40_000),
        ];
        for region in rejected {
            let err = root.get_child_region(region).unwrap_err();
            assert!(
                matches!(err, Error::OutOfBounds { .. }),
                "expected out-of-bounds for {region}"
            );
        }
    }

    #[test]
    fn child_bounds_are_validated_against_the_parent_not_the_root() {
        let root = any_root();
        let child = child(&root, Region::new(10, 30, 100, 400));
        // Fits the root, exceeds the 100-wide child.
        assert!(child.get_child_region(Region::new(0, 0, 101, 10)).is_err());
    }

    #[test]
    fn region_left_for_a_child_of_the_root() {
        let root = any_root();
        let child = child(&root, Region::new(10, 30, 100, 400));

        assert_eq!(child.region_left(None, false), Region::new(0, 30, 10, 400));
        assert_eq!(child.region_left(None, true), Region::new(0, 30, 10, 400));
        assert_eq!(child.region_left(Some(3), false), Region::new(7, 30, 3, 400));
        assert_eq!(child.region_left(Some(3), true), Region::new(7, 30, 3, 400));
    }

    #[test]
    fn region_left_for_a_grandchild_distinguishes_frames() {
        let root = any_root();
        let child = child(&root, Region::new(10, 30, 100, 400));
        let grandchild = child.get_child_region(Region::new(3, 5, 20, 100)).unwrap();

        assert_eq!(
            grandchild.region_left(None, false),
            Region::new(0, 5, 3, 100)
        );
        assert_eq!(
            grandchild.region_left(None, true),
            Region::new(0, 35, 13, 100)
        );
        assert_eq!(
            grandchild.region_left(Some(2), false),
            Region::new(1, 5, 2, 100)
        );
        assert_eq!(
            grandchild.region_left(Some(4), true),
            Region::new(9, 35, 4, 100)
        );
    }

    #[test]
    fn region_above_for_a_child_of_the_root() {
        let root = any_root();
        let child = child(&root, Region::new(10, 30, 100, 400));

        assert_eq!(child.region_above(None, false), Region::new(10, 0, 100, 30));
        assert_eq!(child.region_above(None, true), Region::new(10, 0, 100, 30));
        assert_eq!(
            child.region_above(Some(3), false),
            Region::new(10, 27, 100, 3)
        );
        assert_eq!(
            child.region_above(Some(3), true),
            Region::new(10, 27, 100, 3)
        );
    }

    #[test]
    fn region_above_for_a_grandchild_distinguishes_frames() {
        let root = any_root();
        let child = child(&root, Region::new(10, 30, 100, 400));
        let grandchild = child.get_child_region(Region::new(3, 5, 20, 100)).unwrap();

        assert_eq!(
            grandchild.region_above(None, false),
            Region::new(3, 0, 20, 5)
        );
        assert_eq!(
            grandchild.region_above(None, true),
            Region::new(13, 0, 20, 35)
        );
        assert_eq!(
            grandchild.region_above(Some(2), false),
            Region::new(3, 3, 20, 2)
        );
        assert_eq!(
            grandchild.region_above(Some(4), true),
            Region::new(13, 31, 20, 4)
        );
    }

    #[test]
    fn sibling_regions_of_a_flush_child_can_have_zero_size() {
        let root = any_root();
        let child = child(&root, Region::new(0, 0, 100, 100));
        assert_eq!(child.region_left(None, false), Region::new(0, 0, 0, 100));
        assert_eq!(child.region_above(None, true), Region::new(0, 0, 100, 0));
    }

    #[test]
    fn to_buffer_crops_at_the_absolute_region() {
        let mut raster = RgbaImage::new(40, 40);
        raster.put_pixel(13, 35, image::Rgba([1, 2, 3, 255]));
        let root = Image::new(raster);
        let child = root.get_child_region(Region::new(10, 30, 20, 10)).unwrap();
        let grandchild = child.get_child_region(Region::new(3, 5, 5, 5)).unwrap();

        let buffer = grandchild.to_buffer();
        assert_eq!(buffer.dimensions(), (5, 5));
        assert_eq!(buffer.get_pixel(0, 0), &image::Rgba([1, 2, 3, 255]));
    }
}
