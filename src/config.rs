//! Slicer configuration.

use crate::float_types::{MAX_GAP, Real, SAFETY_OFFSET};

/// How the loops of a layer are turned into regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SlicingMode {
    /// Counter-clockwise loops add material and clockwise loops remove it,
    /// visiting loops from the largest to the smallest.
    #[default]
    Regular,
    /// Loop orientation is ignored; a point is inside when an odd number of
    /// loops surround it.
    EvenOdd,
    /// Every loop is turned counter-clockwise, so every loop adds material.
    /// Closes the holes of meshes with inverted or mixed winding.
    Positive,
    /// Like [`SlicingMode::Positive`], keeping only the largest region of
    /// each layer.
    PositiveLargestContour,
}

/// Parameters shared by slicing and cutting.
#[derive(Debug, Clone, PartialEq)]
pub struct SlicerConfig {
    pub mode: SlicingMode,

    /// Grow-then-shrink delta applied by the nesting resolver to merge
    /// near-coincident seams. `0.0` disables the pass.
    pub safety_offset: Real,

    /// Morphological closing radius of the nesting resolver: regions are
    /// grown by this much and shrunk back, closing gaps narrower than twice
    /// the radius.
    pub closing_radius: Real,

    /// Final outward (positive) or inward (negative) offset of every region.
    pub extra_offset: Real,

    /// Keep loops that could not be closed and try to chain them into closed
    /// polygons in a second pass, instead of discarding them.
    pub close_open_polylines: bool,

    /// Largest gap bridged between open polyline ends when
    /// `close_open_polylines` is set. `0.0` only joins ends on the same mesh
    /// vertex or edge.
    pub max_gap: Real,

    /// Close the halves of a cut with triangulated caps. Without caps both
    /// halves are left open along the plane.
    pub triangulate_caps: bool,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            mode: SlicingMode::Regular,
            safety_offset: SAFETY_OFFSET,
            closing_radius: 0.0,
            extra_offset: 0.0,
            close_open_polylines: false,
            max_gap: MAX_GAP,
            triangulate_caps: true,
        }
    }
}

impl SlicerConfig {
    #[must_use]
    pub const fn with_mode(mut self, mode: SlicingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the nesting safety offset. Negative values are clamped to zero.
    #[must_use]
    pub fn with_safety_offset(mut self, safety_offset: Real) -> Self {
        self.safety_offset = safety_offset.max(0.0);
        self
    }

    /// Set the closing radius. Negative values are clamped to zero.
    #[must_use]
    pub fn with_closing_radius(mut self, closing_radius: Real) -> Self {
        self.closing_radius = closing_radius.max(0.0);
        self
    }

    #[must_use]
    pub const fn with_extra_offset(mut self, extra_offset: Real) -> Self {
        self.extra_offset = extra_offset;
        self
    }

    /// Enable or disable open-polyline stitching.
    #[must_use]
    pub const fn with_close_open_polylines(mut self, enabled: bool) -> Self {
        self.close_open_polylines = enabled;
        self
    }

    /// Set the largest bridged gap. Negative values are clamped to zero.
    #[must_use]
    pub fn with_max_gap(mut self, max_gap: Real) -> Self {
        self.max_gap = max_gap.max(0.0);
        self
    }

    #[must_use]
    pub const fn with_triangulate_caps(mut self, enabled: bool) -> Self {
        self.triangulate_caps = enabled;
        self
    }

    /// A configuration that performs no safety offset and preserves loop
    /// coordinates exactly through nesting.
    #[must_use]
    pub fn exact() -> Self {
        Self {
            safety_offset: 0.0,
            ..Default::default()
        }
    }

    /// Outward and inward deltas applied after the safety pass, derived from
    /// the closing radius and the extra offset.
    pub(crate) fn closing_deltas(&self) -> (Real, Real) {
        if self.closing_radius >= self.extra_offset {
            (self.closing_radius, -(self.closing_radius - self.extra_offset))
        } else {
            (self.extra_offset, 0.0)
        }
    }
}
