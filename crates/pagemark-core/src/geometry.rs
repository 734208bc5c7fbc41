use serde::{Deserialize, Serialize};
use std::fmt;

/// Native document units per inch (PDF points).
pub const NATIVE_UNITS_PER_INCH: f64 = 72.0;

/// A point in raster/display space, as observed on the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A user-drawn rectangle in display space.
///
/// The anchor is the first click and the extents are signed deltas to the
/// second click, so a region drawn right-to-left has a negative width. The
/// directional form is kept everywhere (storage, overlay redraw, extraction).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub anchor: Point,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// The corner opposite the anchor (the second click).
    pub fn far_corner(&self) -> Point {
        Point::new(self.anchor.x + self.width, self.anchor.y + self.height)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:+}x{:+}", self.anchor, self.width, self.height)
    }
}

/// A rectangle in the document's native coordinate units, handed to the
/// text extractor. Same directional convention as [`Region`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl NativeRect {
    /// Min-corner form with non-negative extents: `(x, y, w, h)`.
    ///
    /// Only for collaborators that cannot take directional extents.
    pub fn normalized(&self) -> (f64, f64, f64, f64) {
        let x = self.x.min(self.x + self.width);
        let y = self.y.min(self.y + self.height);
        (x, y, self.width.abs(), self.height.abs())
    }
}

/// Maps between display space (the rendered raster) and native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    /// Display pixels per native unit.
    scale: f64,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        CoordinateMapper { scale: 1.0 }
    }
}

impl CoordinateMapper {
    /// Mapper for a raster rendered at `dpi` dots per inch.
    ///
    /// At 72 dpi one native unit is one pixel and the mapping is the identity.
    pub fn for_dpi(dpi: f64) -> Self {
        CoordinateMapper {
            scale: dpi / NATIVE_UNITS_PER_INCH,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Clicks are taken as-is: selections are drawn in the space they are observed in.
    pub fn point_from_click(&self, display_x: f64, display_y: f64) -> Point {
        Point::new(display_x, display_y)
    }

    pub fn rectangle_from_two_points(&self, p0: Point, p1: Point) -> Region {
        Region {
            anchor: p0,
            width: p1.x - p0.x,
            height: p1.y - p0.y,
        }
    }

    pub fn extraction_rectangle(&self, region: &Region) -> NativeRect {
        NativeRect {
            x: region.anchor.x / self.scale,
            y: region.anchor.y / self.scale,
            width: region.width / self.scale,
            height: region.height / self.scale,
        }
    }

    /// Inverse of [`extraction_rectangle`](Self::extraction_rectangle), for overlays.
    pub fn display_rectangle(&self, rect: &NativeRect) -> Region {
        Region {
            anchor: Point::new(rect.x * self.scale, rect.y * self.scale),
            width: rect.width * self.scale,
            height: rect.height * self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_clicks_make_anchor_and_extent() {
        let mapper = CoordinateMapper::default();
        let r = mapper.rectangle_from_two_points(Point::new(10.0, 20.0), Point::new(50.0, 70.0));
        assert_eq!(r.anchor, Point::new(10.0, 20.0));
        assert_eq!(r.width, 40.0);
        assert_eq!(r.height, 50.0);
    }

    #[test]
    fn test_reverse_clicks_keep_direction() {
        let mapper = CoordinateMapper::default();
        let r = mapper.rectangle_from_two_points(Point::new(50.0, 70.0), Point::new(10.0, 20.0));
        assert_eq!(r.anchor, Point::new(50.0, 70.0));
        assert_eq!(r.width, -40.0);
        assert_eq!(r.height, -50.0);
        assert_eq!(r.far_corner(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_identity_at_72_dpi() {
        let mapper = CoordinateMapper::for_dpi(72.0);
        let r = mapper.rectangle_from_two_points(Point::new(10.0, 20.0), Point::new(-5.0, 70.0));
        let native = mapper.extraction_rectangle(&r);
        assert_eq!(
            native,
            NativeRect {
                x: 10.0,
                y: 20.0,
                width: -15.0,
                height: 50.0
            }
        );
    }

    #[test]
    fn test_scaled_mapping_round_trips() {
        let mapper = CoordinateMapper::for_dpi(144.0);
        assert_eq!(mapper.scale(), 2.0);
        let r = mapper.rectangle_from_two_points(Point::new(100.0, 40.0), Point::new(20.0, 240.0));
        let native = mapper.extraction_rectangle(&r);
        assert_eq!(native.x, 50.0);
        assert_eq!(native.width, -40.0);
        assert_eq!(native.height, 100.0);
        assert_eq!(mapper.display_rectangle(&native), r);
    }

    #[test]
    fn test_normalized_flips_negative_extents() {
        let rect = NativeRect {
            x: 50.0,
            y: 70.0,
            width: -40.0,
            height: -50.0,
        };
        assert_eq!(rect.normalized(), (10.0, 20.0, 40.0, 50.0));
    }
}
