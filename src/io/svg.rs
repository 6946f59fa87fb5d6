use crate::float_types::Real;
use crate::polygon::{ExPolygon, Polygon};
use svg::Document;
use svg::node::element::Path;
use svg::node::element::path::Data;

/// Append one closed subpath per loop. Y is negated so the drawing is not
/// mirrored by SVG's downward Y axis.
fn append_loop(data: Data, polygon: &Polygon) -> Data {
    let mut points = polygon.points.iter();
    let Some(first) = points.next() else {
        return data;
    };
    let data = data.move_to((first.x, -first.y));
    points.fold(data, |d, p| d.line_to((p.x, -p.y))).close()
}

/// Render the contours and holes of one layer as an SVG document.
///
/// Each [`ExPolygon`] becomes one path with an even-odd fill, so holes stay
/// empty. The view box is the layer's bounding box.
pub fn layer_to_svg(layer: &[ExPolygon]) -> String {
    let (mut min_x, mut min_y) = (Real::MAX, Real::MAX);
    let (mut max_x, mut max_y) = (-Real::MAX, -Real::MAX);
    for p in layer.iter().flat_map(|ex| ex.contour.points.iter()) {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(-p.y);
        max_y = max_y.max(-p.y);
    }
    if min_x > max_x {
        (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
    }

    let mut document = Document::new().set("viewBox", (min_x, min_y, max_x - min_x, max_y - min_y));
    for ex in layer {
        let data = ex.holes.iter().fold(append_loop(Data::new(), &ex.contour), append_loop);
        let path = Path::new()
            .set("fill", "black")
            .set("fill-rule", "evenodd")
            .set("stroke", "none")
            .set("d", data);
        document = document.add(path);
    }
    document.to_string()
}
