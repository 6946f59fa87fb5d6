//! Chaining of one layer's slice lines into closed loops.

use crate::config::{SlicerConfig, SlicingMode};
use crate::float_types::Real;
use crate::polygon::Polygon;
use crate::slice::intersect::{FacetEdgeType, IntersectionLine};
use hashbrown::HashMap;
use nalgebra::Point2;

/// Identity of a chain end: the vertex or edge it lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EndRef {
    vertex_id: Option<usize>,
    edge_id: Option<usize>,
}

impl EndRef {
    fn start_of(line: &IntersectionLine) -> Self {
        Self {
            vertex_id: line.a_id(),
            edge_id: line.edge_a_id(),
        }
    }

    fn end_of(line: &IntersectionLine) -> Self {
        Self {
            vertex_id: line.b_id(),
            edge_id: line.edge_b_id(),
        }
    }

    fn meets(&self, other: &EndRef) -> bool {
        (self.edge_id.is_some() && self.edge_id == other.edge_id)
            || (self.vertex_id.is_some() && self.vertex_id == other.vertex_id)
    }
}

/// A chain that ran out of continuations before closing.
#[derive(Debug, Clone)]
struct OpenPolyline {
    start: EndRef,
    end: EndRef,
    points: Vec<Point2<Real>>,
}

/// Marks redundant in-plane edges as consumed.
///
/// Two lines joining the same pair of vertices (in either direction) describe
/// one edge shared by two in-plane facets or facet edges. When both carry the
/// same classification, or both are horizontal, the edge lies inside the
/// section and both are dropped; otherwise only the later one is.
fn cancel_tangent_edges(lines: &[IntersectionLine], consumed: &mut [bool]) {
    for i in 0..lines.len() {
        let line = &lines[i];
        if consumed[i] || line.edge_type == FacetEdgeType::None {
            continue;
        }
        let (Some(a), Some(b)) = (line.a_id(), line.b_id()) else {
            continue;
        };
        for j in i + 1..lines.len() {
            let other = &lines[j];
            if consumed[j] || other.edge_type == FacetEdgeType::None {
                continue;
            }
            let ids = (other.a_id(), other.b_id());
            if ids != (Some(a), Some(b)) && ids != (Some(b), Some(a)) {
                continue;
            }
            consumed[j] = true;
            if line.edge_type == other.edge_type {
                consumed[i] = true;
                break;
            }
        }
    }
}

/// Indexes of the unconsumed lines, keyed by the identity of their start point.
#[derive(Debug, Default)]
struct StartIndex {
    by_edge: HashMap<usize, Vec<usize>>,
    by_vertex: HashMap<usize, Vec<usize>>,
}

impl StartIndex {
    fn build(lines: &[IntersectionLine], consumed: &[bool]) -> Self {
        let mut index = Self::default();
        for (i, line) in lines.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            if let Some(edge) = line.edge_a_id() {
                index.by_edge.entry(edge).or_default().push(i);
            }
            if let Some(vertex) = line.a_id() {
                index.by_vertex.entry(vertex).or_default().push(i);
            }
        }
        index
    }

    /// First unconsumed line starting where `line` ends, matching edges first.
    fn next_after(&self, line: &IntersectionLine, consumed: &[bool]) -> Option<usize> {
        let first_free = |candidates: Option<&Vec<usize>>| {
            candidates.and_then(|c| c.iter().copied().find(|&i| !consumed[i]))
        };
        line.edge_b_id()
            .and_then(|edge| first_free(self.by_edge.get(&edge)))
            .or_else(|| line.b_id().and_then(|vertex| first_free(self.by_vertex.get(&vertex))))
    }
}

/// Chain the slice lines of one layer into closed loops.
///
/// Loops are returned in discovery order. Outer boundaries wind
/// counter-clockwise and holes clockwise. Chains that cannot be closed are
/// dropped, or stitched together first when
/// [`SlicerConfig::close_open_polylines`] is set: ends on the same mesh vertex
/// or edge are joined, then ends up to [`SlicerConfig::max_gap`] apart.
///
/// [`SlicingMode::Positive`] turns every loop counter-clockwise and
/// [`SlicingMode::PositiveLargestContour`] keeps only the largest one.
pub fn make_loops(lines: &[IntersectionLine], config: &SlicerConfig) -> Vec<Polygon> {
    let mut consumed = vec![false; lines.len()];
    cancel_tangent_edges(lines, &mut consumed);
    let index = StartIndex::build(lines, &consumed);

    let mut loops = Vec::new();
    let mut open = Vec::new();
    for seed in 0..lines.len() {
        if consumed[seed] {
            continue;
        }
        consumed[seed] = true;
        let first = &lines[seed];
        let start = EndRef::start_of(first);
        let mut points = vec![first.a.point];
        let mut last = first;

        loop {
            if start.meets(&EndRef::end_of(last)) {
                loops.push(Polygon::new(points));
                break;
            }
            match index.next_after(last, &consumed) {
                Some(next) => {
                    consumed[next] = true;
                    last = &lines[next];
                    points.push(last.a.point);
                }
                None => {
                    points.push(last.b.point);
                    open.push(OpenPolyline {
                        start,
                        end: EndRef::end_of(last),
                        points,
                    });
                    break;
                }
            }
        }
    }

    if config.close_open_polylines && !open.is_empty() {
        open = stitch_open_polylines(open, &mut loops);
        if config.max_gap > 0.0 && !open.is_empty() {
            // Same direction first, then allow chains running against each other
            open = close_gaps(open, &mut loops, config.max_gap, false);
            open = close_gaps(open, &mut loops, config.max_gap, true);
        }
    }
    if !open.is_empty() {
        tracing::warn!(abandoned = open.len(), "open polylines dropped while building loops");
    }

    loops.retain(|polygon| !polygon.is_degenerate());
    match config.mode {
        SlicingMode::Regular | SlicingMode::EvenOdd => {}
        SlicingMode::Positive => {
            for polygon in loops.iter_mut().filter(|p| p.area() < 0.0) {
                polygon.reverse();
            }
        }
        SlicingMode::PositiveLargestContour => {
            let largest = loops
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.area().abs().total_cmp(&b.1.area().abs()))
                .map(|(i, _)| i);
            loops = match largest {
                Some(i) => {
                    let mut polygon = loops.swap_remove(i);
                    if polygon.area() < 0.0 {
                        polygon.reverse();
                    }
                    vec![polygon]
                }
                None => Vec::new(),
            };
        }
    }
    loops
}

/// Join open polylines end to end, reversing them as needed. Closed chains are
/// oriented counter-clockwise and pushed to `loops`; the rest is returned.
fn stitch_open_polylines(mut open: Vec<OpenPolyline>, loops: &mut Vec<Polygon>) -> Vec<OpenPolyline> {
    // (polyline, is_start) for every end
    let mut by_edge: HashMap<usize, Vec<(usize, bool)>> = HashMap::new();
    let mut by_vertex: HashMap<usize, Vec<(usize, bool)>> = HashMap::new();
    for (i, opl) in open.iter().enumerate() {
        for (end, is_start) in [(opl.start, true), (opl.end, false)] {
            if let Some(edge) = end.edge_id {
                by_edge.entry(edge).or_default().push((i, is_start));
            }
            if let Some(vertex) = end.vertex_id {
                by_vertex.entry(vertex).or_default().push((i, is_start));
            }
        }
    }

    let mut consumed = vec![false; open.len()];
    let mut closed = 0usize;
    for i in 0..open.len() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let start = open[i].start;
        let mut end = open[i].end;
        let mut points = std::mem::take(&mut open[i].points);

        loop {
            let first_free = |candidates: Option<&Vec<(usize, bool)>>| {
                candidates.and_then(|c| c.iter().copied().find(|&(j, _)| !consumed[j]))
            };
            let next = end
                .edge_id
                .and_then(|edge| first_free(by_edge.get(&edge)))
                .or_else(|| end.vertex_id.and_then(|vertex| first_free(by_vertex.get(&vertex))));

            let Some((j, attach_at_start)) = next else {
                // Leave the grown chain available for later seeds
                consumed[i] = false;
                open[i].points = points;
                open[i].end = end;
                break;
            };

            let piece = std::mem::take(&mut open[j].points);
            consumed[j] = true;
            if attach_at_start {
                points.extend(piece.into_iter().skip(1));
                end = open[j].end;
            } else {
                points.extend(piece.into_iter().rev().skip(1));
                end = open[j].start;
            }

            if start.meets(&end) {
                // The last point repeats the first
                points.pop();
                if points.len() >= 3 {
                    let mut polygon = Polygon::new(points);
                    if polygon.area() < 0.0 {
                        polygon.reverse();
                    }
                    loops.push(polygon);
                    closed += 1;
                }
                break;
            }
        }
    }

    if closed > 0 {
        tracing::debug!(closed, "closed loops from open polylines");
    }
    open.into_iter()
        .zip(consumed)
        .filter(|(_, used)| !used)
        .map(|(opl, _)| opl)
        .collect()
}

fn polyline_length(points: &[Point2<Real>]) -> Real {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Join open polylines whose ends lie less than `max_gap` apart, seeding from
/// the longest. With `allow_reversed` a polyline may also be attached by its
/// end and walked backwards. Closed chains are pushed to `loops`; the rest is
/// returned.
fn close_gaps(
    mut open: Vec<OpenPolyline>,
    loops: &mut Vec<Polygon>,
    max_gap: Real,
    allow_reversed: bool,
) -> Vec<OpenPolyline> {
    let lengths: Vec<Real> = open.iter().map(|opl| polyline_length(&opl.points)).collect();
    let mut order: Vec<usize> = (0..open.len()).collect();
    order.sort_by(|&a, &b| lengths[b].total_cmp(&lengths[a]));

    let mut consumed = vec![false; open.len()];
    let mut closed = 0usize;
    for &i in &order {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;
        let mut points = std::mem::take(&mut open[i].points);
        let mut joined = 1usize;

        loop {
            let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
                break;
            };
            // (polyline, attach at its start, distance) of the nearest free end
            let next = open
                .iter()
                .enumerate()
                .filter(|(j, _)| !consumed[*j])
                .flat_map(|(j, opl)| {
                    let start = opl.points.first().map(|&p| (j, true, p));
                    let end = opl.points.last().filter(|_| allow_reversed).map(|&p| (j, false, p));
                    start.into_iter().chain(end)
                })
                .map(|(j, at_start, p)| (j, at_start, (p - last).norm()))
                .filter(|&(_, _, d)| d < max_gap)
                .min_by(|a, b| a.2.total_cmp(&b.2));

            let closing = (first - last).norm();
            // A short chain prefers growing over closing on itself
            let close = closing < max_gap
                && next.is_none_or(|(_, _, d)| closing <= d && closing < 0.3 * polyline_length(&points));
            if close {
                if closing == 0.0 {
                    points.pop();
                }
                if points.len() >= 3 {
                    let mut polygon = Polygon::new(points);
                    if allow_reversed && joined > 1 && polygon.area() < 0.0 {
                        polygon.reverse();
                    }
                    loops.push(polygon);
                    closed += 1;
                }
                break;
            }

            let Some((j, at_start, _)) = next else {
                consumed[i] = false;
                open[i].points = points;
                break;
            };
            let mut piece = std::mem::take(&mut open[j].points);
            consumed[j] = true;
            if !at_start {
                piece.reverse();
            }
            let skip = usize::from(piece.first() == Some(&last));
            points.extend(piece.into_iter().skip(skip));
            joined += 1;
        }
    }

    if closed > 0 {
        tracing::debug!(closed, max_gap, "closed loops across gaps");
    }
    open.into_iter()
        .zip(consumed)
        .filter(|(opl, used)| !used && !opl.points.is_empty())
        .map(|(opl, _)| opl)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::intersect::IntersectionPoint;

    fn corner(id: usize) -> IntersectionPoint {
        let xy = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)][id];
        IntersectionPoint {
            point: Point2::new(xy.0, xy.1),
            vertex_id: Some(id),
            edge_id: None,
        }
    }

    fn line(a: usize, b: usize, edge_type: FacetEdgeType) -> IntersectionLine {
        IntersectionLine {
            a: corner(a),
            b: corner(b),
            edge_type,
        }
    }

    #[test]
    fn test_square_closes_counter_clockwise() {
        let lines = [
            line(2, 3, FacetEdgeType::None),
            line(0, 1, FacetEdgeType::None),
            line(3, 0, FacetEdgeType::None),
            line(1, 2, FacetEdgeType::None),
        ];
        let loops = make_loops(&lines, &SlicerConfig::default());
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert!((loops[0].area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shared_horizontal_edge_cancels() {
        let lines = [
            line(0, 1, FacetEdgeType::Horizontal),
            line(1, 2, FacetEdgeType::Horizontal),
            line(2, 0, FacetEdgeType::Horizontal),
            line(0, 2, FacetEdgeType::Horizontal),
            line(2, 3, FacetEdgeType::Horizontal),
            line(3, 0, FacetEdgeType::Horizontal),
        ];
        let loops = make_loops(&lines, &SlicerConfig::default());
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert!((loops[0].area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_with_other_type_keeps_one() {
        let mut lines = vec![
            line(0, 1, FacetEdgeType::Bottom),
            line(1, 2, FacetEdgeType::Bottom),
            line(2, 3, FacetEdgeType::Bottom),
            line(3, 0, FacetEdgeType::Bottom),
        ];
        lines.push(line(0, 1, FacetEdgeType::Horizontal));
        let mut consumed = vec![false; lines.len()];
        cancel_tangent_edges(&lines, &mut consumed);
        assert_eq!(consumed, vec![false, false, false, false, true]);
        assert_eq!(make_loops(&lines, &SlicerConfig::default()).len(), 1);
    }

    #[test]
    fn test_crossing_lines_are_never_cancelled() {
        let lines = [line(0, 1, FacetEdgeType::None), line(1, 0, FacetEdgeType::None)];
        let mut consumed = vec![false; 2];
        cancel_tangent_edges(&lines, &mut consumed);
        assert_eq!(consumed, vec![false, false]);
    }

    #[test]
    fn test_open_chain_is_abandoned() {
        let lines = [line(0, 1, FacetEdgeType::None), line(1, 2, FacetEdgeType::None)];
        assert!(make_loops(&lines, &SlicerConfig::default()).is_empty());
    }

    #[test]
    fn test_open_polylines_are_stitched_when_enabled() {
        // The third segment runs against the others
        let lines = [
            line(0, 1, FacetEdgeType::None),
            line(1, 2, FacetEdgeType::None),
            line(3, 2, FacetEdgeType::None),
            line(3, 0, FacetEdgeType::None),
        ];
        assert!(make_loops(&lines, &SlicerConfig::default()).is_empty());

        let config = SlicerConfig::default().with_close_open_polylines(true);
        let loops = make_loops(&lines, &config);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert!(loops[0].is_counter_clockwise());
    }

    #[test]
    fn test_edge_identity_preferred_over_vertex() {
        let on_edge = |x: Real, y: Real, edge: usize| IntersectionPoint {
            point: Point2::new(x, y),
            vertex_id: None,
            edge_id: Some(edge),
        };
        let lines = [
            IntersectionLine {
                a: on_edge(0.0, 0.0, 10),
                b: on_edge(2.0, 0.0, 11),
                edge_type: FacetEdgeType::None,
            },
            IntersectionLine {
                a: on_edge(2.0, 0.0, 11),
                b: on_edge(1.0, 2.0, 12),
                edge_type: FacetEdgeType::None,
            },
            IntersectionLine {
                a: on_edge(1.0, 2.0, 12),
                b: on_edge(0.0, 0.0, 10),
                edge_type: FacetEdgeType::None,
            },
        ];
        let loops = make_loops(&lines, &SlicerConfig::default());
        assert_eq!(loops.len(), 1);
        assert!((loops[0].area() - 2.0).abs() < 1e-12);
    }

    /// Lines through `points` chained by vertex ids starting at `first_id`,
    /// closed back to the first point when `closed` is set.
    fn chain(points: &[(Real, Real)], first_id: usize, closed: bool) -> Vec<IntersectionLine> {
        let at = |i: usize| IntersectionPoint {
            point: Point2::new(points[i].0, points[i].1),
            vertex_id: Some(first_id + i),
            edge_id: None,
        };
        let n = points.len();
        let segments = if closed { n } else { n - 1 };
        (0..segments)
            .map(|k| IntersectionLine {
                a: at(k),
                b: at((k + 1) % n),
                edge_type: FacetEdgeType::None,
            })
            .collect()
    }

    #[test]
    fn test_positive_mode_reorients_loops() {
        let mut lines = chain(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)], 0, true);
        lines.extend(chain(&[(5.0, 0.0), (8.0, 0.0), (8.0, 3.0), (5.0, 3.0)], 10, true));

        let regular = make_loops(&lines, &SlicerConfig::default());
        assert_eq!(regular.len(), 2);
        assert!(regular.iter().any(|p| p.area() < 0.0));

        let config = SlicerConfig::default().with_mode(SlicingMode::Positive);
        let positive = make_loops(&lines, &config);
        assert_eq!(positive.len(), 2);
        assert!(positive.iter().all(Polygon::is_counter_clockwise));

        let config = SlicerConfig::default().with_mode(SlicingMode::PositiveLargestContour);
        let largest = make_loops(&lines, &config);
        assert_eq!(largest.len(), 1);
        assert!((largest[0].area() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_small_gap_is_closed() {
        let lines = chain(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.001)], 0, false);
        assert!(make_loops(&lines, &SlicerConfig::default()).is_empty());

        let exact_only = SlicerConfig::default().with_close_open_polylines(true).with_max_gap(0.0);
        assert!(make_loops(&lines, &exact_only).is_empty());

        let config = SlicerConfig::default().with_close_open_polylines(true);
        let loops = make_loops(&lines, &config);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 5);
        assert!((loops[0].area() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_gapped_pieces_join_against_each_other() {
        // Two halves of a square, the second one running backwards
        let mut lines = chain(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], 0, false);
        lines.extend(chain(&[(0.0, 0.01), (0.0, 1.0), (0.99, 1.0)], 10, false));

        let config = SlicerConfig::default().with_close_open_polylines(true).with_max_gap(0.1);
        let loops = make_loops(&lines, &config);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 6);
        assert!(loops[0].is_counter_clockwise());
        assert!((loops[0].area() - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_gaps_wider_than_max_gap_stay_open() {
        let lines = chain(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.5)], 0, false);
        let config = SlicerConfig::default().with_close_open_polylines(true).with_max_gap(0.1);
        assert!(make_loops(&lines, &config).is_empty());
    }
}
