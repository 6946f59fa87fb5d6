//! Grouping of a layer's loops into contours with holes.

use crate::config::{SlicerConfig, SlicingMode};
use crate::float_types::Real;
use crate::polygon::{ExPolygon, Polygon};
use geo::{BooleanOps, MultiPolygon, Orient, Polygon as GeoPolygon, orient::Direction};

fn to_multi(polygon: &Polygon) -> MultiPolygon<Real> {
    MultiPolygon(vec![GeoPolygon::new(polygon.to_line_string(), vec![])])
}

/// Area-ordered accumulation: counter-clockwise loops are unioned in,
/// clockwise loops are subtracted, largest first.
fn combine_regular(loops: &[&Polygon]) -> MultiPolygon<Real> {
    let mut by_area: Vec<(Real, &Polygon)> = loops.iter().map(|p| (p.area(), *p)).collect();
    // Larger loops first; a hole is always smaller than the contour around it
    by_area.sort_by(|a, b| b.0.abs().total_cmp(&a.0.abs()));

    let mut mp_acc: MultiPolygon<Real> = MultiPolygon::new(Vec::new());
    for (area, polygon) in by_area {
        if area > 0.0 {
            mp_acc = mp_acc.union(&to_multi(polygon));
        } else if !mp_acc.0.is_empty() {
            mp_acc = mp_acc.difference(&to_multi(&polygon.reversed()));
        }
    }
    mp_acc
}

/// Even-odd fill: every loop toggles the region it encloses.
fn combine_even_odd(loops: &[&Polygon]) -> MultiPolygon<Real> {
    loops.iter().fold(MultiPolygon::new(Vec::new()), |acc, polygon| {
        let mut piece = (*polygon).clone();
        if piece.area() < 0.0 {
            piece.reverse();
        }
        acc.xor(&to_multi(&piece))
    })
}

/// Every loop adds material, whatever its winding.
fn combine_positive(loops: &[&Polygon]) -> MultiPolygon<Real> {
    loops.iter().fold(MultiPolygon::new(Vec::new()), |acc, polygon| {
        let mut piece = (*polygon).clone();
        if piece.area() < 0.0 {
            piece.reverse();
        }
        acc.union(&to_multi(&piece))
    })
}

/// Grow (positive `delta`) or shrink (negative) every region. Exteriors are
/// oriented counter-clockwise first, as the straight-skeleton offset drops
/// clockwise exteriors.
#[cfg(feature = "offset")]
fn offset(mp: MultiPolygon<Real>, delta: Real) -> MultiPolygon<Real> {
    if delta == 0.0 || mp.0.is_empty() {
        return mp;
    }
    geo_buf::buffer_multi_polygon(&mp.orient(Direction::Default), delta).orient(Direction::Default)
}

#[cfg(not(feature = "offset"))]
fn offset(mp: MultiPolygon<Real>, delta: Real) -> MultiPolygon<Real> {
    if delta != 0.0 {
        tracing::trace!(delta, "offsetting needs the `offset` feature, skipped");
    }
    mp
}

/// Combine the loops of one layer into [`ExPolygon`]s.
///
/// Loops are combined according to `config.mode`. In
/// [`SlicingMode::Regular`] they are visited from the largest to the smallest
/// absolute area: counter-clockwise loops are unioned into the result,
/// clockwise loops are subtracted from it.
///
/// The result is then grown and shrunk by `config.safety_offset` to merge
/// seams left by slicing noise, closed by `config.closing_radius` and offset
/// by `config.extra_offset`.
///
/// Coordinates are not preserved. Use [`make_expolygons_simple`] when the
/// output has to reuse the loop points exactly.
pub fn make_expolygons(loops: &[Polygon], config: &SlicerConfig) -> Vec<ExPolygon> {
    let loops: Vec<&Polygon> = loops
        .iter()
        .filter(|p| p.len() >= 3 && p.area() != 0.0)
        .collect();

    let mut mp_acc = match config.mode {
        SlicingMode::Regular => combine_regular(&loops),
        SlicingMode::EvenOdd => combine_even_odd(&loops),
        SlicingMode::Positive | SlicingMode::PositiveLargestContour => combine_positive(&loops),
    };

    if config.safety_offset > 0.0 {
        mp_acc = offset(offset(mp_acc, config.safety_offset), -config.safety_offset);
    }
    let (grow, shrink) = config.closing_deltas();
    mp_acc = offset(offset(mp_acc, grow), shrink);

    let mut expolygons: Vec<ExPolygon> = mp_acc
        .orient(Direction::Default)
        .0
        .iter()
        .map(ExPolygon::from_geo)
        .filter(|ex| !ex.contour.is_degenerate())
        .collect();

    if config.mode == SlicingMode::PositiveLargestContour && expolygons.len() > 1 {
        let largest = expolygons
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.contour.area().total_cmp(&b.1.contour.area()))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let kept = expolygons.swap_remove(largest);
        expolygons = vec![kept];
    }
    expolygons
}

/// Containment-based nesting that keeps every loop point untouched.
///
/// Counter-clockwise loops become contours. Each clockwise loop becomes a hole
/// of the smallest contour containing its first point, or is dropped when no
/// contour contains it.
pub fn make_expolygons_simple(loops: &[Polygon]) -> Vec<ExPolygon> {
    let (contours, holes): (Vec<&Polygon>, Vec<&Polygon>) = loops.iter().partition(|p| p.area() >= 0.0);
    let mut expolygons: Vec<ExPolygon> = contours.into_iter().map(|c| ExPolygon::new(c.clone())).collect();

    let mut orphans = 0usize;
    for hole in holes {
        let Some(first) = hole.points.first() else {
            continue;
        };
        let parent = expolygons
            .iter_mut()
            .filter(|ex| ex.contour.contains_point(first))
            .min_by(|a, b| a.contour.area().total_cmp(&b.contour.area()));
        match parent {
            Some(ex) => ex.holes.push(hole.clone()),
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        tracing::warn!(orphans, "holes outside every contour dropped");
    }
    expolygons
}
