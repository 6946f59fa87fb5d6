// Re-export parry for the bounding volume types used by meshes
pub use parry3d_f64 as parry3d;

// Our Real scalar type. Slicing interpolates in double precision.
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized tolerance used for degenerate-loop rejection and
/// containment tests. Exact Z comparisons in facet slicing never use it.
/// Defaults to `1e-9`, but can be overridden:
///  1) **Build-time**: set env var `MESHSLICE_TOLERANCE` (e.g. `MESHSLICE_TOLERANCE=1e-7 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    1e-9
}

/// Returns the current tolerance value.
/// If not set yet, it tries `MESHSLICE_TOLERANCE` (parsed as `Real`) and
/// falls back to a sensible default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        // Compile-time env if provided, inherited by dependencies
        if let Some(environment_variable) = option_env!("MESHSLICE_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `meshslice::float_types::set_tolerance(1e-7);`
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;

/// Default grow/shrink delta of the nesting safety offset, in model units.
pub const SAFETY_OFFSET: Real = 0.0499;

/// Default largest gap bridged when closing open polylines, in model units.
pub const MAX_GAP: Real = 2.0;
