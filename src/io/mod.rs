//! Mesh and layer file formats, each behind a cargo feature.

#[cfg(feature = "stl-io")]
mod stl;

#[cfg(feature = "svg-io")]
mod svg;

#[cfg(feature = "svg-io")]
pub use self::svg::layer_to_svg;
