//! # zonal
//!
//! Découpage de rasters par une géométrie et sommes zonales par polygone.
//!
//! ## Features
//!
//! - Grille mono-bande en mémoire avec transformation affine (ordre GDAL)
//! - Lecture par fenêtre via le trait [`RasterSource`] (backends fournis par l'appelant)
//! - Découpage crop + masque, règle du centre de pixel
//! - Séparation rural / urbain d'une grille de population
//! - Sommes par zone et jointure des statistiques par identifiant de zone
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zonal::{clip_to_geometry, split_by_land_use, join_by_zone, LandUseClasses, ZoneCoverage};
//!
//! let mask = clip_to_geometry(&mask_source, &bbox)?;
//! let coverage = ZoneCoverage::for_grid(&zones, &mask)?;
//!
//! let population = clip_to_geometry(&pop_source, &bbox)?;
//! let split = split_by_land_use(&population, &mask, &LandUseClasses::default())?;
//! let rural = coverage.sums(&split.rural)?;
//! let urban = coverage.sums(&split.urban)?;
//! let records = join_by_zone(&zones, "2010", &rural, &urban)?;
//! ```

pub mod clip;
pub mod error;
pub mod landuse;
pub mod raster;
pub mod rasterize;
pub mod stats;
pub mod types;

pub use clip::{clip_to_geometry, geometry_window};
pub use error::ZonalError;
pub use landuse::{split_by_land_use, LandUseSplit};
pub use raster::{slice_window, RasterSource};
pub use rasterize::{rasterize, rasterize_mask};
pub use stats::{join_by_zone, ZoneCoverage};
pub use types::{
    GeoTransform, Grid, LandUseClasses, ResultRecord, Window, Zone, ZoneStat,
};
