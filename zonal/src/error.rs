//! Types d'erreurs pour le crate zonal

use thiserror::Error;

use crate::types::GeoTransform;

/// Erreurs pouvant survenir lors du découpage ou de l'agrégation
#[derive(Debug, Error)]
pub enum ZonalError {
    /// Lecture impossible par le backend raster
    #[error("Cannot read raster {source_name}: {reason}")]
    RasterRead { source_name: String, reason: String },

    /// La géométrie de découpage ne recouvre pas le raster
    #[error(
        "Clip geometry does not overlap the raster: geometry bounds \
         [{min_x}, {min_y}, {max_x}, {max_y}], raster is {width}x{height} pixels"
    )]
    EmptyClip {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        width: usize,
        height: usize,
    },

    /// Deux grilles qui devraient être superposables ne le sont pas
    #[error(
        "Grid mismatch: expected {expected_width}x{expected_height} with transform \
         {expected_transform:?}, got {actual_width}x{actual_height} with transform \
         {actual_transform:?}"
    )]
    GridMismatch {
        expected_width: usize,
        expected_height: usize,
        expected_transform: [f64; 6],
        actual_width: usize,
        actual_height: usize,
        actual_transform: [f64; 6],
    },

    /// Transformation avec rotation ou axe inversé
    #[error("Unsupported transform (rotated or not north-up): {0:?}")]
    UnsupportedTransform([f64; 6]),

    /// Fenêtre de lecture hors de l'emprise du raster
    #[error("Window {col_off},{row_off} {width}x{height} is outside a {raster_width}x{raster_height} raster")]
    WindowOutOfBounds {
        col_off: usize,
        row_off: usize,
        width: usize,
        height: usize,
        raster_width: usize,
        raster_height: usize,
    },

    /// Le nombre de valeurs ne correspond pas aux dimensions
    #[error("Expected {expected} values for the grid, got {actual}")]
    DataLength { expected: usize, actual: usize },

    /// Statistique absente pour une zone lors de la jointure
    #[error("No {layer} statistic for zone {zone_id}")]
    MissingZoneStat { zone_id: String, layer: String },
}

impl ZonalError {
    /// Crée une erreur de lecture raster avec contexte
    pub fn raster_read(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RasterRead {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de grilles non alignées
    pub fn grid_mismatch(
        expected: (usize, usize, &GeoTransform),
        actual: (usize, usize, &GeoTransform),
    ) -> Self {
        Self::GridMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            expected_transform: expected.2.to_gdal(),
            actual_width: actual.0,
            actual_height: actual.1,
            actual_transform: actual.2.to_gdal(),
        }
    }

    /// Crée une erreur de statistique manquante
    pub fn missing_zone_stat(zone_id: impl Into<String>, layer: impl Into<String>) -> Self {
        Self::MissingZoneStat {
            zone_id: zone_id.into(),
            layer: layer.into(),
        }
    }
}
