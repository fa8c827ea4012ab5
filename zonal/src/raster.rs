//! Abstraction de lecture raster par fenêtre
//!
//! Les backends (GDAL, GeoTIFF pur Rust) implémentent [`RasterSource`];
//! une [`Grid`] en mémoire en est une aussi.

use crate::types::{GeoTransform, Grid, Window};
use crate::ZonalError;

/// Source raster mono-bande lisible par fenêtre
pub trait RasterSource {
    /// Nom affiché dans les logs et les erreurs (chemin en général)
    fn name(&self) -> String;

    /// Dimensions (largeur, hauteur) en pixels
    fn size(&self) -> (usize, usize);

    fn transform(&self) -> GeoTransform;

    fn nodata(&self) -> Option<f64>;

    /// Lit une fenêtre, valeurs converties en f64 ligne par ligne
    fn read_window(&self, window: &Window) -> Result<Vec<f64>, ZonalError>;
}

impl RasterSource for Grid {
    fn name(&self) -> String {
        format!("<grid {}x{}>", self.width, self.height)
    }

    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn read_window(&self, window: &Window) -> Result<Vec<f64>, ZonalError> {
        slice_window(&self.data, self.width, self.height, window)
    }
}

/// Extrait une fenêtre d'un tableau ligne par ligne
pub fn slice_window(
    data: &[f64],
    width: usize,
    height: usize,
    window: &Window,
) -> Result<Vec<f64>, ZonalError> {
    if !window.fits(width, height) {
        return Err(ZonalError::WindowOutOfBounds {
            col_off: window.col_off,
            row_off: window.row_off,
            width: window.width,
            height: window.height,
            raster_width: width,
            raster_height: height,
        });
    }

    let mut out = Vec::with_capacity(window.width * window.height);
    for row in window.row_off..window.row_off + window.height {
        let start = row * width + window.col_off;
        out.extend_from_slice(&data[start..start + window.width]);
    }
    Ok(out)
}
