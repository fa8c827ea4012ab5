//! Lecture des rasters via GDAL (grilles ArcInfo, GeoTIFF, ...)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gdal::Dataset;
use tracing::debug;
use zonal::{GeoTransform, RasterSource, Window, ZonalError};

/// Dataset GDAL ouvert, lu par fenêtres sur la bande 1
pub struct GdalRaster {
    path: PathBuf,
    dataset: Dataset,
    width: usize,
    height: usize,
    transform: GeoTransform,
    nodata: Option<f64>,
}

impl GdalRaster {
    pub fn open(path: &Path) -> Result<Self> {
        let dataset = Dataset::open(path)
            .with_context(|| format!("Failed to open raster with GDAL: {}", path.display()))?;

        let gt = dataset
            .geo_transform()
            .with_context(|| format!("Raster has no geotransform: {}", path.display()))?;
        let (width, height) = dataset.raster_size();
        let nodata = dataset
            .rasterband(1)
            .with_context(|| format!("Raster has no band 1: {}", path.display()))?
            .no_data_value();

        debug!(
            path = %path.display(),
            width,
            height,
            nodata = ?nodata,
            transform = ?gt,
            "GDAL dataset opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            dataset,
            width,
            height,
            transform: GeoTransform::from_gdal(gt),
            nodata,
        })
    }
}

impl RasterSource for GdalRaster {
    fn name(&self) -> String {
        self.path.display().to_string()
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
        if !window.fits(self.width, self.height) {
            return Err(ZonalError::WindowOutOfBounds {
                col_off: window.col_off,
                row_off: window.row_off,
                width: window.width,
                height: window.height,
                raster_width: self.width,
                raster_height: self.height,
            });
        }
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let band = self
            .dataset
            .rasterband(1)
            .map_err(|e| ZonalError::raster_read(self.name(), e.to_string()))?;
        let size = (window.width, window.height);
        let buffer = band
            .read_as::<f64>(
                (window.col_off as isize, window.row_off as isize),
                size,
                size,
                None,
            )
            .map_err(|e| ZonalError::raster_read(self.name(), e.to_string()))?;

        Ok(buffer.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing() {
        assert!(GdalRaster::open(Path::new("nonexistent/lspop2005/hdr.adf")).is_err());
    }
}
