//! Ouverture des rasters (GDAL ou GeoTIFF pur Rust)

#[cfg(feature = "gdal")]
pub mod gdal_backend;
pub mod geotiff;

use std::path::Path;

use anyhow::{bail, Result};
use zonal::RasterSource;

use crate::config::RasterBackend;

pub use geotiff::GeoTiffRaster;

/// Ouvre un raster et le rend lisible par fenêtre
pub trait RasterReader {
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>>;
}

/// Lecteur GeoTIFF en Rust pur (pas de grilles ArcInfo)
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoTiffReader;

impl RasterReader for GeoTiffReader {
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>> {
        if !geotiff::is_tiff(path) {
            bail!(
                "{} is not a GeoTIFF; reading this format requires the 'gdal' feature. \
                 Build with: cargo build --features gdal",
                path.display()
            );
        }
        Ok(Box::new(GeoTiffRaster::open(path)?))
    }
}

/// Lecteur GDAL (tous formats supportés par la bibliothèque)
#[cfg(feature = "gdal")]
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalReader;

#[cfg(feature = "gdal")]
impl RasterReader for GdalReader {
    fn open(&self, path: &Path) -> Result<Box<dyn RasterSource>> {
        Ok(Box::new(gdal_backend::GdalRaster::open(path)?))
    }
}

/// Choisit le lecteur selon la configuration
pub fn reader_for(backend: RasterBackend) -> Result<Box<dyn RasterReader>> {
    match backend {
        #[cfg(feature = "gdal")]
        RasterBackend::Auto | RasterBackend::Gdal => Ok(Box::new(GdalReader)),
        #[cfg(not(feature = "gdal"))]
        RasterBackend::Auto => Ok(Box::new(GeoTiffReader)),
        #[cfg(not(feature = "gdal"))]
        RasterBackend::Gdal => bail!(
            "The GDAL raster backend requires the 'gdal' feature. \
             Build with: cargo build --features gdal"
        ),
        RasterBackend::Geotiff => Ok(Box::new(GeoTiffReader)),
    }
}
