//! # rural-urban-pop
//!
//! Population rurale et urbaine par municipio et par année, à partir des
//! rasters LandScan (`lspop<année>/hdr.adf`), d'un masque d'occupation du sol
//! et d'une emprise de découpage commune.
//!
//! ## Features
//!
//! - Découverte des rasters annuels et extraction de l'année
//! - Zones lues depuis un Shapefile ou un GeoJSON
//! - Lecture raster via GDAL (feature `gdal`, défaut) ou GeoTIFF pur Rust
//! - Export CSV `id,name,year,rural_pop,urban_pop` et rapport JSON
//!
//! ## Usage CLI
//!
//! ```bash
//! # Arborescence par défaut (data/...) → rural_urban_pop.csv
//! rural-urban-pop
//!
//! # Chemins explicites, rapport JSON
//! rural-urban-pop --zones zones.geojson --land-use rural.tif --report report.json
//!
//! # Lister les rasters trouvés
//! rural-urban-pop list --population-dir data
//! ```

pub mod config;
pub mod discovery;
pub mod export;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod vector;

pub use config::{RasterBackend, RunConfig};
pub use pipeline::run;
pub use report::{RunReport, RunStatus, YearSummary};
pub use source::{reader_for, RasterReader};
