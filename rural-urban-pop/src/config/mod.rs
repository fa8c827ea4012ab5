//! Configuration du traitement

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zonal::LandUseClasses;

/// Backend de lecture des rasters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterBackend {
    /// GDAL si compilé avec la feature `gdal`, sinon GeoTIFF
    #[default]
    Auto,
    /// GDAL (tous formats, dont les grilles ArcInfo hdr.adf)
    Gdal,
    /// Lecteur GeoTIFF en Rust pur
    Geotiff,
}

impl std::str::FromStr for RasterBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(RasterBackend::Auto),
            "gdal" => Ok(RasterBackend::Gdal),
            "geotiff" | "tiff" | "tif" => Ok(RasterBackend::Geotiff),
            _ => Err(format!("Invalid raster backend: {}. Use: auto, gdal, geotiff", s)),
        }
    }
}

/// Codes de la classification rural/urbain
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClassesConfig {
    pub urban: f64,
    pub rural: f64,
    pub nodata: f64,
}

impl Default for ClassesConfig {
    fn default() -> Self {
        let classes = LandUseClasses::default();
        Self {
            urban: classes.urban,
            rural: classes.rural,
            nodata: classes.nodata,
        }
    }
}

impl From<ClassesConfig> for LandUseClasses {
    fn from(c: ClassesConfig) -> Self {
        LandUseClasses {
            urban: c.urban,
            rural: c.rural,
            nodata: c.nodata,
        }
    }
}

/// Configuration principale
///
/// Chaque champ a une valeur par défaut correspondant à l'arborescence
/// historique (`data/...`), un fichier JSON peut n'en surcharger qu'une partie.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Répertoire contenant les dossiers `lspop<année>`
    pub population_dir: PathBuf,

    /// Préfixe des dossiers de population, suivi de l'année
    pub population_prefix: String,

    /// Nom du fichier raster dans chaque dossier
    pub population_file: String,

    /// Polygones des zones (municipios)
    pub zones: PathBuf,

    /// Champ identifiant des zones
    pub zone_id_field: String,

    /// Champ nom des zones
    pub zone_name_field: String,

    /// Raster d'occupation du sol (0 = urbain, 1 = rural, 3 = nodata)
    pub land_use: PathBuf,

    /// Emprise de découpage commune à tous les rasters
    pub bounding_box: PathBuf,

    /// Fichier CSV de sortie (réécrit à chaque exécution)
    pub output: PathBuf,

    pub classes: ClassesConfig,

    pub raster_backend: RasterBackend,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            population_dir: PathBuf::from("data"),
            population_prefix: "lspop".into(),
            population_file: "hdr.adf".into(),
            zones: PathBuf::from("data/GTM_adm2.shp"),
            zone_id_field: "ID_2".into(),
            zone_name_field: "NAME_2".into(),
            land_use: PathBuf::from("data/rural.tif"),
            bounding_box: PathBuf::from("data/ca_boundingbox.shp"),
            output: PathBuf::from("rural_urban_pop.csv"),
            classes: ClassesConfig::default(),
            raster_backend: RasterBackend::Auto,
        }
    }
}

impl RunConfig {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_json(&content).context(format!("Failed to parse config: {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse config JSON")
    }

    pub fn land_use_classes(&self) -> LandUseClasses {
        self.classes.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = RunConfig::default();
        assert_eq!(config.population_dir, PathBuf::from("data"));
        assert_eq!(config.population_prefix, "lspop");
        assert_eq!(config.population_file, "hdr.adf");
        assert_eq!(config.zones, PathBuf::from("data/GTM_adm2.shp"));
        assert_eq!(config.zone_id_field, "ID_2");
        assert_eq!(config.zone_name_field, "NAME_2");
        assert_eq!(config.output, PathBuf::from("rural_urban_pop.csv"));
        assert_eq!(config.land_use_classes(), LandUseClasses::default());
    }

    #[test]
    fn test_partial_json() {
        let config = RunConfig::from_json(
            r#"{"output": "out/pop.csv", "classes": {"nodata": 255}, "raster_backend": "geotiff"}"#,
        )
        .unwrap();
        assert_eq!(config.output, PathBuf::from("out/pop.csv"));
        assert_eq!(config.classes.nodata, 255.0);
        assert_eq!(config.classes.rural, 1.0);
        assert_eq!(config.raster_backend, RasterBackend::Geotiff);
        assert_eq!(config.zones, PathBuf::from("data/GTM_adm2.shp"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(RunConfig::from_json("{not json").is_err());
        assert!(RunConfig::from_json(r#"{"raster_backend": "netcdf"}"#).is_err());
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("GDAL".parse::<RasterBackend>(), Ok(RasterBackend::Gdal));
        assert_eq!("tif".parse::<RasterBackend>(), Ok(RasterBackend::Geotiff));
        assert!("png".parse::<RasterBackend>().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = RunConfig::load(Path::new("nonexistent-config.json"));
        assert!(result.is_err());
    }
}
