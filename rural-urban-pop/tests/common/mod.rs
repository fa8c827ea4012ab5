//! Jeux de données de test: GeoTIFF et GeoJSON dans un répertoire temporaire

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use rural_urban_pop::{RasterBackend, RunConfig};
use serde_json::json;
use tempfile::TempDir;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

/// Grille 4x3, pixels de 1x1, origine (0, 3)
pub const WIDTH: u32 = 4;
pub const HEIGHT: u32 = 3;

/// Masque: 0 = urbain, 1 = rural, 3 = nodata
pub const MASK: [f32; 12] = [
    0.0, 0.0, 0.0, 1.0, //
    0.0, 1.0, 3.0, 1.0, //
    1.0, 3.0, 1.0, 1.0,
];

/// Population, -9999 = nodata
pub const POPULATION: [f32; 12] = [
    1.0, -9999.0, 4.0, 8.0, //
    16.0, 32.0, 64.0, 128.0, //
    256.0, 512.0, 1024.0, 2048.0,
];

/// Écrit un GeoTIFF mono-bande nord en haut
pub fn write_geotiff(
    path: &Path,
    width: u32,
    height: u32,
    origin: (f64, f64),
    pixel_size: f64,
    nodata: Option<&str>,
    data: &[f32],
) {
    let mut encoder = TiffEncoder::new(File::create(path).unwrap()).unwrap();
    let mut image = encoder
        .new_image::<colortype::Gray32Float>(width, height)
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &[pixel_size, pixel_size, 0.0][..])
        .unwrap();
    image
        .encoder()
        .write_tag(
            Tag::ModelTiepointTag,
            &[0.0, 0.0, 0.0, origin.0, origin.1, 0.0][..],
        )
        .unwrap();
    if let Some(nd) = nodata {
        image.encoder().write_tag(Tag::GdalNodata, nd).unwrap();
    }
    image.write_data(data).unwrap();
}

/// FeatureCollection de rectangles (x0, y0, x1, y1) avec leurs attributs
pub fn write_geojson(path: &Path, features: &[((f64, f64, f64, f64), serde_json::Value)]) {
    let features: Vec<_> = features
        .iter()
        .map(|((x0, y0, x1, y1), props)| {
            json!({
                "type": "Feature",
                "properties": props,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]]
                }
            })
        })
        .collect();
    let collection = json!({"type": "FeatureCollection", "features": features});
    fs::write(path, collection.to_string()).unwrap();
}

/// Arborescence complète prête à traiter
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Emprise = grille entière; zone 1 = colonnes 0-1, zone 2 = colonne 2,
    /// zone 3 hors grille. Population pour l'année 2010.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        write_geojson(
            &root.join("bbox.geojson"),
            &[((0.0, 0.0, 4.0, 3.0), json!({"NAME": "bbox"}))],
        );
        write_geojson(
            &root.join("zones.geojson"),
            &[
                ((0.0, 0.0, 2.0, 3.0), json!({"ID_2": 1, "NAME_2": "Guatemala"})),
                ((2.0, 0.0, 3.0, 3.0), json!({"ID_2": 2, "NAME_2": "Mixco"})),
                ((10.0, 10.0, 11.0, 11.0), json!({"ID_2": 3, "NAME_2": "Fuera"})),
            ],
        );
        write_geotiff(
            &root.join("rural.tif"),
            WIDTH,
            HEIGHT,
            (0.0, 3.0),
            1.0,
            Some("3"),
            &MASK,
        );

        let fixture = Self { dir };
        fixture.add_population_year("2010", &POPULATION);
        fixture
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn population_dir(&self) -> PathBuf {
        self.root().join("population")
    }

    /// Ajoute `population/lspop<year>/pop.tif`
    pub fn add_population_year(&self, year: &str, data: &[f32]) {
        let dir = self.population_dir().join(format!("lspop{}", year));
        fs::create_dir_all(&dir).unwrap();
        write_geotiff(
            &dir.join("pop.tif"),
            WIDTH,
            HEIGHT,
            (0.0, 3.0),
            1.0,
            Some("-9999"),
            data,
        );
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("rural_urban_pop.csv")
    }

    pub fn config(&self) -> RunConfig {
        RunConfig {
            population_dir: self.population_dir(),
            population_prefix: "lspop".into(),
            population_file: "pop.tif".into(),
            zones: self.root().join("zones.geojson"),
            zone_id_field: "ID_2".into(),
            zone_name_field: "NAME_2".into(),
            land_use: self.root().join("rural.tif"),
            bounding_box: self.root().join("bbox.geojson"),
            output: self.output(),
            raster_backend: RasterBackend::Geotiff,
            ..Default::default()
        }
    }
}
