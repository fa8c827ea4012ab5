//! Lecture des couches vecteur (Shapefile ou GeoJSON)

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Geometry, MultiPolygon};
use geojson::GeoJson;
use shapefile::dbase::FieldValue;
use shapefile::Shape;
use tracing::{debug, info};
use zonal::Zone;

/// Feature lue depuis une couche vecteur
#[derive(Debug, Clone)]
pub struct VectorFeature {
    /// Géométrie surfacique, `None` pour les autres types
    pub geometry: Option<MultiPolygon<f64>>,

    /// Attributs convertis en texte (clé -> valeur), valeurs nulles absentes
    pub properties: HashMap<String, String>,
}

/// Lit toutes les features d'un fichier, dans l'ordre du fichier
pub fn read_features(path: &Path) -> Result<Vec<VectorFeature>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .ok_or_else(|| anyhow!("Vector file has no extension: {}", path.display()))?;

    match extension.as_str() {
        "shp" => read_shapefile(path),
        "json" | "geojson" => read_geojson(path),
        _ => bail!("Unsupported vector format: {} ({})", extension, path.display()),
    }
}

/// Charge l'emprise de découpage
///
/// Toutes les géométries surfaciques du fichier sont réunies dans un seul
/// multipolygone; un fichier sans polygone est une erreur.
pub fn load_bounding_geometry(path: &Path) -> Result<MultiPolygon<f64>> {
    let features = read_features(path)?;
    let feature_count = features.len();

    let polygons: Vec<_> = features
        .into_iter()
        .filter_map(|f| f.geometry)
        .flat_map(|mp| mp.0)
        .collect();

    if polygons.is_empty() {
        bail!("No polygon found in bounding file {}", path.display());
    }

    info!(
        path = %path.display(),
        features = feature_count,
        polygons = polygons.len(),
        "Bounding geometry loaded"
    );
    Ok(MultiPolygon::new(polygons))
}

/// Charge les zones dans l'ordre du fichier
///
/// Chaque feature doit porter `id_field` et `name_field`; les identifiants
/// doivent être uniques. Une feature sans polygone donne une zone vide.
pub fn load_zones(path: &Path, id_field: &str, name_field: &str) -> Result<Vec<Zone>> {
    let features = read_features(path)?;

    let mut seen = HashSet::new();
    let mut zones = Vec::with_capacity(features.len());

    for (index, feature) in features.into_iter().enumerate() {
        let id = feature
            .properties
            .get(id_field)
            .cloned()
            .ok_or_else(|| anyhow!("Feature #{} has no '{}' field in {}", index, id_field, path.display()))?;
        let name = feature
            .properties
            .get(name_field)
            .cloned()
            .ok_or_else(|| {
                anyhow!("Feature #{} has no '{}' field in {}", index, name_field, path.display())
            })?;

        if !seen.insert(id.clone()) {
            bail!("Duplicate zone id '{}' in {}", id, path.display());
        }

        let geometry = feature.geometry.unwrap_or_else(|| {
            debug!(zone = %id, "Zone without polygon geometry");
            MultiPolygon::new(vec![])
        });

        zones.push(Zone { id, name, geometry });
    }

    info!(path = %path.display(), zones = zones.len(), "Zones loaded");
    Ok(zones)
}

fn read_shapefile(path: &Path) -> Result<Vec<VectorFeature>> {
    let mut reader = shapefile::Reader::from_path(path)
        .with_context(|| format!("Failed to open Shapefile: {}", path.display()))?;

    let mut features = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) =
            result.with_context(|| format!("Failed to read Shapefile: {}", path.display()))?;

        let geometry = match shape {
            Shape::Polygon(polygon) => Some(
                MultiPolygon::<f64>::try_from(polygon)
                    .map_err(|e| anyhow!("Failed to convert polygon: {:?}", e))?,
            ),
            Shape::PolygonM(polygon) => Some(
                MultiPolygon::<f64>::try_from(polygon)
                    .map_err(|e| anyhow!("Failed to convert polygonM: {:?}", e))?,
            ),
            Shape::PolygonZ(polygon) => Some(
                MultiPolygon::<f64>::try_from(polygon)
                    .map_err(|e| anyhow!("Failed to convert polygonZ: {:?}", e))?,
            ),
            other => {
                debug!(shape_type = ?other.shapetype(), "Skipping non-polygon shape");
                None
            }
        };

        let fields: HashMap<String, FieldValue> = record.into();
        let properties = fields
            .into_iter()
            .filter_map(|(name, value)| field_to_string(&value).map(|v| (name, v)))
            .collect();

        features.push(VectorFeature {
            geometry,
            properties,
        });
    }

    Ok(features)
}

fn read_geojson(path: &Path) -> Result<Vec<VectorFeature>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {}", path.display()))?;
    let geojson = GeoJson::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse GeoJSON: {}", path.display()))?;

    let raw_features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(g) => vec![geojson::Feature {
            bbox: None,
            geometry: Some(g),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    };

    let mut features = Vec::with_capacity(raw_features.len());
    for feature in raw_features {
        let geometry = match feature.geometry {
            Some(geom) => {
                let geom: Geometry<f64> = geom
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert GeoJSON geometry: {:?}", e))?;
                surface(geom)
            }
            None => None,
        };

        let properties = feature
            .properties
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| json_to_string(&v).map(|s| (k, s)))
            .collect();

        features.push(VectorFeature {
            geometry,
            properties,
        });
    }

    Ok(features)
}

/// Ne garde que les géométries surfaciques
fn surface(geom: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::GeometryCollection(gc) => {
            let polygons: Vec<_> = gc
                .0
                .into_iter()
                .filter_map(surface)
                .flat_map(|mp| mp.0)
                .collect();
            (!polygons.is_empty()).then(|| MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

/// Convertit une valeur dBase en texte (`None` pour une valeur nulle)
fn field_to_string(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(s) => s.as_ref().map(|s| s.trim().to_string()),
        FieldValue::Memo(s) => Some(s.clone()),
        FieldValue::Numeric(n) => n.map(format_number),
        FieldValue::Float(f) => f.map(|f| format_number(f64::from(f))),
        FieldValue::Double(d) => Some(format_number(*d)),
        FieldValue::Currency(c) => Some(format_number(*c)),
        FieldValue::Integer(i) => Some(i.to_string()),
        FieldValue::Logical(b) => b.map(|b| b.to_string()),
        _ => None,
    }
}

fn json_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i.to_string()),
            None => n.as_f64().map(format_number),
        },
        other => Some(other.to_string()),
    }
}

/// `1.0` → `"1"`, `2.5` → `"2.5"` (les champs numériques dBase sont des flottants)
fn format_number(n: f64) -> String {
    n.to_string()
}
