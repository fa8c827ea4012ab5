//! Lecture GeoTIFF en Rust pur (sans GDAL)
//!
//! Supporte les GeoTIFF mono-bande géoréférencés par `ModelPixelScale` +
//! `ModelTiepoint` ou par `ModelTransformation`, nodata lu dans le tag
//! `GDAL_NODATA`. L'image est décodée entièrement à l'ouverture.
//!
//! Avec `GTRasterTypeGeoKey = PixelIsPoint`, le point d'attache désigne le
//! centre du pixel: l'origine est décalée d'un demi-pixel vers le coin,
//! comme le fait GDAL.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;
use zonal::{slice_window, GeoTransform, RasterSource, Window, ZonalError};

/// Clé GeoTIFF du type de raster, et sa valeur `RasterPixelIsPoint`
const GT_RASTER_TYPE_GEO_KEY: u16 = 1025;
const RASTER_PIXEL_IS_POINT: u16 = 2;

/// Vérifie l'extension .tif / .tiff
pub fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_lowercase().as_str(), "tif" | "tiff"))
        .unwrap_or(false)
}

/// Raster GeoTIFF décodé en mémoire
#[derive(Debug)]
pub struct GeoTiffRaster {
    path: PathBuf,
    width: usize,
    height: usize,
    transform: GeoTransform,
    nodata: Option<f64>,
    data: Vec<f64>,
}

impl GeoTiffRaster {
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("Failed to open raster: {}", path.display()))?;
        let mut decoder = Decoder::new(BufReader::new(file))
            .with_context(|| format!("Failed to read TIFF header: {}", path.display()))?
            .with_limits(Limits::unlimited());

        let (width, height) = decoder.dimensions()?;
        let (width, height) = (width as usize, height as usize);
        let transform = read_transform(&mut decoder)
            .with_context(|| format!("No usable georeferencing in {}", path.display()))?;
        let nodata = read_nodata(&mut decoder)?;

        let data = samples_to_f64(decoder.read_image()?)
            .with_context(|| format!("Failed to decode {}", path.display()))?;
        if data.len() != width * height {
            bail!(
                "{} has {} samples for {}x{} pixels; only single-band rasters are supported",
                path.display(),
                data.len(),
                width,
                height
            );
        }

        debug!(
            path = %path.display(),
            width,
            height,
            nodata = ?nodata,
            transform = ?transform.to_gdal(),
            "GeoTIFF decoded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            width,
            height,
            transform,
            nodata,
            data,
        })
    }
}

impl RasterSource for GeoTiffRaster {
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
        slice_window(&self.data, self.width, self.height, window)
    }
}

/// Transformation depuis les tags GeoTIFF, ramenée au coin du pixel
fn read_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    let transform = read_model_transform(decoder)?;
    if !is_pixel_is_point(decoder)? {
        return Ok(transform);
    }

    let mut gt = transform.to_gdal();
    gt[0] -= 0.5 * (gt[1] + gt[2]);
    gt[3] -= 0.5 * (gt[4] + gt[5]);
    debug!("PixelIsPoint raster, origin moved half a pixel");
    Ok(GeoTransform::from_gdal(gt))
}

fn read_model_transform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<GeoTransform> {
    if let Some(scale) = decoder.find_tag(Tag::ModelPixelScaleTag)? {
        let scale = scale.into_f64_vec()?;
        let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag)?;
        if scale.len() < 2 || tiepoint.len() < 6 {
            bail!(
                "Malformed ModelPixelScale ({} values) or ModelTiepoint ({} values)",
                scale.len(),
                tiepoint.len()
            );
        }
        // Tiepoint: (i, j, k) pixel → (x, y, z) modèle
        let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
        let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
        return Ok(GeoTransform::north_up(origin_x, origin_y, scale[0], -scale[1]));
    }

    if let Some(matrix) = decoder.find_tag(Tag::ModelTransformationTag)? {
        let m = matrix.into_f64_vec()?;
        if m.len() < 8 {
            bail!("Malformed ModelTransformation ({} values)", m.len());
        }
        return Ok(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]]));
    }

    Err(anyhow!("Missing ModelPixelScale/ModelTiepoint and ModelTransformation tags"))
}

/// Cherche `GTRasterTypeGeoKey` dans le GeoKeyDirectory
///
/// Répertoire: en-tête de 4 valeurs (dont le nombre de clés en dernier), puis
/// 4 valeurs par clé (id, tag de stockage, nombre, valeur). Seules les clés
/// stockées directement (tag 0) sont lues.
fn is_pixel_is_point<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<bool> {
    let Some(directory) = decoder.find_tag(Tag::GeoKeyDirectoryTag)? else {
        return Ok(false);
    };
    let directory = directory.into_u16_vec()?;
    Ok(raster_type(&directory) == Some(RASTER_PIXEL_IS_POINT))
}

fn raster_type(directory: &[u16]) -> Option<u16> {
    let key_count = usize::from(*directory.get(3)?);
    directory
        .get(4..)?
        .chunks_exact(4)
        .take(key_count)
        .find(|entry| entry[0] == GT_RASTER_TYPE_GEO_KEY && entry[1] == 0)
        .map(|entry| entry[3])
}

/// Valeur nodata du tag GDAL_NODATA (texte ASCII)
fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<f64>> {
    let Some(value) = decoder.find_tag(Tag::GdalNodata)? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    parse_nodata(&text).map(Some)
}

fn parse_nodata(text: &str) -> Result<f64> {
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if text.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    text.parse::<f64>()
        .map_err(|_| anyhow!("Invalid GDAL_NODATA value: '{}'", text))
}

fn samples_to_f64(result: DecodingResult) -> Result<Vec<f64>> {
    Ok(match result {
        DecodingResult::U8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f64).collect(),
        DecodingResult::F32(v) => v.into_iter().map(f64::from).collect(),
        DecodingResult::F64(v) => v,
        #[allow(unreachable_patterns)]
        _ => bail!("Unsupported TIFF sample format"),
    })
}
