//! Types de données pour le crate zonal

use geo::{Coord, MultiPolygon};

use crate::ZonalError;

/// Tolérance relative pour comparer deux transformations
const TRANSFORM_TOLERANCE: f64 = 1e-9;

/// Transformation affine pixel → coordonnées (ordre GDAL)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// X du coin haut-gauche
    pub origin_x: f64,
    /// Largeur d'un pixel
    pub pixel_width: f64,
    /// Rotation (terme ligne sur X)
    pub row_rotation: f64,
    /// Y du coin haut-gauche
    pub origin_y: f64,
    /// Rotation (terme colonne sur Y)
    pub col_rotation: f64,
    /// Hauteur d'un pixel (négative pour une image nord en haut)
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Transformation nord en haut sans rotation
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            pixel_width,
            row_rotation: 0.0,
            origin_y,
            col_rotation: 0.0,
            pixel_height,
        }
    }

    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            origin_x: gt[0],
            pixel_width: gt[1],
            row_rotation: gt[2],
            origin_y: gt[3],
            col_rotation: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Pas de rotation, X croissant vers la droite, Y décroissant vers le bas
    pub fn is_north_up(&self) -> bool {
        self.row_rotation == 0.0
            && self.col_rotation == 0.0
            && self.pixel_width > 0.0
            && self.pixel_height < 0.0
    }

    /// Coordonnées du centre d'un pixel
    pub fn pixel_center(&self, row: usize, col: usize) -> Coord {
        let c = col as f64 + 0.5;
        let r = row as f64 + 0.5;
        Coord {
            x: self.origin_x + c * self.pixel_width + r * self.row_rotation,
            y: self.origin_y + c * self.col_rotation + r * self.pixel_height,
        }
    }

    /// Transformation d'une fenêtre extraite de ce raster
    pub fn window_transform(&self, window: &Window) -> Self {
        let c = window.col_off as f64;
        let r = window.row_off as f64;
        Self {
            origin_x: self.origin_x + c * self.pixel_width + r * self.row_rotation,
            origin_y: self.origin_y + c * self.col_rotation + r * self.pixel_height,
            ..*self
        }
    }

    /// Égalité à une tolérance relative près
    pub fn approx_eq(&self, other: &GeoTransform) -> bool {
        self.to_gdal()
            .iter()
            .zip(other.to_gdal().iter())
            .all(|(a, b)| {
                let scale = 1.0_f64.max(a.abs()).max(b.abs());
                (a - b).abs() <= TRANSFORM_TOLERANCE * scale
            })
    }
}

/// Rectangle de pixels dans un raster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(col_off: usize, row_off: usize, width: usize, height: usize) -> Self {
        Self {
            col_off,
            row_off,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Vérifie que la fenêtre tient dans un raster de cette taille
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.col_off + self.width <= width && self.row_off + self.height <= height
    }
}

/// Grille raster en mémoire (une bande, ligne par ligne)
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    /// Valeur nodata déclarée par la source
    pub nodata: Option<f64>,
    pub data: Vec<f64>,
}

impl Grid {
    /// Crée une grille en vérifiant la taille des données
    pub fn new(
        width: usize,
        height: usize,
        transform: GeoTransform,
        nodata: Option<f64>,
        data: Vec<f64>,
    ) -> Result<Self, ZonalError> {
        if data.len() != width * height {
            return Err(ZonalError::DataLength {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            transform,
            nodata,
            data,
        })
    }

    /// Grille remplie d'une valeur constante
    pub fn filled(
        width: usize,
        height: usize,
        transform: GeoTransform,
        nodata: Option<f64>,
        value: f64,
    ) -> Self {
        Self {
            width,
            height,
            transform,
            nodata,
            data: vec![value; width * height],
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Valeur utilisée pour les pixels hors géométrie
    pub fn fill_value(&self) -> f64 {
        self.nodata.unwrap_or(0.0)
    }

    /// Une valeur est valide si elle n'est ni NaN ni nodata
    #[inline]
    pub fn is_valid(&self, value: f64) -> bool {
        if value.is_nan() {
            return false;
        }
        match self.nodata {
            Some(nd) => value != nd,
            None => true,
        }
    }

    /// Vérifie que deux grilles sont superposables pixel à pixel
    pub fn ensure_aligned(&self, other: &Grid) -> Result<(), ZonalError> {
        if self.shape() != other.shape() || !self.transform.approx_eq(&other.transform) {
            return Err(ZonalError::grid_mismatch(
                (self.width, self.height, &self.transform),
                (other.width, other.height, &other.transform),
            ));
        }
        Ok(())
    }

    /// Somme des valeurs valides
    pub fn valid_sum(&self) -> f64 {
        self.data.iter().filter(|v| self.is_valid(**v)).sum()
    }
}

/// Zone de regroupement (municipio)
#[derive(Debug, Clone)]
pub struct Zone {
    /// Identifiant unique (ex: ID_2)
    pub id: String,
    /// Nom (ex: NAME_2)
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Somme d'une couche pour une zone
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneStat {
    pub zone_id: String,
    /// Nombre de pixels valides couverts par la zone
    pub count: usize,
    /// `None` si la zone ne couvre aucun centre de pixel
    pub sum: Option<f64>,
}

/// Codes de la classification rural/urbain
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandUseClasses {
    pub urban: f64,
    pub rural: f64,
    pub nodata: f64,
}

impl Default for LandUseClasses {
    fn default() -> Self {
        Self {
            urban: 0.0,
            rural: 1.0,
            nodata: 3.0,
        }
    }
}

/// Ligne de résultat: une zone pour une année
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub id: String,
    pub name: String,
    pub year: String,
    pub rural_pop: Option<f64>,
    pub urban_pop: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_center() {
        let gt = GeoTransform::north_up(100.0, 50.0, 2.0, -2.0);
        let c = gt.pixel_center(0, 0);
        assert_eq!((c.x, c.y), (101.0, 49.0));
        let c = gt.pixel_center(2, 3);
        assert_eq!((c.x, c.y), (107.0, 45.0));
    }

    #[test]
    fn test_window_transform() {
        let gt = GeoTransform::north_up(100.0, 50.0, 2.0, -2.0);
        let sub = gt.window_transform(&Window::new(3, 2, 4, 4));
        assert_eq!(sub.origin_x, 106.0);
        assert_eq!(sub.origin_y, 46.0);
        assert_eq!(sub.pixel_width, 2.0);
    }

    #[test]
    fn test_approx_eq() {
        let a = GeoTransform::north_up(-92.0, 18.0, 0.008333333333, -0.008333333333);
        let b = GeoTransform::north_up(-92.0 + 1e-12, 18.0, 0.008333333333, -0.008333333333);
        let c = GeoTransform::north_up(-91.99, 18.0, 0.008333333333, -0.008333333333);
        assert!(a.approx_eq(&b));
        assert!(!a.approx_eq(&c));
    }

    #[test]
    fn test_grid_length_checked() {
        let gt = GeoTransform::north_up(0.0, 2.0, 1.0, -1.0);
        assert!(Grid::new(2, 2, gt, None, vec![0.0; 4]).is_ok());
        assert!(matches!(
            Grid::new(2, 2, gt, None, vec![0.0; 3]),
            Err(ZonalError::DataLength { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_is_valid() {
        let gt = GeoTransform::north_up(0.0, 1.0, 1.0, -1.0);
        let grid = Grid::filled(1, 1, gt, Some(-9999.0), 0.0);
        assert!(grid.is_valid(0.0));
        assert!(!grid.is_valid(-9999.0));
        assert!(!grid.is_valid(f64::NAN));
    }

    #[test]
    fn test_ensure_aligned() {
        let gt = GeoTransform::north_up(0.0, 2.0, 1.0, -1.0);
        let a = Grid::filled(2, 2, gt, None, 0.0);
        let b = Grid::filled(2, 2, gt, Some(3.0), 1.0);
        assert!(a.ensure_aligned(&b).is_ok());

        let c = Grid::filled(3, 2, gt, None, 0.0);
        assert!(matches!(
            a.ensure_aligned(&c),
            Err(ZonalError::GridMismatch { actual_width: 3, .. })
        ));

        let shifted = GeoTransform::north_up(0.5, 2.0, 1.0, -1.0);
        let d = Grid::filled(2, 2, shifted, None, 0.0);
        assert!(a.ensure_aligned(&d).is_err());
    }
}
