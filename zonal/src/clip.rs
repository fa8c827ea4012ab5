//! Découpage d'un raster par une géométrie (crop + masque)
//!
//! La fenêtre lue est l'emprise de la géométrie arrondie vers l'extérieur au
//! pixel près, intersectée avec le raster. Les pixels de la fenêtre dont le
//! centre est hors de la géométrie reçoivent la valeur nodata de la source
//! (0 si la source n'en déclare pas).

use geo::{BoundingRect, MultiPolygon};
use tracing::debug;

use crate::rasterize::rasterize_mask;
use crate::raster::RasterSource;
use crate::types::{GeoTransform, Grid, Window};
use crate::ZonalError;

/// Fenêtre de pixels couvrant l'emprise de la géométrie
pub fn geometry_window(
    geometry: &MultiPolygon<f64>,
    width: usize,
    height: usize,
    transform: &GeoTransform,
) -> Result<Window, ZonalError> {
    if !transform.is_north_up() {
        return Err(ZonalError::UnsupportedTransform(transform.to_gdal()));
    }

    let Some(bbox) = geometry.bounding_rect() else {
        return Err(ZonalError::EmptyClip {
            min_x: f64::NAN,
            min_y: f64::NAN,
            max_x: f64::NAN,
            max_y: f64::NAN,
            width,
            height,
        });
    };

    let col_start = clamp(
        ((bbox.min().x - transform.origin_x) / transform.pixel_width).floor(),
        width,
    );
    let col_end = clamp(
        ((bbox.max().x - transform.origin_x) / transform.pixel_width).ceil(),
        width,
    );
    let row_start = clamp(
        ((bbox.max().y - transform.origin_y) / transform.pixel_height).floor(),
        height,
    );
    let row_end = clamp(
        ((bbox.min().y - transform.origin_y) / transform.pixel_height).ceil(),
        height,
    );

    if col_start >= col_end || row_start >= row_end {
        return Err(ZonalError::EmptyClip {
            min_x: bbox.min().x,
            min_y: bbox.min().y,
            max_x: bbox.max().x,
            max_y: bbox.max().y,
            width,
            height,
        });
    }

    Ok(Window::new(
        col_start,
        row_start,
        col_end - col_start,
        row_end - row_start,
    ))
}

/// Découpe une source raster selon une géométrie
///
/// # Errors
///
/// `EmptyClip` si la géométrie ne recouvre pas le raster,
/// `UnsupportedTransform` pour un raster avec rotation.
pub fn clip_to_geometry(
    source: &dyn RasterSource,
    geometry: &MultiPolygon<f64>,
) -> Result<Grid, ZonalError> {
    let (width, height) = source.size();
    let transform = source.transform();
    let window = geometry_window(geometry, width, height, &transform)?;

    debug!(
        source = %source.name(),
        col_off = window.col_off,
        row_off = window.row_off,
        width = window.width,
        height = window.height,
        "Clip window"
    );

    let data = source.read_window(&window)?;
    let mut grid = Grid::new(
        window.width,
        window.height,
        transform.window_transform(&window),
        source.nodata(),
        data,
    )?;

    let inside = rasterize_mask(geometry, grid.width, grid.height, &grid.transform);
    let fill = grid.fill_value();
    for (value, keep) in grid.data.iter_mut().zip(inside) {
        if !keep {
            *value = fill;
        }
    }

    Ok(grid)
}

fn clamp(value: f64, max: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= max as f64 {
        max
    } else {
        value as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    /// Grille 6x6, pixels de 1, coin haut-gauche en (0, 6), valeurs 1..=36
    fn grid6() -> Grid {
        let gt = GeoTransform::north_up(0.0, 6.0, 1.0, -1.0);
        Grid::new(6, 6, gt, Some(-1.0), (1..=36).map(f64::from).collect()).unwrap()
    }

    fn triangle() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 1.0, y: 1.0),
            (x: 4.0, y: 1.0),
            (x: 1.0, y: 4.0),
            (x: 1.0, y: 1.0)
        ]])
    }

    #[test]
    fn test_window_crops_to_bounds() {
        let grid = grid6();
        let window = geometry_window(&triangle(), 6, 6, &grid.transform).unwrap();
        assert_eq!(window, Window::new(1, 2, 3, 3));
    }

    #[test]
    fn test_window_rounds_outward() {
        let grid = grid6();
        let geom = MultiPolygon::new(vec![polygon![
            (x: 1.2, y: 1.2),
            (x: 2.6, y: 1.2),
            (x: 2.6, y: 2.6),
            (x: 1.2, y: 1.2)
        ]]);
        let window = geometry_window(&geom, 6, 6, &grid.transform).unwrap();
        assert_eq!(window, Window::new(1, 3, 2, 2));
    }

    #[test]
    fn test_clip_masks_outside_pixels() {
        let clipped = clip_to_geometry(&grid6(), &triangle()).unwrap();
        assert_eq!(clipped.shape(), (3, 3));
        assert_eq!(clipped.transform.origin_x, 1.0);
        assert_eq!(clipped.transform.origin_y, 4.0);

        // Les centres posés sur l'hypoténuse sont exclus (intervalle semi-ouvert)
        assert_eq!(clipped.data[0..3], [-1.0, -1.0, -1.0]);
        assert_eq!(clipped.data[3..6], [20.0, -1.0, -1.0]);
        assert_eq!(clipped.data[6..9], [26.0, 27.0, -1.0]);
    }

    #[test]
    fn test_clip_overlapping_parts_keep_all_pixels() {
        let gt = GeoTransform::north_up(0.0, 4.0, 1.0, -1.0);
        let grid = Grid::filled(6, 4, gt, Some(-1.0), 7.0);
        let square = |x0: f64, x1: f64| {
            polygon![
                (x: x0, y: 0.0),
                (x: x1, y: 0.0),
                (x: x1, y: 4.0),
                (x: x0, y: 4.0),
                (x: x0, y: 0.0)
            ]
        };
        // Colonnes 2 et 3 couvertes par les deux parties
        let geom = MultiPolygon::new(vec![square(0.0, 4.0), square(2.0, 6.0)]);

        let clipped = clip_to_geometry(&grid, &geom).unwrap();
        assert_eq!(clipped.shape(), (6, 4));
        assert!(clipped.data.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_clip_without_nodata_fills_zero() {
        let mut grid = grid6();
        grid.nodata = None;
        let clipped = clip_to_geometry(&grid, &triangle()).unwrap();
        assert_eq!(clipped.get(0, 2), 0.0);
        assert_eq!(clipped.get(2, 0), 26.0);
    }

    #[test]
    fn test_clip_no_overlap() {
        let geom = MultiPolygon::new(vec![polygon![
            (x: 10.0, y: 10.0),
            (x: 12.0, y: 10.0),
            (x: 12.0, y: 12.0),
            (x: 10.0, y: 10.0)
        ]]);
        let result = clip_to_geometry(&grid6(), &geom);
        assert!(matches!(result, Err(ZonalError::EmptyClip { .. })));
    }

    #[test]
    fn test_clip_rotated_rejected() {
        let mut grid = grid6();
        grid.transform.row_rotation = 0.1;
        let result = clip_to_geometry(&grid, &triangle());
        assert!(matches!(result, Err(ZonalError::UnsupportedTransform(_))));
    }

    #[test]
    fn test_same_resolution_rasters_align_after_clip() {
        // Raster plus grand, même résolution, origine décalée d'un nombre entier de pixels
        let gt = GeoTransform::north_up(-2.0, 8.0, 1.0, -1.0);
        let bigger = Grid::filled(10, 10, gt, None, 5.0);

        let a = clip_to_geometry(&grid6(), &triangle()).unwrap();
        let b = clip_to_geometry(&bigger, &triangle()).unwrap();
        assert!(a.ensure_aligned(&b).is_ok());
    }

    #[test]
    fn test_different_resolution_rasters_do_not_align() {
        let gt = GeoTransform::north_up(0.0, 6.0, 0.5, -0.5);
        let finer = Grid::filled(12, 12, gt, None, 1.0);

        let a = clip_to_geometry(&grid6(), &triangle()).unwrap();
        let b = clip_to_geometry(&finer, &triangle()).unwrap();
        assert!(matches!(
            a.ensure_aligned(&b),
            Err(ZonalError::GridMismatch { .. })
        ));
    }
}
