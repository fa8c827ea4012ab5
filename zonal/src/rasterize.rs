//! Rastérisation de polygones par balayage de lignes
//!
//! Règle du centre de pixel: un pixel appartient au polygone si son centre est
//! à l'intérieur (remplissage pair-impair, anneaux intérieurs compris).
//! Les intersections sont semi-ouvertes, un centre posé sur une frontière
//! commune à deux zones n'est compté qu'une fois.
//!
//! Chaque polygone d'un multipolygone est balayé séparément puis les parties
//! sont réunies: un pixel couvert par deux parties qui se recouvrent est
//! retenu une seule fois.

use geo::{BoundingRect, Coord, MultiPolygon, Polygon};

use crate::types::GeoTransform;

/// Indices (`ligne * largeur + colonne`) des pixels dont le centre est dans la géométrie
///
/// Les indices sont triés et uniques. La transformation doit être nord en haut
/// (voir [`GeoTransform::is_north_up`]).
pub fn rasterize(
    geometry: &MultiPolygon<f64>,
    width: usize,
    height: usize,
    transform: &GeoTransform,
) -> Vec<usize> {
    debug_assert!(transform.is_north_up());

    let mut pixels = Vec::new();
    if width == 0 || height == 0 {
        return pixels;
    }

    for polygon in &geometry.0 {
        scan_polygon(polygon, width, height, transform, &mut pixels);
    }

    // Union des parties
    if geometry.0.len() > 1 {
        pixels.sort_unstable();
        pixels.dedup();
    }
    pixels
}

/// Masque booléen de la géométrie sur la grille
pub fn rasterize_mask(
    geometry: &MultiPolygon<f64>,
    width: usize,
    height: usize,
    transform: &GeoTransform,
) -> Vec<bool> {
    let mut mask = vec![false; width * height];
    for idx in rasterize(geometry, width, height, transform) {
        mask[idx] = true;
    }
    mask
}

/// Balaye un polygone (extérieur et trous), ajoute ses pixels ligne par ligne
fn scan_polygon(
    polygon: &Polygon<f64>,
    width: usize,
    height: usize,
    transform: &GeoTransform,
    pixels: &mut Vec<usize>,
) {
    let Some(bbox) = polygon.bounding_rect() else {
        return;
    };

    let edges = collect_edges(polygon);
    if edges.is_empty() {
        return;
    }

    // Lignes dont le centre peut tomber dans l'emprise
    let row_start = clamp_index(
        ((bbox.max().y - transform.origin_y) / transform.pixel_height - 0.5).floor(),
        height,
    );
    let row_end = clamp_index(
        ((bbox.min().y - transform.origin_y) / transform.pixel_height - 0.5).ceil() + 1.0,
        height,
    );

    let mut crossings: Vec<f64> = Vec::new();
    for row in row_start..row_end {
        let y = transform.origin_y + (row as f64 + 0.5) * transform.pixel_height;

        crossings.clear();
        for (a, b) in &edges {
            if (a.y <= y) != (b.y <= y) {
                crossings.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let col_start = first_col_at_or_after(span[0], transform, width);
            let col_end = first_col_at_or_after(span[1], transform, width);
            let base = row * width;
            pixels.extend((col_start..col_end).map(|col| base + col));
        }
    }
}

/// Segments de l'anneau extérieur et des anneaux intérieurs
fn collect_edges(polygon: &Polygon<f64>) -> Vec<(Coord, Coord)> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(|ring| ring.lines().map(|line| (line.start, line.end)))
        .collect()
}

/// Première colonne dont le centre est >= x
fn first_col_at_or_after(x: f64, transform: &GeoTransform, width: usize) -> usize {
    clamp_index(
        ((x - transform.origin_x) / transform.pixel_width - 0.5).ceil(),
        width,
    )
}

fn clamp_index(value: f64, max: usize) -> usize {
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
    use geo::{polygon, Polygon};

    fn unit_grid() -> GeoTransform {
        // 4x4 pixels de 1 unité, coin haut-gauche en (0, 4)
        GeoTransform::north_up(0.0, 4.0, 1.0, -1.0)
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0)
        ]
    }

    #[test]
    fn test_square_bottom_left() {
        let geom = MultiPolygon::new(vec![square(0.0, 0.0, 2.0, 2.0)]);
        let pixels = rasterize(&geom, 4, 4, &unit_grid());
        assert_eq!(pixels, vec![8, 9, 12, 13]);
    }

    #[test]
    fn test_polygon_with_hole() {
        let outer = square(0.0, 0.0, 3.0, 3.0);
        let hole = square(1.0, 1.0, 2.0, 2.0);
        let poly = Polygon::new(outer.exterior().clone(), vec![hole.exterior().clone()]);
        let pixels = rasterize(&MultiPolygon::new(vec![poly]), 4, 4, &unit_grid());
        // 3x3 pixels (lignes 1..4, colonnes 0..3) moins le centre (ligne 2, colonne 1)
        assert_eq!(pixels.len(), 8);
        assert!(!pixels.contains(&9));
        assert!(pixels.contains(&4));
        assert!(pixels.contains(&14));
    }

    #[test]
    fn test_shared_boundary_counted_once() {
        // Frontière verticale en x = 1.5, qui passe par le centre des pixels de colonne 1
        let left = MultiPolygon::new(vec![square(0.0, 0.0, 1.5, 4.0)]);
        let right = MultiPolygon::new(vec![square(1.5, 0.0, 4.0, 4.0)]);
        let mut a = rasterize(&left, 4, 4, &unit_grid());
        let b = rasterize(&right, 4, 4, &unit_grid());
        assert_eq!(a.len() + b.len(), 16);
        a.extend(b);
        a.sort_unstable();
        a.dedup();
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn test_partial_pixel_uses_center() {
        // Couvre 40% du pixel (0,0): centre exclu
        let geom = MultiPolygon::new(vec![square(0.0, 3.0, 0.4, 4.0)]);
        assert!(rasterize(&geom, 4, 4, &unit_grid()).is_empty());

        // Couvre 60%: centre inclus
        let geom = MultiPolygon::new(vec![square(0.0, 3.0, 0.6, 4.0)]);
        assert_eq!(rasterize(&geom, 4, 4, &unit_grid()), vec![0]);
    }

    #[test]
    fn test_geometry_outside_grid() {
        let geom = MultiPolygon::new(vec![square(10.0, 10.0, 12.0, 12.0)]);
        assert!(rasterize(&geom, 4, 4, &unit_grid()).is_empty());
    }

    #[test]
    fn test_overlapping_parts_are_unioned() {
        // Deux carrés qui se recouvrent sur les colonnes 1 et 2
        let geom = MultiPolygon::new(vec![
            square(0.0, 0.0, 3.0, 4.0),
            square(1.0, 0.0, 4.0, 4.0),
        ]);
        let pixels = rasterize(&geom, 4, 4, &unit_grid());
        assert_eq!(pixels, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn test_disjoint_parts_sorted() {
        let geom = MultiPolygon::new(vec![
            square(2.0, 0.0, 3.0, 1.0),
            square(0.0, 3.0, 1.0, 4.0),
        ]);
        assert_eq!(rasterize(&geom, 4, 4, &unit_grid()), vec![0, 14]);
    }

    #[test]
    fn test_geometry_larger_than_grid() {
        let geom = MultiPolygon::new(vec![square(-5.0, -5.0, 10.0, 10.0)]);
        let mask = rasterize_mask(&geom, 4, 4, &unit_grid());
        assert!(mask.iter().all(|&m| m));
    }
}
