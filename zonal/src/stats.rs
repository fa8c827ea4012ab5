//! Sommes zonales et jointure des statistiques par zone

use std::collections::HashMap;

use tracing::debug;

use crate::rasterize::rasterize;
use crate::types::{GeoTransform, Grid, ResultRecord, Zone, ZoneStat};
use crate::ZonalError;

/// Pixels couverts par chaque zone sur une grille donnée
///
/// La rastérisation est faite une seule fois puis réutilisée pour toutes les
/// grilles alignées sur la même transformation.
#[derive(Debug, Clone)]
pub struct ZoneCoverage {
    width: usize,
    height: usize,
    transform: GeoTransform,
    zones: Vec<(String, Vec<usize>)>,
}

impl ZoneCoverage {
    /// Rastérise chaque zone sur la grille décrite
    pub fn build(
        zones: &[Zone],
        width: usize,
        height: usize,
        transform: &GeoTransform,
    ) -> Result<Self, ZonalError> {
        if !transform.is_north_up() {
            return Err(ZonalError::UnsupportedTransform(transform.to_gdal()));
        }

        let zones: Vec<(String, Vec<usize>)> = zones
            .iter()
            .map(|zone| {
                let pixels = rasterize(&zone.geometry, width, height, transform);
                (zone.id.clone(), pixels)
            })
            .collect();

        let empty = zones.iter().filter(|(_, p)| p.is_empty()).count();
        debug!(zones = zones.len(), empty, width, height, "Zone coverage built");

        Ok(Self {
            width,
            height,
            transform: *transform,
            zones,
        })
    }

    /// Couverture construite sur la grille d'une autre grille
    pub fn for_grid(zones: &[Zone], grid: &Grid) -> Result<Self, ZonalError> {
        Self::build(zones, grid.width, grid.height, &grid.transform)
    }

    /// Nombre de zones ne couvrant aucun centre de pixel
    pub fn empty_zones(&self) -> usize {
        self.zones.iter().filter(|(_, p)| p.is_empty()).count()
    }

    /// Somme des pixels valides de la grille pour chaque zone
    ///
    /// Une zone sans pixel valide a une somme `None`.
    pub fn sums(&self, grid: &Grid) -> Result<Vec<ZoneStat>, ZonalError> {
        if (grid.width, grid.height) != (self.width, self.height)
            || !grid.transform.approx_eq(&self.transform)
        {
            return Err(ZonalError::grid_mismatch(
                (self.width, self.height, &self.transform),
                (grid.width, grid.height, &grid.transform),
            ));
        }

        Ok(self
            .zones
            .iter()
            .map(|(zone_id, pixels)| {
                let mut count = 0;
                let mut sum = 0.0;
                for &idx in pixels {
                    let value = grid.data[idx];
                    if grid.is_valid(value) {
                        count += 1;
                        sum += value;
                    }
                }
                ZoneStat {
                    zone_id: zone_id.clone(),
                    count,
                    sum: (count > 0).then_some(sum),
                }
            })
            .collect())
    }
}

/// Assemble les lignes de résultat en joignant les statistiques par identifiant
///
/// L'ordre de sortie est celui de `zones`, quel que soit l'ordre des statistiques.
pub fn join_by_zone(
    zones: &[Zone],
    year: &str,
    rural: &[ZoneStat],
    urban: &[ZoneStat],
) -> Result<Vec<ResultRecord>, ZonalError> {
    let rural_by_id: HashMap<&str, &ZoneStat> =
        rural.iter().map(|s| (s.zone_id.as_str(), s)).collect();
    let urban_by_id: HashMap<&str, &ZoneStat> =
        urban.iter().map(|s| (s.zone_id.as_str(), s)).collect();

    zones
        .iter()
        .map(|zone| {
            let r = rural_by_id
                .get(zone.id.as_str())
                .ok_or_else(|| ZonalError::missing_zone_stat(&zone.id, "rural"))?;
            let u = urban_by_id
                .get(zone.id.as_str())
                .ok_or_else(|| ZonalError::missing_zone_stat(&zone.id, "urban"))?;
            Ok(ResultRecord {
                id: zone.id.clone(),
                name: zone.name.clone(),
                year: year.to_string(),
                rural_pop: r.sum,
                urban_pop: u.sum,
            })
        })
        .collect()
}
