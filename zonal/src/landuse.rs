//! Séparation d'une grille de population en rural / urbain

use crate::types::{Grid, LandUseClasses};
use crate::ZonalError;

/// Résultat de la séparation d'une grille de population
#[derive(Debug, Clone)]
pub struct LandUseSplit {
    /// Population des pixels classés ruraux, 0 ailleurs
    pub rural: Grid,
    /// Population des pixels classés urbains, 0 ailleurs
    pub urban: Grid,
    /// Population valide tombant sur un pixel ni rural ni urbain
    pub unclassified_total: f64,
    /// Pixels du masque dont la classe n'est ni urbaine, ni rurale, ni nodata
    pub unknown_class_pixels: usize,
}

/// Sépare la population selon le masque d'occupation du sol
///
/// Les deux grilles doivent être alignées. Un pixel de population nodata
/// compte pour 0; un pixel de masque nodata (code `classes.nodata` ou nodata
/// de la grille) ne compte ni en rural ni en urbain, sa population est
/// reportée dans `unclassified_total`. Une classe inconnue est traitée comme
/// nodata et comptée dans `unknown_class_pixels`.
pub fn split_by_land_use(
    population: &Grid,
    mask: &Grid,
    classes: &LandUseClasses,
) -> Result<LandUseSplit, ZonalError> {
    mask.ensure_aligned(population)?;

    let len = population.data.len();
    let mut rural = Vec::with_capacity(len);
    let mut urban = Vec::with_capacity(len);
    let mut unclassified_total = 0.0;
    let mut unknown_class_pixels = 0;

    for (&pop, &class) in population.data.iter().zip(&mask.data) {
        let pop = if population.is_valid(pop) { pop } else { 0.0 };

        if class == classes.rural {
            rural.push(pop);
            urban.push(0.0);
        } else if class == classes.urban {
            rural.push(0.0);
            urban.push(pop);
        } else {
            if class != classes.nodata && mask.is_valid(class) {
                unknown_class_pixels += 1;
            }
            rural.push(0.0);
            urban.push(0.0);
            unclassified_total += pop;
        }
    }

    let derived = |data| Grid {
        width: population.width,
        height: population.height,
        transform: population.transform,
        nodata: None,
        data,
    };

    Ok(LandUseSplit {
        rural: derived(rural),
        urban: derived(urban),
        unclassified_total,
        unknown_class_pixels,
    })
}
