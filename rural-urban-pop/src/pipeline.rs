//! Traitement complet: emprise, zones, masque, puis une passe par année

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use geo::MultiPolygon;
use tracing::{debug, info, warn};
use zonal::{
    clip_to_geometry, join_by_zone, split_by_land_use, Grid, LandUseClasses, Zone, ZoneCoverage,
};

use crate::config::RunConfig;
use crate::discovery::{discover_population_rasters, extract_year};
use crate::export::ResultWriter;
use crate::report::{RunReport, YearSummary};
use crate::source::RasterReader;
use crate::vector::{load_bounding_geometry, load_zones};

/// Géométries chargées une fois pour toute l'exécution
#[derive(Debug, Clone)]
pub struct SpatialContext {
    pub bounding_geometry: MultiPolygon<f64>,
    pub zones: Vec<Zone>,
}

impl SpatialContext {
    pub fn load(config: &RunConfig) -> Result<Self> {
        let bounding_geometry = load_bounding_geometry(&config.bounding_box)?;
        let zones = load_zones(
            &config.zones,
            &config.zone_id_field,
            &config.zone_name_field,
        )?;
        Ok(Self {
            bounding_geometry,
            zones,
        })
    }
}

/// Ouvre un raster et le découpe sur l'emprise
pub fn load_clipped(
    reader: &dyn RasterReader,
    path: &Path,
    geometry: &MultiPolygon<f64>,
) -> Result<Grid> {
    let source = reader.open(path)?;
    let grid = clip_to_geometry(source.as_ref(), geometry)
        .with_context(|| format!("Failed to clip raster {}", path.display()))?;
    debug!(
        path = %path.display(),
        width = grid.width,
        height = grid.height,
        "Raster clipped"
    );
    Ok(grid)
}

/// Exécute le traitement complet et écrit le CSV
pub fn run(config: &RunConfig, reader: &dyn RasterReader) -> Result<RunReport> {
    let start = Instant::now();
    let mut report = RunReport::new(&config.output);
    let classes = config.land_use_classes();

    let context = SpatialContext::load(config)?;

    let mask = load_clipped(reader, &config.land_use, &context.bounding_geometry)
        .context("Failed to load land-use raster")?;
    info!(
        path = %config.land_use.display(),
        width = mask.width,
        height = mask.height,
        "Land-use mask loaded"
    );

    let coverage = ZoneCoverage::for_grid(&context.zones, &mask)?;
    if coverage.empty_zones() > 0 {
        warn!(
            empty_zones = coverage.empty_zones(),
            "Some zones cover no pixel centre; their sums will be empty"
        );
    }

    let mut writer = ResultWriter::create(&config.output)?;

    let rasters = discover_population_rasters(
        &config.population_dir,
        &config.population_prefix,
        &config.population_file,
    )?;
    if rasters.is_empty() {
        warn!(
            dir = %config.population_dir.display(),
            prefix = %config.population_prefix,
            "No population raster found; output will only contain the header"
        );
    } else {
        info!(count = rasters.len(), "Population rasters found");
    }

    for path in &rasters {
        let year = extract_year(path, &config.population_prefix, &config.population_file)?;
        let summary = process_year(
            reader,
            path,
            &year,
            &context,
            &mask,
            &coverage,
            &classes,
            &mut writer,
        )?;
        report.record_year(summary);
    }

    report.rows_written = writer.finish()?;
    report.set_duration(start.elapsed());
    report.finalize();

    info!(
        output = %config.output.display(),
        rows = report.rows_written,
        duration_secs = report.duration_secs,
        "Done"
    );
    Ok(report)
}

#[allow(clippy::too_many_arguments)]
fn process_year(
    reader: &dyn RasterReader,
    path: &Path,
    year: &str,
    context: &SpatialContext,
    mask: &Grid,
    coverage: &ZoneCoverage,
    classes: &LandUseClasses,
    writer: &mut ResultWriter,
) -> Result<YearSummary> {
    info!(year = %year, path = %path.display(), "Processing population raster");

    let population = load_clipped(reader, path, &context.bounding_geometry)?;
    mask.ensure_aligned(&population)
        .with_context(|| format!("Population raster {} is not aligned with the land-use mask", path.display()))?;

    let split = split_by_land_use(&population, mask, classes)?;
    if split.unknown_class_pixels > 0 {
        warn!(
            year = %year,
            pixels = split.unknown_class_pixels,
            urban = classes.urban,
            rural = classes.rural,
            nodata = classes.nodata,
            "Land-use pixels with an unknown class are treated as no-data"
        );
    }
    if split.unclassified_total > 0.0 {
        warn!(
            year = %year,
            population = split.unclassified_total,
            "Population on no-data land-use pixels is counted in neither column"
        );
    }

    let rural = coverage.sums(&split.rural)?;
    let urban = coverage.sums(&split.urban)?;
    let records = join_by_zone(&context.zones, year, &rural, &urban)?;
    writer.write_records(&records)?;

    let summary = YearSummary {
        year: year.to_string(),
        raster: path.display().to_string(),
        zones: records.len(),
        population_total: population.valid_sum(),
        rural_total: rural.iter().filter_map(|s| s.sum).sum(),
        urban_total: urban.iter().filter_map(|s| s.sum).sum(),
        unclassified_total: split.unclassified_total,
        empty_zones: coverage.empty_zones(),
    };
    debug!(
        year = %year,
        rural = summary.rural_total,
        urban = summary.urban_total,
        "Year written"
    );
    Ok(summary)
}
