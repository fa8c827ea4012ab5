//! Définition et implémentation des commandes CLI
//!
//! - défaut: calcul complet → CSV
//! - `list`: rasters de population trouvés et leur année

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use rural_urban_pop::discovery::{discover_population_rasters, extract_year};
use rural_urban_pop::{reader_for, run, RasterBackend, RunConfig};
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// List discovered population rasters and their year
    List {
        #[command(flatten)]
        args: RunArgs,
    },
}

/// Options communes, chacune surcharge le fichier de configuration
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// JSON config file (every field optional)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory containing the lspop<year> folders (default: data)
    #[arg(long)]
    pub population_dir: Option<PathBuf>,

    /// Prefix of the population folders (default: lspop)
    #[arg(long)]
    pub population_prefix: Option<String>,

    /// Raster file name inside each folder (default: hdr.adf)
    #[arg(long)]
    pub population_file: Option<String>,

    /// Zone polygons, Shapefile or GeoJSON (default: data/GTM_adm2.shp)
    #[arg(long)]
    pub zones: Option<PathBuf>,

    /// Zone id attribute (default: ID_2)
    #[arg(long)]
    pub id_field: Option<String>,

    /// Zone name attribute (default: NAME_2)
    #[arg(long)]
    pub name_field: Option<String>,

    /// Land-use raster (default: data/rural.tif)
    #[arg(long)]
    pub land_use: Option<PathBuf>,

    /// Clipping geometry (default: data/ca_boundingbox.shp)
    #[arg(long)]
    pub bounding_box: Option<PathBuf>,

    /// Output CSV, overwritten (default: rural_urban_pop.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Raster backend: auto, gdal, geotiff
    #[arg(long)]
    pub raster_backend: Option<RasterBackend>,

    /// Save the run report as JSON
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Charge la configuration puis applique les options de la ligne de commande
pub fn resolve_config(args: &RunArgs) -> Result<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut RunConfig, args: &RunArgs) {
    if let Some(v) = &args.population_dir {
        config.population_dir = v.clone();
    }
    if let Some(v) = &args.population_prefix {
        config.population_prefix = v.clone();
    }
    if let Some(v) = &args.population_file {
        config.population_file = v.clone();
    }
    if let Some(v) = &args.zones {
        config.zones = v.clone();
    }
    if let Some(v) = &args.id_field {
        config.zone_id_field = v.clone();
    }
    if let Some(v) = &args.name_field {
        config.zone_name_field = v.clone();
    }
    if let Some(v) = &args.land_use {
        config.land_use = v.clone();
    }
    if let Some(v) = &args.bounding_box {
        config.bounding_box = v.clone();
    }
    if let Some(v) = &args.output {
        config.output = v.clone();
    }
    if let Some(v) = args.raster_backend {
        config.raster_backend = v;
    }
}

/// Exécute le calcul complet
pub fn cmd_run(args: &RunArgs, quiet: bool) -> Result<()> {
    let config = resolve_config(args)?;

    info!(
        zones = %config.zones.display(),
        land_use = %config.land_use.display(),
        bounding_box = %config.bounding_box.display(),
        population_dir = %config.population_dir.display(),
        output = %config.output.display(),
        backend = ?config.raster_backend,
        "Starting run"
    );

    let reader = reader_for(config.raster_backend)?;
    let report = run(&config, reader.as_ref())?;

    if !quiet {
        report.display();
    }
    if let Some(path) = &args.report {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    info!("{}", report.summary());
    Ok(())
}

/// Affiche les rasters trouvés sans rien calculer
pub fn cmd_list(args: &RunArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let rasters = discover_population_rasters(
        &config.population_dir,
        &config.population_prefix,
        &config.population_file,
    )?;

    for path in &rasters {
        let year = extract_year(path, &config.population_prefix, &config.population_file)?;
        println!("{}\t{}", year, path.display());
    }
    info!(count = rasters.len(), "Population rasters listed");
    Ok(())
}
