//! Découverte des rasters de population et extraction de l'année

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use tracing::debug;

/// Liste les rasters `<root>/<prefix>*/<file_name>`, triés par chemin
///
/// Le tri est lexical sur la chaîne du chemin: il suit l'ordre des années tant
/// qu'elles ont toutes le même nombre de chiffres. Aucun résultat n'est pas
/// une erreur.
pub fn discover_population_rasters(
    root: &Path,
    prefix: &str,
    file_name: &str,
) -> Result<Vec<PathBuf>> {
    let root_str = root
        .to_str()
        .ok_or_else(|| anyhow!("Population directory is not valid UTF-8: {}", root.display()))?;
    let root_str = if root_str.is_empty() { "." } else { root_str };

    let pattern = format!(
        "{}/{}*/{}",
        glob::Pattern::escape(root_str.trim_end_matches('/')),
        glob::Pattern::escape(prefix),
        glob::Pattern::escape(file_name)
    );
    debug!(pattern = %pattern, "Searching population rasters");

    let mut rasters = Vec::new();
    for entry in glob::glob(&pattern).context(format!("Invalid glob pattern: {}", pattern))? {
        let path = entry.context("Failed to read a population raster directory entry")?;
        rasters.push(path);
    }

    rasters.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    Ok(rasters)
}

/// Extrait l'année du nom du dossier parent (`data/lspop2005/hdr.adf` → `2005`)
pub fn extract_year(path: &Path, prefix: &str, file_name: &str) -> Result<String> {
    if path.file_name().and_then(|f| f.to_str()) != Some(file_name) {
        bail!(
            "Population raster {} is not named {}",
            path.display(),
            file_name
        );
    }

    let dir_name = path
        .parent()
        .and_then(|p| p.file_name())
        .and_then(|d| d.to_str())
        .ok_or_else(|| anyhow!("No parent directory for {}", path.display()))?;

    let year = dir_name.strip_prefix(prefix).ok_or_else(|| {
        anyhow!(
            "Directory {} does not start with prefix {}",
            dir_name,
            prefix
        )
    })?;

    if year.is_empty() {
        bail!("Empty year token in {}", path.display());
    }

    Ok(year.to_string())
}
