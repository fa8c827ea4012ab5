//! Rapport d'exécution
//!
//! Totaux par année collectés pendant le traitement, affichés en console et
//! sauvegardables en JSON.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

/// Statut global de l'exécution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunStatus {
    /// Au moins une année traitée
    Success,
    /// Aucun raster de population trouvé (en-tête seul)
    Empty,
}

/// Totaux d'une année
#[derive(Debug, Clone, Serialize)]
pub struct YearSummary {
    pub year: String,
    /// Chemin du raster de population
    pub raster: String,
    /// Nombre de zones écrites
    pub zones: usize,
    /// Population valide de tout le raster découpé
    pub population_total: f64,
    pub rural_total: f64,
    pub urban_total: f64,
    /// Population sur des pixels ni ruraux ni urbains
    pub unclassified_total: f64,
    /// Zones sans aucun pixel
    pub empty_zones: usize,
}

/// Rapport complet
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub duration_secs: f64,
    pub output: PathBuf,
    /// Lignes de données du CSV, fixé à la fermeture du fichier
    pub rows_written: usize,
    pub years: Vec<YearSummary>,
}

impl RunReport {
    pub fn new(output: &Path) -> Self {
        Self {
            status: RunStatus::Empty,
            duration_secs: 0.0,
            output: output.to_path_buf(),
            rows_written: 0,
            years: Vec::new(),
        }
    }

    /// Enregistre une année traitée
    pub fn record_year(&mut self, summary: YearSummary) {
        self.years.push(summary);
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.years.is_empty() {
            RunStatus::Empty
        } else {
            RunStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RURAL / URBAN POPULATION REPORT");
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Output: {} ({} rows)", self.output.display(), self.rows_written);

        if !self.years.is_empty() {
            println!("\n--- BY YEAR ---");
            for y in &self.years {
                println!(
                    "  {}: total {:.0}, rural {:.0}, urban {:.0}, unclassified {:.0} ({} zones, {} empty)",
                    y.year,
                    y.population_total,
                    y.rural_total,
                    y.urban_total,
                    y.unclassified_total,
                    y.zones,
                    y.empty_zones
                );
            }
        }

        let unclassified: Vec<_> = self
            .years
            .iter()
            .filter(|y| y.unclassified_total > 0.0)
            .collect();
        if !unclassified.is_empty() {
            println!("\n--- WARNINGS ({}) ---", unclassified.len());
            for y in unclassified {
                println!(
                    "  [{}] {:.0} people on no-data land-use pixels (counted in neither column)",
                    y.year, y.unclassified_total
                );
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} years, {} rows written to {}",
            self.years.len(),
            self.rows_written,
            self.output.display()
        )
    }
}
