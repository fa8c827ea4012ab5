//! Export CSV des populations rurales et urbaines

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use zonal::ResultRecord;

/// En-tête écrit une seule fois, à la création du fichier
pub const HEADER: [&str; 5] = ["id", "name", "year", "rural_pop", "urban_pop"];

/// Écrivain CSV incrémental (une série de lignes par année)
pub struct ResultWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows_written: usize,
}

impl ResultWriter {
    /// Crée (ou tronque) le fichier et écrit l'en-tête
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        writer
            .write_record(HEADER)
            .with_context(|| format!("Failed to write header to {}", path.display()))?;
        writer.flush()?;

        debug!(path = %path.display(), "CSV output created");

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows_written: 0,
        })
    }

    /// Ajoute les lignes dans l'ordre donné puis vide le tampon
    pub fn write_records(&mut self, records: &[ResultRecord]) -> Result<()> {
        for record in records {
            let rural = format_sum(record.rural_pop);
            let urban = format_sum(record.urban_pop);
            self.writer
                .write_record([
                    record.id.as_str(),
                    record.name.as_str(),
                    record.year.as_str(),
                    rural.as_str(),
                    urban.as_str(),
                ])
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;

        self.rows_written += records.len();
        Ok(())
    }

    /// Termine l'écriture, retourne le nombre de lignes de données
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows_written)
    }
}

/// Somme vide pour une zone sans pixel, sinon affichage court du f64
pub fn format_sum(sum: Option<f64>) -> String {
    match sum {
        Some(value) => value.to_string(),
        None => String::new(),
    }
}
