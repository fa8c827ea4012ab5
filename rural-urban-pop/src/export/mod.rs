//! Écriture des résultats

pub mod csv_writer;

pub use csv_writer::{format_sum, ResultWriter, HEADER};
