//! CSV export for paired Monte Carlo samples.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::monte_carlo::Samples;

/// Column header for the paired samples export.
const HEADER: &str = "replication,adaptive_energy,adaptive_budget,adp_energy,adp_budget";

/// Exports paired evaluation samples to a CSV file at the given path.
///
/// Row `i` holds replication `i` of both policies, which faced the same
/// price path. Produces deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if the batches differ in length or if file
/// creation or writing fails.
pub fn export_csv(adaptive: &Samples, adp: &Samples, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(adaptive, adp, buf)
}

/// Writes paired evaluation samples as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if the batches differ in length or writing fails.
pub fn write_csv(adaptive: &Samples, adp: &Samples, writer: impl Write) -> io::Result<()> {
    if adaptive.len() != adp.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "sample batches differ in length: {} vs {}",
                adaptive.len(),
                adp.len()
            ),
        ));
    }

    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER.split(','))?;

    for (i, ((a_energy, a_budget), (b_energy, b_budget))) in
        adaptive.iter().zip(adp.iter()).enumerate()
    {
        wtr.write_record(&[
            i.to_string(),
            format!("{a_energy:.2}"),
            format!("{a_budget:.4}"),
            format!("{b_energy:.2}"),
            format!("{b_budget:.4}"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
