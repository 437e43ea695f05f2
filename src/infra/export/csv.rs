use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

pub fn write_csv<W: Write>(writer: W, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(headers)
        .context("failed to write csv header")?;
    for row in rows {
        writer.write_record(row).context("failed to write csv row")?;
    }
    writer.flush().context("failed to flush csv")?;
    Ok(())
}

pub fn export_csv_file(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create csv: {}", path.display()))?;
    write_csv(file, headers, rows)
}
