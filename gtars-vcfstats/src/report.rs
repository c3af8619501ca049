//! Tab-separated output of the summary table.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::consts::STATS_TABLE_HEADER;
use crate::errors::Result;
use crate::models::SummaryRow;

fn create_output(output: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(output)?))
}

/// Write the comment line, header and rows to any writer.
pub fn write_table<W: Write>(writer: &mut W, source_name: &str, rows: &[SummaryRow]) -> Result<()> {
    writeln!(writer, "# {}", source_name)?;
    writeln!(writer, "{}", STATS_TABLE_HEADER.join("\t"))?;
    for row in rows {
        writeln!(writer, "{}", row.to_tsv_line())?;
    }
    Ok(())
}

/// Write the header-only table for an input without records.
pub fn write_empty<W: Write>(writer: &mut W, source_name: &str) -> Result<()> {
    writeln!(writer, "# {} - HAS NO RECORDS", source_name)?;
    writeln!(writer, "{}", STATS_TABLE_HEADER.join("\t"))?;
    Ok(())
}

/// Write the sorted summary table to `output`, creating parent directories as needed.
pub fn write_summary_table(output: &Path, source_name: &str, rows: &[SummaryRow]) -> Result<()> {
    let mut writer = create_output(output)?;
    write_table(&mut writer, source_name, rows)?;
    writer.flush()?;
    info!("Wrote {} rows to {}", rows.len(), output.display());
    Ok(())
}

/// Write the table of an input that has no records.
pub fn write_empty_table(output: &Path, source_name: &str) -> Result<()> {
    warn!("VCF is empty: {}", source_name);
    warn!("Creating empty output file");
    let mut writer = create_output(output)?;
    write_empty(&mut writer, source_name)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatValue;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::tempdir;

    #[rstest]
    fn test_write_table() {
        let rows = vec![SummaryRow {
            location: "genome".to_string(),
            filter_status: "PASS".to_string(),
            call_type: "PRECISE".to_string(),
            variant_type: "DEL".to_string(),
            attribute: "quality".to_string(),
            statistic: "mean".to_string(),
            value: StatValue::Float(12.5),
        }];
        let mut buf: Vec<u8> = Vec::new();
        write_table(&mut buf, "calls.vcf.gz", &rows).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "# calls.vcf.gz\n\
             location\tfilter_status\tcall_type\tvariant_type\tattribute\tstatistic\tvalue\n\
             genome\tPASS\tPRECISE\tDEL\tquality\tmean\t12.5\n"
        );
    }

    #[rstest]
    fn test_write_empty_table_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("nested").join("deeper").join("stats.tsv");

        write_empty_table(&output, "empty.vcf").unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            content,
            "# empty.vcf - HAS NO RECORDS\n\
             location\tfilter_status\tcall_type\tvariant_type\tattribute\tstatistic\tvalue\n"
        );
    }
}
