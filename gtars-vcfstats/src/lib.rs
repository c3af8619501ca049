//! Summary statistics for variant call files.
//!
//! This crate scans a single-sample VCF or BCF file and reports, per contig and genome-wide,
//! for every combination of filter status, call precision and variant type:
//!
//! - Genotype counts
//! - Mean and percentiles of variant length, call quality and read support
//!
//! The result is a deterministically ordered table, written as TSV.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use gtars_vcfstats::{SummaryOptions, summarize_vcf};
//!
//! let options = SummaryOptions {
//!     default_variant_type: Some("SNV".to_string()),
//!     ..Default::default()
//! };
//! summarize_vcf(Path::new("calls.vcf.gz"), Path::new("stats/calls.tsv"), &options).unwrap();
//! ```

pub mod accumulate;
pub mod errors;
pub mod extract;
pub mod models;
pub mod report;
pub mod sorter;
pub mod summary;
pub mod vcf;

use std::path::Path;

use crate::accumulate::{DEFAULT_BATCH_SIZE, collect_vcf_statistics};
use crate::report::{write_empty_table, write_summary_table};
use crate::sorter::sort_summary;
use crate::summary::build_summary;

// re-exports
pub use accumulate::StatsAccumulator;
pub use errors::{Result, VcfStatsError};
pub use extract::extract_record;
pub use models::{ExtractedRecord, SummaryRow, VariantRecord};
pub use sorter::TableSorter;
pub use summary::PercentileMethod;

pub mod consts {
    pub const VCFSTATS_CMD: &str = "vcfstats";

    pub const STATS_TABLE_HEADER: [&str; 7] = [
        "location",
        "filter_status",
        "call_type",
        "variant_type",
        "attribute",
        "statistic",
        "value",
    ];
}

/// Run configuration for [`summarize_vcf`].
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Variant type for records without an SVTYPE INFO entry.
    pub default_variant_type: Option<String>,
    pub percentile_method: PercentileMethod,
    /// Records extracted per parallel batch.
    pub batch_size: usize,
    /// Worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions {
            default_variant_type: None,
            percentile_method: PercentileMethod::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            threads: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOutcome {
    Written { records: u64, rows: usize },
    /// The input had no records; a header-only table was written.
    Empty,
}

/// Summarize `vcf` into a TSV table at `output`.
///
/// The whole input is read before anything is written, so a failing record
/// leaves no output behind.
pub fn summarize_vcf(vcf: &Path, output: &Path, options: &SummaryOptions) -> Result<SummaryOutcome> {
    let stats = collect_vcf_statistics(vcf, options)?;

    let source_name = vcf
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| vcf.display().to_string());

    if stats.is_empty() {
        write_empty_table(output, &source_name)?;
        return Ok(SummaryOutcome::Empty);
    }

    let rows = sort_summary(build_summary(&stats, options.percentile_method));
    write_summary_table(output, &source_name, &rows)?;

    Ok(SummaryOutcome::Written {
        records: stats.records(),
        rows: rows.len(),
    })
}
