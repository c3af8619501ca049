use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use gtars_vcfstats::{PercentileMethod, SummaryOptions, SummaryOutcome, summarize_vcf};

pub fn run_vcfstats(matches: &ArgMatches) -> Result<()> {
    let vcf = matches
        .get_one::<String>("vcf")
        .expect("A path to a VCF file is required.");

    let output = matches
        .get_one::<String>("output")
        .expect("A path to the output table is required.");

    let percentile_method = matches
        .get_one::<String>("percentile-method")
        .map(|m| m.parse::<PercentileMethod>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let options = SummaryOptions {
        default_variant_type: matches.get_one::<String>("variant-type").cloned(),
        percentile_method,
        threads: matches.get_one::<usize>("threads").copied(),
        ..Default::default()
    };

    let vcf = Path::new(vcf);
    let output = Path::new(output);
    if !vcf.is_file() {
        bail!("VCF file not found: {}", vcf.display());
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}")?);
    spinner.set_message(format!("Summarizing {}", vcf.display()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = summarize_vcf(vcf, output, &options)
        .with_context(|| format!("Failed to summarize VCF: {}", vcf.display()));
    spinner.finish_and_clear();

    match outcome? {
        SummaryOutcome::Written { records, rows } => {
            info!(
                "Summarized {} records into {} rows: {}",
                records,
                rows,
                output.display()
            );
        }
        SummaryOutcome::Empty => {
            info!("No records found, wrote empty table: {}", output.display());
        }
    }

    Ok(())
}
