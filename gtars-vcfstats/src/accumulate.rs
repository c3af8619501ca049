//! Running count and distribution tables over a stream of records.
//!
//! Accumulation is purely additive: two accumulators built from disjoint parts
//! of a file merge into the same tables a single pass would have produced
//! (up to the order of the observation lists, which the summary sorts anyway).

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;

use crate::SummaryOptions;
use crate::errors::{Result, VcfStatsError};
use crate::extract::extract_record;
use crate::models::{Attribute, CategoryKey, ExtractedRecord, GENOME_WIDE, VariantRecord};
use crate::vcf::VariantReader;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAccumulator {
    /// Occurrences per category, keyed with the genotype label attribute.
    pub counts: BTreeMap<CategoryKey, u64>,
    /// Length, quality and support observations per category.
    pub aggregates: BTreeMap<CategoryKey, Vec<f64>>,
    records: u64,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records added, including those of merged accumulators.
    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records == 0
    }

    /// Add one record to both its contig bucket and the genome-wide bucket.
    pub fn add(&mut self, record: &ExtractedRecord) {
        for location in [record.contig.as_str(), GENOME_WIDE] {
            let genotype = Attribute::Genotype(record.genotype_label.clone());
            *self.counts.entry(record.key(location, genotype)).or_insert(0) += 1;

            let observations = [
                (Attribute::Length, record.variant_length as f64),
                (Attribute::Quality, record.quality),
                (Attribute::Support, record.read_support as f64),
            ];
            for (attribute, value) in observations {
                self.aggregates
                    .entry(record.key(location, attribute))
                    .or_default()
                    .push(value);
            }
        }
        self.records += 1;
    }

    /// Key-wise union of two accumulators: counts are summed, observation lists concatenated.
    pub fn merge(&mut self, other: StatsAccumulator) {
        for (key, count) in other.counts {
            *self.counts.entry(key).or_insert(0) += count;
        }
        for (key, values) in other.aggregates {
            self.aggregates.entry(key).or_default().extend(values);
        }
        self.records += other.records;
    }

    /// Extract and accumulate a batch of records in parallel.
    ///
    /// Any extraction error aborts the whole batch. When several records fail,
    /// the error of the earliest one in batch order is returned.
    pub fn from_records(
        records: &[VariantRecord],
        default_variant_type: Option<&str>,
    ) -> Result<Self> {
        records
            .par_iter()
            .enumerate()
            .fold(
                || Ok::<_, (usize, VcfStatsError)>(StatsAccumulator::new()),
                |acc, (index, record)| {
                    let mut acc = acc?;
                    acc.add(&extract_record(record, default_variant_type).map_err(|e| (index, e))?);
                    Ok(acc)
                },
            )
            .reduce(
                || Ok(StatsAccumulator::new()),
                |left, right| match (left, right) {
                    (Ok(mut left), Ok(right)) => {
                        left.merge(right);
                        Ok(left)
                    }
                    (Err(left), Err(right)) => Err(if right.0 < left.0 { right } else { left }),
                    (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
                },
            )
            .map_err(|(_, e)| e)
    }
}

/// Accumulate statistics over a record stream, `batch_size` records at a time.
pub fn collect_statistics<I>(
    records: I,
    default_variant_type: Option<&str>,
    batch_size: usize,
) -> Result<StatsAccumulator>
where
    I: Iterator<Item = Result<VariantRecord>>,
{
    let batch_size = batch_size.max(1);
    let mut stats = StatsAccumulator::new();
    let mut batch: Vec<VariantRecord> = Vec::with_capacity(batch_size);

    for record in records {
        batch.push(record?);
        if batch.len() == batch_size {
            stats.merge(StatsAccumulator::from_records(&batch, default_variant_type)?);
            debug!("Accumulated {} records", stats.records());
            batch.clear();
        }
    }
    if !batch.is_empty() {
        stats.merge(StatsAccumulator::from_records(&batch, default_variant_type)?);
    }

    Ok(stats)
}

/// Read a VCF or BCF file and accumulate its statistics.
///
/// `options.threads` limits the worker pool used for a batch; `None` uses the
/// global rayon pool.
pub fn collect_vcf_statistics(vcf_path: &Path, options: &SummaryOptions) -> Result<StatsAccumulator> {
    // the reader is not Send, so it is opened on the thread that drives the batches
    let run = || {
        let reader = VariantReader::from_path(vcf_path)?;
        collect_statistics(
            reader,
            options.default_variant_type.as_deref(),
            options.batch_size,
        )
    };

    let stats = match options.threads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| VcfStatsError::ThreadPool(e.to_string()))?;
            pool.install(run)?
        }
        None => run()?,
    };

    info!(
        "Read {} records from {}",
        stats.records(),
        vcf_path.display()
    );
    Ok(stats)
}
