//! Streaming VCF and BCF record readers.
//!
//! Reads a VCF file (plain text or gzipped/bgzf) one data line at a time, or a
//! BCF file one binary record at a time, and decodes the columns the
//! summarizer needs into [`VariantRecord`]s.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use noodles::vcf::variant::io::Write as _;
use noodles::{bcf, vcf};

use crate::errors::{Result, VcfStatsError};
use crate::models::{InfoValue, SampleCall, VariantRecord};

const BCF_MAGIC: &[u8] = b"BCF";
const MIN_COLUMNS: usize = 8;
const FORMAT_COLUMN: usize = 8;

/// Open a VCF or BCF file, using the extension to decide on gzip/bgzf decompression.
pub fn open_vcf(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let capacity = 256 * 1024; // 256KB buffer for large VCF files
    let compressed = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("gz") | Some("bgz") | Some("bcf")
    );
    if compressed {
        Ok(Box::new(BufReader::with_capacity(
            capacity,
            flate2::read::MultiGzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(capacity, file)))
    }
}

/// Iterator over the data records of a VCF stream.
///
/// Construction consumes the meta-information lines and the `#CHROM` header,
/// so the sample names are known before the first record is decoded.
pub struct VcfReader<R: BufRead> {
    reader: R,
    line_buf: String,
    line_number: usize,
    sample_names: Vec<String>,
}

impl<R: BufRead> VcfReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        if reader.fill_buf()?.starts_with(BCF_MAGIC) {
            return Err(VcfStatsError::UnsupportedInput(
                "BCF stream given to the text VCF reader, use VariantReader".to_string(),
            ));
        }

        let mut line_buf = String::new();
        let mut line_number = 0;
        loop {
            line_buf.clear();
            if reader.read_line(&mut line_buf)? == 0 {
                return Err(VcfStatsError::MalformedRecord(
                    "no #CHROM header line found".to_string(),
                ));
            }
            line_number += 1;

            let line = line_buf.trim_end_matches('\n').trim_end_matches('\r');
            if line.starts_with("##") {
                continue;
            }
            if line.starts_with("#CHROM") {
                let sample_names = line
                    .split('\t')
                    .skip(FORMAT_COLUMN + 1)
                    .map(|s| s.to_string())
                    .collect();
                return Ok(VcfReader {
                    reader,
                    line_buf,
                    line_number,
                    sample_names,
                });
            }
            return Err(VcfStatsError::MalformedRecord(format!(
                "line {}: expected a #CHROM header line before the data records",
                line_number
            )));
        }
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line_number += 1;

            let line = self.line_buf.trim_end_matches('\n').trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some(parse_record_line(line, self.line_number, &self.sample_names));
        }
    }
}

/// Iterator over the records of a BCF stream.
///
/// Each binary record is rendered as a VCF data line through the header and
/// decoded by [`parse_record_line`]. Record numbers (1-based) stand in for
/// line numbers in diagnostics.
pub struct BcfReader<R: BufRead> {
    reader: bcf::io::Reader<R>,
    header: vcf::Header,
    record: bcf::Record,
    line: vcf::io::Writer<Vec<u8>>,
    record_number: usize,
    sample_names: Vec<String>,
}

impl<R: BufRead> BcfReader<R> {
    /// `reader` yields the decompressed stream, starting at the BCF magic.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = bcf::io::Reader::from(reader);
        let header = reader
            .read_header()
            .map_err(|e| VcfStatsError::MalformedRecord(format!("invalid BCF header: {}", e)))?;
        let sample_names = header.sample_names().iter().cloned().collect();

        Ok(BcfReader {
            reader,
            header,
            record: bcf::Record::default(),
            line: vcf::io::Writer::new(Vec::new()),
            record_number: 0,
            sample_names,
        })
    }

    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }
}

impl<R: BufRead> Iterator for BcfReader<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(e.into())),
        }
        self.record_number += 1;

        self.line.get_mut().clear();
        if let Err(e) = self.line.write_variant_record(&self.header, &self.record) {
            return Some(Err(malformed(
                self.record_number,
                format!("undecodable BCF record: {}", e),
            )));
        }
        let line = match std::str::from_utf8(self.line.get_ref()) {
            Ok(line) => line.trim_end_matches('\n'),
            Err(e) => return Some(Err(malformed(self.record_number, e.to_string()))),
        };
        Some(parse_record_line(line, self.record_number, &self.sample_names))
    }
}

/// A VCF or BCF record stream, chosen by the leading magic bytes.
pub enum VariantReader<R: BufRead> {
    Vcf(VcfReader<R>),
    Bcf(BcfReader<R>),
}

impl VariantReader<Box<dyn BufRead>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        VariantReader::new(open_vcf(path)?)
    }
}

impl<R: BufRead> VariantReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        if reader.fill_buf()?.starts_with(BCF_MAGIC) {
            Ok(VariantReader::Bcf(BcfReader::new(reader)?))
        } else {
            Ok(VariantReader::Vcf(VcfReader::new(reader)?))
        }
    }

    pub fn sample_names(&self) -> &[String] {
        match self {
            VariantReader::Vcf(reader) => reader.sample_names(),
            VariantReader::Bcf(reader) => reader.sample_names(),
        }
    }
}

impl<R: BufRead> Iterator for VariantReader<R> {
    type Item = Result<VariantRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            VariantReader::Vcf(reader) => reader.next(),
            VariantReader::Bcf(reader) => reader.next(),
        }
    }
}

fn malformed(line_number: usize, msg: impl AsRef<str>) -> VcfStatsError {
    VcfStatsError::MalformedRecord(format!("line {}: {}", line_number, msg.as_ref()))
}

/// Decode one tab-separated data line.
pub fn parse_record_line(
    line: &str,
    line_number: usize,
    sample_names: &[String],
) -> Result<VariantRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(malformed(
            line_number,
            format!("expected at least {} columns, found {}", MIN_COLUMNS, fields.len()),
        ));
    }

    let pos = fields[1]
        .parse::<u64>()
        .map_err(|_| malformed(line_number, format!("invalid POS '{}'", fields[1])))?;

    let alt_alleles = match fields[4] {
        "." | "" => vec![],
        alts => alts.split(',').map(|s| s.to_string()).collect(),
    };

    let quality = match fields[5] {
        "." | "" => None,
        q => Some(
            q.parse::<f64>()
                .map_err(|_| malformed(line_number, format!("invalid QUAL '{}'", q)))?,
        ),
    };

    let filters = match fields[6] {
        "." | "" => vec![],
        f => f.split(';').map(|s| s.to_string()).collect(),
    };

    let info = parse_info(fields[7]);

    let samples = if fields.len() > FORMAT_COLUMN + 1 {
        let format_keys: Vec<&str> = fields[FORMAT_COLUMN].split(':').collect();
        fields[FORMAT_COLUMN + 1..]
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let name = sample_names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("sample{}", i + 1));
                parse_sample(name, &format_keys, column, line_number)
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![]
    };

    Ok(VariantRecord {
        line_number,
        contig: fields[0].to_string(),
        pos,
        id: fields[2].to_string(),
        ref_allele: fields[3].to_string(),
        alt_alleles,
        quality,
        filters,
        info,
        samples,
    })
}

fn parse_info(column: &str) -> Vec<(String, InfoValue)> {
    if column == "." {
        return vec![];
    }
    column
        .split(';')
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => (key.to_string(), InfoValue::Value(value.to_string())),
            None => (entry.to_string(), InfoValue::Flag),
        })
        .collect()
}

fn parse_sample(
    name: String,
    format_keys: &[&str],
    column: &str,
    line_number: usize,
) -> Result<SampleCall> {
    let mut sample = SampleCall {
        name,
        ..Default::default()
    };

    // trailing fields may be dropped, zip stops at the shorter side
    for (key, value) in format_keys.iter().zip(column.split(':')) {
        match *key {
            "GT" => sample.genotype = parse_genotype(value, line_number)?,
            "DP" => {
                sample.read_depth = match value {
                    "." | "" => None,
                    dp => Some(
                        dp.parse::<i64>()
                            .map_err(|_| malformed(line_number, format!("invalid DP '{}'", dp)))?,
                    ),
                }
            }
            _ => {}
        }
    }

    Ok(sample)
}

fn parse_genotype(value: &str, line_number: usize) -> Result<Vec<Option<u32>>> {
    value
        .split(['/', '|'])
        .map(|allele| match allele {
            "." | "" => Ok(None),
            a => a
                .parse::<u32>()
                .map(Some)
                .map_err(|_| malformed(line_number, format!("invalid GT allele '{}'", a))),
        })
        .collect()
}
