//! Data types shared by the extraction, accumulation and reporting stages.

use std::fmt;

/// Location value of the bucket that collects contributions from every contig.
pub const GENOME_WIDE: &str = "genome";

/// Value of a single INFO entry. Bare keys (e.g. `PRECISE`) are flags;
/// everything else keeps its raw text, which may be a comma-separated list.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Flag,
    Value(String),
}

impl InfoValue {
    /// Comma-separated items of the value. A flag has no items.
    pub fn items(&self) -> Vec<&str> {
        match self {
            InfoValue::Flag => vec![],
            InfoValue::Value(raw) => raw.split(',').collect(),
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Flag => write!(f, "true"),
            InfoValue::Value(raw) => write!(f, "{}", raw),
        }
    }
}

/// Per-sample values the summarizer needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleCall {
    pub name: String,
    /// Genotype alleles in call order; `None` marks a missing (`.`) allele.
    /// Empty when the record carries no GT.
    pub genotype: Vec<Option<u32>>,
    /// FORMAT/DP, when present and not missing.
    pub read_depth: Option<i64>,
}

/// One decoded variant record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantRecord {
    /// 1-based line number in the source file, used for diagnostics.
    pub line_number: usize,
    pub contig: String,
    pub pos: u64,
    pub id: String,
    pub ref_allele: String,
    pub alt_alleles: Vec<String>,
    pub quality: Option<f64>,
    pub filters: Vec<String>,
    /// INFO entries in file order.
    pub info: Vec<(String, InfoValue)>,
    pub samples: Vec<SampleCall>,
}

impl VariantRecord {
    pub fn info(&self, key: &str) -> Option<&InfoValue> {
        self.info.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn has_info(&self, key: &str) -> bool {
        self.info(key).is_some()
    }

    /// INFO entries rendered as `{KEY: value, ...}` for error reports.
    pub fn info_summary(&self) -> String {
        let entries: Vec<String> = self
            .info
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

impl fmt::Display for VariantRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alts = if self.alt_alleles.is_empty() {
            ".".to_string()
        } else {
            self.alt_alleles.join(",")
        };
        let qual = self
            .quality
            .map(|q| q.to_string())
            .unwrap_or_else(|| ".".to_string());
        let filters = if self.filters.is_empty() {
            ".".to_string()
        } else {
            self.filters.join(";")
        };
        let info = if self.info.is_empty() {
            ".".to_string()
        } else {
            self.info
                .iter()
                .map(|(k, v)| match v {
                    InfoValue::Flag => k.clone(),
                    InfoValue::Value(raw) => format!("{}={}", k, raw),
                })
                .collect::<Vec<_>>()
                .join(";")
        };
        write!(
            f,
            "line {}: {}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.line_number, self.contig, self.pos, self.id, self.ref_allele, alts, qual, filters, info
        )
    }
}

/// How the breakpoints of a call were determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallType {
    Precise,
    Imprecise,
    Unspecified,
}

impl CallType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallType::Precise => "PRECISE",
            CallType::Imprecise => "IMPRECISE",
            CallType::Unspecified => "UNSPECIFIED",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The facet measured for a category: a genotype label for counts,
/// or one of the numeric observations for distributions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Genotype(String),
    Length,
    Support,
    Quality,
}

impl Attribute {
    pub fn label(&self) -> &str {
        match self {
            Attribute::Genotype(label) => label.as_str(),
            Attribute::Length => "length",
            Attribute::Support => "support",
            Attribute::Quality => "quality",
        }
    }

    /// Length and support are whole numbers of bases/reads; they are reported as integers.
    pub fn is_integral(&self) -> bool {
        matches!(self, Attribute::Length | Attribute::Support)
    }
}

/// Composite grouping key for counts and distributions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryKey {
    pub location: String,
    pub filter_status: String,
    pub call_type: CallType,
    pub variant_type: String,
    pub attribute: Attribute,
}

/// Normalized fields pulled out of one [`VariantRecord`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub contig: String,
    pub filter_status: String,
    pub call_type: CallType,
    pub variant_type: String,
    /// `-1` when the alternate alleles disagree on the length.
    pub variant_length: i64,
    /// `-1.0` when the record has no quality.
    pub quality: f64,
    /// `-1` when no support source and no sample depth is available.
    pub read_support: i64,
    pub genotype_label: String,
}

impl ExtractedRecord {
    /// Key for this record under `location` with the given attribute.
    pub fn key(&self, location: &str, attribute: Attribute) -> CategoryKey {
        CategoryKey {
            location: location.to_string(),
            filter_status: self.filter_status.clone(),
            call_type: self.call_type,
            variant_type: self.variant_type.clone(),
            attribute,
        }
    }
}

/// A reported value: integers for counts, lengths and support, floats otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Integer(v) => write!(f, "{}", v),
            StatValue::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

/// Shortest round-trip float text with a signed, two-digit exponent
/// (`30.0`, `1e+16`, `1.5e-05`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    // Debug keeps the trailing `.0` on whole floats and switches to
    // exponent notation outside [1e-4, 1e16)
    let text = format!("{:?}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => text,
    }
}

/// One line of the final table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub location: String,
    pub filter_status: String,
    pub call_type: String,
    pub variant_type: String,
    pub attribute: String,
    pub statistic: String,
    pub value: StatValue,
}

impl SummaryRow {
    pub fn from_key(key: &CategoryKey, statistic: &str, value: StatValue) -> Self {
        SummaryRow {
            location: key.location.clone(),
            filter_status: key.filter_status.clone(),
            call_type: key.call_type.as_str().to_string(),
            variant_type: key.variant_type.clone(),
            attribute: key.attribute.label().to_string(),
            statistic: statistic.to_string(),
            value,
        }
    }

    /// Tab-separated fields in report column order.
    pub fn to_tsv_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.location,
            self.filter_status,
            self.call_type,
            self.variant_type,
            self.attribute,
            self.statistic,
            self.value
        )
    }
}
