//! Pulls the normalized summary fields out of a single [`VariantRecord`].

use std::collections::BTreeSet;

use crate::errors::{Result, VcfStatsError};
use crate::models::{CallType, ExtractedRecord, InfoValue, VariantRecord};

/// Sentinel for values that could not be determined.
pub const MISSING_VALUE: i64 = -1;

type SupportExtractor = fn(&VariantRecord, &InfoValue) -> Result<i64>;

/// INFO keys that report read support, highest priority first. The first key
/// present on a record decides its support; the sample depth is the fallback.
const READ_SUPPORT_SOURCES: &[(&str, SupportExtractor)] = &[
    ("SUPPORT", single_integer as SupportExtractor),
    ("RE", single_integer as SupportExtractor),
    ("RNAMES", list_length as SupportExtractor),
];

fn malformed(record: &VariantRecord, msg: impl AsRef<str>) -> VcfStatsError {
    VcfStatsError::MalformedRecord(format!(
        "{}\n{}\n{}",
        msg.as_ref(),
        record,
        record.info_summary()
    ))
}

fn single_integer(record: &VariantRecord, value: &InfoValue) -> Result<i64> {
    match value.items().as_slice() {
        [item] => item
            .trim()
            .parse::<i64>()
            .map_err(|_| malformed(record, format!("expected an integer INFO value, found '{}'", item))),
        items => Err(malformed(
            record,
            format!("expected a single integer INFO value, found {} values", items.len()),
        )),
    }
}

fn list_length(_record: &VariantRecord, value: &InfoValue) -> Result<i64> {
    Ok(value.items().len() as i64)
}

pub fn call_type(record: &VariantRecord) -> CallType {
    if record.has_info("PRECISE") {
        CallType::Precise
    } else if record.has_info("IMPRECISE") {
        CallType::Imprecise
    } else {
        CallType::Unspecified
    }
}

/// Read support from the INFO sources only; [`MISSING_VALUE`] if none is present.
pub fn info_read_support(record: &VariantRecord) -> Result<i64> {
    for (key, extractor) in READ_SUPPORT_SOURCES {
        if let Some(value) = record.info(key) {
            return extractor(record, value);
        }
    }
    Ok(MISSING_VALUE)
}

pub fn variant_type(record: &VariantRecord, default_variant_type: Option<&str>) -> Result<String> {
    match (record.info("SVTYPE"), default_variant_type) {
        (Some(InfoValue::Value(svtype)), _) => Ok(svtype.clone()),
        (Some(InfoValue::Flag), _) => Err(malformed(record, "SVTYPE is present but has no value")),
        (None, Some(default)) => Ok(default.to_string()),
        (None, None) => Err(VcfStatsError::Configuration(format!(
            "No variant type in INFO field (key: SVTYPE) and no variant type set ({})",
            record
        ))),
    }
}

/// Length from SVLEN, or inferred from the REF/ALT length difference.
///
/// Returns [`MISSING_VALUE`] when the alternates imply different lengths.
pub fn variant_length(record: &VariantRecord) -> Result<i64> {
    if let Some(svlen) = record.info("SVLEN") {
        return Ok(single_integer(record, svlen)?.abs());
    }

    let ref_length = record.ref_allele.len() as i64;
    if ref_length <= 0 {
        return Err(malformed(record, "reference allele has non-positive length"));
    }
    if record.alt_alleles.is_empty() {
        return Err(malformed(
            record,
            "no SVLEN and no alternate allele to infer the variant length from",
        ));
    }

    let diff_lengths: BTreeSet<i64> = record
        .alt_alleles
        .iter()
        .map(|alt| (ref_length - alt.len() as i64).abs())
        .collect();

    match diff_lengths.len() {
        // e.g. T --> G,A
        1 => Ok(diff_lengths.into_iter().next().map_or(1, |d| d.max(1))),
        _ => Ok(MISSING_VALUE),
    }
}

fn genotype_label(alleles: &[Option<u32>]) -> String {
    let render = |idx: usize| {
        alleles
            .get(idx)
            .copied()
            .flatten()
            .map_or_else(|| ".".to_string(), |a| a.to_string())
    };
    format!("GT:{}/{}", render(0), render(1))
}

/// Extract the summary fields of one record.
///
/// `default_variant_type` is used when the record carries no SVTYPE.
pub fn extract_record(
    record: &VariantRecord,
    default_variant_type: Option<&str>,
) -> Result<ExtractedRecord> {
    let filter_status = record.filters.join("|");
    let call_type = call_type(record);
    let mut read_support = info_read_support(record)?;
    let variant_type = variant_type(record, default_variant_type)?;
    let variant_length = variant_length(record)?;
    let quality = record.quality.unwrap_or(MISSING_VALUE as f64);

    let sample = match record.samples.as_slice() {
        [sample] => sample,
        samples => {
            let names: Vec<&str> = samples.iter().map(|s| s.name.as_str()).collect();
            return Err(VcfStatsError::UnsupportedInput(format!(
                "Multi-sample VCFs are not supported, exactly one sample is required: {:?} ({})",
                names, record
            )));
        }
    };

    if read_support == MISSING_VALUE {
        read_support = sample.read_depth.unwrap_or(MISSING_VALUE);
    }

    Ok(ExtractedRecord {
        contig: record.contig.clone(),
        filter_status,
        call_type,
        variant_type,
        variant_length,
        quality,
        read_support,
        genotype_label: genotype_label(&sample.genotype),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SampleCall;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn info(entries: &[(&str, Option<&str>)]) -> Vec<(String, InfoValue)> {
        entries
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Some(raw) => InfoValue::Value(raw.to_string()),
                    None => InfoValue::Flag,
                };
                (k.to_string(), value)
            })
            .collect()
    }

    #[fixture]
    fn record() -> VariantRecord {
        VariantRecord {
            line_number: 10,
            contig: "chr1".to_string(),
            pos: 1000,
            id: ".".to_string(),
            ref_allele: "A".to_string(),
            alt_alleles: vec!["T".to_string()],
            quality: Some(30.0),
            filters: vec!["PASS".to_string()],
            info: info(&[("SVTYPE", Some("SNV")), ("SVLEN", Some("1"))]),
            samples: vec![SampleCall {
                name: "s1".to_string(),
                genotype: vec![Some(0), Some(1)],
                read_depth: Some(10),
            }],
        }
    }

    #[rstest]
    fn test_extract_single_snv(record: VariantRecord) {
        let extracted = extract_record(&record, None).unwrap();
        assert_eq!(
            extracted,
            ExtractedRecord {
                contig: "chr1".to_string(),
                filter_status: "PASS".to_string(),
                call_type: CallType::Unspecified,
                variant_type: "SNV".to_string(),
                variant_length: 1,
                quality: 30.0,
                read_support: 10,
                genotype_label: "GT:0/1".to_string(),
            }
        );
    }

    #[rstest]
    #[case(vec![], "")]
    #[case(vec!["PASS"], "PASS")]
    #[case(vec!["q10", "lowDP"], "q10|lowDP")]
    fn test_filter_status(
        mut record: VariantRecord,
        #[case] filters: Vec<&str>,
        #[case] expected: &str,
    ) {
        record.filters = filters.into_iter().map(String::from).collect();
        assert_eq!(extract_record(&record, None).unwrap().filter_status, expected);
    }

    #[rstest]
    #[case(&[("PRECISE", None), ("IMPRECISE", None)], CallType::Precise)]
    #[case(&[("IMPRECISE", None)], CallType::Imprecise)]
    #[case(&[], CallType::Unspecified)]
    fn test_call_type(
        mut record: VariantRecord,
        #[case] entries: &[(&str, Option<&str>)],
        #[case] expected: CallType,
    ) {
        record.info = info(entries);
        assert_eq!(call_type(&record), expected);
    }

    #[rstest]
    #[case(&[("SUPPORT", Some("7")), ("RE", Some("5")), ("RNAMES", Some("a,b"))], 7)]
    #[case(&[("RE", Some("5")), ("RNAMES", Some("a,b"))], 5)]
    #[case(&[("RNAMES", Some("a,b,c"))], 3)]
    #[case(&[], 10)]
    fn test_read_support_priority(
        mut record: VariantRecord,
        #[case] entries: &[(&str, Option<&str>)],
        #[case] expected: i64,
    ) {
        record.info = info(entries);
        let extracted = extract_record(&record, Some("SNV")).unwrap();
        assert_eq!(extracted.read_support, expected);
    }

    #[rstest]
    fn test_read_support_without_depth_keeps_sentinel(mut record: VariantRecord) {
        record.samples[0].read_depth = None;
        let extracted = extract_record(&record, None).unwrap();
        assert_eq!(extracted.read_support, MISSING_VALUE);
    }

    #[rstest]
    fn test_variant_type_override(mut record: VariantRecord) {
        record.info = vec![];
        assert_eq!(variant_type(&record, Some("INS")).unwrap(), "INS");

        let err = extract_record(&record, None).unwrap_err();
        assert!(matches!(err, VcfStatsError::Configuration(_)));
    }

    #[rstest]
    fn test_info_svtype_wins_over_override(record: VariantRecord) {
        assert_eq!(variant_type(&record, Some("DEL")).unwrap(), "SNV");
    }

    #[rstest]
    #[case(Some("-300"), "N", vec!["<DEL>"], 300)]
    #[case(None, "T", vec!["G", "A"], 1)]
    #[case(None, "TAAA", vec!["T"], 3)]
    #[case(None, "T", vec!["TAA", "TAAAA"], -1)]
    #[case(None, "ACGT", vec!["TGCA"], 1)]
    fn test_variant_length(
        mut record: VariantRecord,
        #[case] svlen: Option<&str>,
        #[case] ref_allele: &str,
        #[case] alts: Vec<&str>,
        #[case] expected: i64,
    ) {
        record.info = match svlen {
            Some(len) => info(&[("SVLEN", Some(len))]),
            None => vec![],
        };
        record.ref_allele = ref_allele.to_string();
        record.alt_alleles = alts.into_iter().map(String::from).collect();
        assert_eq!(variant_length(&record).unwrap(), expected);
    }

    #[rstest]
    fn test_empty_reference_is_malformed(mut record: VariantRecord) {
        record.info = vec![];
        record.ref_allele = String::new();
        let err = variant_length(&record).unwrap_err();
        match err {
            VcfStatsError::MalformedRecord(msg) => {
                assert!(msg.contains("non-positive length"));
                assert!(msg.contains("line 10"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[rstest]
    fn test_multi_valued_svlen_is_malformed(mut record: VariantRecord) {
        record.info = info(&[("SVLEN", Some("-3,-5"))]);
        assert!(matches!(
            variant_length(&record),
            Err(VcfStatsError::MalformedRecord(_))
        ));
    }

    #[rstest]
    #[case(&[("SVTYPE", Some("DEL"))], vec![], "no SVLEN and no alternate allele")]
    #[case(&[("SVTYPE", None), ("SVLEN", Some("1"))], vec!["T"], "SVTYPE is present but has no value")]
    #[case(&[("SVTYPE", Some("INS")), ("SVLEN", Some("5")), ("SUPPORT", Some("x"))], vec!["T"], "found 'x'")]
    #[case(&[("SVTYPE", Some("INS")), ("SVLEN", Some("5")), ("RE", Some("many"))], vec!["T"], "found 'many'")]
    #[case(&[("SVTYPE", Some("INS")), ("SVLEN", Some("5")), ("RE", Some("2,3"))], vec!["T"], "found 2 values")]
    fn test_malformed_info(
        mut record: VariantRecord,
        #[case] entries: &[(&str, Option<&str>)],
        #[case] alts: Vec<&str>,
        #[case] expected: &str,
    ) {
        record.info = info(entries);
        record.alt_alleles = alts.into_iter().map(String::from).collect();
        match extract_record(&record, Some("SNV")) {
            Err(VcfStatsError::MalformedRecord(msg)) => {
                assert!(msg.contains(expected), "{}", msg);
                // the offending record follows the reason
                assert!(msg.contains("line 10: chr1\t1000"), "{}", msg);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[rstest]
    fn test_missing_quality(mut record: VariantRecord) {
        record.quality = None;
        assert_eq!(extract_record(&record, None).unwrap().quality, -1.0);
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    fn test_sample_count_must_be_one(mut record: VariantRecord, #[case] n_samples: usize) {
        let sample = record.samples[0].clone();
        record.samples = vec![sample; n_samples];
        assert!(matches!(
            extract_record(&record, None),
            Err(VcfStatsError::UnsupportedInput(_))
        ));
    }

    #[rstest]
    #[case(vec![Some(0), Some(1)], "GT:0/1")]
    #[case(vec![Some(1), Some(1)], "GT:1/1")]
    #[case(vec![None, None], "GT:./.")]
    #[case(vec![Some(1)], "GT:1/.")]
    #[case(vec![], "GT:./.")]
    fn test_genotype_label(#[case] alleles: Vec<Option<u32>>, #[case] expected: &str) {
        assert_eq!(genotype_label(&alleles), expected);
    }
}
