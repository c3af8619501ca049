//! Deterministic ordering of the summary table.
//!
//! The most commonly used data goes to the top: genome-wide rows, then
//! autosomes in numeric order, sex chromosomes and mitochondria; PASS calls
//! before filtered ones, and so on for every categorical column. Values
//! without a fixed rank are ordered lexically after the known ones.
//!
//! Ranks are assigned in a build phase over every distinct value of the
//! complete table and only then applied, so a table is never sorted with a
//! partially populated registry.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::SummaryRow;
use crate::summary::{COUNT_LABEL, MEAN_LABEL, PERCENTILES};

pub type Rank = u64;

const LOCATION_ORDER: &[(&str, Rank)] = &[
    ("wg", 0),
    ("genome", 0),
    ("chrX", 23),
    ("X", 23),
    ("chrY", 24),
    ("Y", 24),
    ("chrM", 25),
    ("chrMT", 25),
    ("M", 25),
    ("MT", 25),
];

const FILTER_ORDER: &[(&str, Rank)] = &[("PASS", 0), ("RefCall", 1), ("Refcall", 1)];

const CALL_TYPE_ORDER: &[(&str, Rank)] = &[
    ("PRECISE", 0),
    ("IMPRECISE", 1),
    ("UNSPECIFIED", 2),
    ("UNKNOWN", 3),
];

const VARIANT_TYPE_ORDER: &[(&str, Rank)] = &[
    ("SNV", 0),
    ("INS", 1),
    ("DEL", 2),
    ("DUP", 3),
    ("INV", 4),
    ("BND", 5),
];

const ATTRIBUTE_ORDER: &[(&str, Rank)] = &[
    ("GT:1/1", 1),
    ("GT:0/1", 2),
    ("GT:1/0", 3),
    ("GT:0/0", 4),
    ("length", 5),
    ("support", 6),
    ("quality", 7),
];

const MEAN_POSITION: Rank = 55;

static AUTOSOME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(chr)?[0-9]{1,2}$").unwrap());

/// Band of the statistic rank space. Every `Ordered` rank sorts before every `Unseen` one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatisticBand {
    /// Known statistics and percentiles, interleaved by position.
    Ordered,
    /// Any other statistic, in lexical order.
    Unseen,
}

/// Rank of a statistic label.
///
/// Known statistics sit at tier 0 of their position. Percentile labels that
/// are not known sit at the same position as their percentile, on tiers above
/// 0, so they never share a rank with a known statistic or with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatisticRank {
    pub band: StatisticBand,
    pub position: Rank,
    pub tier: u32,
}

pub type SortKey = (Rank, Rank, Rank, Rank, Rank, StatisticRank);

fn canonical_map(order: &[(&str, Rank)]) -> HashMap<String, Rank> {
    order.iter().map(|(v, r)| (v.to_string(), *r)).collect()
}

fn canonical_statistics() -> HashMap<String, Rank> {
    let mut known = HashMap::from([(COUNT_LABEL.to_string(), 0), (MEAN_LABEL.to_string(), MEAN_POSITION)]);
    for (label, pct) in PERCENTILES {
        known.insert(label.to_string(), pct as Rank);
    }
    known
}

/// Canonical ranks plus trailing ranks for values outside `canonical`,
/// assigned in ascending lexical order starting after the canonical maximum.
pub fn generic_order(values: &BTreeSet<&str>, canonical: &[(&str, Rank)]) -> HashMap<String, Rank> {
    let mut order = canonical_map(canonical);
    let mut order_max = order.values().copied().max().unwrap_or(0);
    for &value in values {
        if !order.contains_key(value) {
            order_max += 1;
            order.insert(value.to_string(), order_max);
        }
    }
    order
}

/// Like [`generic_order`], but autosome names (`chr7`, `12`) rank by their number.
pub fn location_order(values: &BTreeSet<&str>) -> HashMap<String, Rank> {
    let mut order = canonical_map(LOCATION_ORDER);
    let mut order_max = order.values().copied().max().unwrap_or(0);
    for &value in values {
        if order.contains_key(value) {
            continue;
        }
        let number = AUTOSOME
            .is_match(value)
            .then(|| value.strip_prefix("chr").unwrap_or(value).parse::<Rank>().ok())
            .flatten();
        match number {
            Some(n) => {
                order.insert(value.to_string(), n);
            }
            None => {
                order_max += 1;
                order.insert(value.to_string(), order_max);
            }
        }
    }
    order
}

/// Percentile encoded in a label such as `pct_10` or `P90_pct_90`.
fn percentile_of(label: &str) -> Option<Rank> {
    if !label.contains("pct_") {
        return None;
    }
    label.rsplit('_').next()?.parse::<Rank>().ok()
}

pub fn statistic_order(values: &BTreeSet<&str>) -> HashMap<String, StatisticRank> {
    let mut order: HashMap<String, StatisticRank> = canonical_statistics()
        .into_iter()
        .map(|(label, position)| {
            let rank = StatisticRank {
                band: StatisticBand::Ordered,
                position,
                tier: 0,
            };
            (label, rank)
        })
        .collect();

    let mut tiers_used: HashMap<Rank, u32> = HashMap::new();
    let mut unseen: Rank = 0;
    for &value in values {
        if order.contains_key(value) {
            continue;
        }
        let rank = match percentile_of(value) {
            Some(pct) => {
                let tier = tiers_used.entry(pct).or_insert(0);
                *tier += 1;
                StatisticRank {
                    band: StatisticBand::Ordered,
                    position: pct,
                    tier: *tier,
                }
            }
            None => {
                unseen += 1;
                StatisticRank {
                    band: StatisticBand::Unseen,
                    position: unseen,
                    tier: 0,
                }
            }
        };
        order.insert(value.to_string(), rank);
    }
    order
}

fn distinct<'a>(rows: &'a [SummaryRow], column: fn(&SummaryRow) -> &str) -> BTreeSet<&'a str> {
    rows.iter().map(column).collect()
}

/// Rank registry for every categorical column of one summary table.
#[derive(Debug, Clone)]
pub struct TableSorter {
    location: HashMap<String, Rank>,
    filter_status: HashMap<String, Rank>,
    call_type: HashMap<String, Rank>,
    variant_type: HashMap<String, Rank>,
    attribute: HashMap<String, Rank>,
    statistic: HashMap<String, StatisticRank>,
}

impl TableSorter {
    /// Build the registry from the distinct values of every column in `rows`.
    pub fn new(rows: &[SummaryRow]) -> Self {
        TableSorter {
            location: location_order(&distinct(rows, |r| r.location.as_str())),
            filter_status: generic_order(&distinct(rows, |r| r.filter_status.as_str()), FILTER_ORDER),
            call_type: generic_order(&distinct(rows, |r| r.call_type.as_str()), CALL_TYPE_ORDER),
            variant_type: generic_order(
                &distinct(rows, |r| r.variant_type.as_str()),
                VARIANT_TYPE_ORDER,
            ),
            attribute: generic_order(&distinct(rows, |r| r.attribute.as_str()), ATTRIBUTE_ORDER),
            statistic: statistic_order(&distinct(rows, |r| r.statistic.as_str())),
        }
    }

    /// Sort key of a row. Values that were not seen when the registry was
    /// built sort last on their axis.
    pub fn sort_key(&self, row: &SummaryRow) -> SortKey {
        let rank = |map: &HashMap<String, Rank>, value: &str| map.get(value).copied().unwrap_or(Rank::MAX);
        let statistic = self
            .statistic
            .get(&row.statistic)
            .copied()
            .unwrap_or(StatisticRank {
                band: StatisticBand::Unseen,
                position: Rank::MAX,
                tier: u32::MAX,
            });
        (
            rank(&self.location, &row.location),
            rank(&self.filter_status, &row.filter_status),
            rank(&self.call_type, &row.call_type),
            rank(&self.variant_type, &row.variant_type),
            rank(&self.attribute, &row.attribute),
            statistic,
        )
    }

    /// Stable sort: rows with equal keys keep their relative order.
    pub fn sort(&self, rows: &mut [SummaryRow]) {
        rows.sort_by_key(|row| self.sort_key(row));
    }
}

/// Build the rank registry from `rows`, then sort them with it.
pub fn sort_summary(mut rows: Vec<SummaryRow>) -> Vec<SummaryRow> {
    let sorter = TableSorter::new(&rows);
    sorter.sort(&mut rows);
    rows
}
