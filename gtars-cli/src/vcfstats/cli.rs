use clap::{Arg, Command, value_parser};

pub use gtars_vcfstats::consts::*;

pub fn create_vcfstats_cli() -> Command {
    Command::new(VCFSTATS_CMD)
        .author("Databio")
        .about("Summarize a single-sample VCF or BCF file into a table of genotype counts and length, quality and read support distributions.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("vcf")
                .long("vcf-input")
                .short('i')
                .visible_aliases(["vcf", "input"])
                .required(true)
                .help("Path to the VCF file (plain, gzipped or bgzipped) or BCF file"),
        )
        .arg(
            Arg::new("variant-type")
                .long("fix-variant-type")
                .short('t')
                .visible_alias("var-type")
                .required(false)
                .help("If the variant type is not reported in the INFO field (key: SVTYPE), use this value"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .required(true)
                .help("Path to the output TSV table; parent directories are created"),
        )
        .arg(
            Arg::new("percentile-method")
                .long("percentile-method")
                .value_parser(["nearest-rank", "fraction"])
                .default_value("nearest-rank")
                .help("How percentiles are scored from the observations"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('p')
                .value_parser(value_parser!(usize))
                .required(false)
                .help("Number of worker threads (default: all cores)"),
        )
}
