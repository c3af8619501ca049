mod vcfstats;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "gtars";
    pub const BIN_NAME: &str = "gtars";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Performance critical tools for summarizing genomic variant calls.")
        .subcommand_required(true)
        .subcommand(vcfstats::cli::create_vcfstats_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // VCF STATISTICS
        //
        Some((vcfstats::cli::VCFSTATS_CMD, matches)) => {
            vcfstats::handlers::run_vcfstats(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
