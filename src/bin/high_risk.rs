//! Count records with several risk factors.
use clap::Parser;
use qu::ick_use::*;
use std::path::PathBuf;
use vte_tabulator::{config::DEFAULT_CONFIG_PATH, header, Config, Dataset, HIGH_RISK_THRESHOLD};

#[derive(Debug, Parser)]
struct Opt {
    /// The config file to use.
    #[clap(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// The booking export to read. Overrides the config file.
    #[clap(long, short)]
    data: Option<PathBuf>,
    /// Don't fall back to the built-in sample if the booking export is missing.
    #[clap(long)]
    no_fallback: bool,
    /// Only show this health center (any known spelling).
    #[clap(long)]
    center: Option<String>,
    /// List the high-risk records, most risk factors first.
    #[clap(long)]
    list: bool,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let config = Config::load(&opt.config)?.with_overrides(opt.data, opt.no_fallback);
    let Some(dataset) = Dataset::load(&config)? else {
        bail!("no data available");
    };

    let records = match &opt.center {
        Some(center) => dataset.records.for_center(center),
        None => dataset.records.clone(),
    };
    let tab = dataset.tabulate_records(&records);

    header(&format!(
        "Records with {} or more risk factors",
        HIGH_RISK_THRESHOLD
    ));
    println!("source: {}", dataset.source);
    println!("{}", tab.high_risk_table());

    if opt.list {
        let high_risk = records.high_risk().sorted_by_risk();
        header(&format!("High-risk records ({})", high_risk.len()));
        println!("{}", high_risk.term_table());
    }
    Ok(())
}
