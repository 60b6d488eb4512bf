//! Print risk factors by age bucket for each health center.
use clap::Parser;
use qu::ick_use::*;
use std::path::PathBuf;
use vte_tabulator::{config::DEFAULT_CONFIG_PATH, header, Config, Dataset, RiskFactor};

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
    /// Only count records with this risk factor.
    #[clap(long)]
    factor: Option<RiskFactor>,
    /// Also show risk factors that no-one has.
    #[clap(long)]
    show_empty: bool,
    /// Print the tabulation as json instead of tables.
    #[clap(long)]
    json: bool,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let config = Config::load(&opt.config)?.with_overrides(opt.data, opt.no_fallback);
    let Some(dataset) = Dataset::load(&config)? else {
        bail!("no data available");
    };

    let mut records = dataset.records.clone();
    if let Some(center) = &opt.center {
        records = records.for_center(center);
    }
    if let Some(factor) = opt.factor {
        records = records.with_factor(factor);
    }
    let tab = dataset.tabulate_records(&records);

    if opt.json {
        vte_tabulator::export::write_json(&tab, std::io::stdout().lock())?;
        println!();
        return Ok(());
    }

    header("Data");
    println!("source: {}", dataset.source);
    println!("{}", dataset.summary.term_table());

    if tab.is_empty() {
        println!("no records match");
        return Ok(());
    }

    header("Age distribution");
    println!("{}", tab.age_table());

    for (name, data) in tab.iter() {
        header(&format!("Risk factors: {}", name));
        println!("{}", data.term_table(!opt.show_empty));
    }

    if opt.center.is_none() {
        header("Risk factors: all centers");
        println!("{}", tab.overall().term_table(!opt.show_empty));
    }
    Ok(())
}
