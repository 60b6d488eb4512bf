//! Write the tabulation out as csv and json for the dashboard.
use clap::Parser;
use qu::ick_use::*;
use std::path::PathBuf;
use vte_tabulator::{config::DEFAULT_CONFIG_PATH, export, Config, Dataset, Source};

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
    /// Where to write the exports. Overrides the config file.
    #[clap(long)]
    out_dir: Option<PathBuf>,
    /// If set, allow overwriting existing exports.
    #[clap(long, short)]
    overwrite: bool,
    /// Write the settings used to the config file, so they can be edited.
    #[clap(long)]
    save_config: bool,
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let mut config = Config::load(&opt.config)?.with_overrides(opt.data, opt.no_fallback);
    if let Some(out_dir) = opt.out_dir {
        config.export_dir = out_dir;
    }
    if opt.save_config {
        config.save(&opt.config, opt.overwrite)?;
        event!(Level::INFO, "saved config to \"{}\"", opt.config.display());
    }

    let Some(dataset) = Dataset::load(&config)? else {
        bail!("no data available");
    };
    if dataset.source == Source::Sample {
        event!(Level::WARN, "exporting the built-in sample, not real data");
    }
    let tab = dataset.tabulate();

    let (csv_path, json_path) = export::save_all(&tab, &config.export_dir, opt.overwrite)?;
    event!(Level::INFO, "wrote \"{}\"", csv_path.display());
    event!(Level::INFO, "wrote \"{}\"", json_path.display());

    println!(
        "exported {} health centers ({} records) from {}",
        tab.centers.len(),
        tab.summary.accepted,
        dataset.source
    );
    Ok(())
}
