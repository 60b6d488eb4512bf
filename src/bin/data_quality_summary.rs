//! Report what was dropped while loading the booking export, and why.
use clap::Parser;
use qu::ick_use::*;
use std::path::PathBuf;
use term_data_table::{Cell, Row, Table};
use vte_tabulator::{center, config::DEFAULT_CONFIG_PATH, header, Config, Dataset};

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
}

#[qu::ick]
pub fn main(opt: Opt) -> Result {
    let config = Config::load(&opt.config)?.with_overrides(opt.data, opt.no_fallback);
    let Some(dataset) = Dataset::load(&config)? else {
        bail!("no data available");
    };
    let summary = &dataset.summary;

    header("Rows");
    println!("source: {}", dataset.source);
    println!("{}", summary.term_table());

    header("Columns not found");
    if summary.missing_columns.is_empty() {
        println!("all columns found");
    }
    for name in summary.missing_columns.iter() {
        println!("{}", name);
    }

    // Unrecognised names are kept as typed, so misspellings show up here as extra centers.
    header("Health centers");
    let tab = dataset.tabulate();
    let mut table = Table::new().with_row(
        Row::new()
            .with_cell(Cell::from("Health center"))
            .with_cell(Cell::from("Records"))
            .with_cell(Cell::from("Recognised")),
    );
    let known = center::known().collect::<Vec<_>>();
    for (name, data) in tab.iter() {
        let recognised = if known.iter().any(|k| *k == name) {
            "yes"
        } else {
            "no"
        };
        table.add_row(
            Row::new()
                .with_cell(Cell::from(name.to_owned()))
                .with_cell(Cell::from(data.total.to_string()))
                .with_cell(Cell::from(recognised)),
        );
    }
    for name in known.iter().filter(|name| tab.get(name).is_none()) {
        table.add_row(
            Row::new()
                .with_cell(Cell::from(*name))
                .with_cell(Cell::from("0"))
                .with_cell(Cell::from("yes")),
        );
    }
    println!("{}", table);
    Ok(())
}
