pub mod age;
pub mod center;
pub mod config;
pub mod export;
pub mod header;
pub mod line;
pub mod record;
pub mod risk_factor;
pub mod sample;
pub mod source;
pub mod tabulation;
mod util;

pub use anyhow::{Context, Error};
use qu::ick_use::*;
use serde::Serialize;
use std::{collections::BTreeMap, ops::Deref, sync::Arc};

pub use crate::{
    age::{AgeBucket, BucketCounts},
    config::Config,
    header::Columns,
    record::{PatientRecord, Rejection, HIGH_RISK_THRESHOLD},
    risk_factor::{RiskFactor, VteColumn},
    source::{Dataset, Source},
    tabulation::{HealthCenterData, Tabulation},
    util::{header, path_exists, ResultExt},
};

pub type ArcStr = Arc<str>;
pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;

/// The accepted rows of a booking export.
#[derive(Debug, Clone, Default)]
pub struct Records {
    els: Arc<Vec<PatientRecord>>,
}

impl Records {
    /// Parse the text of a booking export.
    ///
    /// The first non-blank line is the header. Rows that can't be used are skipped and counted
    /// in the returned summary; this never fails.
    pub fn parse(text: &str) -> (Self, LoadSummary) {
        let mut lines = line::lines(text);
        let Some((_, header_line)) = lines.next() else {
            event!(Level::WARN, "booking export is empty");
            return (Self::default(), LoadSummary::default());
        };
        let columns = Columns::resolve(&line::split_line(header_line));
        if !columns.has_required() {
            event!(
                Level::WARN,
                "header is missing the health center or age column, no rows will be accepted"
            );
        }

        let mut summary = LoadSummary {
            missing_columns: columns.missing(),
            ..LoadSummary::default()
        };
        let mut els = vec![];
        for (line_no, row) in lines {
            summary.rows += 1;
            match PatientRecord::from_row(&line::split_line(row), &columns) {
                Ok(record) => els.push(record),
                Err(reason) => {
                    event!(Level::DEBUG, "skipping line {}: {}", line_no, reason);
                    *summary.rejections.entry(reason).or_insert(0) += 1;
                }
            }
        }
        summary.accepted = els.len();
        event!(
            Level::INFO,
            "accepted {} of {} rows",
            summary.accepted,
            summary.rows
        );
        (Self::new(els), summary)
    }

    /// Iterate over records in this store.
    pub fn iter(&self) -> impl Iterator<Item = PatientRecord> + '_ {
        self.els.iter().cloned()
    }

    pub fn iter_ref(&self) -> impl Iterator<Item = &PatientRecord> + '_ {
        self.els.iter()
    }

    /// Get a `Records` object containing only records that match the filter.
    pub fn filter(&self, f: impl Fn(&PatientRecord) -> bool) -> Self {
        Records::new(self.iter().filter(f).collect())
    }

    /// Records from one health center. The name is normalized first, so any known spelling
    /// works.
    pub fn for_center(&self, name: &str) -> Self {
        let name = center::normalize(name);
        self.filter(|rec| rec.health_center == name)
    }

    /// Records carrying `factor`.
    pub fn with_factor(&self, factor: RiskFactor) -> Self {
        self.filter(|rec| rec.has(factor))
    }

    /// Records with at least [`HIGH_RISK_THRESHOLD`] risk factors.
    pub fn high_risk(&self) -> Self {
        self.filter(PatientRecord::is_high_risk)
    }

    /// Records sorted by number of risk factors, most first. Ties keep file order.
    pub fn sorted_by_risk(&self) -> Self {
        let mut els = (*self.els).clone();
        els.sort_by(|l, r| r.risk_factors.len().cmp(&l.risk_factors.len()));
        Records::new(els)
    }

    /// To display in the console/terminal.
    pub fn term_table(&self) -> term_data_table::Table<'static> {
        use term_data_table::{Cell, Row, Table};
        let mut table = Table::new().with_row(
            Row::new()
                .with_cell(Cell::from("Health center"))
                .with_cell(Cell::from("Age"))
                .with_cell(Cell::from("Gravida"))
                .with_cell(Cell::from("Parity"))
                .with_cell(Cell::from("VTE score"))
                .with_cell(Cell::from("Risk factors")),
        );
        for rec in self.iter_ref() {
            table.add_row(
                Row::new()
                    .with_cell(Cell::from(rec.health_center.to_string()))
                    .with_cell(Cell::from(rec.age.to_string()))
                    .with_cell(Cell::from(rec.gravida.to_string()))
                    .with_cell(Cell::from(rec.parity.to_string()))
                    .with_cell(Cell::from(rec.vte_score.to_string()))
                    .with_cell(Cell::from(
                        rec.risk_factors
                            .iter()
                            .map(|f| f.label())
                            .collect::<Vec<_>>()
                            .join(", "),
                    )),
            );
        }
        table
    }

    fn new(els: Vec<PatientRecord>) -> Self {
        Records { els: Arc::new(els) }
    }
}

impl Deref for Records {
    type Target = [PatientRecord];
    fn deref(&self) -> &Self::Target {
        &*self.els
    }
}

impl<'a> IntoIterator for &'a Records {
    type IntoIter = <&'a [PatientRecord] as IntoIterator>::IntoIter;
    type Item = &'a PatientRecord;
    fn into_iter(self) -> Self::IntoIter {
        self.els.iter()
    }
}

impl FromIterator<PatientRecord> for Records {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = PatientRecord>,
    {
        Self::new(iter.into_iter().collect())
    }
}

/// What happened to the rows of a booking export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Non-blank lines after the header.
    pub rows: usize,
    pub accepted: usize,
    pub rejections: BTreeMap<Rejection, usize>,
    /// Search terms of the columns that weren't in the header.
    pub missing_columns: Vec<String>,
}

impl LoadSummary {
    /// A summary for records that were all accepted.
    pub fn accepted_only(count: usize) -> Self {
        Self {
            rows: count,
            accepted: count,
            ..Self::default()
        }
    }

    pub fn rejected(&self) -> usize {
        self.rejections.values().sum()
    }

    pub fn term_table(&self) -> term_data_table::Table<'static> {
        use term_data_table::{Cell, Row, Table};
        let row = |label: String, count: usize| {
            Row::new()
                .with_cell(Cell::from(label))
                .with_cell(Cell::from(count.to_string()))
                .with_cell(Cell::from(format!(
                    "{:.1}%",
                    tabulation::percent(count, self.rows)
                )))
        };
        let mut table = Table::new()
            .with_row(
                Row::new()
                    .with_cell(Cell::from("Rows"))
                    .with_cell(Cell::from("Count"))
                    .with_cell(Cell::from("Percentage")),
            )
            .with_row(row("read".into(), self.rows))
            .with_row(row("accepted".into(), self.accepted));
        for (reason, count) in self.rejections.iter() {
            table.add_row(row(format!("rejected: {}", reason), *count));
        }
        table
    }
}
