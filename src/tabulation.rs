//! Cross-tabulation of risk factors against age buckets, per health center.
use crate::{
    age::{AgeBucket, BucketCounts},
    risk_factor::RiskFactor,
    ArcStr, LoadSummary, PatientRecord, Records,
};
use serde::Serialize;
use std::collections::BTreeMap;
use term_data_table as tdt;

/// Counts for one health center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCenterData {
    pub total: usize,
    pub age_distribution: BucketCounts,
    /// Every factor is present, even if all its counts are 0.
    pub risk_factors: BTreeMap<RiskFactor, BucketCounts>,
    /// Records with at least `HIGH_RISK_THRESHOLD` factors.
    pub high_risk: BucketCounts,
}

impl Default for HealthCenterData {
    fn default() -> Self {
        Self {
            total: 0,
            age_distribution: BucketCounts::new(),
            risk_factors: RiskFactor::ALL
                .iter()
                .map(|factor| (*factor, BucketCounts::new()))
                .collect(),
            high_risk: BucketCounts::new(),
        }
    }
}

impl HealthCenterData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a record.
    pub fn add(&mut self, record: &PatientRecord) {
        let bucket = record.age_bucket();
        self.total += 1;
        self.age_distribution.incr(bucket);
        for factor in record.risk_factors.iter() {
            self.risk_factors.entry(*factor).or_default().incr(bucket);
        }
        if record.is_high_risk() {
            self.high_risk.incr(bucket);
        }
    }

    /// Number of records with `factor` in `bucket`.
    pub fn count(&self, factor: RiskFactor, bucket: AgeBucket) -> usize {
        self.risk_factors
            .get(&factor)
            .map(|counts| counts[bucket])
            .unwrap_or(0)
    }

    /// Number of records with `factor` across all buckets.
    pub fn factor_total(&self, factor: RiskFactor) -> usize {
        self.risk_factors
            .get(&factor)
            .map(BucketCounts::total)
            .unwrap_or(0)
    }

    /// Percentage of the bucket that has `factor`. 0 if the bucket is empty.
    pub fn percentage(&self, factor: RiskFactor, bucket: AgeBucket) -> f64 {
        percent(self.count(factor, bucket), self.age_distribution[bucket])
    }

    /// Percentage of the center that has `factor`. 0 if the center is empty.
    pub fn factor_percentage(&self, factor: RiskFactor) -> f64 {
        percent(self.factor_total(factor), self.total)
    }

    /// Factors by how many records have them, most common first. Ties keep column order.
    pub fn ranked_factors(&self) -> Vec<(RiskFactor, usize)> {
        let mut ranked = RiskFactor::ALL
            .iter()
            .map(|factor| (*factor, self.factor_total(*factor)))
            .collect::<Vec<_>>();
        // stable sort, so ties stay in column order.
        ranked.sort_by(|(_, l), (_, r)| r.cmp(l));
        ranked
    }

    /// Risk factors by age bucket, for display in the terminal.
    ///
    /// Factors with no records are left out when `skip_empty` is set.
    pub fn term_table(&self, skip_empty: bool) -> tdt::Table<'static> {
        use tdt::{Cell, Row, Table};
        let mut heading = Row::new().with_cell(Cell::from("Risk factor"));
        for bucket in AgeBucket::ALL {
            heading = heading.with_cell(Cell::from(format!(
                "{} (n={})",
                bucket,
                self.age_distribution[bucket]
            )));
        }
        let mut table =
            Table::new().with_row(heading.with_cell(Cell::from(format!("Total (n={})", self.total))));

        for (factor, total) in self.ranked_factors() {
            if skip_empty && total == 0 {
                continue;
            }
            let mut row = Row::new().with_cell(Cell::from(factor.label()));
            for bucket in AgeBucket::ALL {
                row = row.with_cell(Cell::from(count_and_percent(
                    self.count(factor, bucket),
                    self.age_distribution[bucket],
                )));
            }
            table.add_row(row.with_cell(Cell::from(count_and_percent(total, self.total))));
        }
        table
    }
}

/// The full cross-tabulation: one [`HealthCenterData`] per normalized center name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tabulation {
    pub centers: BTreeMap<ArcStr, HealthCenterData>,
    pub summary: LoadSummary,
}

impl Tabulation {
    /// Parse the booking export and count everything in it.
    pub fn from_csv(text: &str) -> Self {
        let (records, summary) = Records::parse(text);
        let mut this = Self::from_records(&records);
        this.summary = summary;
        this
    }

    /// Count a set of already-parsed records.
    ///
    /// The summary describes `records` only (nothing was rejected).
    pub fn from_records(records: &Records) -> Self {
        let centers = records.iter_ref().fold(
            BTreeMap::new(),
            |mut map: BTreeMap<ArcStr, HealthCenterData>, record| {
                map.entry(record.health_center.clone())
                    .or_default()
                    .add(record);
                map
            },
        );
        Tabulation {
            centers,
            summary: LoadSummary::accepted_only(records.len()),
        }
    }

    pub fn get(&self, center: &str) -> Option<&HealthCenterData> {
        self.centers.get(center)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HealthCenterData)> + '_ {
        self.centers.iter().map(|(name, data)| (&**name, data))
    }

    pub fn is_empty(&self) -> bool {
        self.centers.is_empty()
    }

    /// All centers added together.
    pub fn overall(&self) -> HealthCenterData {
        self.centers
            .values()
            .fold(HealthCenterData::new(), |mut acc, data| {
                acc.total += data.total;
                acc.age_distribution = acc.age_distribution + data.age_distribution;
                acc.high_risk = acc.high_risk + data.high_risk;
                for (factor, counts) in data.risk_factors.iter() {
                    let entry = acc.risk_factors.entry(*factor).or_default();
                    *entry = *entry + *counts;
                }
                acc
            })
    }

    /// Age distribution of each center, for display in the terminal.
    pub fn age_table(&self) -> tdt::Table<'static> {
        use tdt::{Cell, Row, Table};
        let mut heading = Row::new().with_cell(Cell::from("Health center"));
        for bucket in AgeBucket::ALL {
            heading = heading.with_cell(Cell::from(bucket.label()));
        }
        let mut table = Table::new().with_row(heading.with_cell(Cell::from("Total")));
        for (name, data) in self.iter() {
            table.add_row(age_row(name.to_owned(), &data.age_distribution, data.total));
        }
        let overall = self.overall();
        table.add_row(age_row(
            "All centers".to_owned(),
            &overall.age_distribution,
            overall.total,
        ));
        table
    }

    /// High-risk records in each center, by age bucket.
    pub fn high_risk_table(&self) -> tdt::Table<'static> {
        use tdt::{Cell, Row, Table};
        let mut heading = Row::new().with_cell(Cell::from("Health center"));
        for bucket in AgeBucket::ALL {
            heading = heading.with_cell(Cell::from(bucket.label()));
        }
        let mut table = Table::new().with_row(heading.with_cell(Cell::from("Total")));
        let overall = self.overall();
        for (name, data) in self
            .iter()
            .chain(std::iter::once(("All centers", &overall)))
        {
            let mut row = Row::new().with_cell(Cell::from(name.to_owned()));
            for bucket in AgeBucket::ALL {
                row = row.with_cell(Cell::from(count_and_percent(
                    data.high_risk[bucket],
                    data.age_distribution[bucket],
                )));
            }
            table.add_row(
                row.with_cell(Cell::from(count_and_percent(
                    data.high_risk.total(),
                    data.total,
                ))),
            );
        }
        table
    }
}

fn age_row(name: String, counts: &BucketCounts, total: usize) -> tdt::Row<'static> {
    use tdt::{Cell, Row};
    let mut row = Row::new().with_cell(Cell::from(name));
    for (_, count) in counts.iter() {
        row = row.with_cell(Cell::from(count_and_percent(count, total)));
    }
    row.with_cell(Cell::from(total.to_string()))
}

/// `count / total` as a percentage, 0 when `total` is 0.
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.
    } else {
        count as f64 / total as f64 * 100.
    }
}

fn count_and_percent(count: usize, total: usize) -> String {
    format!("{} ({:.1}%)", count, percent(count, total))
}

#[cfg(test)]
mod test {
    use super::{percent, HealthCenterData, Tabulation};
    use crate::{age::AgeBucket, risk_factor::RiskFactor, sample, Records};

    const HEADER: &str = "Health institution name,Age,Gravida,Parity,Booking done,\
                          VTE score at booking,Risk factors for VTE 7,Risk factors for VTE 10";

    fn csv(rows: &[&str]) -> String {
        let mut text = HEADER.to_owned();
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn end_to_end() {
        let tab = Tabulation::from_csv(&csv(&["AL MULTAQA,20,1,0,,0,,", "AL MULTAQA,40,1,0,,0,YES,"]));
        let data = tab.get("Al Multaqa").unwrap();
        assert_eq!(data.total, 2);
        assert_eq!(data.age_distribution[AgeBucket::Below18], 0);
        assert_eq!(data.age_distribution[AgeBucket::From18To34], 1);
        assert_eq!(data.age_distribution[AgeBucket::From35], 1);
        assert_eq!(data.count(RiskFactor::AgeOver35, AgeBucket::From35), 1);
        assert_eq!(tab.summary.accepted, 2);
    }

    #[test]
    fn derived_factors_counted() {
        let tab = Tabulation::from_csv(&csv(&["Wadi Hibi,40,6,4,,0,,"]));
        let data = tab.get("Wadi Hibi").unwrap();
        assert_eq!(data.count(RiskFactor::AgeOver35, AgeBucket::From35), 1);
        assert_eq!(data.count(RiskFactor::ParityThreeOrMore, AgeBucket::From35), 1);
    }

    #[test]
    fn rejected_rows_excluded() {
        let tab = Tabulation::from_csv(&csv(&[
            "Al Falaj,abc,0,0,,0,,",
            "Al Falaj,5,0,0,,0,,",
            "Al Falaj,70,0,0,,0,,",
            ",25,0,0,,0,,",
        ]));
        assert!(tab.is_empty());
        assert_eq!(tab.summary.rejected(), 4);
    }

    #[test]
    fn all_factors_present() {
        let tab = Tabulation::from_csv(&csv(&["Al Falaj,25,0,0,,0,,"]));
        let data = tab.get("Al Falaj").unwrap();
        assert_eq!(data.risk_factors.len(), RiskFactor::ALL.len());
        for factor in RiskFactor::ALL {
            assert_eq!(data.factor_total(factor), 0);
        }
    }

    #[test]
    fn sample_invariants() {
        let tab = Tabulation::from_csv(sample::TEXT);
        assert!(!tab.is_empty());
        for (name, data) in tab.iter() {
            assert_eq!(data.age_distribution.total(), data.total, "{}", name);
            for (factor, counts) in data.risk_factors.iter() {
                assert!(counts.total() <= data.total, "{} {}", name, factor);
                for bucket in AgeBucket::ALL {
                    assert!(counts[bucket] <= data.age_distribution[bucket]);
                }
            }
            assert!(data.high_risk.total() <= data.total);
        }
        let overall = tab.overall();
        assert_eq!(overall.total, tab.summary.accepted);
    }

    #[test]
    fn from_records_matches_from_csv() {
        let (records, _) = Records::parse(sample::TEXT);
        let a = Tabulation::from_records(&records);
        let b = Tabulation::from_csv(sample::TEXT);
        assert_eq!(a.centers, b.centers);
    }

    #[test]
    fn percentages() {
        assert_eq!(percent(1, 0), 0.);
        assert_eq!(percent(1, 4), 25.);

        let tab = Tabulation::from_csv(&csv(&[
            "Al Tareef,36,0,0,,0,,YES",
            "Al Tareef,50,0,0,,0,,",
        ]));
        let data = tab.get("Al Tareef").unwrap();
        assert_eq!(data.percentage(RiskFactor::Smoker, AgeBucket::From35), 50.);
        assert_eq!(data.percentage(RiskFactor::Smoker, AgeBucket::Below18), 0.);
        assert_eq!(data.factor_percentage(RiskFactor::AgeOver35), 100.);
    }

    #[test]
    fn ranking() {
        let tab = Tabulation::from_csv(&csv(&[
            "Al Tareef,36,0,0,,0,,YES",
            "Al Tareef,37,0,0,,0,,",
        ]));
        let ranked = tab.get("Al Tareef").unwrap().ranked_factors();
        assert_eq!(ranked[0], (RiskFactor::AgeOver35, 2));
        assert_eq!(ranked[1], (RiskFactor::Smoker, 1));
        // ties keep column order
        assert_eq!(ranked[2], (RiskFactor::PreviousVte, 0));
    }

    #[test]
    fn empty_center_data() {
        let data = HealthCenterData::new();
        assert_eq!(data.percentage(RiskFactor::Smoker, AgeBucket::From35), 0.);
        assert_eq!(data.ranked_factors().len(), 27);
    }
}
