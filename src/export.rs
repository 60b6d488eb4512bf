//! Writing the tabulation out for other tools (the dashboard, spreadsheets).
use crate::{age::AgeBucket, risk_factor::RiskFactor, tabulation::percent, util, Tabulation};
use qu::ick_use::*;
use serde::Serialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// File name of the csv export inside the export directory.
pub const CSV_FILE: &str = "vte_risk_factors.csv";
/// File name of the json export inside the export directory.
pub const JSON_FILE: &str = "vte_risk_factors.json";

/// One cell of the cross-tabulation, in long format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellRow<'a> {
    pub center: &'a str,
    pub factor: RiskFactor,
    pub bucket: AgeBucket,
    pub count: usize,
    /// Of the records in `center` and `bucket`.
    pub percentage: f64,
}

/// Every (center, factor, bucket) cell, centers in name order, factors in column order.
pub fn cells(tab: &Tabulation) -> impl Iterator<Item = CellRow<'_>> + '_ {
    tab.iter().flat_map(|(center, data)| {
        RiskFactor::ALL.into_iter().flat_map(move |factor| {
            AgeBucket::ALL.into_iter().map(move |bucket| {
                let count = data.count(factor, bucket);
                CellRow {
                    center,
                    factor,
                    bucket,
                    count,
                    percentage: percent(count, data.age_distribution[bucket]),
                }
            })
        })
    })
}

/// Write the cells as csv, with a header row.
pub fn write_csv(tab: &Tabulation, out: impl io::Write) -> Result {
    let mut writer = csv::Writer::from_writer(out);
    for cell in cells(tab) {
        writer.serialize(cell)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_json(tab: &Tabulation, out: impl io::Write) -> Result {
    serde_json::to_writer_pretty(out, tab)?;
    Ok(())
}

/// Save the cells as csv.
pub fn save_csv(tab: &Tabulation, path: impl AsRef<Path>, overwrite: bool) -> Result {
    save_with(path.as_ref(), overwrite, |file| write_csv(tab, file))
}

/// Save the whole tabulation, including the load summary, as json.
pub fn save_json(tab: &Tabulation, path: impl AsRef<Path>, overwrite: bool) -> Result {
    save_with(path.as_ref(), overwrite, |file| write_json(tab, file))
}

/// Save both exports into `dir`, returning the paths written.
///
/// Nothing is written unless both files can be, so a refused overwrite can't leave a new csv next
/// to an old json.
pub fn save_all(
    tab: &Tabulation,
    dir: impl AsRef<Path>,
    overwrite: bool,
) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    let csv_path = dir.join(CSV_FILE);
    let json_path = dir.join(JSON_FILE);
    if !overwrite {
        for path in [&csv_path, &json_path] {
            ensure!(
                !util::path_exists(path)?,
                "\"{}\" already exists",
                path.display()
            );
        }
    }
    save_csv(tab, &csv_path, overwrite)?;
    save_json(tab, &json_path, overwrite)?;
    Ok((csv_path, json_path))
}

fn save_with(
    path: &Path,
    overwrite: bool,
    write: impl FnOnce(io::BufWriter<fs::File>) -> Result,
) -> Result {
    fn inner(
        path: &Path,
        overwrite: bool,
        write: impl FnOnce(io::BufWriter<fs::File>) -> Result,
    ) -> Result {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("could not create parent")?;
        }
        ensure!(
            overwrite || !util::path_exists(path)?,
            "file already exists"
        );
        write(io::BufWriter::new(fs::File::create(path)?))
    }
    inner(path, overwrite, write).with_context(|| format!("saving to \"{}\"", path.display()))
}

#[cfg(test)]
mod test {
    use super::{cells, save_all, write_csv, write_json, CSV_FILE, JSON_FILE};
    use crate::{age::AgeBucket, risk_factor::RiskFactor, sample, Tabulation};
    use std::{fs, path::PathBuf};

    /// A fresh directory under the system temp dir.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "vte-tabulator-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    const TEXT: &str = "Health institution name,Age,Parity,Risk factors for VTE 10\n\
                        Al Multaqa,25,0,yes\n\
                        Al Multaqa,40,0,\n";

    #[test]
    fn one_cell_per_center_factor_bucket() {
        let tab = Tabulation::from_csv(sample::TEXT);
        let expected = tab.centers.len() * RiskFactor::ALL.len() * AgeBucket::ALL.len();
        assert_eq!(cells(&tab).count(), expected);
    }

    #[test]
    fn csv_output() {
        let tab = Tabulation::from_csv(TEXT);
        let mut out = Vec::new();
        write_csv(&tab, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("center,factor,bucket,count,percentage")
        );
        assert!(out.contains("Al Multaqa,Smoker,18-34,1,100.0\n"));
        assert!(out.contains("Al Multaqa,Age > 35 years,35 and above,1,100.0\n"));
        assert!(out.contains("Al Multaqa,Smoker,Below 18,0,0.0\n"));
        assert_eq!(lines.count(), 27 * 3);
    }

    #[test]
    fn json_output() {
        let tab = Tabulation::from_csv(TEXT);
        let mut out = Vec::new();
        write_json(&tab, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let center = &value["centers"]["Al Multaqa"];
        assert_eq!(center["total"], 2);
        assert_eq!(center["age_distribution"]["18-34"], 1);
        assert_eq!(center["risk_factors"]["Smoker"]["18-34"], 1);
        assert_eq!(center["risk_factors"]["Previous VTE"]["35 and above"], 0);
        assert_eq!(value["summary"]["accepted"], 2);
    }

    #[test]
    fn save_all_writes_both() {
        let dir = scratch_dir("save-all");
        let tab = Tabulation::from_csv(TEXT);
        let (csv_path, json_path) = save_all(&tab, &dir, false).unwrap();
        assert!(csv_path.ends_with(CSV_FILE));
        assert!(fs::read_to_string(&json_path).unwrap().contains("Al Multaqa"));
        // refused without overwrite, allowed with it
        assert!(save_all(&tab, &dir, false).is_err());
        assert!(save_all(&tab, &dir, true).is_ok());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn existing_json_blocks_csv() {
        let dir = scratch_dir("existing-json");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(JSON_FILE), "stale").unwrap();
        let tab = Tabulation::from_csv(TEXT);
        assert!(save_all(&tab, &dir, false).is_err());
        assert!(!dir.join(CSV_FILE).exists());
        assert_eq!(fs::read_to_string(dir.join(JSON_FILE)).unwrap(), "stale");
        fs::remove_dir_all(&dir).unwrap();
    }
}
