use crate::{
    age::{AgeBucket, MAX_AGE, MIN_AGE},
    center,
    header::{field, Columns},
    risk_factor::RiskFactor,
    ArcStr,
};
use serde::Serialize;
use std::{collections::BTreeSet, fmt};

/// A record is high-risk when it carries at least this many distinct risk factors.
pub const HIGH_RISK_THRESHOLD: usize = 3;

/// Parity at or above which we add [`RiskFactor::ParityThreeOrMore`].
const DERIVED_PARITY: i32 = 3;
/// Age at or above which we add [`RiskFactor::AgeOver35`].
const DERIVED_AGE: u8 = 35;

/// One accepted row of the booking export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    /// Normalized health center name.
    pub health_center: ArcStr,
    /// Always within `MIN_AGE..=MAX_AGE`.
    pub age: u8,
    pub risk_factors: BTreeSet<RiskFactor>,
    pub vte_score: i32,
    pub gravida: i32,
    pub parity: i32,
    /// The "booking done" column as written (usually the trimester). May be empty.
    pub trimester: ArcStr,
}

impl PatientRecord {
    /// Build a record from a split row, or say why the row can't be used.
    pub fn from_row(row: &[String], columns: &Columns) -> Result<Self, Rejection> {
        let health_center = match field(row, columns.health_center) {
            Some(name) if !name.is_empty() => center::normalize(name),
            _ => return Err(Rejection::MissingCenter),
        };
        let age = parse_age(field(row, columns.age))?;
        let gravida = parse_or_zero(field(row, columns.gravida));
        let parity = parse_or_zero(field(row, columns.parity));
        let vte_score = parse_or_zero(field(row, columns.vte_score));
        let trimester = field(row, columns.booking_done).unwrap_or("").into();

        let mut risk_factors = columns
            .risk_factors
            .iter()
            .filter(|(_, idx)| field(row, Some(**idx)).map_or(false, is_flagged))
            .filter_map(|(col, _)| col.factor())
            .collect::<BTreeSet<_>>();

        // Derived factors. Adding to a set means an explicit flag and the derived value are
        // counted once.
        if age >= DERIVED_AGE {
            risk_factors.insert(RiskFactor::AgeOver35);
        }
        if parity >= DERIVED_PARITY {
            risk_factors.insert(RiskFactor::ParityThreeOrMore);
        }

        Ok(PatientRecord {
            health_center,
            age,
            risk_factors,
            vte_score,
            gravida,
            parity,
            trimester,
        })
    }

    pub fn age_bucket(&self) -> AgeBucket {
        AgeBucket::for_age(self.age)
    }

    pub fn has(&self, factor: RiskFactor) -> bool {
        self.risk_factors.contains(&factor)
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_factors.len() >= HIGH_RISK_THRESHOLD
    }
}

/// Why a row was not turned into a record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Rejection {
    /// The health center column is missing or blank.
    MissingCenter,
    /// The age is missing or not a whole number.
    InvalidAge,
    /// The age is a number outside `MIN_AGE..=MAX_AGE`.
    AgeOutOfRange,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::MissingCenter => f.write_str("missing health center"),
            Rejection::InvalidAge => f.write_str("age missing or not a number"),
            Rejection::AgeOutOfRange => {
                write!(f, "age outside {} - {}", MIN_AGE, MAX_AGE)
            }
        }
    }
}

impl std::error::Error for Rejection {}

fn parse_age(input: Option<&str>) -> Result<u8, Rejection> {
    let age = input
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or(Rejection::InvalidAge)?;
    if (i64::from(MIN_AGE)..=i64::from(MAX_AGE)).contains(&age) {
        // in range, so it fits.
        Ok(age as u8)
    } else {
        Err(Rejection::AgeOutOfRange)
    }
}

/// Auxiliary numbers default to 0 rather than rejecting the row. Negative values are kept.
fn parse_or_zero(input: Option<&str>) -> i32 {
    input.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// Values that mean "this risk factor is present".
fn is_flagged(value: &str) -> bool {
    matches!(
        value.to_uppercase().as_str(),
        "YES" | "Y" | "1" | "TRUE"
    )
}
