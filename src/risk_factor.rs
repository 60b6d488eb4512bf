//! The fixed set of VTE risk factors recorded at antenatal booking.
//!
//! The booking export has 29 columns headed `Risk factors for VTE 1` to `Risk factors for VTE
//! 29`. The first 27 map, by position, to one of the factors below. Columns 28 and 29 exist in
//! the export but have no agreed meaning, so they are read and then ignored.
//!
//! Two factors are also derived from other fields: [`RiskFactor::AgeOver35`] from the age and
//! [`RiskFactor::ParityThreeOrMore`] from the parity. They are members of the same enumeration as
//! the column factors, so every table built from this module has one canonical set of rows.
use qu::ick_use::*;
use serde::{Serialize, Serializer};
use std::fmt;

/// Number of `Risk factors for VTE {n}` columns in the booking export.
pub const VTE_COLUMN_COUNT: u8 = 29;

/// A single risk factor for venous thromboembolism.
///
/// Ordering follows the column order of the booking export.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RiskFactor {
    PreviousVte,
    HighRiskThrombophilia,
    MedicalComorbidity,
    FamilyHistory,
    LowRiskThrombophilia,
    SurgicalProcedure,
    AgeOver35,
    ParityThreeOrMore,
    Obesity,
    Smoker,
    VaricoseVeins,
    SystemicInfection,
    Immobility,
    PreEclampsia,
    Hyperemesis,
    MultiplePregnancy,
    AssistedReproduction,
    Ohss,
    CaesareanSection,
    ProlongedLabour,
    InstrumentalDelivery,
    PostpartumHaemorrhage,
    PretermBirth,
    Stillbirth,
    LongDistanceTravel,
    SickleCell,
    IvDrugUser,
}

impl RiskFactor {
    /// Every factor, in column order.
    pub const ALL: [RiskFactor; 27] = {
        use RiskFactor::*;
        [
            PreviousVte,
            HighRiskThrombophilia,
            MedicalComorbidity,
            FamilyHistory,
            LowRiskThrombophilia,
            SurgicalProcedure,
            AgeOver35,
            ParityThreeOrMore,
            Obesity,
            Smoker,
            VaricoseVeins,
            SystemicInfection,
            Immobility,
            PreEclampsia,
            Hyperemesis,
            MultiplePregnancy,
            AssistedReproduction,
            Ohss,
            CaesareanSection,
            ProlongedLabour,
            InstrumentalDelivery,
            PostpartumHaemorrhage,
            PretermBirth,
            Stillbirth,
            LongDistanceTravel,
            SickleCell,
            IvDrugUser,
        ]
    };

    /// The factor recorded in column `Risk factors for VTE {column}`, if that column has a
    /// meaning.
    pub fn from_column(column: u8) -> Option<Self> {
        let idx = usize::from(column).checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    /// The 1-based export column this factor is recorded in.
    pub fn column(self) -> u8 {
        // ALL is in declaration order, which is column order.
        self as u8 + 1
    }

    /// A human-readable label for the factor.
    ///
    /// These are the labels shown on the dashboard, so they are also the keys used in exports.
    pub fn label(self) -> &'static str {
        use RiskFactor::*;
        match self {
            PreviousVte => "Previous VTE",
            HighRiskThrombophilia => "High-risk thrombophilia",
            MedicalComorbidity => "Medical comorbidities",
            FamilyHistory => "Family history of VTE",
            LowRiskThrombophilia => "Low-risk thrombophilia",
            SurgicalProcedure => "Surgical procedure in pregnancy",
            AgeOver35 => "Age > 35 years",
            ParityThreeOrMore => "Parity ≥3",
            Obesity => "Obesity (BMI ≥ 30 kg/m²)",
            Smoker => "Smoker",
            VaricoseVeins => "Gross varicose veins",
            SystemicInfection => "Current systemic infection",
            Immobility => "Immobility",
            PreEclampsia => "Pre-eclampsia",
            Hyperemesis => "Hyperemesis / dehydration",
            MultiplePregnancy => "Multiple pregnancy",
            AssistedReproduction => "IVF / assisted reproduction",
            Ohss => "Ovarian hyperstimulation syndrome",
            CaesareanSection => "Caesarean section",
            ProlongedLabour => "Prolonged labour (> 24 hours)",
            InstrumentalDelivery => "Mid-cavity or rotational operative delivery",
            PostpartumHaemorrhage => "Postpartum haemorrhage > 1 litre",
            PretermBirth => "Preterm birth",
            Stillbirth => "Stillbirth in current pregnancy",
            LongDistanceTravel => "Long-distance travel (> 4 hours)",
            SickleCell => "Sickle cell disease",
            IvDrugUser => "Intravenous drug user",
        }
    }

    /// A short machine-friendly name, used on the command line.
    pub fn code(self) -> &'static str {
        use RiskFactor::*;
        match self {
            PreviousVte => "previous_vte",
            HighRiskThrombophilia => "high_risk_thrombophilia",
            MedicalComorbidity => "medical_comorbidity",
            FamilyHistory => "family_history",
            LowRiskThrombophilia => "low_risk_thrombophilia",
            SurgicalProcedure => "surgical_procedure",
            AgeOver35 => "age_over_35",
            ParityThreeOrMore => "parity_3_or_more",
            Obesity => "obesity",
            Smoker => "smoker",
            VaricoseVeins => "varicose_veins",
            SystemicInfection => "systemic_infection",
            Immobility => "immobility",
            PreEclampsia => "pre_eclampsia",
            Hyperemesis => "hyperemesis",
            MultiplePregnancy => "multiple_pregnancy",
            AssistedReproduction => "assisted_reproduction",
            Ohss => "ohss",
            CaesareanSection => "caesarean_section",
            ProlongedLabour => "prolonged_labour",
            InstrumentalDelivery => "instrumental_delivery",
            PostpartumHaemorrhage => "postpartum_haemorrhage",
            PretermBirth => "preterm_birth",
            Stillbirth => "stillbirth",
            LongDistanceTravel => "long_distance_travel",
            SickleCell => "sickle_cell",
            IvDrugUser => "iv_drug_user",
        }
    }
}

/// Accepts either the short code or the label (case-insensitive).
impl std::str::FromStr for RiskFactor {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|factor| {
                factor.code().eq_ignore_ascii_case(input)
                    || factor.label().eq_ignore_ascii_case(input)
            })
            .ok_or_else(|| format_err!("unrecognised risk factor \"{}\"", input))
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Serialize as the label so the factor can be used as a JSON map key.
impl Serialize for RiskFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One of the `Risk factors for VTE {n}` columns of the booking export.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VteColumn(u8);

impl VteColumn {
    /// All columns, `1..=29`.
    pub fn all() -> impl Iterator<Item = VteColumn> {
        (1..=VTE_COLUMN_COUNT).map(VteColumn)
    }

    /// The lowercase phrase we search the header row for.
    pub fn search_term(self) -> String {
        format!("risk factors for vte {}", self.0)
    }

    /// The factor this column records, or `None` for the unmapped trailing columns.
    pub fn factor(self) -> Option<RiskFactor> {
        RiskFactor::from_column(self.0)
    }
}

impl fmt::Display for VteColumn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Risk factors for VTE {}", self.0)
    }
}
