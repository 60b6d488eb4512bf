use crate::risk_factor::VteColumn;
use std::collections::BTreeMap;

/// Positions of the columns we read, found from the header row.
///
/// A column that isn't in the header is `None`. Looking a value up through a missing column (or
/// past the end of a short row) gives "no value", never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns {
    pub health_center: Option<usize>,
    pub age: Option<usize>,
    pub gravida: Option<usize>,
    pub parity: Option<usize>,
    pub booking_done: Option<usize>,
    pub vte_score: Option<usize>,
    pub risk_factors: BTreeMap<VteColumn, usize>,
}

impl Columns {
    pub const HEALTH_CENTER: &'static str = "health institution name";
    pub const AGE: &'static str = "age";
    pub const GRAVIDA: &'static str = "gravida";
    pub const PARITY: &'static str = "parity";
    pub const BOOKING_DONE: &'static str = "booking done";
    pub const VTE_SCORE: &'static str = "vte score at booking";

    /// Find our columns in a header row.
    pub fn resolve(headers: &[String]) -> Self {
        let lower = headers
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect::<Vec<_>>();
        Columns {
            health_center: find(&lower, Self::HEALTH_CENTER),
            age: find(&lower, Self::AGE),
            gravida: find(&lower, Self::GRAVIDA),
            parity: find(&lower, Self::PARITY),
            booking_done: find(&lower, Self::BOOKING_DONE),
            vte_score: find(&lower, Self::VTE_SCORE),
            risk_factors: VteColumn::all()
                .filter_map(|col| Some((col, find(&lower, &col.search_term())?)))
                .collect(),
        }
    }

    /// The fields we couldn't find, by search term.
    pub fn missing(&self) -> Vec<String> {
        let mut missing = [
            (Self::HEALTH_CENTER, self.health_center),
            (Self::AGE, self.age),
            (Self::GRAVIDA, self.gravida),
            (Self::PARITY, self.parity),
            (Self::BOOKING_DONE, self.booking_done),
            (Self::VTE_SCORE, self.vte_score),
        ]
        .into_iter()
        .filter(|(_, idx)| idx.is_none())
        .map(|(name, _)| name.to_owned())
        .collect::<Vec<_>>();
        missing.extend(
            VteColumn::all()
                .filter(|col| !self.risk_factors.contains_key(col))
                .map(|col| col.search_term()),
        );
        missing
    }

    /// Whether we can build any records at all.
    pub fn has_required(&self) -> bool {
        self.health_center.is_some() && self.age.is_some()
    }
}

/// Get the trimmed value at `idx`, if both the column and the value exist.
pub fn field(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.and_then(|idx| row.get(idx)).map(|s| s.trim())
}

/// An exact match wins, otherwise the first header containing `term`.
fn find(lower_headers: &[String], term: &str) -> Option<usize> {
    lower_headers
        .iter()
        .position(|h| h == term)
        .or_else(|| lower_headers.iter().position(|h| contains_term(h, term)))
}

/// `term` appears in `header` and isn't the start of a longer number (`vte 1` in `vte 10`).
fn contains_term(header: &str, term: &str) -> bool {
    header
        .match_indices(term)
        .any(|(idx, _)| !header[idx + term.len()..].starts_with(|c: char| c.is_ascii_digit()))
}

#[cfg(test)]
mod test {
    use super::{field, Columns};
    use crate::{line::split_line, risk_factor::VteColumn};

    fn col(n: u8) -> VteColumn {
        VteColumn::all().nth(usize::from(n) - 1).unwrap()
    }

    #[test]
    fn resolves_named_columns() {
        let headers = split_line(
            "Health Institution Name,Age,Gravida,Parity,Booking done (trimester),\
             VTE score at booking,Risk factors for VTE 1,Risk factors for VTE 7",
        );
        let cols = Columns::resolve(&headers);
        assert_eq!(cols.health_center, Some(0));
        assert_eq!(cols.age, Some(1));
        assert_eq!(cols.gravida, Some(2));
        assert_eq!(cols.parity, Some(3));
        assert_eq!(cols.booking_done, Some(4));
        assert_eq!(cols.vte_score, Some(5));
        assert_eq!(cols.risk_factors.get(&col(1)), Some(&6));
        assert_eq!(cols.risk_factors.get(&col(7)), Some(&7));
        assert_eq!(cols.risk_factors.len(), 2);
        assert!(cols.has_required());
    }

    #[test]
    fn exact_match_preferred() {
        let headers = split_line("Risk factors for VTE 10,Risk factors for VTE 1");
        let cols = Columns::resolve(&headers);
        assert_eq!(cols.risk_factors.get(&col(1)), Some(&1));
        assert_eq!(cols.risk_factors.get(&col(10)), Some(&0));
    }

    #[test]
    fn number_prefix_is_not_a_match() {
        let headers = split_line("Risk factors for VTE 10 (smoker)");
        let cols = Columns::resolve(&headers);
        assert_eq!(cols.risk_factors.get(&col(10)), Some(&0));
        assert_eq!(cols.risk_factors.get(&col(1)), None);
    }

    #[test]
    fn substring_fallback() {
        let headers = split_line("Name of health institution name (free text),Patient age");
        let cols = Columns::resolve(&headers);
        assert_eq!(cols.health_center, Some(0));
        assert_eq!(cols.age, Some(1));
    }

    #[test]
    fn missing_columns() {
        let headers = split_line("Age,Something else");
        let cols = Columns::resolve(&headers);
        assert_eq!(cols.health_center, None);
        assert!(!cols.has_required());
        let missing = cols.missing();
        assert!(missing.contains(&"health institution name".to_owned()));
        assert!(missing.contains(&"risk factors for vte 29".to_owned()));
        assert!(!missing.contains(&"age".to_owned()));

        let row = split_line("25");
        assert_eq!(field(&row, cols.age), Some("25"));
        assert_eq!(field(&row, cols.health_center), None);
        assert_eq!(field(&row, Some(5)), None);
    }
}
