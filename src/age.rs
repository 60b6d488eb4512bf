use itertools::Itertools;
use qu::ick_use::*;
use serde::{ser::SerializeMap, Serialize, Serializer};
use std::{fmt, ops};

/// Youngest age we accept. Younger ages are data entry errors.
pub const MIN_AGE: u8 = 10;
/// Oldest age we accept.
pub const MAX_AGE: u8 = 60;

/// Ages from `start` (inclusive) up to `end` (exclusive), or with no upper limit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Range<T> {
    pub start: T,
    pub end: Option<T>,
}

impl<T: Ord> Range<T> {
    pub fn contains(&self, val: &T) -> bool {
        *val >= self.start && self.end.as_ref().map_or(true, |end| val < end)
    }
}

impl<T: fmt::Display> fmt::Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.end {
            Some(end) => write!(f, "{} - {}", self.start, end),
            None => write!(f, "{}+", self.start),
        }
    }
}

/// The three age groups risk factors are reported in.
///
/// Every accepted age falls into exactly one bucket.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum AgeBucket {
    Below18,
    From18To34,
    From35,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 3] = [AgeBucket::Below18, AgeBucket::From18To34, AgeBucket::From35];

    /// The bucket whose range contains `age`.
    pub fn for_age(age: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|bucket| bucket.range().contains(&age))
            // the ranges cover 0 upwards, so this is only reached if they are edited wrongly.
            .unwrap_or(AgeBucket::From35)
    }

    /// The ages covered by this bucket.
    pub fn range(self) -> Range<u8> {
        let (start, end) = match self {
            AgeBucket::Below18 => (0, Some(18)),
            AgeBucket::From18To34 => (18, Some(35)),
            AgeBucket::From35 => (35, None),
        };
        Range { start, end }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Below18 => "Below 18",
            AgeBucket::From18To34 => "18-34",
            AgeBucket::From35 => "35 and above",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::str::FromStr for AgeBucket {
    type Err = Error;
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        AgeBucket::ALL
            .iter()
            .copied()
            .find(|bucket| bucket.label().eq_ignore_ascii_case(input))
            .ok_or_else(|| format_err!("unrecognised age bucket \"{}\"", input))
    }
}

impl fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for AgeBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A count for each age bucket.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BucketCounts([usize; 3]);

impl BucketCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more value in `bucket`.
    pub fn incr(&mut self, bucket: AgeBucket) {
        self.0[bucket.index()] += 1;
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgeBucket, usize)> + '_ {
        AgeBucket::ALL.iter().copied().zip_eq(self.0.iter().copied())
    }
}

impl ops::Index<AgeBucket> for BucketCounts {
    type Output = usize;
    fn index(&self, bucket: AgeBucket) -> &usize {
        &self.0[bucket.index()]
    }
}

impl ops::Add for BucketCounts {
    type Output = BucketCounts;
    fn add(mut self, rhs: BucketCounts) -> BucketCounts {
        for (lhs, rhs) in self.0.iter_mut().zip(rhs.0) {
            *lhs += rhs;
        }
        self
    }
}

// A map from bucket label to count, so it reads like the dashboard's data.
impl Serialize for BucketCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        for (bucket, count) in self.iter() {
            map.serialize_entry(bucket.label(), &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod test {
    use super::{AgeBucket, BucketCounts, MAX_AGE, MIN_AGE};

    fn counts(ages: &[u8]) -> BucketCounts {
        let mut counts = BucketCounts::new();
        for age in ages {
            counts.incr(AgeBucket::for_age(*age));
        }
        counts
    }

    #[test]
    fn ranges_do_not_overlap() {
        for age in 0..=u8::MAX {
            let containing = AgeBucket::ALL
                .iter()
                .filter(|bucket| bucket.range().contains(&age))
                .count();
            assert_eq!(containing, 1, "age {}", age);
        }
    }

    #[test]
    fn accepted_ages_bucketed() {
        for age in MIN_AGE..=MAX_AGE {
            assert!(AgeBucket::for_age(age).range().contains(&age), "age {}", age);
        }
    }

    #[test]
    fn boundaries() {
        assert_eq!(AgeBucket::for_age(17), AgeBucket::Below18);
        assert_eq!(AgeBucket::for_age(18), AgeBucket::From18To34);
        assert_eq!(AgeBucket::for_age(34), AgeBucket::From18To34);
        assert_eq!(AgeBucket::for_age(35), AgeBucket::From35);
        assert_eq!(AgeBucket::for_age(u8::MAX), AgeBucket::From35);
    }

    #[test]
    fn bucket_counts() {
        let counts = counts(&[12, 20, 30, 35, 60]);
        assert_eq!(counts[AgeBucket::Below18], 1);
        assert_eq!(counts[AgeBucket::From18To34], 2);
        assert_eq!(counts[AgeBucket::From35], 2);
        assert_eq!(counts.total(), 5);
        assert_eq!((counts + counts).total(), 10);
    }

    #[test]
    fn labels() {
        assert_eq!("18-34".parse::<AgeBucket>().unwrap(), AgeBucket::From18To34);
        assert_eq!(AgeBucket::From35.range().to_string(), "35+");
        assert_eq!(AgeBucket::Below18.range().to_string(), "0 - 18");
    }

    #[test]
    fn serialize_as_map() {
        assert_eq!(
            serde_json::to_string(&counts(&[40])).unwrap(),
            r#"{"Below 18":0,"18-34":0,"35 and above":1}"#
        );
    }
}
