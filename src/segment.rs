use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

/// The four phases of the exercise, in the order they are prayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentName {
    Lectio,
    Meditatio,
    Oratio,
    Contemplatio,
}

impl SegmentName {
    pub const ALL: [SegmentName; 4] = [
        SegmentName::Lectio,
        SegmentName::Meditatio,
        SegmentName::Oratio,
        SegmentName::Contemplatio,
    ];

    /// Only the first and last segment may be switched off.
    pub fn is_optional(&self) -> bool {
        matches!(self, SegmentName::Lectio | SegmentName::Contemplatio)
    }

    pub fn index(&self) -> usize {
        match self {
            SegmentName::Lectio => 0,
            SegmentName::Meditatio => 1,
            SegmentName::Oratio => 2,
            SegmentName::Contemplatio => 3,
        }
    }
}

impl Display for SegmentName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SegmentName::Lectio => write!(f, "Lectio"),
            SegmentName::Meditatio => write!(f, "Meditatio"),
            SegmentName::Oratio => write!(f, "Oratio"),
            SegmentName::Contemplatio => write!(f, "Contemplatio"),
        }
    }
}

/// A positive whole number of minutes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Minutes(NonZeroU32);

impl Minutes {
    pub const DEFAULT: Minutes = match NonZeroU32::new(5) {
        Some(n) => Minutes(n),
        None => unreachable!(),
    };

    pub fn new(minutes: u32) -> Option<Minutes> {
        NonZeroU32::new(minutes).map(Minutes)
    }

    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// Parses user input, falling back to [`Minutes::DEFAULT`] for anything
    /// that is empty, non-numeric, zero or negative.
    pub fn value_or_default(input: &str) -> Minutes {
        input.parse().unwrap_or(Minutes::DEFAULT)
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.get()) * 60_000)
    }
}

impl Default for Minutes {
    fn default() -> Self {
        Minutes::DEFAULT
    }
}

impl From<Minutes> for u32 {
    fn from(minutes: Minutes) -> Self {
        minutes.get()
    }
}

impl TryFrom<u32> for Minutes {
    type Error = ParseMinutesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Minutes::new(value).ok_or(ParseMinutesError::NotPositive)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseMinutesError {
    Empty,
    NotPositive,
    ParseIntError(std::num::ParseIntError),
}

impl Display for ParseMinutesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMinutesError::Empty => write!(f, "expected a number of minutes"),
            ParseMinutesError::NotPositive => write!(f, "minutes must be greater than zero"),
            ParseMinutesError::ParseIntError(e) => write!(f, "failed to parse integer: {e}"),
        }
    }
}

impl Error for ParseMinutesError {}

impl FromStr for Minutes {
    type Err = ParseMinutesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMinutesError::Empty);
        }
        if s.starts_with('-') {
            return Err(ParseMinutesError::NotPositive);
        }

        let minutes = s.parse::<u32>().map_err(ParseMinutesError::ParseIntError)?;
        Minutes::try_from(minutes)
    }
}

impl Display for Minutes {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub name: SegmentName,
    pub duration: Minutes,
    pub enabled: bool,
}

impl Segment {
    pub fn new(name: SegmentName, duration: Minutes) -> Segment {
        Segment {
            name,
            duration,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Segment {
        self.enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_invalid_input_to_five_minutes() {
        for input in ["", "   ", "abc", "0", "-3", "4.5", "99999999999"] {
            assert_eq!(Minutes::value_or_default(input), Minutes::DEFAULT, "{input:?}");
        }
        assert_eq!(Minutes::DEFAULT.get(), 5);
    }

    #[test]
    fn parses_positive_minutes() {
        assert_eq!(Minutes::value_or_default("12").get(), 12);
        assert_eq!(Minutes::value_or_default(" 7 ").get(), 7);
        assert_eq!("0".parse::<Minutes>(), Err(ParseMinutesError::NotPositive));
        assert_eq!("".parse::<Minutes>(), Err(ParseMinutesError::Empty));
    }

    #[test]
    fn converts_to_milliseconds() {
        let three = Minutes::new(3).unwrap();
        assert_eq!(three.as_duration().as_millis(), 180_000);
        assert_eq!(three.as_duration(), Duration::from_secs(180));
    }

    #[test]
    fn only_outer_segments_are_optional() {
        let optional: Vec<_> = SegmentName::ALL
            .into_iter()
            .filter(SegmentName::is_optional)
            .collect();
        assert_eq!(optional, [SegmentName::Lectio, SegmentName::Contemplatio]);
    }

    #[test]
    fn zero_is_rejected_when_deserializing() {
        assert!(serde_json::from_str::<Minutes>("0").is_err());
        assert_eq!(serde_json::from_str::<Minutes>("8").unwrap().get(), 8);
    }
}
