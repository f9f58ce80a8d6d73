use serde::{Serialize, Serializer};
use std::fmt;

/// One of the 24 hourly snapshots, `00` (latest) through `23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourCode(u8);

impl HourCode {
    pub const COUNT: u8 = 24;

    pub fn new(hour: u8) -> Option<Self> {
        (hour < Self::COUNT).then_some(HourCode(hour))
    }

    /// All hour codes in ascending order.
    pub fn all() -> impl Iterator<Item = HourCode> {
        (0..Self::COUNT).map(HourCode)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for HourCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl Serialize for HourCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
