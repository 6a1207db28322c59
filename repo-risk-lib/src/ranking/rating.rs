use core::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Serialize, Serializer};

/// Scores above this are rated high risk.
pub const HIGH_RISK_THRESHOLD: u32 = 15;

/// Scores above this (and not above [`HIGH_RISK_THRESHOLD`]) are rated medium risk.
pub const MEDIUM_RISK_THRESHOLD: u32 = 10;

const NOT_APPLICABLE: &str = "N/A";

/// The total risk score, or a sentinel when the analysis could not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Points(u32),
    NotApplicable,
}

impl Score {
    #[must_use]
    pub const fn points(self) -> Option<u32> {
        match self {
            Self::Points(points) => Some(points),
            Self::NotApplicable => None,
        }
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Points(points) => write!(f, "{points}"),
            Self::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Points(points) => serializer.serialize_u32(*points),
            Self::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

/// The three-tier risk rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Low,
    Medium,
    High,
    NotApplicable,
}

impl Rating {
    #[must_use]
    pub const fn from_points(points: u32) -> Self {
        if points > HIGH_RISK_THRESHOLD {
            Self::High
        } else if points > MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn from_score(score: Score) -> Self {
        match score {
            Score::Points(points) => Self::from_points(points),
            Score::NotApplicable => Self::NotApplicable,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::NotApplicable => NOT_APPLICABLE,
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
