mod rating;
mod risk_factor;
mod risk_scorer;

pub use rating::{HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD, Rating, Score};
pub use risk_factor::{RiskCategory, RiskFactor};
pub use risk_scorer::{RiskAssessment, RiskScorer};
