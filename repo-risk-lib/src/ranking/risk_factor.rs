use serde::{Deserialize, Serialize};
use strum::Display;

/// The report section a risk factor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum RiskCategory {
    Sustainability,
    Security,
    License,
    Dependencies,
    #[strum(serialize = "Development Quality")]
    DevelopmentQuality,
    Community,
    Releases,
}

/// A weighted, human-readable contributor to the total risk score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub weight: u32,
    pub message: String,
    pub category: RiskCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_names() {
        assert_eq!(RiskCategory::DevelopmentQuality.to_string(), "Development Quality");
        assert_eq!(RiskCategory::Security.to_string(), "Security");
    }
}
