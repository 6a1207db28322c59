use crate::ranking::{Rating, RiskFactor, Score};
use clap::ValueEnum;
use core::fmt::Write;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// When to color console output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Color when writing to a terminal
    #[default]
    Auto,

    /// Always color
    Always,

    /// Never color
    Never,
}

impl ColorMode {
    /// Resolve `Auto` against whether stdout is a terminal.
    #[must_use]
    pub fn enabled(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::stdout().is_terminal(),
        }
    }
}

/// Produce the console summary: a headline with the rating and score, then one line per factor.
#[must_use]
pub fn generate(repo: &str, score: Score, rating: Rating, factors: &[RiskFactor], colored: bool) -> String {
    let mut out = String::new();

    let rating_text = format!("{rating} risk");
    let rating_text = if colored {
        match rating {
            Rating::Low => rating_text.green().bold().to_string(),
            Rating::Medium => rating_text.yellow().bold().to_string(),
            Rating::High | Rating::NotApplicable => rating_text.red().bold().to_string(),
        }
    } else {
        rating_text
    };

    let repo_text = if colored { repo.bold().to_string() } else { repo.to_string() };
    let _ = writeln!(out, "{repo_text}: {rating_text} (score {score})");

    for factor in factors {
        let weight = format!("+{}", factor.weight);
        let weight = if colored { weight.dimmed().to_string() } else { weight };
        let _ = writeln!(out, "  {weight:>3} {} [{}]", factor.message, factor.category);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::RiskCategory;

    #[test]
    fn test_plain_summary() {
        let factors = vec![
            RiskFactor {
                weight: 3,
                message: "No license".to_string(),
                category: RiskCategory::License,
            },
            RiskFactor {
                weight: 1,
                message: "No CI configuration".to_string(),
                category: RiskCategory::DevelopmentQuality,
            },
        ];

        let out = generate("octo/widgets", Score::Points(4), Rating::Low, &factors, false);
        assert_eq!(
            out,
            "octo/widgets: Low risk (score 4)\n   +3 No license [License]\n   +1 No CI configuration [Development Quality]\n"
        );
    }

    #[test]
    fn test_not_applicable_summary() {
        let out = generate("octo/widgets", Score::NotApplicable, Rating::NotApplicable, &[], false);
        assert_eq!(out, "octo/widgets: N/A risk (score N/A)\n");
    }

    #[test]
    fn test_colored_summary_has_escapes() {
        let out = generate("octo/widgets", Score::Points(20), Rating::High, &[], true);
        assert!(out.contains('\u{1b}'));
        assert!(out.contains("High risk"));
    }

    #[test]
    fn test_explicit_modes() {
        assert!(ColorMode::Always.enabled());
        assert!(!ColorMode::Never.enabled());
    }
}
