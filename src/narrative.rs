//! Rule-based category narrative, used whenever a remote narrative is
//! unavailable. Pure function of its inputs.

use std::fmt::Write;

const THEME_LIMIT: usize = 5;

const NEGATIVE_THEMES: &[&str] = &[
    "bad",
    "poor",
    "terrible",
    "awful",
    "hate",
    "difficult",
    "confusing",
    "boring",
    "useless",
    "problem",
    "issue",
    "complaint",
    "disappointed",
    "frustrated",
];

const POSITIVE_THEMES: &[&str] = &[
    "good",
    "great",
    "excellent",
    "amazing",
    "helpful",
    "useful",
    "love",
    "enjoy",
    "like",
    "perfect",
    "outstanding",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Critical,
    Moderate,
    Low,
}

impl Tier {
    fn from_percentage(negative_percentage: f64) -> Self {
        if negative_percentage > 50.0 {
            Tier::Critical
        } else if negative_percentage > 25.0 {
            Tier::Moderate
        } else {
            Tier::Low
        }
    }

    fn banner(self) -> &'static str {
        match self {
            Tier::Critical => "🔴 **CRITICAL PRIORITY**",
            Tier::Moderate => "🟡 **MODERATE PRIORITY**",
            Tier::Low => "🟢 **LOW PRIORITY**",
        }
    }

    fn highlights(self) -> &'static [&'static str] {
        match self {
            Tier::Critical => &[
                "High negative feedback detected",
                "Immediate attention required",
                "Root cause analysis needed",
            ],
            Tier::Moderate => &[
                "Moderate negative feedback",
                "Review and improvement needed",
                "Monitor trends closely",
            ],
            Tier::Low => &[
                "Low negative feedback",
                "Continue current practices",
                "Minor optimizations only",
            ],
        }
    }

    fn recommendations(self) -> &'static [&'static str] {
        match self {
            Tier::Critical => &[
                "Conduct immediate user interviews",
                "Review and redesign the process",
                "Implement quick fixes for urgent issues",
                "Set up monitoring for improvements",
            ],
            Tier::Moderate => &[
                "Gather more detailed feedback",
                "Identify specific pain points",
                "Implement targeted improvements",
                "Follow up with affected users",
            ],
            Tier::Low => &[
                "Continue current practices",
                "Monitor for any changes",
                "Consider minor optimizations",
            ],
        }
    }
}

fn themes_in<'a>(corpus: &str, vocabulary: &[&'a str]) -> Vec<&'a str> {
    vocabulary
        .iter()
        .copied()
        .filter(|word| corpus.contains(word))
        .take(THEME_LIMIT)
        .collect()
}

pub fn negative_response_count(negative_percentage: f64, entry_count: usize) -> i64 {
    (negative_percentage * entry_count as f64 / 100.0).round() as i64
}

pub fn narrate<S: AsRef<str>>(category: &str, texts: &[S], negative_percentage: f64) -> String {
    let tier = Tier::from_percentage(negative_percentage);
    let corpus = texts
        .iter()
        .map(|text| text.as_ref())
        .collect::<Vec<&str>>()
        .join(" ")
        .to_lowercase();

    let mut output = String::new();
    let _ = writeln!(output, "📊 **{} Feedback Analysis**", category);
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", tier.banner());
    for line in tier.highlights() {
        let _ = writeln!(output, "• {}", line);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "🎯 **Key Themes Identified:**");
    let negative = themes_in(&corpus, NEGATIVE_THEMES);
    if !negative.is_empty() {
        let _ = writeln!(output, "• Negative themes: {}", negative.join(", "));
    }
    let positive = themes_in(&corpus, POSITIVE_THEMES);
    if !positive.is_empty() {
        let _ = writeln!(output, "• Positive themes: {}", positive.join(", "));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "⚠️ **Specific Issues:**");
    let _ = writeln!(output, "• {:.1}% of feedback is negative", negative_percentage);
    let _ = writeln!(output, "• {} total feedback entries", texts.len());
    let _ = writeln!(
        output,
        "• {} negative responses",
        negative_response_count(negative_percentage, texts.len())
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "💡 **Recommendations:**");
    for line in tier.recommendations() {
        let _ = writeln!(output, "• {}", line);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_strict() {
        assert_eq!(Tier::from_percentage(50.0), Tier::Moderate);
        assert_eq!(Tier::from_percentage(50.1), Tier::Critical);
        assert_eq!(Tier::from_percentage(25.0), Tier::Low);
        assert_eq!(Tier::from_percentage(25.1), Tier::Moderate);
    }

    #[test]
    fn critical_narrative_lists_metrics_and_actions() {
        let texts = ["bad trainer", "poor slides", "awful room", "good lunch"];
        let text = narrate("Trainer", &texts, 75.0);

        assert!(text.starts_with("📊 **Trainer Feedback Analysis**"));
        assert!(text.contains("🔴 **CRITICAL PRIORITY**"));
        assert!(text.contains("• Negative themes: bad, poor, awful\n"));
        assert!(text.contains("• Positive themes: good\n"));
        assert!(text.contains("• 75.0% of feedback is negative"));
        assert!(text.contains("• 4 total feedback entries"));
        assert!(text.contains("• 3 negative responses"));
        assert!(text.contains("• Conduct immediate user interviews"));
    }

    #[test]
    fn themes_follow_list_order_and_cap_at_five() {
        let texts = ["issue problem useless boring confusing difficult hate awful"];
        let text = narrate("Registration", &texts, 100.0);
        assert!(text.contains("• Negative themes: awful, hate, difficult, confusing, boring\n"));
    }

    #[test]
    fn low_tier_without_themes_omits_theme_lines() {
        let texts: [&str; 2] = ["", "fine"];
        let text = narrate("Unknown", &texts, 0.0);
        assert!(text.contains("🟢 **LOW PRIORITY**"));
        assert!(!text.contains("Negative themes"));
        assert!(!text.contains("Positive themes"));
        assert!(text.contains("• 0 negative responses"));
        assert!(text.contains("• Consider minor optimizations"));
    }

    #[test]
    fn negative_count_rounds_like_aggregator() {
        assert_eq!(negative_response_count(100.0 / 3.0, 3), 1);
        assert_eq!(negative_response_count(50.0, 3), 2);
        assert_eq!(negative_response_count(0.0, 0), 0);
    }

    #[test]
    fn narrate_is_deterministic() {
        let texts = vec!["too slow".to_string(), "great".to_string()];
        assert_eq!(
            narrate("Facilities", &texts, 50.0),
            narrate("Facilities", &texts, 50.0)
        );
    }
}
