use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub feedback: String,
    pub category: String,
    pub student: String,
    pub student_group: String,
    pub posting_date: NaiveDate,
}

impl FeedbackRecord {
    /// Builds a record from nullable source columns.
    pub fn from_parts(
        feedback: Option<String>,
        category: Option<String>,
        student: Option<String>,
        student_group: Option<String>,
        posting_date: NaiveDate,
    ) -> Self {
        Self {
            feedback: feedback.unwrap_or_default(),
            category: normalize_category(category.as_deref()),
            student: student.unwrap_or_default(),
            student_group: student_group.unwrap_or_default(),
            posting_date,
        }
    }
}

pub fn normalize_category(category: Option<&str>) -> String {
    match category {
        Some(value) if !value.trim().is_empty() => value.to_string(),
        _ => UNKNOWN_CATEGORY.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PriorityLevel {
    High,
    Medium,
    Low,
}

impl PriorityLevel {
    pub fn rank(self) -> u8 {
        match self {
            PriorityLevel::High => 1,
            PriorityLevel::Medium => 2,
            PriorityLevel::Low => 3,
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PriorityLevel::High => "High",
            PriorityLevel::Medium => "Medium",
            PriorityLevel::Low => "Low",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub total_count: usize,
    pub negative_count: usize,
    pub negative_percentage: f64,
    pub average_sentiment: f64,
    pub priority_level: PriorityLevel,
    pub key_issues: String,
    pub action_required: String,
    #[serde(skip_serializing)]
    pub feedback_texts: Vec<String>,
    pub analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemCategory {
    pub category: String,
    pub negative_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub total_feedback: usize,
    pub total_negative: usize,
    pub category_count: usize,
    pub high_priority_count: usize,
    pub most_problematic: Option<ProblemCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentActivity {
    pub student: String,
    pub feedback_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Record-level statistics; lengths are in characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackInsights {
    pub total_feedback: usize,
    pub unique_students: usize,
    pub student_groups: usize,
    pub average_length: f64,
    pub longest_length: usize,
    pub shortest_length: usize,
    pub most_active_students: Vec<StudentActivity>,
    pub date_range: Option<DateRange>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackFilters {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub student_group: Option<String>,
    pub student: Option<String>,
    pub category: Option<String>,
}

impl FeedbackFilters {
    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        if let Some(from) = self.from_date {
            if record.posting_date < from {
                return false;
            }
        }
        if let Some(to) = self.to_date {
            if record.posting_date > to {
                return false;
            }
        }
        if let Some(group) = self.student_group.as_deref() {
            if record.student_group != group {
                return false;
            }
        }
        if let Some(student) = self.student.as_deref() {
            if record.student != student {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref() {
            if record.category != category {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, group: &str, day: u32) -> FeedbackRecord {
        FeedbackRecord {
            feedback: "fine".to_string(),
            category: category.to_string(),
            student: "EDU-STU-0001".to_string(),
            student_group: group.to_string(),
            posting_date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
        }
    }

    #[test]
    fn missing_or_blank_category_becomes_unknown() {
        assert_eq!(normalize_category(None), "Unknown");
        assert_eq!(normalize_category(Some("  ")), "Unknown");
        assert_eq!(normalize_category(Some("Trainer")), "Trainer");
    }

    #[test]
    fn from_parts_fills_defaults() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let record = FeedbackRecord::from_parts(None, None, Some("S1".into()), None, date);
        assert_eq!(record.feedback, "");
        assert_eq!(record.category, "Unknown");
        assert_eq!(record.student, "S1");
    }

    #[test]
    fn priority_ranks_high_first() {
        assert!(PriorityLevel::High < PriorityLevel::Medium);
        assert!(PriorityLevel::Medium < PriorityLevel::Low);
        assert_eq!(PriorityLevel::Low.rank(), 3);
        assert_eq!(PriorityLevel::High.to_string(), "High");
    }

    #[test]
    fn filters_are_inclusive_on_dates() {
        let filters = FeedbackFilters {
            from_date: NaiveDate::from_ymd_opt(2025, 3, 5),
            to_date: NaiveDate::from_ymd_opt(2025, 3, 10),
            student_group: Some("BATCH-A".to_string()),
            ..Default::default()
        };
        assert!(filters.matches(&record("Trainer", "BATCH-A", 5)));
        assert!(filters.matches(&record("Trainer", "BATCH-A", 10)));
        assert!(!filters.matches(&record("Trainer", "BATCH-A", 4)));
        assert!(!filters.matches(&record("Trainer", "BATCH-B", 7)));
    }
}
