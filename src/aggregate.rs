use std::collections::HashMap;

use crate::models::{
    AnalysisSummary, CategoryAggregate, FeedbackRecord, PriorityLevel, ProblemCategory,
};
use crate::sentiment;

pub const NO_ISSUES: &str = "No major issues identified";

const KEY_ISSUE_LIMIT: usize = 3;
const KEY_ISSUE_CHARS: usize = 100;

pub fn aggregate(records: &[FeedbackRecord]) -> Vec<CategoryAggregate> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&FeedbackRecord>> = HashMap::new();

    for record in records {
        let entry = groups.entry(record.category.as_str()).or_insert_with(|| {
            order.push(record.category.as_str());
            Vec::new()
        });
        entry.push(record);
    }

    let mut aggregates: Vec<CategoryAggregate> = order
        .into_iter()
        .filter_map(|category| {
            groups
                .get(category)
                .map(|entries| summarize_category(category, entries))
        })
        .collect();

    // stable: equal priorities keep first-seen order
    aggregates.sort_by_key(|aggregate| aggregate.priority_level.rank());
    aggregates
}

fn summarize_category(category: &str, entries: &[&FeedbackRecord]) -> CategoryAggregate {
    let scores: Vec<f64> = entries
        .iter()
        .map(|entry| sentiment::score(&entry.feedback))
        .collect();

    let total_count = entries.len();
    let negative_count = scores.iter().filter(|s| sentiment::is_negative(**s)).count();
    let negative_percentage = percentage(negative_count, total_count);
    let average_sentiment = if total_count == 0 {
        0.0
    } else {
        scores.iter().sum::<f64>() / total_count as f64
    };

    CategoryAggregate {
        category: category.to_string(),
        total_count,
        negative_count,
        negative_percentage,
        average_sentiment,
        priority_level: classify_priority(negative_percentage, average_sentiment),
        key_issues: key_issues(entries, negative_count),
        action_required: action_required(negative_percentage).to_string(),
        feedback_texts: entries.iter().map(|entry| entry.feedback.clone()).collect(),
        analysis: None,
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

pub fn classify_priority(negative_percentage: f64, average_sentiment: f64) -> PriorityLevel {
    if negative_percentage >= 50.0 || average_sentiment <= -0.5 {
        PriorityLevel::High
    } else if negative_percentage >= 25.0 || average_sentiment <= -0.2 {
        PriorityLevel::Medium
    } else {
        PriorityLevel::Low
    }
}

pub fn key_issues(entries: &[&FeedbackRecord], negative_count: usize) -> String {
    if negative_count == 0 {
        return NO_ISSUES.to_string();
    }

    entries
        .iter()
        .filter(|entry| sentiment::is_negative(sentiment::score(&entry.feedback)))
        .take(KEY_ISSUE_LIMIT)
        .map(|entry| {
            format!(
                "'{}' (Student: {})",
                truncate(&entry.feedback, KEY_ISSUE_CHARS),
                entry.student
            )
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn action_required(negative_percentage: f64) -> &'static str {
    match negative_percentage {
        p if p >= 70.0 => "URGENT: Complete process review and immediate fixes required",
        p if p >= 50.0 => "CRITICAL: Major improvements needed - allocate resources",
        p if p >= 30.0 => "MODERATE: Review and implement targeted improvements",
        _ => "LOW PRIORITY: Continue monitoring, minor optimizations",
    }
}

pub fn summarize(aggregates: &[CategoryAggregate]) -> AnalysisSummary {
    AnalysisSummary {
        total_feedback: aggregates.iter().map(|a| a.total_count).sum(),
        total_negative: aggregates.iter().map(|a| a.negative_count).sum(),
        category_count: aggregates.len(),
        high_priority_count: aggregates
            .iter()
            .filter(|a| a.priority_level == PriorityLevel::High)
            .count(),
        most_problematic: aggregates.first().map(|a| ProblemCategory {
            category: a.category.clone(),
            negative_percentage: a.negative_percentage,
        }),
    }
}
