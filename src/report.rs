use std::fmt::Write;

use serde::Serialize;

use crate::models::{AnalysisSummary, CategoryAggregate, FeedbackFilters, FeedbackInsights};

#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub summary: &'a AnalysisSummary,
    pub insights: &'a FeedbackInsights,
    pub categories: &'a [CategoryAggregate],
}

pub fn build_json(
    summary: &AnalysisSummary,
    insights: &FeedbackInsights,
    categories: &[CategoryAggregate],
) -> anyhow::Result<String> {
    let report = AnalysisReport {
        summary,
        insights,
        categories,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn scope_label(filters: &FeedbackFilters) -> String {
    let mut parts = Vec::new();
    match (filters.from_date, filters.to_date) {
        (Some(from), Some(to)) => parts.push(format!("{} to {}", from, to)),
        (Some(from), None) => parts.push(format!("since {}", from)),
        (None, Some(to)) => parts.push(format!("until {}", to)),
        (None, None) => {}
    }
    if let Some(group) = &filters.student_group {
        parts.push(format!("group {}", group));
    }
    if let Some(student) = &filters.student {
        parts.push(format!("student {}", student));
    }
    if let Some(category) = &filters.category {
        parts.push(format!("type {}", category));
    }

    if parts.is_empty() {
        "all feedback".to_string()
    } else {
        parts.join(", ")
    }
}

fn write_insights(output: &mut String, insights: &FeedbackInsights) {
    let _ = writeln!(output, "## Feedback Insights");
    let _ = writeln!(output, "- Total feedback: {}", insights.total_feedback);
    let _ = writeln!(output, "- Unique students: {}", insights.unique_students);
    let _ = writeln!(output, "- Student groups: {}", insights.student_groups);
    let _ = writeln!(
        output,
        "- Feedback length: avg {:.1}, longest {}, shortest {} characters",
        insights.average_length, insights.longest_length, insights.shortest_length
    );
    if let Some(range) = &insights.date_range {
        let _ = writeln!(output, "- Date range: {} to {}", range.from, range.to);
    }
    if !insights.most_active_students.is_empty() {
        let _ = writeln!(output, "- Most active students:");
        for activity in &insights.most_active_students {
            let _ = writeln!(
                output,
                "  - {}: {} feedback",
                activity.student, activity.feedback_count
            );
        }
    }
}

pub fn build_markdown(
    filters: &FeedbackFilters,
    summary: &AnalysisSummary,
    insights: &FeedbackInsights,
    categories: &[CategoryAggregate],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Course Feedback Analysis");
    let _ = writeln!(output, "Generated for {}", scope_label(filters));
    let _ = writeln!(output);

    if categories.is_empty() {
        let _ = writeln!(output, "No feedback found for this selection.");
        return output;
    }

    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Feedback types: {}", summary.category_count);
    let _ = writeln!(output, "- High priority types: {}", summary.high_priority_count);
    let _ = writeln!(
        output,
        "- Total negative issues: {} of {} entries",
        summary.total_negative, summary.total_feedback
    );
    if let Some(top) = &summary.most_problematic {
        let _ = writeln!(
            output,
            "- Most problematic: {} ({:.1}% negative)",
            top.category, top.negative_percentage
        );
    }

    let _ = writeln!(output);
    write_insights(&mut output, insights);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Feedback Types by Priority");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "| Type | Priority | Total | Negative | Negative % | Avg Sentiment | Action |"
    );
    let _ = writeln!(output, "|---|---|---|---|---|---|---|");
    for category in categories {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {:.1}% | {:.2} | {} |",
            category.category,
            category.priority_level,
            category.total_count,
            category.negative_count,
            category.negative_percentage,
            category.average_sentiment,
            category.action_required
        );
    }

    for category in categories {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "## {} ({} Priority)",
            category.category, category.priority_level
        );
        let _ = writeln!(output, "Key issues: {}", category.key_issues);
        if let Some(analysis) = &category.analysis {
            let _ = writeln!(output);
            let _ = writeln!(output, "{}", analysis.trim_end());
        }
    }

    output
}
