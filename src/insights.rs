//! Record-level rollup over the loaded feedback, independent of sentiment.

use std::collections::{HashMap, HashSet};

use crate::models::{DateRange, FeedbackInsights, FeedbackRecord, StudentActivity};

const TOP_STUDENTS: usize = 5;

pub fn insights(records: &[FeedbackRecord]) -> FeedbackInsights {
    let unique_students: HashSet<&str> = records.iter().map(|r| r.student.as_str()).collect();
    let student_groups: HashSet<&str> = records.iter().map(|r| r.student_group.as_str()).collect();

    let lengths: Vec<usize> = records.iter().map(|r| r.feedback.chars().count()).collect();
    let average_length = if lengths.is_empty() {
        0.0
    } else {
        lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
    };

    FeedbackInsights {
        total_feedback: records.len(),
        unique_students: unique_students.len(),
        student_groups: student_groups.len(),
        average_length,
        longest_length: lengths.iter().copied().max().unwrap_or(0),
        shortest_length: lengths.iter().copied().min().unwrap_or(0),
        most_active_students: most_active(records),
        date_range: date_range(records),
    }
}

fn most_active(records: &[FeedbackRecord]) -> Vec<StudentActivity> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let count = counts.entry(record.student.as_str()).or_insert_with(|| {
            order.push(record.student.as_str());
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<StudentActivity> = order
        .into_iter()
        .map(|student| StudentActivity {
            student: student.to_string(),
            feedback_count: counts.get(student).copied().unwrap_or(0),
        })
        .collect();

    // stable: ties keep first-seen order
    ranked.sort_by(|a, b| b.feedback_count.cmp(&a.feedback_count));
    ranked.truncate(TOP_STUDENTS);
    ranked
}

fn date_range(records: &[FeedbackRecord]) -> Option<DateRange> {
    let from = records.iter().map(|r| r.posting_date).min()?;
    let to = records.iter().map(|r| r.posting_date).max()?;
    Some(DateRange { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(student: &str, group: &str, feedback: &str, day: u32) -> FeedbackRecord {
        FeedbackRecord {
            feedback: feedback.to_string(),
            category: "Trainer".to_string(),
            student: student.to_string(),
            student_group: group.to_string(),
            posting_date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
        }
    }

    #[test]
    fn empty_input_has_zeroed_insights() {
        let result = insights(&[]);
        assert_eq!(result.total_feedback, 0);
        assert_eq!(result.unique_students, 0);
        assert_eq!(result.student_groups, 0);
        assert_eq!(result.average_length, 0.0);
        assert_eq!(result.longest_length, 0);
        assert_eq!(result.shortest_length, 0);
        assert!(result.most_active_students.is_empty());
        assert!(result.date_range.is_none());
    }

    #[test]
    fn counts_lengths_and_dates() {
        let records = vec![
            record("S1", "BATCH-A", "good", 10),
            record("S2", "BATCH-A", "", 3),
            record("S1", "BATCH-B", "très bien", 21),
        ];
        let result = insights(&records);

        assert_eq!(result.total_feedback, 3);
        assert_eq!(result.unique_students, 2);
        assert_eq!(result.student_groups, 2);
        assert_eq!(result.longest_length, 9);
        assert_eq!(result.shortest_length, 0);
        assert!((result.average_length - 13.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            result.date_range,
            Some(DateRange {
                from: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
                to: NaiveDate::from_ymd_opt(2025, 6, 21).unwrap(),
            })
        );
    }

    #[test]
    fn most_active_ties_keep_first_seen_order_and_cap_at_five() {
        let records = vec![
            record("S1", "G", "a", 1),
            record("S2", "G", "a", 1),
            record("S3", "G", "a", 1),
            record("S2", "G", "a", 2),
            record("S4", "G", "a", 1),
            record("S5", "G", "a", 1),
            record("S6", "G", "a", 1),
            record("S6", "G", "a", 2),
        ];
        let ranked: Vec<(String, usize)> = insights(&records)
            .most_active_students
            .into_iter()
            .map(|a| (a.student, a.feedback_count))
            .collect();

        assert_eq!(
            ranked,
            vec![
                ("S2".to_string(), 2),
                ("S6".to_string(), 2),
                ("S1".to_string(), 1),
                ("S3".to_string(), 1),
                ("S4".to_string(), 1),
            ]
        );
    }
}
