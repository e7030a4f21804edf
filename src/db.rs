use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use crate::models::{FeedbackFilters, FeedbackRecord};

pub async fn fetch_feedback(
    pool: &PgPool,
    filters: &FeedbackFilters,
) -> anyhow::Result<Vec<FeedbackRecord>> {
    let (query, binds) = feedback_query(filters);

    let mut rows = sqlx::query(&query);
    for bind in binds {
        rows = match bind {
            Bind::Date(value) => rows.bind(value),
            Bind::Text(value) => rows.bind(value),
        };
    }

    let records = rows
        .fetch_all(pool)
        .await
        .context("failed to fetch course feedback")?;
    let mut feedback = Vec::with_capacity(records.len());

    for row in records {
        feedback.push(FeedbackRecord::from_parts(
            row.get("feedback"),
            row.get("course_feedback_type"),
            row.get("student"),
            row.get("student_group"),
            row.get("posting_date"),
        ));
    }

    Ok(feedback)
}

#[derive(Debug, Clone, PartialEq)]
enum Bind {
    Date(NaiveDate),
    Text(String),
}

fn feedback_query(filters: &FeedbackFilters) -> (String, Vec<Bind>) {
    let mut query = String::from(
        "SELECT cf.course_feedback_type, cf.feedback, cf.posting_date, \
         cf.student, cf.student_group \
         FROM course_feedback cf",
    );
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(from) = filters.from_date {
        binds.push(Bind::Date(from));
        conditions.push(format!("cf.posting_date >= ${}", binds.len()));
    }
    if let Some(to) = filters.to_date {
        binds.push(Bind::Date(to));
        conditions.push(format!("cf.posting_date <= ${}", binds.len()));
    }
    if let Some(group) = &filters.student_group {
        binds.push(Bind::Text(group.clone()));
        conditions.push(format!("cf.student_group = ${}", binds.len()));
    }
    if let Some(student) = &filters.student {
        binds.push(Bind::Text(student.clone()));
        conditions.push(format!("cf.student = ${}", binds.len()));
    }
    if let Some(category) = &filters.category {
        binds.push(Bind::Text(category.clone()));
        conditions.push(format!("cf.course_feedback_type = ${}", binds.len()));
    }

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }
    query.push_str(" ORDER BY cf.course_feedback_type, cf.posting_date DESC");

    (query, binds)
}

pub fn load_csv(csv_path: &Path, filters: &FeedbackFilters) -> anyhow::Result<Vec<FeedbackRecord>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        #[serde(alias = "category")]
        course_feedback_type: Option<String>,
        feedback: Option<String>,
        posting_date: NaiveDate,
        student: Option<String>,
        student_group: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut rows = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let row = result.with_context(|| format!("invalid feedback row at line {}", index + 2))?;
        rows.push(row);
    }

    // same order as fetch_feedback: type ascending with missing types last, newest first
    rows.sort_by(|a, b| {
        sort_key(a.course_feedback_type.as_deref())
            .cmp(&sort_key(b.course_feedback_type.as_deref()))
            .then_with(|| b.posting_date.cmp(&a.posting_date))
    });

    let feedback = rows
        .into_iter()
        .map(|row| {
            FeedbackRecord::from_parts(
                row.feedback,
                row.course_feedback_type,
                row.student,
                row.student_group,
                row.posting_date,
            )
        })
        .filter(|record| filters.matches(record))
        .collect();

    Ok(feedback)
}

fn sort_key(category: Option<&str>) -> (bool, &str) {
    match category {
        Some(value) if !value.is_empty() => (false, value),
        _ => (true, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "feedback-triage-{}-{}.csv",
            name,
            std::process::id()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn query_without_filters_has_no_where_clause() {
        let (query, binds) = feedback_query(&FeedbackFilters::default());
        assert!(!query.contains("WHERE"));
        assert!(query.ends_with("ORDER BY cf.course_feedback_type, cf.posting_date DESC"));
        assert!(binds.is_empty());
    }

    #[test]
    fn query_numbers_placeholders_in_order() {
        let filters = FeedbackFilters {
            from_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            student_group: Some("BATCH-A".to_string()),
            category: Some("Trainer".to_string()),
            ..Default::default()
        };
        let (query, binds) = feedback_query(&filters);
        assert!(query.contains(
            "WHERE cf.posting_date >= $1 AND cf.student_group = $2 AND cf.course_feedback_type = $3"
        ));
        assert_eq!(
            binds,
            vec![
                Bind::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
                Bind::Text("BATCH-A".to_string()),
                Bind::Text("Trainer".to_string()),
            ]
        );
    }

    #[test]
    fn csv_rows_are_normalized_and_filtered() {
        let path = write_fixture(
            "normalize",
            "course_feedback_type,feedback,posting_date,student,student_group\n\
             Trainer,very good,2025-02-03,EDU-STU-001,BATCH-A\n\
             ,,2025-02-04,EDU-STU-002,BATCH-A\n\
             Facilities,too slow,2025-02-05,EDU-STU-003,BATCH-B\n",
        );
        let filters = FeedbackFilters {
            student_group: Some("BATCH-A".to_string()),
            ..Default::default()
        };

        let records = load_csv(&path, &filters).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].category, "Trainer");
        assert_eq!(records[1].category, "Unknown");
        assert_eq!(records[1].feedback, "");
    }

    #[test]
    fn csv_reports_bad_dates() {
        let path = write_fixture(
            "bad-date",
            "course_feedback_type,feedback,posting_date,student,student_group\n\
             Trainer,good,not-a-date,EDU-STU-001,BATCH-A\n",
        );
        let result = load_csv(&path, &FeedbackFilters::default());
        std::fs::remove_file(&path).ok();

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("line 2"));
    }

    #[test]
    fn demo_file_aggregates_by_type() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/course_feedback.csv");
        let records = load_csv(&path, &FeedbackFilters::default()).unwrap();
        assert_eq!(records.len(), 7);

        let categories = crate::aggregate::aggregate(&records);
        let labels: Vec<(&str, usize, usize)> = categories
            .iter()
            .map(|c| (c.category.as_str(), c.total_count, c.negative_count))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Registration", 3, 2),
                ("Trainer", 2, 1),
                ("Facilities", 1, 0),
                ("Unknown", 1, 0),
            ]
        );
        assert!(categories[0]
            .key_issues
            .starts_with("'Process was confusing and too slow'"));
    }

    #[test]
    fn csv_rows_follow_database_ordering() {
        let path = write_fixture(
            "ordering",
            "course_feedback_type,feedback,posting_date,student,student_group\n\
             Trainer,bad,2025-02-01,EDU-STU-001,BATCH-A\n\
             ,poor,2025-02-09,EDU-STU-002,BATCH-A\n\
             Facilities,awful,2025-02-02,EDU-STU-003,BATCH-A\n\
             Trainer,terrible,2025-02-07,EDU-STU-004,BATCH-A\n",
        );
        let records = load_csv(&path, &FeedbackFilters::default()).unwrap();
        std::fs::remove_file(&path).ok();

        let order: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.category.as_str(), r.student.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Facilities", "EDU-STU-003"),
                ("Trainer", "EDU-STU-004"),
                ("Trainer", "EDU-STU-001"),
                ("Unknown", "EDU-STU-002"),
            ]
        );

        let trainer = crate::aggregate::aggregate(&records)
            .into_iter()
            .find(|c| c.category == "Trainer")
            .unwrap();
        assert!(trainer.key_issues.starts_with("'terrible' (Student: EDU-STU-004)"));
    }
}
