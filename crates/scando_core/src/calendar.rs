//! crates/scando_core/src/calendar.rs
//!
//! Calendar bucketing: per-date agenda views derived from the document
//! collection. Everything here is recomputed on each call; nothing is cached.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{Document, DocumentId, Priority, Task};

/// A task tagged with the document it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaEntry<'a> {
    pub document_id: DocumentId,
    pub document_title: &'a str,
    #[serde(flatten)]
    pub task: &'a Task,
}

/// Every task of every document, in collection order then task order.
pub fn flatten_tasks(documents: &[Document]) -> impl Iterator<Item = AgendaEntry<'_>> {
    documents.iter().flat_map(|doc| {
        doc.tasks.iter().map(move |task| AgendaEntry {
            document_id: doc.id,
            document_title: &doc.title,
            task,
        })
    })
}

/// Tasks whose due date is exactly `date`, preserving flatten order.
pub fn tasks_for_date(
    documents: &[Document],
    date: NaiveDate,
) -> impl Iterator<Item = AgendaEntry<'_>> {
    flatten_tasks(documents).filter(move |entry| entry.task.due_date == Some(date))
}

/// Tasks due on `today`, as the caller sees the current date.
pub fn todays_tasks(
    documents: &[Document],
    today: NaiveDate,
) -> impl Iterator<Item = AgendaEntry<'_>> {
    tasks_for_date(documents, today)
}

/// Grid indicators for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub date: NaiveDate,
    pub task_count: usize,
    pub has_pending_high_priority: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Everything the month grid needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthOverview {
    pub year: i32,
    pub month: u32,
    /// Blank cells before day 1, with weeks starting on Sunday.
    pub leading_blank_days: u32,
    pub days: Vec<DaySummary>,
}

/// Summarizes `year`/`month` (1-based). Returns `None` for an invalid month.
pub fn month_overview(documents: &[Document], year: i32, month: u32) -> Option<MonthOverview> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let length = days_in_month(year, month)?;

    let days = first
        .iter_days()
        .take(length as usize)
        .map(|date| summarize_day(documents, date))
        .collect();

    Some(MonthOverview {
        year,
        month,
        leading_blank_days: first.weekday().num_days_from_sunday(),
        days,
    })
}

fn summarize_day(documents: &[Document], date: NaiveDate) -> DaySummary {
    let mut task_count = 0;
    let mut has_pending_high_priority = false;
    let mut preview = None;

    for entry in tasks_for_date(documents, date) {
        if preview.is_none() {
            preview = Some(entry.task.description.clone());
        }
        task_count += 1;
        has_pending_high_priority |=
            entry.task.priority == Priority::High && !entry.task.is_completed;
    }

    DaySummary {
        date,
        task_count,
        has_pending_high_priority,
        preview,
    }
}

/// Number of days in `year`/`month`, or `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 13), None);
    }

    #[test]
    fn empty_collection_yields_empty_month() {
        let overview = month_overview(&[], 2025, 1).expect("January is valid");
        assert_eq!(overview.days.len(), 31);
        // 2025-01-01 is a Wednesday.
        assert_eq!(overview.leading_blank_days, 3);
        assert!(overview.days.iter().all(|day| day.task_count == 0));
    }
}
