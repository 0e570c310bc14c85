//! crates/scando_core/src/study_plan.rs
//!
//! Date arithmetic for study plans. Schedule entry `n` is taken to fall `n`
//! days after the day the plan is viewed.

use chrono::{Days, NaiveDate};

use crate::domain::{StudyDay, StudyPlan};

/// The day the last scheduled session is behind us.
pub fn estimated_completion(plan: &StudyPlan, today: NaiveDate) -> Option<NaiveDate> {
    let days = u64::try_from(plan.schedule.len()).ok()?;
    today.checked_add_days(Days::new(days))
}

/// The schedule entry that lands on `date`, if any.
pub fn schedule_for_date(plan: &StudyPlan, today: NaiveDate, date: NaiveDate) -> Option<&StudyDay> {
    let offset = date.signed_duration_since(today).num_days();
    usize::try_from(offset)
        .ok()
        .and_then(|index| plan.schedule.get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StudySession;

    fn plan(days: usize) -> StudyPlan {
        StudyPlan {
            overview: "Thermodynamics".into(),
            prerequisites: vec!["Calculator".into()],
            schedule: (1..=days)
                .map(|n| StudyDay {
                    day: format!("Day {}", n),
                    sessions: vec![StudySession {
                        topic: format!("Chapter {}", n),
                        duration: "45 min".into(),
                        activity: "Read and summarize".into(),
                        technique: "Feynman".into(),
                    }],
                })
                .collect(),
            tips: vec!["Sleep".into()],
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn completion_is_today_plus_schedule_length() {
        assert_eq!(
            estimated_completion(&plan(7), date(2025, 1, 28)),
            Some(date(2025, 2, 4))
        );
    }

    #[test]
    fn schedule_maps_offsets_from_today() {
        let plan = plan(3);
        let today = date(2025, 3, 1);
        assert_eq!(
            schedule_for_date(&plan, today, today).map(|d| d.day.as_str()),
            Some("Day 1")
        );
        assert_eq!(
            schedule_for_date(&plan, today, date(2025, 3, 3)).map(|d| d.day.as_str()),
            Some("Day 3")
        );
        assert!(schedule_for_date(&plan, today, date(2025, 3, 4)).is_none());
        assert!(schedule_for_date(&plan, today, date(2025, 2, 28)).is_none());
    }
}
