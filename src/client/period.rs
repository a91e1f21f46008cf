use std::collections::HashMap;

use chrono::{Datelike, Duration, Months, NaiveDate};

use super::api::ApiClient;
use super::error::{ClientError, Result};
use super::track;
use crate::models::{Session, SessionFilter};

/// Per-day aggregate for the calendar grids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayStats {
    pub date: NaiveDate,
    pub exercise_count: usize,
    pub session_count: usize,
    pub completed: bool,
    /// Distinct names, in the order first seen.
    pub muscle_groups: Vec<String>,
}

impl DayStats {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            exercise_count: 0,
            session_count: 0,
            completed: false,
            muscle_groups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodSummary {
    pub total_exercises: usize,
    pub days_worked_out: usize,
    pub completed_days: usize,
}

impl PeriodSummary {
    pub fn from_days(days: &[DayStats]) -> Self {
        Self {
            total_exercises: days.iter().map(|d| d.exercise_count).sum(),
            days_worked_out: days.iter().filter(|d| d.session_count > 0).count(),
            completed_days: days.iter().filter(|d| d.completed).count(),
        }
    }
}

/// Number of days in a period on which a muscle group was trained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFrequency {
    pub name: String,
    pub days: usize,
}

/// One `DayStats` per calendar day in `[start, end]`, in date order.
/// Sessions outside the range are ignored; an inverted range yields nothing.
pub fn aggregate(sessions: &[Session], start: NaiveDate, end: NaiveDate) -> Vec<DayStats> {
    let mut by_date: HashMap<NaiveDate, Vec<&Session>> = HashMap::new();
    for session in sessions {
        by_date.entry(session.date).or_default().push(session);
    }

    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| {
            let mut stats = DayStats::empty(day);
            for session in by_date.get(&day).into_iter().flatten() {
                stats.session_count += 1;
                stats.exercise_count += session.entries.len();
                stats.completed |= session.completed;
                for entry in &session.entries {
                    let name = &entry.exercise.muscle_group.name;
                    if !stats.muscle_groups.contains(name) {
                        stats.muscle_groups.push(name.clone());
                    }
                }
            }
            stats
        })
        .collect()
}

/// Days-per-group table, most frequent first; ties keep encounter order.
pub fn muscle_group_frequency(days: &[DayStats]) -> Vec<GroupFrequency> {
    let mut table: Vec<GroupFrequency> = Vec::new();
    for day in days {
        for name in &day.muscle_groups {
            match table.iter_mut().find(|g| &g.name == name) {
                Some(group) => group.days += 1,
                None => table.push(GroupFrequency {
                    name: name.clone(),
                    days: 1,
                }),
            }
        }
    }
    // sort_by is stable
    table.sort_by(|a, b| b.days.cmp(&a.days));
    table
}

/// Monday-to-Sunday week containing `date`.
pub fn week_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (start, start + Duration::days(6))
}

/// First and last day of the month containing `date`.
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date - Duration::days(i64::from(date.day0()));
    let mut end = start;
    while let Some(next) = end.succ_opt() {
        if next.month() != start.month() {
            break;
        }
        end = next;
    }
    (start, end)
}

/// Rows of seven for the month grid; the last row is not padded.
pub fn calendar_rows(days: &[DayStats]) -> Vec<&[DayStats]> {
    days.chunks(7).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    Week,
    Month,
}

impl PeriodKind {
    pub fn range(self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            PeriodKind::Week => week_range(anchor),
            PeriodKind::Month => month_range(anchor),
        }
    }

    /// Move `anchor` by `steps` weeks or months (negative goes back).
    pub fn shift(self, anchor: NaiveDate, steps: i32) -> NaiveDate {
        match self {
            PeriodKind::Week => anchor + Duration::days(7 * i64::from(steps)),
            PeriodKind::Month => {
                let months = Months::new(steps.unsigned_abs());
                let shifted = if steps >= 0 {
                    anchor.checked_add_months(months)
                } else {
                    anchor.checked_sub_months(months)
                };
                shifted.unwrap_or(anchor)
            }
        }
    }
}

/// Week or month screen state.
#[derive(Debug)]
pub struct PeriodView {
    api: ApiClient,
    pub kind: PeriodKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayStats>,
    pub summary: PeriodSummary,
    pub frequency: Vec<GroupFrequency>,
    pub error: Option<String>,
}

impl PeriodView {
    pub fn new(api: ApiClient, kind: PeriodKind, anchor: NaiveDate) -> Self {
        let (start, end) = kind.range(anchor);
        Self {
            api,
            kind,
            start,
            end,
            days: Vec::new(),
            summary: PeriodSummary::default(),
            frequency: Vec::new(),
            error: None,
        }
    }

    /// Fetch and aggregate every session in `[start, end]`.
    pub async fn load_period(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        let result = self.fetch(self.kind, start, end).await;
        track(&mut self.error, "Failed to load sessions", result)
    }

    /// Snap to the week or month containing `anchor` and load it.
    ///
    /// `kind` only changes once the sessions have arrived.
    pub async fn load(&mut self, kind: PeriodKind, anchor: NaiveDate) -> Result<()> {
        let (start, end) = kind.range(anchor);
        let result = self.fetch(kind, start, end).await;
        track(&mut self.error, "Failed to load sessions", result)
    }

    pub async fn reload(&mut self) -> Result<()> {
        self.load_period(self.start, self.end).await
    }

    pub async fn previous(&mut self) -> Result<()> {
        let anchor = self.kind.shift(self.start, -1);
        self.load(self.kind, anchor).await
    }

    pub async fn next(&mut self) -> Result<()> {
        let anchor = self.kind.shift(self.start, 1);
        self.load(self.kind, anchor).await
    }

    pub fn rows(&self) -> Vec<&[DayStats]> {
        calendar_rows(&self.days)
    }

    async fn fetch(&mut self, kind: PeriodKind, start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start > end {
            return Err(ClientError::Validation(format!(
                "Period start {} is after end {}",
                start, end
            )));
        }

        let sessions = self
            .api
            .list_sessions(&SessionFilter::between(start, end))
            .await?;

        self.kind = kind;
        self.start = start;
        self.end = end;
        self.days = aggregate(&sessions, start, end);
        self.summary = PeriodSummary::from_days(&self.days);
        self.frequency = muscle_group_frequency(&self.days);
        Ok(())
    }
}
