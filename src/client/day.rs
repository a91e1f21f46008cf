use chrono::NaiveDate;

use super::api::ApiClient;
use super::error::Result;
use super::track;
use crate::models::{
    CreateSession, CreateSessionEntry, EntryStatus, Exercise, ExerciseFilter, MuscleGroup,
    Session, SessionFilter,
};

/// One row of the day table: an entry tagged with the session it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEntry {
    pub id: i64,
    pub session_id: i64,
    pub date: NaiveDate,
    pub exercise: Exercise,
    pub weight: String,
    pub status: EntryStatus,
}

#[derive(Debug)]
pub struct DayView {
    api: ApiClient,
    pub date: NaiveDate,
    pub sessions: Vec<Session>,
    pub exercises: Vec<Exercise>,
    pub muscle_groups: Vec<MuscleGroup>,
    pub error: Option<String>,
}

impl DayView {
    pub fn new(api: ApiClient, date: NaiveDate) -> Self {
        Self {
            api,
            date,
            sessions: Vec::new(),
            exercises: Vec::new(),
            muscle_groups: Vec::new(),
            error: None,
        }
    }

    /// Load the day's sessions plus the exercise and muscle group catalogs.
    pub async fn load(&mut self) -> Result<()> {
        let result = self.fetch_all().await;
        track(&mut self.error, "Failed to load sessions", result)
    }

    /// Switch to another date and load it.
    pub async fn load_day(&mut self, date: NaiveDate) -> Result<()> {
        self.date = date;
        self.load().await
    }

    /// Log an exercise for the current date, creating the day's session if needed.
    ///
    /// Returns `Ok(false)` without contacting the server when no exercise is
    /// selected or the weight is blank.
    pub async fn add_entry(
        &mut self,
        exercise_id: Option<i64>,
        weight: &str,
        status: EntryStatus,
    ) -> Result<bool> {
        let exercise_id = match exercise_id {
            Some(id) if !weight.trim().is_empty() => id,
            _ => return Ok(false),
        };

        let result = self.create_entry(exercise_id, weight, status).await;
        track(&mut self.error, "Failed to add exercise", result).map(|_| true)
    }

    /// Delete an entry, then drop any session left without entries.
    pub async fn delete_entry(&mut self, entry_id: i64) -> Result<()> {
        let result = self.remove_entry(entry_id).await;
        track(&mut self.error, "Failed to delete exercise", result)
    }

    /// Session that receives new entries: the first one held for the view's date.
    pub fn target_session(&self) -> Option<&Session> {
        self.sessions.iter().find(|s| s.date == self.date)
    }

    /// All entries of all sessions on this date, flattened in session order.
    pub fn entries(&self) -> Vec<DayEntry> {
        self.sessions
            .iter()
            .flat_map(|session| {
                session.entries.iter().map(move |entry| DayEntry {
                    id: entry.id,
                    session_id: session.id,
                    date: session.date,
                    exercise: entry.exercise.clone(),
                    weight: entry.weight.clone(),
                    status: entry.status,
                })
            })
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.completed).count()
    }

    /// Exercise picker options, narrowed to one muscle group when given.
    pub fn exercises_for_group(&self, muscle_group_id: Option<i64>) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| muscle_group_id.map_or(true, |id| e.muscle_group.id == id))
            .collect()
    }

    async fn fetch_all(&mut self) -> Result<()> {
        // Nothing from a previous date may survive a failed fetch
        self.sessions.clear();
        self.exercises.clear();
        self.muscle_groups.clear();

        self.refresh_sessions().await?;
        self.exercises = self.api.list_exercises(&ExerciseFilter::default()).await?;
        self.muscle_groups = self.api.list_muscle_groups().await?;
        Ok(())
    }

    async fn refresh_sessions(&mut self) -> Result<()> {
        self.sessions = self.api.list_sessions(&SessionFilter::on(self.date)).await?;
        Ok(())
    }

    async fn create_entry(
        &mut self,
        exercise_id: i64,
        weight: &str,
        status: EntryStatus,
    ) -> Result<()> {
        let session_id = match self.target_session() {
            Some(session) => session.id,
            None => {
                let session = self
                    .api
                    .create_session(&CreateSession {
                        date: self.date,
                        notes: String::new(),
                        completed: false,
                    })
                    .await?;
                tracing::debug!("Created session {} for {}", session.id, self.date);
                let id = session.id;
                self.sessions = vec![session];
                id
            }
        };

        self.api
            .create_entry(&CreateSessionEntry {
                session: session_id,
                exercise: exercise_id,
                weight: weight.to_string(),
                status,
            })
            .await?;

        self.refresh_sessions().await
    }

    async fn remove_entry(&mut self, entry_id: i64) -> Result<()> {
        self.api.delete_entry(entry_id).await?;
        self.refresh_sessions().await?;

        let empty: Vec<i64> = self
            .sessions
            .iter()
            .filter(|s| s.entries.is_empty())
            .map(|s| s.id)
            .collect();
        for id in empty {
            tracing::debug!("Deleting empty session {}", id);
            self.api.delete_session(id).await?;
        }

        self.refresh_sessions().await
    }
}
