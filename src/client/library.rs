use std::collections::BTreeSet;

use super::api::ApiClient;
use super::error::{ClientError, Result};
use super::track;
use crate::models::{CreateExercise, Exercise, ExerciseFilter};

/// Muscle group selector of the library screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GroupFilter {
    #[default]
    All,
    Group(String),
}

impl GroupFilter {
    /// "All" selects everything; any other label selects that group.
    pub fn from_label(label: &str) -> Self {
        if label == "All" {
            GroupFilter::All
        } else {
            GroupFilter::Group(label.to_string())
        }
    }
}

#[derive(Debug)]
pub struct ExerciseLibrary {
    api: ApiClient,
    pub exercises: Vec<Exercise>,
    /// Sorted, distinct muscle group names present in the catalog.
    pub groups: Vec<String>,
    pub error: Option<String>,
}

impl ExerciseLibrary {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            exercises: Vec::new(),
            groups: Vec::new(),
            error: None,
        }
    }

    pub async fn load_catalog(&mut self) -> Result<()> {
        let result = self.fetch_catalog().await;
        track(&mut self.error, "Failed to load exercises", result)
    }

    /// Client-side filter over the loaded catalog.
    pub fn filter_by(&self, filter: &GroupFilter) -> Vec<&Exercise> {
        self.exercises
            .iter()
            .filter(|e| match filter {
                GroupFilter::All => true,
                GroupFilter::Group(name) => &e.muscle_group.name == name,
            })
            .collect()
    }

    /// Create an exercise by muscle group name, creating the group (and the
    /// type, best effort) as needed, then reload the catalog.
    pub async fn create_exercise(
        &mut self,
        name: &str,
        group_name: &str,
        type_name: Option<&str>,
    ) -> Result<Exercise> {
        let result = self.create(name, group_name, type_name).await;
        track(&mut self.error, "Failed to create exercise", result)
    }

    async fn fetch_catalog(&mut self) -> Result<()> {
        self.exercises = self.api.list_exercises(&ExerciseFilter::default()).await?;
        self.groups = self
            .exercises
            .iter()
            .map(|e| e.muscle_group.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Ok(())
    }

    async fn create(
        &mut self,
        name: &str,
        group_name: &str,
        type_name: Option<&str>,
    ) -> Result<Exercise> {
        let name = name.trim();
        let group_name = group_name.trim();
        if name.is_empty() || group_name.is_empty() {
            return Err(ClientError::Validation(
                "Exercise name and muscle group are required".to_string(),
            ));
        }

        let muscle_group_id = self.resolve_muscle_group(group_name).await?;

        let mut exercise_type_id = None;
        if let Some(type_name) = type_name.map(str::trim).filter(|t| !t.is_empty()) {
            match self.api.create_exercise_type(type_name).await {
                Ok(created) => exercise_type_id = Some(created.id),
                Err(e) => {
                    tracing::warn!("Could not create exercise type {:?}, continuing: {}", type_name, e)
                }
            }
        }

        let exercise = self
            .api
            .create_exercise(&CreateExercise {
                exercise_name: name.to_string(),
                muscle_group: muscle_group_id,
                exercise_type: exercise_type_id,
            })
            .await?;

        self.fetch_catalog().await?;
        Ok(exercise)
    }

    /// Create the group; if that fails, look for an exact name match instead.
    async fn resolve_muscle_group(&self, group_name: &str) -> Result<i64> {
        match self.api.create_muscle_group(group_name).await {
            Ok(group) => Ok(group.id),
            Err(e) => {
                tracing::debug!("Creating muscle group {:?} failed ({}), searching", group_name, e);
                self.api
                    .list_muscle_groups()
                    .await
                    .ok()
                    .and_then(|groups| groups.into_iter().find(|g| g.name == group_name))
                    .map(|g| g.id)
                    .ok_or_else(|| ClientError::MuscleGroupUnavailable(group_name.to_string()))
            }
        }
    }
}
