pub mod exercise;
pub mod muscle_group;
pub mod session_entry;
pub mod token;
pub mod user;
pub mod workout_session;

pub use exercise::{CreateExercise, Exercise, ExerciseFilter};
pub use muscle_group::{CreateExerciseType, CreateMuscleGroup, ExerciseType, MuscleGroup};
pub use session_entry::{CreateSessionEntry, EntryStatus, SessionEntry};
pub use token::{AuthTokens, RefreshRequest};
pub use user::{LoginCredentials, MessageResponse, RegisterRequest, RegisterResponse, User};
pub use workout_session::{CreateSession, Session, SessionFilter, UpdateSession};

/// Row mapping shared by the repositories.
///
/// Implementations read columns by name, so every query feeding a model must
/// alias its columns to the names that model expects.
pub trait FromSqliteRow: Sized {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>;
}
