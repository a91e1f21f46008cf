use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use super::config::ClientConfig;
use super::credentials::AuthSession;
use super::error::{ClientError, Result};
use crate::models::{
    AuthTokens, CreateExercise, CreateExerciseType, CreateMuscleGroup, CreateSession,
    CreateSessionEntry, Exercise, ExerciseFilter, ExerciseType, LoginCredentials, MuscleGroup,
    RefreshRequest, RegisterRequest, RegisterResponse, Session, SessionEntry, SessionFilter,
    UpdateSession, User,
};

/// Typed HTTP client for the fittrack API.
///
/// The auth context is explicit: a client built with `new` is anonymous and
/// `with_session` yields a copy that sends `Authorization: Bearer <access>`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Option<AuthSession>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url.trim())?;
        // `Url::join` drops the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            session: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_url)
    }

    pub fn with_session(&self, session: AuthSession) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session: Some(session),
        }
    }

    pub fn without_session(&self) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            session: None,
        }
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self.base_url.join(path)?;
        tracing::debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if let Some(session) = &self.session {
            builder = builder.bearer_auth(&session.tokens.access);
        }
        Ok(builder)
    }

    async fn read_body(builder: RequestBuilder) -> Result<String> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
        let body = Self::read_body(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_empty(builder: RequestBuilder) -> Result<()> {
        Self::read_body(builder).await?;
        Ok(())
    }

    // Sessions
    pub async fn list_sessions(&self, filter: &SessionFilter) -> Result<Vec<Session>> {
        Self::send(self.request(Method::GET, "sessions/")?.query(filter)).await
    }

    pub async fn create_session(&self, session: &CreateSession) -> Result<Session> {
        Self::send(self.request(Method::POST, "sessions/")?.json(session)).await
    }

    pub async fn get_session(&self, id: i64) -> Result<Session> {
        Self::send(self.request(Method::GET, &format!("sessions/{id}/"))?).await
    }

    pub async fn update_session(&self, id: i64, update: &UpdateSession) -> Result<Session> {
        Self::send(
            self.request(Method::PATCH, &format!("sessions/{id}/"))?
                .json(update),
        )
        .await
    }

    pub async fn delete_session(&self, id: i64) -> Result<()> {
        Self::send_empty(self.request(Method::DELETE, &format!("sessions/{id}/"))?).await
    }

    // Session entries
    pub async fn create_entry(&self, entry: &CreateSessionEntry) -> Result<SessionEntry> {
        Self::send(self.request(Method::POST, "session-entries/")?.json(entry)).await
    }

    pub async fn delete_entry(&self, id: i64) -> Result<()> {
        Self::send_empty(self.request(Method::DELETE, &format!("session-entries/{id}/"))?).await
    }

    // Catalog
    pub async fn list_exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>> {
        Self::send(self.request(Method::GET, "exercises/")?.query(filter)).await
    }

    pub async fn create_exercise(&self, exercise: &CreateExercise) -> Result<Exercise> {
        Self::send(self.request(Method::POST, "exercises/")?.json(exercise)).await
    }

    pub async fn list_muscle_groups(&self) -> Result<Vec<MuscleGroup>> {
        Self::send(self.request(Method::GET, "muscle-groups/")?).await
    }

    pub async fn create_muscle_group(&self, name: &str) -> Result<MuscleGroup> {
        let body = CreateMuscleGroup {
            muscle_group_name: name.to_string(),
        };
        Self::send(self.request(Method::POST, "muscle-groups/")?.json(&body)).await
    }

    pub async fn list_exercise_types(&self) -> Result<Vec<ExerciseType>> {
        Self::send(self.request(Method::GET, "exercise-types/")?).await
    }

    pub async fn create_exercise_type(&self, name: &str) -> Result<ExerciseType> {
        let body = CreateExerciseType {
            type_name: name.to_string(),
        };
        Self::send(self.request(Method::POST, "exercise-types/")?.json(&body)).await
    }

    // Auth
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let response: RegisterResponse =
            Self::send(self.request(Method::POST, "auth/register/")?.json(request)).await?;
        Ok(response.user)
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthTokens> {
        Self::send(self.request(Method::POST, "auth/login/")?.json(credentials)).await
    }

    /// Fetch the user behind `access_token`, independent of the attached session.
    pub async fn current_user(&self, access_token: &str) -> Result<User> {
        let builder = self
            .without_session()
            .request(Method::GET, "auth/me/")?
            .bearer_auth(access_token);
        Self::send(builder).await
    }

    /// Revoke the attached session's tokens on the server.
    pub async fn logout(&self) -> Result<()> {
        if self.session.is_none() {
            return Err(ClientError::Validation("Not logged in".to_string()));
        }
        Self::send_empty(self.request(Method::POST, "auth/logout/")?).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens> {
        let body = RefreshRequest {
            refresh: refresh_token.to_string(),
        };
        Self::send(self.request(Method::POST, "auth/refresh/")?.json(&body)).await
    }
}
