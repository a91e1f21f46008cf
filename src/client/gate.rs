use super::api::ApiClient;
use super::credentials::{AuthSession, CredentialStore};
use super::error::{ClientError, Result};
use crate::models::{LoginCredentials, RegisterRequest, User};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(AuthSession),
}

/// Login/register screen state; owns the persisted session.
pub struct AuthGate<S: CredentialStore> {
    api: ApiClient,
    store: S,
    state: AuthState,
    pub error: Option<String>,
}

impl<S: CredentialStore> AuthGate<S> {
    /// Start authenticated when the store already holds a session.
    pub fn new(api: ApiClient, store: S) -> Result<Self> {
        let state = match store.load()? {
            Some(session) => {
                tracing::debug!("Restored session for {}", session.user.email);
                AuthState::Authenticated(session)
            }
            None => AuthState::Anonymous,
        };

        Ok(Self {
            api: api.without_session(),
            store,
            state,
            error: None,
        })
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&AuthSession> {
        match &self.state {
            AuthState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session().map(|s| &s.user)
    }

    /// Client carrying the current session's bearer token.
    pub fn authorized_client(&self) -> Option<ApiClient> {
        self.session().map(|s| self.api.with_session(s.clone()))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<()> {
        self.state = AuthState::Authenticating;
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.authenticate(&credentials).await {
            Ok(session) => {
                tracing::info!("Logged in as {}", session.user.email);
                self.state = AuthState::Authenticated(session);
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Register, then log in with the same credentials.
    /// A password/confirmation mismatch fails before anything is sent.
    pub async fn register(&mut self, request: &RegisterRequest) -> Result<()> {
        if request.password != request.password2 {
            return Err(self.fail(ClientError::Validation("Passwords do not match".to_string())));
        }

        self.state = AuthState::Authenticating;
        if let Err(e) = self.api.register(request).await {
            return Err(self.fail(e));
        }

        self.login(&request.email, &request.password).await
    }

    /// Revoke on the server if possible, then always forget the local session.
    pub async fn logout(&mut self) -> Result<()> {
        if let Some(client) = self.authorized_client() {
            if let Err(e) = client.logout().await {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }

        self.state = AuthState::Anonymous;
        self.error = None;
        self.store.clear()
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<AuthSession> {
        let tokens = self.api.login(credentials).await?;
        let user = self.api.current_user(&tokens.access).await?;
        let session = AuthSession { tokens, user };
        self.store.save(&session)?;
        Ok(session)
    }

    fn fail(&mut self, error: ClientError) -> ClientError {
        tracing::warn!("Authentication failed: {}", error);
        self.state = AuthState::Anonymous;
        self.error = Some(describe_failure(&error));
        error
    }
}

/// Text shown to the user for a failure: the server's JSON body pretty-printed,
/// the raw body when it is not JSON, otherwise the error itself.
pub fn describe_failure(error: &ClientError) -> String {
    match error {
        ClientError::RequestFailed { body, .. } if !body.trim().is_empty() => {
            serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|value| serde_json::to_string_pretty(&value).ok())
                .unwrap_or_else(|| body.clone())
        }
        other => other.to_string(),
    }
}
