/// Typed HTTP client for the Kanban API
///
/// One method per endpoint. The bearer token comes from the client's
/// [`Session`]; a `401` on any call drops the session, so callers only need
/// to check [`KanbanClient::is_authenticated`] to know whether to log in again.
///
/// # Example
///
/// ```no_run
/// use kanban_client::{KanbanClient, NewTask};
///
/// # async fn example() -> Result<(), kanban_client::ClientError> {
/// let client = KanbanClient::new("http://localhost:8080")?;
/// client.login("alice@example.com", "correct horse battery").await?;
///
/// let board = client.create_board("Sprint 1").await?;
/// client.create_task(board.id, &NewTask::titled("Write release notes")).await?;
/// # Ok(())
/// # }
/// ```

use crate::error::{ClientError, ClientResult};
use crate::session::{MemoryStore, Session, SessionStore};
use kanban_shared::models::{
    board::Board,
    task::{Task, TaskStatus},
    user::User,
};
use kanban_shared::reorder::ReorderRequest;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{PoisonError, RwLock};

/// Body for creating a task
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTask {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Server default is `todo`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    /// Server default is the end of the column
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn in_column(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Partial task update; `None` fields are not sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// `Some(None)` clears the description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

#[derive(Deserialize)]
struct AuthResponse {
    user: User,
    token: String,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

/// Kanban API client
pub struct KanbanClient {
    http: reqwest::Client,
    base_url: Url,
    store: Box<dyn SessionStore>,
    session: RwLock<Option<Session>>,
}

impl KanbanClient {
    /// Client with an in-memory session store
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_store(base_url, MemoryStore::new())
    }

    /// Client backed by `store`
    ///
    /// A session already in the store is picked up as-is; call
    /// [`restore`](Self::restore) to check it against the server.
    pub fn with_store(base_url: &str, store: impl SessionStore + 'static) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let session = store.load()?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            store: Box::new(store),
            session: RwLock::new(session),
        })
    }

    /// Current session, if logged in
    pub fn session(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Logged-in user
    pub fn user(&self) -> Option<User> {
        self.session().map(|s| s.user)
    }

    fn token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.token.clone())
    }

    fn set_session(&self, session: Session) -> ClientResult<()> {
        self.store.save(&session)?;
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    fn clear_session(&self) -> ClientResult<()> {
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.clear()
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let builder = self
            .http
            .request(method, self.url(path)?)
            .header(header::ACCEPT, "application/json");

        Ok(match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends and turns non-2xx answers into [`ClientError::Api`]
    async fn execute(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && self.is_authenticated() {
            tracing::warn!("Token rejected by server, clearing session");
            self.clear_session()?;
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_response(status, &body))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.execute(self.request(Method::GET, path)?).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .execute(self.request(method, path)?.json(body))
            .await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        self.execute(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }

    /// `GET /v1/status`
    pub async fn status(&self) -> ClientResult<String> {
        let response: StatusResponse = self.get("v1/status").await?;
        Ok(response.status)
    }

    /// `POST /v1/register`; logs the new user in
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        password_confirmation: &str,
    ) -> ClientResult<User> {
        let body = json!({
            "name": name,
            "email": email,
            "password": password,
            "password_confirmation": password_confirmation,
        });

        let auth: AuthResponse = self.send_json(Method::POST, "v1/register", &body).await?;
        self.start_session(auth)
    }

    /// `POST /v1/login`
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let body = json!({ "email": email, "password": password });

        let auth: AuthResponse = self.send_json(Method::POST, "v1/login", &body).await?;
        self.start_session(auth)
    }

    fn start_session(&self, auth: AuthResponse) -> ClientResult<User> {
        let user = auth.user.clone();
        self.set_session(Session {
            user: auth.user,
            token: auth.token,
        })?;

        tracing::info!(user_id = user.id, "Logged in");
        Ok(user)
    }

    /// Re-validates a stored session with `GET /v1/user`
    ///
    /// Returns the fresh user, or `None` when there was no session or the
    /// server would not accept it. Any failure clears the session.
    pub async fn restore(&self) -> ClientResult<Option<User>> {
        let Some(token) = self.token() else {
            return Ok(None);
        };

        match self.get::<UserResponse>("v1/user").await {
            Ok(UserResponse { user }) => {
                self.set_session(Session {
                    user: user.clone(),
                    token,
                })?;
                Ok(Some(user))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored session rejected, clearing");
                self.clear_session()?;
                Ok(None)
            }
        }
    }

    /// `GET /v1/user`
    pub async fn current_user(&self) -> ClientResult<User> {
        if !self.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }

        let response: UserResponse = self.get("v1/user").await?;
        Ok(response.user)
    }

    /// `POST /v1/logout`
    ///
    /// The local session is cleared whether or not the server call succeeds.
    pub async fn logout(&self) -> ClientResult<()> {
        if self.is_authenticated() {
            let result = match self.request(Method::POST, "v1/logout") {
                Ok(builder) => self.execute(builder).await.map(|_| ()),
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                tracing::warn!(error = %e, "Server logout failed");
            }
        }

        self.clear_session()?;
        tracing::info!("Logged out");

        Ok(())
    }

    /// `GET /v1/boards`
    pub async fn list_boards(&self) -> ClientResult<Vec<Board>> {
        self.get("v1/boards").await
    }

    /// `POST /v1/boards`
    pub async fn create_board(&self, name: &str) -> ClientResult<Board> {
        self.send_json(Method::POST, "v1/boards", &json!({ "name": name }))
            .await
    }

    /// `GET /v1/boards/:id`
    pub async fn get_board(&self, board_id: i64) -> ClientResult<Board> {
        self.get(&format!("v1/boards/{}", board_id)).await
    }

    /// `PUT /v1/boards/:id`
    pub async fn update_board(&self, board_id: i64, name: &str) -> ClientResult<Board> {
        self.send_json(
            Method::PUT,
            &format!("v1/boards/{}", board_id),
            &json!({ "name": name }),
        )
        .await
    }

    /// `DELETE /v1/boards/:id`
    pub async fn delete_board(&self, board_id: i64) -> ClientResult<()> {
        self.delete(&format!("v1/boards/{}", board_id)).await
    }

    /// `GET /v1/boards/:id/tasks`
    pub async fn list_tasks(&self, board_id: i64) -> ClientResult<Vec<Task>> {
        self.get(&format!("v1/boards/{}/tasks", board_id)).await
    }

    /// `POST /v1/boards/:id/tasks`
    pub async fn create_task(&self, board_id: i64, task: &NewTask) -> ClientResult<Task> {
        self.send_json(Method::POST, &format!("v1/boards/{}/tasks", board_id), task)
            .await
    }

    /// `GET /v1/tasks/:id`
    pub async fn get_task(&self, task_id: i64) -> ClientResult<Task> {
        self.get(&format!("v1/tasks/{}", task_id)).await
    }

    /// `PUT /v1/tasks/:id`
    pub async fn update_task(&self, task_id: i64, changes: &TaskChanges) -> ClientResult<Task> {
        self.send_json(Method::PUT, &format!("v1/tasks/{}", task_id), changes)
            .await
    }

    /// `DELETE /v1/tasks/:id`
    pub async fn delete_task(&self, task_id: i64) -> ClientResult<()> {
        self.delete(&format!("v1/tasks/{}", task_id)).await
    }

    /// `POST /v1/tasks/reorder`; returns the server's message
    pub async fn reorder_tasks(&self, request: &ReorderRequest) -> ClientResult<String> {
        let response: MessageResponse = self
            .send_json(Method::POST, "v1/tasks/reorder", request)
            .await?;

        tracing::debug!(
            status = %request.status,
            count = request.task_ids.len(),
            "Reordered column"
        );

        Ok(response.message)
    }
}
