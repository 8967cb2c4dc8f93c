use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Todo, User};

/// Persistence for user records. The username is unique across the store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user, failing with `StoreError::Conflict` if the
    /// username is already taken.
    async fn insert_unique(&self, username: &str, password: &str) -> Result<User, StoreError>;

    /// Exact username + password match. `None` means no such pair exists.
    async fn find_one(&self, username: &str, password: &str)
        -> Result<Option<User>, StoreError>;
}

/// Persistence for todo records. Every filtering operation includes the
/// owning user id, so a caller can never reach another user's records.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert(&self, user_id: &str, title: &str) -> Result<Todo, StoreError>;

    async fn find_many(&self, user_id: &str) -> Result<Vec<Todo>, StoreError>;

    /// Update the todo matching both `id` and `user_id`; `None` when no
    /// record matches both (nonexistent and not-owned are identical).
    async fn find_one_and_update(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError>;

    /// Delete under the same ownership filter as `find_one_and_update`.
    async fn find_one_and_delete(&self, id: &str, user_id: &str)
        -> Result<Option<Todo>, StoreError>;
}

// ----------------------------------------------------------------------------
// In-memory backend
// ----------------------------------------------------------------------------

/// In-memory backend used by the test suites. Implements both store traits
/// so a single instance can back either service.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_unique(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::Conflict);
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_one(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert(&self, user_id: &str, title: &str) -> Result<Todo, StoreError> {
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            completed: false,
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn find_many(&self, user_id: &str) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_one_and_update(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        match todos
            .iter_mut()
            .find(|t| t.id == id && t.user_id == user_id)
        {
            Some(todo) => {
                todo.title = title.to_string();
                todo.completed = completed;
                Ok(Some(todo.clone()))
            }
            None => Ok(None),
        }
    }

    async fn find_one_and_delete(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;
        match todos
            .iter()
            .position(|t| t.id == id && t.user_id == user_id)
        {
            Some(pos) => Ok(Some(todos.remove(pos))),
            None => Ok(None),
        }
    }
}

// ----------------------------------------------------------------------------
// SQLite backend
// ----------------------------------------------------------------------------

/// SQLite-backed store used by the service binaries.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connect to `database_url`, creating the database file and tables on
    /// first use.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
            tracing::info!(url = database_url, "creating database");
            Sqlite::create_database(database_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        );"#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS todos (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            completed BOOLEAN NOT NULL DEFAULT 0
        );"#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn insert_unique(&self, username: &str, password: &str) -> Result<User, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO users (id, username, password) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(username)
            .bind(password)
            .execute(&self.pool)
            .await?;
        Ok(User {
            id,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    async fn find_one(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = ? AND password = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn insert(&self, user_id: &str, title: &str) -> Result<Todo, StoreError> {
        let id = Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO todos (id, user_id, title, completed) VALUES (?, ?, ?, 0)")
            .bind(&id)
            .bind(user_id)
            .bind(title)
            .execute(&self.pool)
            .await?;
        Ok(Todo {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            completed: false,
        })
    }

    async fn find_many(&self, user_id: &str) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(
            "SELECT id, user_id, title, completed FROM todos WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(todos)
    }

    async fn find_one_and_update(
        &self,
        id: &str,
        user_id: &str,
        title: &str,
        completed: bool,
    ) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos SET title = ?, completed = ? WHERE id = ? AND user_id = ? \
             RETURNING id, user_id, title, completed",
        )
        .bind(title)
        .bind(completed)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn find_one_and_delete(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(
            "DELETE FROM todos WHERE id = ? AND user_id = ? \
             RETURNING id, user_id, title, completed",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(todo)
    }
}
