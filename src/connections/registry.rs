//! Connection Registry
//!
//! In-memory list of database connections. Ids are assigned from a counter
//! and never reused. Credentials are held alongside each entry but only the
//! public `Connection` view ever leaves the registry.

use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Connection, NewConnection};

/// Errors from connection registry operations
#[derive(Error, Debug, PartialEq)]
pub enum ConnectionError {
    /// Required fields are blank
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Another connection already uses this name
    #[error("Connection '{0}' already exists")]
    Duplicate(String),

    /// No connection with this id
    #[error("Connection {0} not found")]
    NotFound(u32),
}

/// Result type alias for connection operations
pub type ConnectionResult<T> = Result<T, ConnectionError>;

/// Stored connection with its credentials
struct StoredConnection {
    connection: Connection,
    // Write-only: no response or listing reads these back
    #[cfg_attr(not(test), allow(dead_code))]
    username: String,
    #[cfg_attr(not(test), allow(dead_code))]
    password: String,
}

struct RegistryInner {
    entries: Vec<StoredConnection>,
    next_id: u32,
}

/// Thread-safe in-memory connection registry
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                entries: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Register a connection after presence validation
    pub async fn create(&self, form: NewConnection) -> ConnectionResult<Connection> {
        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(ConnectionError::MissingFields(missing));
        }

        let name = form.name.trim().to_string();
        let mut inner = self.inner.write().await;

        if inner.entries.iter().any(|e| e.connection.name == name) {
            return Err(ConnectionError::Duplicate(name));
        }

        let connection = Connection {
            id: inner.next_id,
            name,
            host: form.host.trim().to_string(),
            port: form.port,
            database: form.database.trim().to_string(),
            tables: 0,
        };
        inner.next_id += 1;

        inner.entries.push(StoredConnection {
            connection: connection.clone(),
            username: form.username,
            password: form.password,
        });

        tracing::info!(
            connection_id = connection.id,
            name = %connection.name,
            host = %connection.host,
            "Registered connection"
        );

        Ok(connection)
    }

    /// All connections in creation order
    pub async fn list(&self) -> Vec<Connection> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .map(|e| e.connection.clone())
            .collect()
    }

    #[cfg(test)]
    pub(crate) async fn get(&self, id: u32) -> Option<Connection> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .find(|e| e.connection.id == id)
            .map(|e| e.connection.clone())
    }

    /// Find a connection by name
    pub async fn find_by_name(&self, name: &str) -> Option<Connection> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .find(|e| e.connection.name == name)
            .map(|e| e.connection.clone())
    }

    /// Stored `(username, password)` for a connection
    #[cfg(test)]
    pub(crate) async fn credentials(&self, id: u32) -> Option<(String, String)> {
        self.inner
            .read()
            .await
            .entries
            .iter()
            .find(|e| e.connection.id == id)
            .map(|e| (e.username.clone(), e.password.clone()))
    }

    /// Remove a connection
    pub async fn delete(&self, id: u32) -> ConnectionResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.entries.len();
        inner.entries.retain(|e| e.connection.id != id);

        if inner.entries.len() == before {
            return Err(ConnectionError::NotFound(id));
        }

        tracing::info!(connection_id = id, "Deleted connection");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str) -> NewConnection {
        NewConnection::new(name, "db.example.com", "prod", "admin").password("secret")
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let registry = ConnectionRegistry::new();

        let prod = registry.create(form("Production DB")).await.unwrap();
        let staging = registry.create(form("Staging DB").port(5433)).await.unwrap();

        assert_eq!(prod.id, 1);
        assert_eq!(prod.port, 5432);
        assert_eq!(staging.id, 2);
        assert_eq!(staging.port, 5433);

        let names: Vec<String> = registry.list().await.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Production DB", "Staging DB"]);
        assert_eq!(
            registry.credentials(1).await,
            Some(("admin".to_string(), "secret".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let registry = ConnectionRegistry::new();
        let mut bad = form("");
        bad.username = "  ".to_string();

        let err = registry.create(bad).await.unwrap_err();
        assert_eq!(err, ConnectionError::MissingFields(vec!["name", "username"]));
        assert_eq!(err.to_string(), "Missing required fields: name, username");
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let registry = ConnectionRegistry::new();
        registry.create(form("prod")).await.unwrap();

        let err = registry.create(form("prod")).await.unwrap_err();
        assert_eq!(err, ConnectionError::Duplicate("prod".to_string()));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_does_not_reuse_ids() {
        let registry = ConnectionRegistry::new();
        registry.create(form("a")).await.unwrap();
        registry.create(form("b")).await.unwrap();

        registry.delete(2).await.unwrap();
        assert_eq!(registry.delete(2).await, Err(ConnectionError::NotFound(2)));

        let c = registry.create(form("c")).await.unwrap();
        assert_eq!(c.id, 3);
        assert!(registry.find_by_name("c").await.is_some());
        assert!(registry.get(2).await.is_none());
    }
}
