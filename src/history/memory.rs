use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{HistoryError, ResultStore};
use crate::model::ValidationResult;

/// In-memory result history
#[derive(Default)]
pub struct MemoryResultStore {
    results: RwLock<Vec<ValidationResult>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert(&self, result: &ValidationResult) -> Result<(), HistoryError> {
        let mut results = self.results.write().await;
        if results.iter().any(|r| r.id == result.id) {
            return Err(HistoryError::DuplicateId(result.id.clone()));
        }
        results.push(result.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ValidationResult>, HistoryError> {
        Ok(self.results.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<ValidationResult>, HistoryError> {
        Ok(self.results.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn count(&self) -> Result<usize, HistoryError> {
        Ok(self.results.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryResultStore::new();
        crate::history::tests::exercise_store(&store).await;
    }
}
