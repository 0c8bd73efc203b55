use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use super::domain::{Disaster, DisasterId, DisasterRecordError};

/// Read access to the disaster policy records maintained by administrators.
pub trait DisasterRepository: Send + Sync {
    fn fetch(&self, id: DisasterId) -> Result<Option<Disaster>, RepositoryError>;
    fn list(&self) -> Result<Vec<Disaster>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("disaster {0} already exists")]
    Conflict(DisasterId),
    #[error("invalid disaster record: {0}")]
    Invalid(#[from] DisasterRecordError),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Process-local disaster store used by the API binary, the CLI and tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDisasterRepository {
    records: Arc<RwLock<BTreeMap<DisasterId, Disaster>>>,
}

impl InMemoryDisasterRepository {
    pub fn with_disasters<I>(disasters: I) -> Result<Self, RepositoryError>
    where
        I: IntoIterator<Item = Disaster>,
    {
        let repository = Self::default();
        for disaster in disasters {
            repository.insert(disaster)?;
        }
        Ok(repository)
    }

    /// Stores a validated record; identifiers are unique.
    pub fn insert(&self, disaster: Disaster) -> Result<(), RepositoryError> {
        disaster.validate()?;
        let mut guard = self
            .records
            .write()
            .map_err(|_| RepositoryError::Unavailable("disaster store poisoned".to_string()))?;
        if guard.contains_key(&disaster.id) {
            return Err(RepositoryError::Conflict(disaster.id));
        }
        guard.insert(disaster.id, disaster);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DisasterRepository for InMemoryDisasterRepository {
    fn fetch(&self, id: DisasterId) -> Result<Option<Disaster>, RepositoryError> {
        let guard = self
            .records
            .read()
            .map_err(|_| RepositoryError::Unavailable("disaster store poisoned".to_string()))?;
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Disaster>, RepositoryError> {
        let guard = self
            .records
            .read()
            .map_err(|_| RepositoryError::Unavailable("disaster store poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }
}
