//! In-memory storage implementation.
//!
//! Keeps every program aggregate in a map behind an async lock. Used by tests
//! and by embedders that handle persistence elsewhere.

use std::collections::HashMap;
use async_trait::async_trait;
use optivita_core::{OwnerId, Program, ProgramId};
use tokio::sync::RwLock;
use tracing::debug;

use super::trait_::{next_revision, sort_programs, Storage, StorageError, Result};

/// Map-backed storage backend.
#[derive(Default)]
pub struct MemoryStorage {
    programs: RwLock<HashMap<ProgramId, Program>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_program(&self, program: &Program) -> Result<()> {
        let mut programs = self.programs.write().await;
        if programs.contains_key(&program.id) {
            return Err(StorageError::Other(format!("program {} already exists", program.id)));
        }
        programs.insert(program.id, program.clone());
        debug!(program_id = %program.id, "stored program");
        Ok(())
    }

    async fn load_program(&self, owner: &OwnerId, id: ProgramId) -> Result<Option<Program>> {
        let programs = self.programs.read().await;
        Ok(programs.get(&id).filter(|p| &p.owner == owner).cloned())
    }

    async fn list_programs(&self, owner: &OwnerId) -> Result<Vec<Program>> {
        let programs = self.programs.read().await;
        let mut owned: Vec<Program> = programs
            .values()
            .filter(|p| &p.owner == owner)
            .cloned()
            .collect();
        sort_programs(&mut owned);
        Ok(owned)
    }

    async fn update_program(&self, program: &Program) -> Result<u64> {
        let mut programs = self.programs.write().await;
        let stored = programs
            .get_mut(&program.id)
            .filter(|p| p.owner == program.owner)
            .ok_or_else(|| StorageError::NotFound(format!("program {}", program.id)))?;

        let revision = next_revision(stored.revision, program.revision)?;
        let mut updated = program.clone();
        updated.revision = revision;
        *stored = updated;
        debug!(program_id = %program.id, revision, "updated program");
        Ok(revision)
    }

    async fn delete_program(&self, owner: &OwnerId, id: ProgramId) -> Result<bool> {
        let mut programs = self.programs.write().await;
        match programs.get(&id) {
            Some(p) if &p.owner == owner => {
                programs.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use optivita_core::NewProgressEntry;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_program(owner: &str) -> Program {
        Program::new(
            OwnerId::new(owner),
            date(2025, 1, 1),
            date(2026, 1, 1),
            Some("test".to_string()),
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_program_round_trip_is_owner_scoped() {
        let storage = MemoryStorage::new();
        let program = create_test_program("alice");
        storage.create_program(&program).await.unwrap();

        let loaded = storage.load_program(&program.owner, program.id).await.unwrap().unwrap();
        assert_eq!(loaded, program);

        let other = OwnerId::new("bob");
        assert!(storage.load_program(&other, program.id).await.unwrap().is_none());
        assert!(storage.list_programs(&other).await.unwrap().is_empty());
        assert!(!storage.delete_program(&other, program.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let storage = MemoryStorage::new();
        let program = create_test_program("alice");
        storage.create_program(&program).await.unwrap();
        assert!(storage.create_program(&program).await.is_err());
    }

    #[tokio::test]
    async fn test_stale_revision_is_rejected() {
        let storage = MemoryStorage::new();
        let program = create_test_program("alice");
        storage.create_program(&program).await.unwrap();

        let mut first = program.clone();
        first.notes = Some("first".to_string());
        assert_eq!(storage.update_program(&first).await.unwrap(), 1);

        let mut stale = program.clone();
        stale.notes = Some("stale".to_string());
        let err = storage.update_program(&stale).await.unwrap_err();
        assert!(matches!(err, StorageError::VersionConflict { expected: 0, actual: 1 }));

        let stored = storage.load_program(&program.owner, program.id).await.unwrap().unwrap();
        assert_eq!(stored.notes.as_deref(), Some("first"));
        assert_eq!(stored.revision, 1);
    }

    #[tokio::test]
    async fn test_recent_entries_before_is_bounded_and_newest_first() {
        let storage = MemoryStorage::new();
        let mut program = create_test_program("alice");
        for day in [3, 10, 17, 24, 31] {
            let entry = NewProgressEntry { date: Some(date(2025, 1, day)), ..Default::default() }
                .into_entry(program.id, date(2025, 12, 31), chrono::Utc::now())
                .unwrap();
            program.push_entry(entry);
        }
        storage.create_program(&program).await.unwrap();

        let window = storage
            .recent_entries_before(&program.owner, program.id, date(2025, 1, 31), 4)
            .await
            .unwrap();
        let dates: Vec<_> = window.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 24), date(2025, 1, 17), date(2025, 1, 10), date(2025, 1, 3)]);
    }

    #[tokio::test]
    async fn test_delete_removes_program() {
        let storage = MemoryStorage::new();
        let program = create_test_program("alice");
        storage.create_program(&program).await.unwrap();

        assert!(storage.delete_program(&program.owner, program.id).await.unwrap());
        assert!(storage.load_program(&program.owner, program.id).await.unwrap().is_none());
        assert!(!storage.delete_program(&program.owner, program.id).await.unwrap());
    }
}
