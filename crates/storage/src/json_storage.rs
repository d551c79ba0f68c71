//! JSON file storage implementation.
//!
//! Stores each program aggregate as one JSON file under `programs/`. Writes go
//! to a sibling temp file first and are renamed into place, so a reader sees
//! either the previous aggregate or the new one.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use optivita_core::{OwnerId, Program, ProgramId};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::trait_::{next_revision, sort_programs, Storage, StorageError, Result};

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStorage {
    /// Create storage, creating the `programs/` directory under `root` if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("programs")).await?;

        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn program_path(&self, id: ProgramId) -> PathBuf {
        self.root.join("programs").join(format!("{}.json", id))
    }

    async fn write_program(&self, program: &Program) -> Result<()> {
        let path = self.program_path(program.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(program)?;
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonStorage {
    async fn create_program(&self, program: &Program) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if fs::try_exists(self.program_path(program.id)).await? {
            return Err(StorageError::Other(format!("program {} already exists", program.id)));
        }
        self.write_program(program).await?;
        debug!(program_id = %program.id, "stored program");
        Ok(())
    }

    async fn load_program(&self, owner: &OwnerId, id: ProgramId) -> Result<Option<Program>> {
        let program: Option<Program> = read_json(&self.program_path(id)).await?;
        Ok(program.filter(|p| &p.owner == owner))
    }

    async fn list_programs(&self, owner: &OwnerId) -> Result<Vec<Program>> {
        let mut programs: Vec<Program> = list_dir(&self.root.join("programs"))
            .await?
            .into_iter()
            .filter(|p: &Program| &p.owner == owner)
            .collect();
        sort_programs(&mut programs);
        Ok(programs)
    }

    async fn update_program(&self, program: &Program) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let stored: Program = read_json(&self.program_path(program.id))
            .await?
            .filter(|p: &Program| p.owner == program.owner)
            .ok_or_else(|| StorageError::NotFound(format!("program {}", program.id)))?;

        let revision = next_revision(stored.revision, program.revision)?;
        let mut updated = program.clone();
        updated.revision = revision;
        self.write_program(&updated).await?;
        debug!(program_id = %program.id, revision, "updated program");
        Ok(revision)
    }

    async fn delete_program(&self, owner: &OwnerId, id: ProgramId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let path = self.program_path(id);
        let existing: Option<Program> = read_json(&path).await?;
        match existing {
            Some(p) if &p.owner == owner => {
                fs::remove_file(&path).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn list_dir<T: serde::de::DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        match read_json(&entry.path()).await {
            Ok(Some(item)) => items.push(item),
            Ok(None) => {}
            Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping unreadable program file"),
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_program(owner: &str, start: NaiveDate) -> Program {
        Program::new(
            OwnerId::new(owner),
            start,
            date(2030, 1, 1),
            None,
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_program_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let program = create_test_program("alice", date(2025, 1, 1));

        {
            let storage = JsonStorage::new(dir.path()).await.unwrap();
            storage.create_program(&program).await.unwrap();
        }

        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let loaded = storage.load_program(&program.owner, program.id).await.unwrap().unwrap();
        assert_eq!(loaded, program);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();

        let older = create_test_program("alice", date(2024, 6, 1));
        let newer = create_test_program("alice", date(2025, 2, 1));
        let foreign = create_test_program("bob", date(2025, 3, 1));
        for p in [&older, &newer, &foreign] {
            storage.create_program(p).await.unwrap();
        }

        let listed = storage.list_programs(&OwnerId::new("alice")).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_update_checks_revision() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let program = create_test_program("alice", date(2025, 1, 1));
        storage.create_program(&program).await.unwrap();

        let mut edited = program.clone();
        edited.notes = Some("week one done".to_string());
        assert_eq!(storage.update_program(&edited).await.unwrap(), 1);

        let err = storage.update_program(&program).await.unwrap_err();
        assert!(matches!(err, StorageError::VersionConflict { expected: 0, actual: 1 }));

        let stored = storage.load_program(&program.owner, program.id).await.unwrap().unwrap();
        assert_eq!(stored.notes.as_deref(), Some("week one done"));
    }

    #[tokio::test]
    async fn test_delete_and_foreign_owner() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let program = create_test_program("alice", date(2025, 1, 1));
        storage.create_program(&program).await.unwrap();

        assert!(!storage.delete_program(&OwnerId::new("bob"), program.id).await.unwrap());
        assert!(storage.delete_program(&program.owner, program.id).await.unwrap());
        assert!(storage.load_program(&program.owner, program.id).await.unwrap().is_none());
    }
}
