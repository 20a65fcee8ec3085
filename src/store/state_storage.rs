use std::{io::ErrorKind, path::PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use super::entities::ChecklistStateEntity;

/// File name of the single checklist record inside the application directory.
pub const STATE_FILE_NAME: &str = "habits.json";

/// Interface for abstracting storage of the checklist record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StateStorage: Send + Sync {
    /// Reads the stored record. `None` means there is nothing usable on disk:
    /// the file is absent or its content couldn't be decoded. `today` fills
    /// in a missing `last_date`.
    async fn load(&self, today: NaiveDate) -> Result<Option<ChecklistStateEntity>>;

    /// Overwrites the stored record with `state`.
    async fn save(&self, state: &ChecklistStateEntity) -> Result<()>;
}

/// The main realization of [StateStorage]. Keeps the whole checklist in one
/// JSON file, read and overwritten whole under an advisory file lock.
pub struct StateStorageImpl {
    state_file: PathBuf,
}

impl StateStorageImpl {
    pub fn new(state_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&state_dir)?;

        Ok(Self {
            state_file: state_dir.join(STATE_FILE_NAME),
        })
    }

    async fn read_raw(&self) -> Result<Option<String>> {
        let mut file = match File::open(&self.state_file).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        file.lock_shared()?;
        let mut raw = String::new();
        let result = file.read_to_string(&mut raw).await;
        file.unlock_async().await?;
        result?;
        Ok(Some(raw))
    }

    async fn write_with_file(file: &mut File, state: &ChecklistStateEntity) -> Result<()> {
        let buffer = serde_json::to_vec(state)?;
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl StateStorage for StateStorageImpl {
    async fn load(&self, today: NaiveDate) -> Result<Option<ChecklistStateEntity>> {
        let Some(raw) = self.read_raw().await? else {
            debug!("No stored checklist at {:?}", self.state_file);
            return Ok(None);
        };

        match ChecklistStateEntity::from_json(&raw, today) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                // Manual edits or a cut-off write. Start over instead of failing.
                warn!(
                    "Stored checklist at {:?} failed to decode: {e}",
                    self.state_file
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &ChecklistStateEntity) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.state_file)
            .await?;

        // Semi-safe acquire-release for the file
        file.lock_exclusive()?;
        let result = Self::write_with_file(&mut file, state).await;
        file.unlock_async().await?;
        result
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::store::entities::{ChecklistStateEntity, HabitEntity};

    use super::{StateStorage, StateStorageImpl, STATE_FILE_NAME};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    fn test_state() -> ChecklistStateEntity {
        ChecklistStateEntity {
            habits: vec![
                HabitEntity {
                    name: "Drink water".into(),
                    done: true,
                    added_at: Utc.with_ymd_and_hms(2023, 12, 30, 9, 0, 0).unwrap(),
                },
                HabitEntity {
                    name: "Exercise".into(),
                    done: false,
                    added_at: Utc.with_ymd_and_hms(2023, 12, 31, 18, 30, 0).unwrap(),
                },
            ],
            last_date: TEST_DATE,
        }
    }

    #[tokio::test]
    async fn test_save_load_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let storage = StateStorageImpl::new(dir.path().to_owned())?;

        let state = test_state();
        storage.save(&state).await?;

        let loaded = storage.load(TEST_DATE).await?;
        assert_eq!(loaded, Some(state));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_none() -> Result<()> {
        let dir = tempdir()?;
        let storage = StateStorageImpl::new(dir.path().to_owned())?;

        assert_eq!(storage.load(TEST_DATE).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_record_loads_as_none() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(STATE_FILE_NAME), "{ not json")?;
        let storage = StateStorageImpl::new(dir.path().to_owned())?;

        assert_eq!(storage.load(TEST_DATE).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_habits_of_wrong_shape_load_as_none() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(
            dir.path().join(STATE_FILE_NAME),
            r#"{"habits": {"oops": true}, "last_date": "2024-01-01"}"#,
        )?;
        let storage = StateStorageImpl::new(dir.path().to_owned())?;

        assert_eq!(storage.load(TEST_DATE).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_record() -> Result<()> {
        let dir = tempdir()?;
        let storage = StateStorageImpl::new(dir.path().to_owned())?;

        storage.save(&test_state()).await?;

        let mut shorter = test_state();
        shorter.habits.truncate(1);
        storage.save(&shorter).await?;

        let loaded = storage.load(TEST_DATE).await?;
        assert_eq!(loaded, Some(shorter));
        Ok(())
    }
}
