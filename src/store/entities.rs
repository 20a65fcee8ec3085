use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;

use serde::Deserialize;
use serde::Serialize;

use tracing::warn;

/// A single tracked habit. `added_at` is set once at creation and never
/// changes. `done` only means done for the current day and is cleared by the
/// daily rollover.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct HabitEntity {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub added_at: DateTime<Utc>,
}

/// The whole persisted checklist. Stored as a single JSON record that is read
/// and overwritten whole. `last_date` marks the day for which the done flags
/// are valid and serializes as `YYYY-MM-DD`.
#[derive(PartialEq, Eq, Debug, Serialize, Clone)]
pub struct ChecklistStateEntity {
    pub habits: Vec<HabitEntity>,
    pub last_date: NaiveDate,
}

impl ChecklistStateEntity {
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            habits: Vec::new(),
            last_date: today,
        }
    }

    /// Lenient decoding of a stored record. Habit entries that fail to decode
    /// are skipped, a missing `last_date` falls back to `today`. A record
    /// whose `habits` field is not an array fails entirely, which the caller
    /// treats as no usable record.
    pub fn from_json(raw: &str, today: NaiveDate) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct RawRecord {
            habits: Vec<serde_json::Value>,
            #[serde(default)]
            last_date: Option<NaiveDate>,
        }

        let record: RawRecord = serde_json::from_str(raw)?;
        let habits = record
            .habits
            .into_iter()
            .filter_map(
                |value| match serde_json::from_value::<HabitEntity>(value) {
                    Ok(habit) => Some(habit),
                    Err(e) => {
                        // Might happen after a cut-off write or a manual edit.
                        warn!("Skipping stored habit that failed to decode: {e}");
                        None
                    }
                },
            )
            .collect();

        Ok(Self {
            habits,
            last_date: record.last_date.unwrap_or(today),
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{ChecklistStateEntity, HabitEntity};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

    #[test]
    fn test_record_round_trip() -> Result<()> {
        let state = ChecklistStateEntity {
            habits: vec![
                HabitEntity {
                    name: "Drink water".into(),
                    done: true,
                    added_at: Utc.with_ymd_and_hms(2023, 12, 30, 9, 15, 0).unwrap(),
                },
                HabitEntity {
                    name: "Exercise".into(),
                    done: false,
                    added_at: Utc.with_ymd_and_hms(2023, 12, 31, 18, 0, 0).unwrap(),
                },
            ],
            last_date: TEST_DATE,
        };

        let raw = serde_json::to_string(&state)?;
        let decoded = ChecklistStateEntity::from_json(&raw, TEST_DATE)?;
        assert_eq!(decoded, state);
        Ok(())
    }

    #[test]
    fn test_last_date_serializes_as_plain_date() -> Result<()> {
        let raw = serde_json::to_value(ChecklistStateEntity::empty(TEST_DATE))?;
        assert_eq!(raw["last_date"], "2024-01-01");
        Ok(())
    }

    #[test]
    fn test_missing_last_date_defaults_to_today() -> Result<()> {
        let decoded = ChecklistStateEntity::from_json(r#"{"habits": []}"#, TEST_DATE)?;
        assert_eq!(decoded.last_date, TEST_DATE);
        assert!(decoded.habits.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_habits_are_filtered() -> Result<()> {
        let raw = r#"{
            "habits": [
                {"name": "Stretch", "done": false, "added_at": "2024-01-01T08:00:00Z"},
                {"done": true},
                42,
                {"name": "Read", "added_at": "2024-01-01T08:30:00Z"}
            ],
            "last_date": "2024-01-01"
        }"#;
        let decoded = ChecklistStateEntity::from_json(raw, TEST_DATE)?;
        assert_eq!(decoded.habits.len(), 2);
        assert_eq!(decoded.habits[0].name, "Stretch");
        // missing done is tolerated and defaults to false
        assert_eq!(decoded.habits[1].name, "Read");
        assert!(!decoded.habits[1].done);
        Ok(())
    }

    #[test]
    fn test_habits_must_be_a_sequence() {
        let raw = r#"{"habits": "not a list", "last_date": "2024-01-01"}"#;
        assert!(ChecklistStateEntity::from_json(raw, TEST_DATE).is_err());
    }
}
