use tracing::{debug, warn};

use crate::utils::{clock::Clock, progress::Progress};

use super::{
    entities::{ChecklistStateEntity, HabitEntity},
    state_storage::StateStorage,
};

/// The in-memory checklist for the session. Owns the single state record and
/// mirrors it to storage after every mutation; there is no other write path.
///
/// Mutating operations report whether they changed anything, so callers can
/// skip re-rendering after a no-op. Invalid input (blank name, out-of-range
/// position) is ignored rather than treated as an error.
pub struct Checklist<S: StateStorage> {
    state: ChecklistStateEntity,
    storage: S,
    clock: Box<dyn Clock>,
}

impl<S: StateStorage> Checklist<S> {
    /// Loads the stored record, falling back to an empty checklist when
    /// nothing usable is on disk.
    pub async fn load(storage: S, clock: Box<dyn Clock>) -> Self {
        let today = clock.today();
        let state = match storage.load(today).await {
            Ok(Some(state)) => state,
            Ok(None) => ChecklistStateEntity::empty(today),
            Err(e) => {
                warn!("Could not read the stored checklist, starting empty: {e:?}");
                ChecklistStateEntity::empty(today)
            }
        };
        Self {
            state,
            storage,
            clock,
        }
    }

    pub fn state(&self) -> &ChecklistStateEntity {
        &self.state
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn progress(&self) -> Progress {
        Progress::of(&self.state.habits)
    }

    /// Appends a habit to the end of the list. Whitespace-only names are
    /// ignored. Duplicate names are allowed.
    pub async fn add_habit(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            debug!("Ignoring a blank habit name");
            return false;
        }

        self.state.habits.push(HabitEntity {
            name: name.to_owned(),
            done: false,
            added_at: self.clock.time(),
        });
        self.save().await;
        true
    }

    /// Flips the done flag of the habit at `index`. Out-of-range positions
    /// are ignored.
    pub async fn toggle_done(&mut self, index: usize) -> bool {
        let Some(habit) = self.state.habits.get_mut(index) else {
            debug!("Toggle on missing position {index}");
            return false;
        };
        habit.done = !habit.done;
        self.save().await;
        true
    }

    /// Removes the habit at `index`, shifting later habits up by one
    /// position. Out-of-range positions are ignored.
    pub async fn delete_habit(&mut self, index: usize) -> bool {
        if index >= self.state.habits.len() {
            debug!("Delete on missing position {index}");
            return false;
        }
        self.state.habits.remove(index);
        self.save().await;
        true
    }

    /// Removes every habit that is done for today, preserving the relative
    /// order of the rest.
    pub async fn clear_completed(&mut self) -> bool {
        let before = self.state.habits.len();
        self.state.habits.retain(|habit| !habit.done);
        let changed = self.state.habits.len() != before;
        self.save().await;
        changed
    }

    /// Empties the whole list. Asking the user for confirmation is on the
    /// caller.
    pub async fn reset_all(&mut self) -> bool {
        let changed = !self.state.habits.is_empty();
        self.state.habits.clear();
        self.save().await;
        changed
    }

    /// Clears every done flag once the calendar date has advanced past
    /// `last_date`. Names, creation stamps and order are untouched. Calling
    /// it again on the same day is a no-op.
    pub async fn reset_if_new_day(&mut self) -> bool {
        let today = self.clock.today();
        if self.state.last_date == today {
            return false;
        }

        debug!(
            "Date advanced from {} to {today}, clearing done flags",
            self.state.last_date
        );
        for habit in &mut self.state.habits {
            habit.done = false;
        }
        self.save().await;
        true
    }

    /// Stamps `last_date` with the current date and writes the record out.
    /// A failed write is reported and the session keeps working in memory.
    async fn save(&mut self) {
        self.state.last_date = self.clock.today();
        if let Err(e) = self.storage.save(&self.state).await {
            warn!("Could not persist the checklist, changes will be lost on exit: {e:?}");
        }
    }
}
