use std::fmt::Display;

use crate::store::entities::HabitEntity;

/// Completion summary for the checklist: habits done today over the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn of(habits: &[HabitEntity]) -> Progress {
        Progress {
            done: habits.iter().filter(|h| h.done).count(),
            total: habits.len(),
        }
    }

    /// Rounded integer percentage in 0..=100. An empty checklist counts as 0.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            0
        } else {
            (self.done as f64 / self.total as f64 * 100.).round() as u8
        }
    }
}

impl Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.done, self.total)
    }
}
