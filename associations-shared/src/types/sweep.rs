use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Outcome of an orphan sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Records whose content entity still resolves.
    pub kept: u64,
    /// Records removed because their content entity is gone.
    pub deleted: u64,
}

impl AddAssign for SweepSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.kept += rhs.kept;
        self.deleted += rhs.deleted;
    }
}
