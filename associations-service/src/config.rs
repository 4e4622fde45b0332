use associations_shared::types::ProfileId;
use std::collections::BTreeSet;
use std::num::NonZeroU32;

/// Profile that owns anonymous content. Never ranked.
pub const ANONYMOUS_PROFILE_ID: ProfileId = 1;

const DEFAULT_SWEEP_BATCH_SIZE: u32 = 500;
const DEFAULT_MAX_CREATE_ATTEMPTS: u32 = 3;

/// Tuning knobs shared by the store, the ranking query and the sweeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Records fetched per scan batch during a sweep.
    pub sweep_batch_size: NonZeroU32,
    /// Profiles left out of every ranking.
    pub excluded_profiles: BTreeSet<ProfileId>,
    /// Attempts of a create-or-get that keeps hitting a vanished conflicting row.
    pub max_create_attempts: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sweep_batch_size: NonZeroU32::new(DEFAULT_SWEEP_BATCH_SIZE).unwrap_or(NonZeroU32::MIN),
            excluded_profiles: BTreeSet::from([ANONYMOUS_PROFILE_ID]),
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
        }
    }
}
