//! Crew roster: which worker is responsible for which zone.
//!
//! The roster is maintained by an administrative process; the report lifecycle
//! only ever reads it through the [`WorkerRegistry`] seam. The in-memory
//! [`WorkerRoster`] enforces the one-active-worker-per-zone invariant at
//! registration time instead of silently picking one of several matches.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use serde::Deserialize;
use tracing::warn;

use crate::reports::domain::UserId;

/// A worker bound to exactly one zone.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerProfile {
    pub user: UserId,
    pub zone_number: u32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Read-only lookup the report lifecycle uses to bind a report to a worker.
pub trait WorkerRegistry: Send + Sync {
    /// The single active worker for the zone. Zones with zero active workers
    /// resolve to `None`, as do zones with several (seed data that pre-dates
    /// the registration check).
    fn active_worker(&self, zone_number: u32) -> Option<UserId>;
}

/// In-memory roster backing the server and the tests.
#[derive(Debug)]
pub struct WorkerRoster {
    zone_count: u32,
    profiles: Mutex<Vec<WorkerProfile>>,
}

impl WorkerRoster {
    pub fn new(zone_count: u32) -> Self {
        Self {
            zone_count,
            profiles: Mutex::new(Vec::new()),
        }
    }

    /// Builds a roster from a JSON seed file, degrading to an empty roster.
    ///
    /// Seed entries that violate the staffing invariant are skipped with a
    /// warning; the rest of the roster still loads.
    pub fn load_or_empty(path: impl AsRef<Path>, zone_count: u32) -> Self {
        let roster = Self::new(zone_count);
        let profiles: Vec<WorkerProfile> = match fs::read_to_string(path.as_ref())
            .map_err(RosterError::from)
            .and_then(|content| serde_json::from_str(&content).map_err(RosterError::from))
        {
            Ok(profiles) => profiles,
            Err(error) => {
                warn!(path = %path.as_ref().display(), %error, "worker roster unavailable, reports will be created unassigned");
                return roster;
            }
        };

        for profile in profiles {
            let user = profile.user.clone();
            if let Err(error) = roster.register(profile) {
                warn!(user = %user.0, %error, "skipping roster seed entry");
            }
        }
        roster
    }

    /// Registers a worker, rejecting a second active worker for a staffed zone.
    pub fn register(&self, profile: WorkerProfile) -> Result<(), RosterError> {
        if profile.zone_number == 0 || profile.zone_number > self.zone_count {
            return Err(RosterError::ZoneOutOfRange {
                zone_number: profile.zone_number,
                zone_count: self.zone_count,
            });
        }

        let mut profiles = self.profiles.lock().expect("roster mutex poisoned");
        if profile.active
            && profiles
                .iter()
                .any(|existing| existing.active && existing.zone_number == profile.zone_number)
        {
            return Err(RosterError::ZoneAlreadyStaffed {
                zone_number: profile.zone_number,
            });
        }

        profiles.push(profile);
        Ok(())
    }

    /// Deactivates every profile of the given user, freeing their zone.
    pub fn deactivate(&self, user: &UserId) {
        let mut profiles = self.profiles.lock().expect("roster mutex poisoned");
        for profile in profiles.iter_mut().filter(|profile| &profile.user == user) {
            profile.active = false;
        }
    }
}

impl WorkerRegistry for WorkerRoster {
    fn active_worker(&self, zone_number: u32) -> Option<UserId> {
        let profiles = self.profiles.lock().expect("roster mutex poisoned");
        let mut matches = profiles
            .iter()
            .filter(|profile| profile.active && profile.zone_number == zone_number);

        match (matches.next(), matches.next()) {
            (Some(profile), None) => Some(profile.user.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("zone {zone_number} is outside the configured range 1..={zone_count}")]
    ZoneOutOfRange { zone_number: u32, zone_count: u32 },
    #[error("zone {zone_number} already has an active worker")]
    ZoneAlreadyStaffed { zone_number: u32 },
    #[error("failed to read worker roster: {0}")]
    Io(#[from] std::io::Error),
    #[error("worker roster is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
