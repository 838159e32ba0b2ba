//! Effect store — thread-safe zone → effect-intensity mapping.
//!
//! Each installed zone owns its own mutex, so applications and decay ticks
//! on different zones never contend, and a [`snapshot`](EffectStore::snapshot)
//! always reflects a single instant for all kinds of one zone.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use greenhouse_domain::effect::{EffectKind, EffectLevels};
use greenhouse_domain::error::GreenhouseError;
use greenhouse_domain::zone::{Zone, ZoneRegistry};

use crate::sync::poisoned;

/// Intensities of every effect kind for every installed zone.
pub struct EffectStore {
    zones: HashMap<Zone, Mutex<EffectLevels>>,
}

impl EffectStore {
    /// Create a store with all intensities at zero for the registry's zones.
    #[must_use]
    pub fn new(registry: &ZoneRegistry) -> Self {
        Self {
            zones: registry
                .zones()
                .map(|zone| (zone, Mutex::new(EffectLevels::default())))
                .collect(),
        }
    }

    fn with_zone<T>(
        &self,
        zone: Zone,
        f: impl FnOnce(&mut EffectLevels) -> T,
    ) -> Result<T, GreenhouseError> {
        let cell = self
            .zones
            .get(&zone)
            .ok_or_else(|| GreenhouseError::InvalidZone(zone.to_string()))?;
        let mut levels = cell.lock().map_err(|_| poisoned("effect store"))?;
        Ok(f(&mut levels))
    }

    /// Add `delta` to the intensity of `(zone, kind)`, clamped to `0..=100`.
    ///
    /// Returns the new intensity.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if `zone` is not installed.
    pub fn apply(&self, zone: Zone, kind: EffectKind, delta: i32) -> Result<u8, GreenhouseError> {
        self.with_zone(zone, |levels| levels.adjust(kind, delta))
    }

    /// Subtract `step` from the intensity of `(zone, kind)`, stopping at zero.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if `zone` is not installed.
    pub fn decay(&self, zone: Zone, kind: EffectKind, step: u8) -> Result<u8, GreenhouseError> {
        self.with_zone(zone, |levels| levels.adjust(kind, -i32::from(step)))
    }

    /// Current intensity of `(zone, kind)`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if `zone` is not installed.
    pub fn get(&self, zone: Zone, kind: EffectKind) -> Result<u8, GreenhouseError> {
        self.with_zone(zone, |levels| levels.get(kind))
    }

    /// All intensities of `zone`, read under one lock acquisition.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if `zone` is not installed.
    pub fn snapshot(&self, zone: Zone) -> Result<EffectLevels, GreenhouseError> {
        self.with_zone(zone, |levels| *levels)
    }

    /// Snapshot of every installed zone, ordered by zone.
    ///
    /// Each zone is consistent on its own; zones are read one after another.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InternalSyncFailure`] if a zone lock is poisoned.
    pub fn snapshot_all(&self) -> Result<BTreeMap<Zone, EffectLevels>, GreenhouseError> {
        self.zones
            .keys()
            .map(|zone| self.snapshot(*zone).map(|levels| (*zone, levels)))
            .collect()
    }
}
