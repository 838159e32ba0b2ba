//! Decay scheduler — fades applied effects back to zero over time.
//!
//! Exactly one decay run exists per `(zone, kind)` pair while its intensity
//! is above zero. A run goes through two phases:
//!
//! ```text
//!  apply ──▶ Grace ──[grace elapsed, no refresh]──▶ Ticking ──[intensity = 0]──▶ (gone)
//!              ▲  │                                   │
//!              └──┘ apply: deadline pushed back       └── apply: intensity bumped only
//! ```
//!
//! Applications and decay ticks on the same pair serialize through the
//! pair's slot lock, which is also where a finished run retires itself, so
//! "intensity > 0" and "a run exists" always change together.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use greenhouse_domain::effect::EffectKind;
use greenhouse_domain::error::GreenhouseError;
use greenhouse_domain::event::{Event, EventType};
use greenhouse_domain::zone::{Zone, ZoneRegistry};

use crate::effect_store::EffectStore;
use crate::event_bus::InProcessEventBus;
use crate::sync::poisoned;

/// Timing of decay runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecaySettings {
    /// Quiet period after the last application before ticking starts.
    pub grace: Duration,
    /// Delay between two decrements.
    pub interval: Duration,
    /// Amount removed per decrement.
    pub step: u8,
}

impl Default for DecaySettings {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
            interval: Duration::from_secs(5),
            step: 5,
        }
    }
}

impl DecaySettings {
    /// Guard against settings that would never terminate or would spin.
    fn normalized(self) -> Self {
        Self {
            grace: self.grace,
            interval: self.interval.max(Duration::from_millis(1)),
            step: self.step.max(1),
        }
    }
}

enum Phase {
    Grace { until: Instant },
    Ticking,
}

struct DecayRun {
    generation: u64,
    phase: Phase,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    run: Option<DecayRun>,
}

enum GraceCheck {
    Wait(Instant),
    Elapsed,
    Stale,
}

enum TickOutcome {
    Remaining,
    Finished,
    Stale,
}

struct Inner {
    store: Arc<EffectStore>,
    settings: DecaySettings,
    slots: HashMap<(Zone, EffectKind), Mutex<Slot>>,
    events: InProcessEventBus,
    generations: AtomicU64,
    shut_down: AtomicBool,
}

/// Owns every decay run and the application path that starts them.
pub struct DecayScheduler {
    inner: Arc<Inner>,
}

impl DecayScheduler {
    /// Create a scheduler with one idle slot per installed `(zone, kind)` pair.
    #[must_use]
    pub fn new(
        store: Arc<EffectStore>,
        registry: &ZoneRegistry,
        settings: DecaySettings,
        events: InProcessEventBus,
    ) -> Self {
        let slots = registry
            .zones()
            .flat_map(|zone| EffectKind::ALL.map(|kind| (zone, kind)))
            .map(|pair| (pair, Mutex::new(Slot::default())))
            .collect();

        Self {
            inner: Arc::new(Inner {
                store,
                settings: settings.normalized(),
                slots,
                events,
                generations: AtomicU64::new(0),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Add `delta` to `(zone, kind)` and make sure a decay run covers it.
    ///
    /// Starts a run when none exists, pushes back the grace deadline of a run
    /// still in its grace phase, and leaves a ticking run alone. Must be
    /// called from within a Tokio runtime.
    ///
    /// Returns the new intensity.
    ///
    /// # Errors
    ///
    /// Returns [`GreenhouseError::InvalidZone`] if `zone` is not installed, or
    /// [`GreenhouseError::InternalSyncFailure`] if a lock is poisoned.
    pub fn apply(&self, zone: Zone, kind: EffectKind, delta: u8) -> Result<u8, GreenhouseError> {
        let inner = &self.inner;
        let mut slot = inner.lock_slot(zone, kind)?;
        let intensity = inner.store.apply(zone, kind, i32::from(delta))?;
        if intensity == 0 {
            return Ok(0);
        }

        let now = Instant::now();
        if let Some(run) = slot.run.as_mut() {
            match &mut run.phase {
                Phase::Grace { until } => {
                    *until = now + inner.settings.grace;
                    tracing::debug!(%zone, %kind, intensity, "grace period refreshed");
                    inner.publish(EventType::GraceRefreshed, zone, kind, intensity);
                }
                Phase::Ticking => {
                    tracing::debug!(%zone, %kind, intensity, "decay already ticking");
                }
            }
            return Ok(intensity);
        }

        if inner.shut_down.load(Ordering::SeqCst) {
            tracing::warn!(%zone, %kind, intensity, "scheduler is shut down, decay not started");
            return Ok(intensity);
        }

        let generation = inner.generations.fetch_add(1, Ordering::Relaxed);
        let handle = tokio::spawn(run_decay(Arc::clone(inner), zone, kind, generation));
        slot.run = Some(DecayRun {
            generation,
            phase: Phase::Grace {
                until: now + inner.settings.grace,
            },
            handle,
        });
        tracing::debug!(%zone, %kind, intensity, "decay run started");
        inner.publish(EventType::DecayStarted, zone, kind, intensity);

        Ok(intensity)
    }

    /// Whether a decay run currently exists for `(zone, kind)`.
    #[must_use]
    pub fn is_running(&self, zone: Zone, kind: EffectKind) -> bool {
        self.inner
            .lock_slot(zone, kind)
            .is_ok_and(|slot| slot.run.is_some())
    }

    /// Number of live decay runs across all pairs.
    #[must_use]
    pub fn active_runs(&self) -> usize {
        self.inner
            .slots
            .values()
            .filter(|slot| slot.lock().is_ok_and(|slot| slot.run.is_some()))
            .count()
    }

    /// Abort every pending run and refuse to start new ones.
    ///
    /// Intensities keep whatever value they had. Calling this more than once
    /// is a no-op.
    pub fn shutdown(&self) {
        if self.inner.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut stopped = 0_usize;
        for slot in self.inner.slots.values() {
            let Ok(mut slot) = slot.lock() else {
                tracing::error!("decay slot poisoned during shutdown");
                continue;
            };
            if let Some(run) = slot.run.take() {
                run.handle.abort();
                stopped += 1;
            }
        }
        tracing::info!(stopped, "decay scheduler shut down");
    }
}

impl Drop for DecayScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    fn lock_slot(
        &self,
        zone: Zone,
        kind: EffectKind,
    ) -> Result<MutexGuard<'_, Slot>, GreenhouseError> {
        self.slots
            .get(&(zone, kind))
            .ok_or_else(|| GreenhouseError::InvalidZone(zone.to_string()))?
            .lock()
            .map_err(|_| poisoned("decay scheduler"))
    }

    fn publish(&self, event_type: EventType, zone: Zone, kind: EffectKind, intensity: u8) {
        self.events.publish(Event::new(
            event_type,
            Some(zone),
            serde_json::json!({ "kind": kind, "intensity": intensity }),
        ));
    }

    /// Decide whether the run identified by `generation` may start ticking.
    fn check_grace(
        &self,
        zone: Zone,
        kind: EffectKind,
        generation: u64,
    ) -> Result<GraceCheck, GreenhouseError> {
        let mut slot = self.lock_slot(zone, kind)?;
        let Some(run) = slot
            .run
            .as_mut()
            .filter(|run| run.generation == generation)
        else {
            return Ok(GraceCheck::Stale);
        };

        match run.phase {
            Phase::Grace { until } if until > Instant::now() => Ok(GraceCheck::Wait(until)),
            Phase::Grace { .. } => {
                run.phase = Phase::Ticking;
                tracing::debug!(%zone, %kind, "grace period elapsed, decay ticking");
                Ok(GraceCheck::Elapsed)
            }
            Phase::Ticking => Ok(GraceCheck::Elapsed),
        }
    }

    /// Apply one decrement; retire the run when the intensity reaches zero.
    fn tick(
        &self,
        zone: Zone,
        kind: EffectKind,
        generation: u64,
    ) -> Result<TickOutcome, GreenhouseError> {
        let mut slot = self.lock_slot(zone, kind)?;
        if slot
            .run
            .as_ref()
            .is_none_or(|run| run.generation != generation)
        {
            return Ok(TickOutcome::Stale);
        }

        let remaining = self.store.decay(zone, kind, self.settings.step)?;
        tracing::trace!(%zone, %kind, remaining, "effect decayed");
        self.publish(EventType::EffectDecayed, zone, kind, remaining);
        if remaining > 0 {
            return Ok(TickOutcome::Remaining);
        }

        slot.run = None;
        tracing::debug!(%zone, %kind, "decay run finished");
        self.publish(EventType::DecayFinished, zone, kind, 0);
        Ok(TickOutcome::Finished)
    }
}

async fn run_decay(inner: Arc<Inner>, zone: Zone, kind: EffectKind, generation: u64) {
    loop {
        match inner.check_grace(zone, kind, generation) {
            Ok(GraceCheck::Wait(until)) => tokio::time::sleep_until(until).await,
            Ok(GraceCheck::Elapsed) => break,
            Ok(GraceCheck::Stale) | Err(_) => return,
        }
    }

    let period = inner.settings.interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    loop {
        ticker.tick().await;
        match inner.tick(zone, kind, generation) {
            Ok(TickOutcome::Remaining) => {}
            Ok(TickOutcome::Finished | TickOutcome::Stale) | Err(_) => return,
        }
    }
}
