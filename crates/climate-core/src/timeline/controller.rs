//! Timeline controller: the single authoritative cursor over the year range.
//!
//! The controller is a cheap-to-clone handle. All clones share one state,
//! mutated only through the methods below and published to subscribers as a
//! `TimelineSnapshot` after every change.
//!
//! # Playback
//!
//! `toggle_playback()` flips between two states:
//!
//! - **Stopped → Playing**: spawns a ticker task that advances the cursor one
//!   year per interval.
//! - **Playing → Stopped**: cancels the ticker; no further tick is applied.
//!
//! A tick that cannot advance (cursor unset or at the last year) stops
//! playback itself. The ticker handle lives inside `Playback::Playing`, so the
//! "playing" flag and the timer can never disagree.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Location, Statistic, TimelineError, YearRange};

/// Period between playback ticks.
pub const DEFAULT_PLAYBACK_INTERVAL: Duration = Duration::from_millis(250);

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Point-in-time view of the controller, published on every change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSnapshot {
    pub position: Option<i32>,
    pub playback: PlaybackState,
    pub selected_location: Option<Location>,
    pub last_update_date: Option<String>,
}

/// Handle to a running ticker task.
#[derive(Debug)]
struct PlaybackTimer {
    session: u64,
    cancel: CancellationToken,
}

impl PlaybackTimer {
    /// Safe to call any number of times, including after the task finished.
    fn cancel(&self) {
        self.cancel.cancel();
    }
}

#[derive(Debug)]
enum Playback {
    Stopped,
    Playing(PlaybackTimer),
}

#[derive(Debug)]
struct State {
    position: Option<i32>,
    playback: Playback,
    selected_location: Option<Location>,
    last_update_date: Option<String>,
    sessions_started: u64,
}

impl State {
    fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            position: self.position,
            playback: match self.playback {
                Playback::Stopped => PlaybackState::Stopped,
                Playback::Playing(_) => PlaybackState::Playing,
            },
            selected_location: self.selected_location.clone(),
            last_update_date: self.last_update_date.clone(),
        }
    }

    fn step_forward(&mut self, range: YearRange) -> bool {
        match self.position.and_then(|year| range.next(year)) {
            Some(next) => {
                self.position = Some(next);
                true
            }
            None => false,
        }
    }

    fn step_backward(&mut self, range: YearRange) -> bool {
        match self.position.and_then(|year| range.previous(year)) {
            Some(previous) => {
                self.position = Some(previous);
                true
            }
            None => false,
        }
    }

    /// Cancels the active timer (if any) and returns to `Stopped`.
    fn stop_playback(&mut self) -> bool {
        match std::mem::replace(&mut self.playback, Playback::Stopped) {
            Playback::Playing(timer) => {
                timer.cancel();
                true
            }
            Playback::Stopped => false,
        }
    }
}

#[derive(Debug)]
struct Shared {
    range: YearRange,
    interval: Duration,
    state: Mutex<State>,
    updates: watch::Sender<TimelineSnapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &State) {
        self.updates.send_replace(state.snapshot());
    }

    /// Applies one playback tick. Returns false once the ticker should exit.
    fn playback_tick(&self, session: u64) -> bool {
        let mut state = self.lock();
        match &state.playback {
            Playback::Playing(timer) if timer.session == session => {}
            _ => return false,
        }

        if state.step_forward(self.range) {
            debug!(year = ?state.position, "playback advanced");
            self.publish(&state);
            true
        } else {
            state.stop_playback();
            info!(year = ?state.position, "playback reached the end of the timeline");
            self.publish(&state);
            false
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.stop_playback();
    }
}

/// Bounded year cursor with step/seek navigation and timed auto-advance.
#[derive(Debug, Clone)]
pub struct TimelineController {
    shared: Arc<Shared>,
}

impl TimelineController {
    /// Creates a controller over `range` ticking at the default interval.
    pub fn new(range: YearRange) -> Self {
        Self::with_playback_interval(range, DEFAULT_PLAYBACK_INTERVAL)
    }

    /// Creates a controller with a custom playback tick period.
    pub fn with_playback_interval(range: YearRange, interval: Duration) -> Self {
        let state = State {
            position: None,
            playback: Playback::Stopped,
            selected_location: None,
            last_update_date: None,
            sessions_started: 0,
        };
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            shared: Arc::new(Shared {
                range,
                interval,
                state: Mutex::new(state),
                updates,
            }),
        }
    }

    /// Creates a controller spanning `first_year` through the current year.
    ///
    /// # Errors
    /// Returns `TimelineError::EmptyRange` if `first_year` is in the future.
    pub fn through_current_year(
        first_year: i32,
        interval: Duration,
    ) -> Result<Self, TimelineError> {
        let range = YearRange::through_current_year(first_year)?;
        Ok(Self::with_playback_interval(range, interval))
    }

    // === Queries ===

    /// The immutable range of selectable years.
    pub fn available_years(&self) -> YearRange {
        self.shared.range
    }

    /// Statistics the rendering layer may request per year.
    pub fn statistic_kinds(&self) -> &'static [Statistic] {
        Statistic::all()
    }

    pub fn playback_interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn position(&self) -> Option<i32> {
        self.shared.lock().position
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.shared.lock().playback, Playback::Playing(_))
    }

    pub fn selected_location(&self) -> Option<Location> {
        self.shared.lock().selected_location.clone()
    }

    pub fn last_update_date(&self) -> Option<String> {
        self.shared.lock().last_update_date.clone()
    }

    pub fn snapshot(&self) -> TimelineSnapshot {
        self.shared.lock().snapshot()
    }

    /// Subscribes to state changes. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<TimelineSnapshot> {
        self.shared.updates.subscribe()
    }

    // === Navigation ===

    /// Moves the cursor to the most recent year.
    pub fn initialize_defaults(&self) {
        self.seek_to_end();
    }

    /// Moves the cursor to `year`.
    ///
    /// # Errors
    /// Returns `TimelineError::OutOfRange` if `year` is not selectable; the
    /// cursor is left untouched.
    pub fn set_year(&self, year: i32) -> Result<(), TimelineError> {
        let range = self.shared.range;
        if !range.contains(year) {
            return Err(TimelineError::OutOfRange {
                year,
                first: range.first(),
                last: range.last(),
            });
        }
        self.update(|state| state.position = Some(year));
        debug!(year, "year selected");
        Ok(())
    }

    /// Advances one year. Returns false if the cursor is unset or already last.
    pub fn step_forward(&self) -> bool {
        let range = self.shared.range;
        let moved = self.update(|state| state.step_forward(range));
        debug!(moved, "step forward");
        moved
    }

    /// Moves back one year. Returns false if the cursor is unset or already first.
    pub fn step_backward(&self) -> bool {
        let range = self.shared.range;
        let moved = self.update(|state| state.step_backward(range));
        debug!(moved, "step backward");
        moved
    }

    pub fn seek_to_start(&self) {
        let first = self.shared.range.first();
        self.update(|state| state.position = Some(first));
    }

    pub fn seek_to_end(&self) {
        let last = self.shared.range.last();
        self.update(|state| state.position = Some(last));
    }

    // === Playback ===

    /// Starts or stops auto-advance and returns the new state.
    ///
    /// # Panics
    /// Starting playback spawns a task, so it must be called from within a
    /// tokio runtime.
    pub fn toggle_playback(&self) -> PlaybackState {
        let mut state = self.shared.lock();
        if state.stop_playback() {
            info!(year = ?state.position, "playback paused");
            self.shared.publish(&state);
            return PlaybackState::Stopped;
        }

        state.sessions_started += 1;
        let session = state.sessions_started;
        let cancel = CancellationToken::new();
        let period = self.shared.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shared = Arc::downgrade(&self.shared);
        let token = cancel.clone();
        tokio::spawn(async move {
            run_ticker(shared, session, token, ticker).await;
        });

        state.playback = Playback::Playing(PlaybackTimer { session, cancel });
        info!(year = ?state.position, session, "playback started");
        self.shared.publish(&state);
        PlaybackState::Playing
    }

    /// Stops playback if active. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.shared.lock();
        if state.stop_playback() {
            info!("playback stopped on shutdown");
            self.shared.publish(&state);
        }
    }

    // === Orthogonal selections ===

    /// Selects a location after validating its coordinates.
    ///
    /// # Errors
    /// Returns `TimelineError::InvalidLocation` for non-finite or
    /// out-of-range coordinates; the previous selection is kept.
    pub fn set_selected_location(&self, location: Location) -> Result<(), TimelineError> {
        location.validate()?;
        debug!(name = %location.name, "location selected");
        self.update(|state| state.selected_location = Some(location));
        Ok(())
    }

    pub fn clear_selected_location(&self) {
        self.update(|state| state.selected_location = None);
    }

    /// Records the dataset's last-update label for display.
    pub fn set_last_update_date(&self, date: impl Into<String>) {
        let date = date.into();
        self.update(|state| state.last_update_date = Some(date));
    }

    fn update<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.shared.lock();
        let result = f(&mut state);
        self.shared.publish(&state);
        result
    }
}

async fn run_ticker(
    shared: Weak<Shared>,
    session: u64,
    cancel: CancellationToken,
    mut ticker: tokio::time::Interval,
) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let Some(shared) = shared.upgrade() else {
            break;
        };
        if !shared.playback_tick(session) {
            break;
        }
    }
}
