//! Wheel Selector
//!
//! Picks one movie out of a user-curated list by "spinning" a wheel. Each
//! candidate owns an equal arc, in list order, starting at 0 degrees. The
//! wheel turns clockwise under a fixed pointer, so the winner is read by
//! walking the arcs backwards from the final stop angle.
//!
//! The winner is only announced once the spin animation has had time to
//! finish. A spin cannot be cancelled once started.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info};

/// Four full turns, added to every spin so it always looks like a real spin.
pub const FULL_TURNS_DEGREES: f64 = 1440.0;

/// How long the wheel animates before the winner is known.
pub const DEFAULT_SPIN_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WheelError {
    #[error("The wheel has no candidates")]
    Empty,
    #[error("The wheel is already spinning")]
    AlreadySpinning,
    #[error("The spin task ended before announcing a winner")]
    Interrupted,
}

/// Source of the random extra rotation, in degrees within `[0, 360)`.
pub trait RandomSource: Send + Sync {
    fn offset_degrees(&self) -> f64;
}

/// Uniform offsets from the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn offset_degrees(&self) -> f64 {
        rand::random_range(0.0..360.0)
    }
}

/// Always returns the same offset. Useful for deterministic spins.
#[derive(Debug, Clone, Copy)]
pub struct FixedOffset(pub f64);

impl RandomSource for FixedOffset {
    fn offset_degrees(&self) -> f64 {
        self.0
    }
}

/// Distinct candidate titles, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelCandidates {
    items: Vec<String>,
}

impl WheelCandidates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` unless it is already present. Returns whether it was added.
    pub fn add(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        if self.items.contains(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Removes the candidate at `index`, if there is one.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|i| i == item)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Index of the segment under the pointer after the wheel has turned by
/// `rotation` degrees, for a wheel of `count` equal segments.
///
/// Stop angles of 0 and 360 land on the same segment.
pub fn winning_index(rotation: f64, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let arc = 360.0 / count as f64;
    let stop = rotation.rem_euclid(360.0);
    let under_pointer = (360.0 - stop).rem_euclid(360.0);
    Some((under_pointer / arc).floor() as usize % count)
}

#[derive(Debug, Default)]
struct WheelState {
    candidates: WheelCandidates,
    rotation: f64,
    spinning: bool,
}

/// A spin in progress.
///
/// The target rotation is known immediately so a view can start animating;
/// the winner arrives once the spin duration has elapsed.
#[derive(Debug)]
pub struct Spin {
    pub start_rotation: f64,
    pub target_rotation: f64,
    winner: oneshot::Receiver<String>,
}

impl Spin {
    /// Waits for the spin to settle and returns the winning title.
    pub async fn winner(self) -> Result<String, WheelError> {
        self.winner.await.map_err(|_| WheelError::Interrupted)
    }
}

/// The spinning wheel and its candidate list.
#[derive(Clone)]
pub struct Wheel {
    state: Arc<Mutex<WheelState>>,
    random: Arc<dyn RandomSource>,
    duration: Duration,
}

impl Default for Wheel {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl Wheel {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self {
            state: Arc::new(Mutex::new(WheelState::default())),
            random,
            duration: DEFAULT_SPIN_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub async fn add_candidate(&self, item: impl Into<String>) -> bool {
        let item = item.into();
        let added = self.state.lock().await.candidates.add(item.clone());
        debug!(%item, added, "Add wheel candidate");
        added
    }

    pub async fn remove_candidate(&self, index: usize) -> Option<String> {
        self.state.lock().await.candidates.remove(index)
    }

    pub async fn candidates(&self) -> WheelCandidates {
        self.state.lock().await.candidates.clone()
    }

    /// Total rotation accumulated over every spin so far, in degrees.
    pub async fn rotation(&self) -> f64 {
        self.state.lock().await.rotation
    }

    pub async fn is_spinning(&self) -> bool {
        self.state.lock().await.spinning
    }

    /// Starts a spin.
    ///
    /// The candidate list is captured now; edits made while the wheel turns
    /// do not affect this spin's winner. Rotation carries over from previous
    /// spins instead of resetting.
    pub async fn spin(&self) -> Result<Spin, WheelError> {
        let mut state = self.state.lock().await;
        if state.spinning {
            return Err(WheelError::AlreadySpinning);
        }
        if state.candidates.is_empty() {
            return Err(WheelError::Empty);
        }

        let snapshot = state.candidates.items().to_vec();
        let start_rotation = state.rotation;
        let offset = self.random.offset_degrees().rem_euclid(360.0);
        let target_rotation = start_rotation + FULL_TURNS_DEGREES + offset;
        state.rotation = target_rotation;
        state.spinning = true;
        drop(state);

        info!(
            candidates = snapshot.len(),
            start_rotation, target_rotation, "Wheel spinning"
        );

        let (tx, rx) = oneshot::channel();
        let shared = self.state.clone();
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            shared.lock().await.spinning = false;

            if let Some(index) = winning_index(target_rotation, snapshot.len()) {
                let winner = snapshot[index].clone();
                info!(%winner, index, "Wheel stopped");
                // The caller may have stopped listening; the spin still completes.
                let _ = tx.send(winner);
            }
        });

        Ok(Spin {
            start_rotation,
            target_rotation,
            winner: rx,
        })
    }
}
