//! Trace playback
//!
//! - [`engine`]: [`TracePlayer`], the owner of playback state
//! - [`scheduler`]: the [`Scheduler`] seam and the virtual-time [`TimerQueue`]
//! - [`listeners`]: subscription handles for step, line and finish events
//! - [`shared`]: [`SharedTracePlayer`], a mutex-guarded player for
//!   multi-threaded hosts
//!
//! # State machine
//!
//! ```text
//! Empty ──load──▶ Playing ⇄ Paused ──▶ Finished
//!   ▲                                     │
//!   └───────────── load / clear ──────────┘
//! ```
//!
//! `Finished` is reached when autoplay hits the last step, or when a seek
//! lands on it. `play()` does nothing there until another trace is loaded or
//! the user seeks back.

pub mod engine;
pub mod listeners;
pub mod scheduler;
pub mod shared;

pub use engine::TracePlayer;
pub use listeners::SubscriptionId;
pub use scheduler::{Scheduler, TickToken, TimerQueue};
pub use shared::SharedTracePlayer;

use std::time::Duration;

/// Delay between autoplay steps
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(1500);

/// Player settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Delay between two autoplay steps, measured from the previous step
    pub cadence: Duration,
}

impl PlayerConfig {
    pub fn with_cadence_ms(ms: u64) -> Self {
        PlayerConfig {
            cadence: Duration::from_millis(ms),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            cadence: DEFAULT_CADENCE,
        }
    }
}

/// Snapshot of the player's position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// `None` exactly when the loaded trace is empty
    pub current_index: Option<usize>,
    pub is_playing: bool,
}

/// Coarse playback status derived from [`PlaybackState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Empty,
    Playing,
    Paused,
    Finished,
}

impl PlaybackStatus {
    pub fn label(self) -> &'static str {
        match self {
            PlaybackStatus::Empty => "EMPTY",
            PlaybackStatus::Playing => "PLAYING",
            PlaybackStatus::Paused => "PAUSED",
            PlaybackStatus::Finished => "END",
        }
    }
}
