//! # Introduction
//!
//! tracetty replays execution traces of small C programs. The traces are
//! fabricated by an external generation service (there is no compiler or
//! interpreter here) and arrive as untrusted JSON; this crate validates them
//! once, plays them back on a fixed cadence with user transport controls, and
//! projects each step into a scene for the topic's visualization kind.
//!
//! ## Pipeline
//!
//! ```text
//! JSON → CompilationResult → Trace → TracePlayer → (index, step) → Scene → TUI
//!                                         └──────→ current line → source view
//! ```
//!
//! 1. [`trace`]: wire format, validation and the [`trace::TraceStep`] model.
//! 2. [`player`]: [`player::TracePlayer`] with playback state, tick scheduling
//!    with stale-tick rejection, and step/line/finish notifications.
//! 3. [`scene`]: [`scene::project`], a pure mapping from a step and a
//!    [`scene::VisualizationKind`] to a renderable [`scene::Scene`].
//! 4. [`ui`]: ratatui-based replay viewer; not part of the stable library API.

pub mod player;
pub mod scene;
pub mod trace;
pub mod ui;
