//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`source`]: C source with syntax highlighting and the current line marked
//! - [`scene`]: the projected scene for the current step
//! - [`output`]: program output and analysis reported by the service
//! - [`status`]: status bar with keybindings and playback state
//! - `utils`: border and scrolling helpers shared by the panes
//!
//! Each pane module exports a `render_*` function plus the scroll state it
//! keeps between frames. Panes are stateless apart from that scroll state.

mod utils;

pub mod output;
pub mod scene;
pub mod source;
pub mod status;

pub use output::render_output_pane;
pub use scene::{render_scene_pane, SceneScrollState};
pub use source::{render_source_pane, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
