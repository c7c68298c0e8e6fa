// tracetty: terminal replay of service-generated C execution traces

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use tracetty::player::{PlayerConfig, TracePlayer};
use tracetty::scene::{SceneProjector, VisualizationKind};
use tracetty::trace::CompilationResult;
use tracetty::ui::App;

#[derive(Parser, Debug)]
#[command(name = "tracetty", version, about = "Replay a C execution trace in the terminal")]
struct Args {
    /// Compilation result JSON returned by the generation service
    result: PathBuf,

    /// C source the trace was generated for
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Visualization kind of the topic (array, stack, loop, ...)
    #[arg(short, long, default_value = "none")]
    kind: VisualizationKind,

    /// Autoplay cadence in milliseconds
    #[arg(long, default_value_t = 1500)]
    cadence_ms: u64,

    /// Print every projected scene as a JSON line instead of starting the TUI
    #[arg(long)]
    dump: bool,

    /// Write logs to this file (the TUI owns the terminal otherwise)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(args: &Args) -> io::Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if args.dump {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn read_result(path: &Path) -> CompilationResult {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: Could not read '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match CompilationResult::from_json(&text) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Play the whole trace on a virtual clock and print each scene
fn dump_scenes(
    result: CompilationResult,
    kind: VisualizationKind,
    config: PlayerConfig,
) -> io::Result<()> {
    let cadence = config.cadence;
    let projector = SceneProjector::new(kind);
    let (tx, rx) = mpsc::channel();

    let mut player: TracePlayer = TracePlayer::new(config);
    player.on_step_changed(move |_, step| {
        let _ = tx.send(projector.project(Some(step)));
    });

    if let Err(e) = player.load(&result.into_trace_steps()) {
        eprintln!("Warning: {}", e);
    }
    while player.is_playing() {
        player.advance_by(cadence);
    }
    drop(player);

    let mut scenes: Vec<_> = rx.into_iter().collect();
    if scenes.is_empty() {
        scenes.push(projector.project(None));
    }
    for scene in scenes {
        println!("{}", serde_json::to_string(&scene).map_err(io::Error::other)?);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args)?;

    let result = read_result(&args.result);
    let config = PlayerConfig::with_cadence_ms(args.cadence_ms);
    tracing::info!(
        steps = result.step_count(),
        success = result.success,
        kind = %args.kind,
        "loaded compilation result"
    );

    if args.dump {
        dump_scenes(result, args.kind, config)?;
        return Ok(());
    }

    let source = match &args.source {
        Some(path) => fs::read_to_string(path).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "could not read source");
            String::new()
        }),
        None => String::new(),
    };

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(result, source, args.kind, config);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
