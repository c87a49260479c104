//! Demo entrypoint: a standalone binary that reads one line from the
//! controlling terminal using the engine in `core-terminal` and prints it
//! back out, the way a shell or REPL embedding this crate would.

use anyhow::Result;
use clap::Parser;
use core_color::Rgb;
use core_config::SessionConfig;
use core_render::FrameStyle;
use core_state::FrameMode;
use core_terminal::Terminal;
use std::sync::Once;

/// Minimal line-reading demo.
#[derive(Parser, Debug)]
#[command(name = "lined-demo", version, about = "Interactive line editor demo")]
struct Args {
    /// Prompt string shown before the input line.
    #[arg(long, default_value = "> ")]
    prompt: String,
    /// Seed the line with initial text instead of starting empty.
    #[arg(long)]
    initial: Option<String>,
    /// Cap the frame at this many wrapped screen rows before scrolling.
    #[arg(long, default_value_t = 10)]
    max_lines: usize,
    /// Edit on a single horizontally-scrolling line instead of wrapping.
    #[arg(long)]
    single_line: bool,
    /// Draw the frame as a colored background rectangle instead of plain text.
    #[arg(long)]
    framed: bool,
    /// Emit OSC 133 semantic prompt markers for shell integration.
    #[arg(long)]
    osc133: bool,
}

fn install_logging() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn main() -> Result<()> {
    install_logging();
    let args = Args::parse();

    let mut config = SessionConfig::new()
        .with_prompt(args.prompt)
        .with_max_lines(args.max_lines)
        .with_frame_mode(if args.single_line {
            FrameMode::SingleLine
        } else {
            FrameMode::Multiline
        })
        .with_osc133(args.osc133);
    if args.framed {
        config = config
            .with_frame_style(FrameStyle::Background)
            .with_colors(Rgb::new(230, 230, 230), Rgb::new(30, 30, 60));
    }
    if let Some(initial) = args.initial {
        config = config.with_initial_buffer(initial);
    }

    let mut terminal = Terminal::open_stdio()?;
    match terminal.read_line(&config)? {
        Some(line) => println!("{line}"),
        None => eprintln!("(cancelled)"),
    }
    Ok(())
}
