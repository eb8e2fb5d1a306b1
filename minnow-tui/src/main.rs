//! minnow, a small IRC client.
//!
//! Startup order matters: the connection is established before the
//! terminal UI starts so connect errors stay visible on stderr.

mod config;
mod ui;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tracing_subscriber::EnvFilter;

use minnow_engine::{Session, SessionConfig, TcpTransport, Transport};

use config::{Config, Resolved};

/// Fixed delay at the end of every loop iteration.
const TICK: Duration = Duration::from_millis(5);

#[derive(Debug, Parser)]
#[command(name = "minnow", about = "A small IRC client", version)]
pub struct Cli {
    /// Server hostname.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Server port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Nickname to register with.
    #[arg(short, long)]
    pub nick: Option<String>,

    /// Server password (PASS), if the server requires one.
    #[arg(long, env = "MINNOW_PASSWORD")]
    pub password: Option<String>,

    /// Create channels for messages to unknown targets instead of
    /// dropping them.
    #[arg(long)]
    pub auto_create: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolved = Resolved::merge(&cli, &Config::load())?;

    tracing::debug!(host = %resolved.host, port = resolved.port, "connecting");
    let transport = TcpTransport::connect(&resolved.host, resolved.port).await?;

    let terminal = ratatui::init();
    let result = run(terminal, resolved, transport).await;
    ratatui::restore();
    result
}

async fn run(
    mut terminal: DefaultTerminal,
    resolved: Resolved,
    transport: TcpTransport,
) -> Result<()> {
    let columns = terminal.size()?.width as usize;
    let session_config = SessionConfig {
        nickname: resolved.nick,
        password: resolved.password,
        host: resolved.host,
        port: resolved.port,
        unknown_target: resolved.unknown_target,
    };
    let mut session = Session::new(session_config, transport, columns);
    session.register();

    loop {
        // Network first: all reassembled lines land before this tick's
        // keystrokes.
        session.poll_network();

        if handle_input(&mut session)? {
            break;
        }

        session.flush_outgoing();

        if session.refresh_pending() {
            terminal.draw(|frame| ui::draw(frame, &session))?;
            session.take_refresh();
        }

        tokio::time::sleep(TICK).await;
    }

    Ok(())
}

/// Apply all key events queued since the last tick. Returns true on quit.
fn handle_input<T: Transport>(session: &mut Session<T>) -> Result<bool> {
    while event::poll(Duration::ZERO)? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Esc => return Ok(true),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(true);
                }
                KeyCode::Left => session.navigate(-1),
                KeyCode::Right => session.navigate(1),
                KeyCode::Enter => session.submit_input(),
                KeyCode::Backspace => session.input_backspace(),
                KeyCode::Char(c) => session.input_char(c),
                _ => {}
            },
            Event::Resize(width, _) => session.set_columns(width as usize),
            _ => {}
        }
    }
    Ok(false)
}
