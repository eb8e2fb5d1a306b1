//! The session state machine and command dispatcher.
//!
//! One [`Session`] owns the transport, the reassembler, the channel store,
//! and the refresh signal. All mutation happens on the single cooperative
//! loop that calls [`Session::poll_network`], the input operations, and
//! [`Session::flush_outgoing`] in turn; no locks, no shared state.

use crate::channel::{ChannelStore, STATUS_CHANNEL};
use crate::error::TransportError;
use crate::reassembly::LineReassembler;
use crate::signal::RefreshSignal;
use crate::transport::{RECV_CHUNK, SendQueue, Transport};
use crate::wire::{Command, ParsedLine, format_command};

/// Connection phase: handshake sent vs. welcome seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Connecting,
    Established,
}

/// Policy for a PRIVMSG whose target channel is not in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownTargetPolicy {
    /// Drop the message silently.
    #[default]
    Drop,
    /// Create the channel and deliver into it.
    AutoCreate,
}

/// Identity and connection parameters, already validated by the caller.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub nickname: String,
    pub password: Option<String>,
    pub host: String,
    pub port: u16,
    pub unknown_target: UnknownTargetPolicy,
}

/// A live client session: protocol state machine plus conversation model.
pub struct Session<T: Transport> {
    config: SessionConfig,
    transport: T,
    phase: Phase,
    /// Origin of the first server-sourced NOTICE/welcome line.
    server_identity: Option<String>,
    channels: ChannelStore,
    reassembler: LineReassembler,
    outgoing: SendQueue,
    refresh: RefreshSignal,
    columns: usize,
    connected: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(config: SessionConfig, transport: T, columns: usize) -> Self {
        Self {
            config,
            transport,
            phase: Phase::Connecting,
            server_identity: None,
            channels: ChannelStore::new(),
            reassembler: LineReassembler::new(),
            outgoing: SendQueue::new(),
            refresh: RefreshSignal::None,
            columns: columns.max(1),
            connected: true,
        }
    }

    /// Send the registration handshake and create the Status channel.
    pub fn register(&mut self) {
        if let Some(password) = self.config.password.clone() {
            self.send_command("PASS", &password);
        }
        let nick = self.config.nickname.clone();
        self.send_command("NICK", &nick);
        self.send_command("USER", &format!("{nick} * * :{nick}"));
        self.channels.insert(STATUS_CHANNEL);
        self.refresh.raise(RefreshSignal::Full);
    }

    pub fn nickname(&self) -> &str {
        &self.config.nickname
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn channels(&self) -> &ChannelStore {
        &self.channels
    }

    pub fn refresh_pending(&self) -> bool {
        self.refresh.is_pending()
    }

    /// Consume the pending refresh signal.
    pub fn take_refresh(&mut self) -> RefreshSignal {
        self.refresh.take()
    }

    /// Update the display width used for wrapping; the view must be
    /// repainted afterwards.
    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
        self.refresh.raise(RefreshSignal::Full);
    }

    /// Queue one outgoing protocol line.
    pub fn send_command(&mut self, cmd: &str, message: &str) {
        self.outgoing.push(format_command(cmd, message));
    }

    /// Drain queued outgoing lines without blocking. A send failure is
    /// transient: logged, and the loop continues.
    pub fn flush_outgoing(&mut self) {
        if !self.connected {
            return;
        }
        if let Err(e) = self.outgoing.drain(&mut self.transport) {
            tracing::warn!(error = %e, "transient send failure");
        }
    }

    /// Drain every complete line currently available from the transport
    /// and dispatch each in arrival order.
    pub fn poll_network(&mut self) {
        while self.connected {
            match self.transport.receive(RECV_CHUNK) {
                Ok(bytes) if bytes.is_empty() => break,
                Ok(bytes) => {
                    for line in self.reassembler.push(&bytes) {
                        tracing::trace!(%line, "rx");
                        match ParsedLine::parse(&line) {
                            Ok(parsed) => self.dispatch(parsed),
                            Err(e) => {
                                tracing::debug!(%line, error = %e, "dropping malformed line");
                            }
                        }
                    }
                }
                Err(TransportError::Closed) => {
                    self.connected = false;
                    self.transport.close();
                    self.append_to(STATUS_CHANNEL, "Disconnected from server");
                    tracing::info!("connection closed by peer");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "transient receive failure");
                    break;
                }
            }
        }
    }

    /// Apply one parsed line to the session. Incoming dispatch is
    /// phase-agnostic; only outgoing user traffic is gated on the phase.
    fn dispatch(&mut self, line: ParsedLine) {
        // The first server-sourced NOTICE or welcome pins the server
        // identity used to route Status traffic.
        if matches!(line.command, Command::Notice | Command::Welcome)
            && self.server_identity.is_none()
            && line.origin.is_some()
        {
            self.server_identity = line.origin.clone();
        }

        if line.origin.is_some() && line.origin == self.server_identity {
            // Server traffic: drop the first param (our nick) and the text
            // marker, then echo to Status. No second token means nothing
            // worth showing.
            if let Some((_, text)) = line.params.split_once(' ') {
                let text = text.strip_prefix(':').unwrap_or(text).to_string();
                self.append_to(STATUS_CHANNEL, &text);
            }
        }

        match line.command {
            Command::Ping => {
                let token = line.params.clone();
                self.send_command("PONG", &token);
            }
            Command::Privmsg => self.on_privmsg(&line),
            Command::Join => self.on_join(&line),
            Command::Part => self.on_part(&line),
            Command::Welcome | Command::MotdEnd => {
                // Registration is complete; user traffic may flow.
                // Post-connect actions (auto-join etc.) would hook in here.
                self.phase = Phase::Established;
            }
            Command::Notice | Command::Unknown(_) => {}
        }
    }

    fn on_privmsg(&mut self, line: &ParsedLine) {
        let Some((target, text)) = line.params.split_once(' ') else {
            tracing::debug!(params = %line.params, "PRIVMSG without message text");
            return;
        };
        let text = text.strip_prefix(':').unwrap_or(text).to_string();
        let nick = line.nickname().unwrap_or("server").to_string();
        let target = target.to_string();

        if !self.channels.contains(&target) {
            match self.config.unknown_target {
                UnknownTargetPolicy::Drop => {
                    tracing::debug!(%target, "message for unknown channel dropped");
                    return;
                }
                UnknownTargetPolicy::AutoCreate => {
                    self.channels.insert(&target);
                }
            }
        }
        self.append_to(&target, &format!("<{nick}> {text}"));
    }

    fn on_join(&mut self, line: &ParsedLine) {
        let channel = channel_param(&line.params);
        if channel.is_empty() {
            return;
        }
        match line.nickname() {
            Some(nick) if nick == self.config.nickname => {
                self.channels.insert(&channel);
                self.append_to(&channel, &format!("Joined {channel}"));
            }
            Some(nick) => {
                if self.channels.contains(&channel) {
                    let text = format!("{nick} joined {channel}");
                    self.append_to(&channel, &text);
                }
            }
            None => {}
        }
    }

    fn on_part(&mut self, line: &ParsedLine) {
        let channel = channel_param(&line.params);
        if channel.is_empty() || !self.channels.contains(&channel) {
            return;
        }
        match line.nickname() {
            Some(nick) if nick == self.config.nickname => {
                self.append_to(&channel, &format!("Left {channel}"));
                self.channels.remove(&channel);
            }
            Some(nick) => {
                let text = format!("{nick} left {channel}");
                self.append_to(&channel, &text);
            }
            None => {}
        }
    }

    /// Wrap and append to a channel's backlog, raising Full when the
    /// target is currently on screen.
    fn append_to(&mut self, name: &str, text: &str) {
        let active = self.channels.is_active(name);
        let columns = self.columns;
        if let Some(channel) = self.channels.get_mut(name) {
            channel.append_line(text, columns);
            if active {
                self.refresh.raise(RefreshSignal::Full);
            }
        }
    }

    // ── Input-buffer operations on the active channel ──

    pub fn input_char(&mut self, c: char) {
        if let Some(channel) = self.channels.active_mut() {
            channel.input_push(c);
            self.refresh.raise(RefreshSignal::InputOnly);
        }
    }

    pub fn input_space(&mut self) {
        self.input_char(' ');
    }

    pub fn input_backspace(&mut self) {
        if let Some(channel) = self.channels.active_mut() {
            channel.input_backspace();
            self.refresh.raise(RefreshSignal::InputOnly);
        }
    }

    /// Switch the active channel by `step`, wrapping in both directions.
    pub fn navigate(&mut self, step: isize) {
        self.channels.navigate(step);
        self.refresh.raise(RefreshSignal::Full);
    }

    /// Handle the Enter key: `/join` and `/part` go out as protocol
    /// commands, anything else as a message to the active channel.
    ///
    /// Nothing is sent before registration completes.
    pub fn submit_input(&mut self) {
        if self.phase != Phase::Established {
            tracing::debug!("submit ignored before registration completes");
            return;
        }
        let Some(trimmed) = self.channels.active().map(|c| c.input().trim().to_string()) else {
            return;
        };
        if trimmed.is_empty() {
            return;
        }
        if let Some(rest) = trimmed.strip_prefix('/') {
            let (cmd, value) = match rest.split_once(' ') {
                Some((cmd, value)) => (cmd.to_ascii_uppercase(), value.trim().to_string()),
                None => (rest.to_ascii_uppercase(), String::new()),
            };
            if cmd == "JOIN" || cmd == "PART" {
                if !value.is_empty() {
                    self.send_command(&cmd, &value);
                }
                if let Some(channel) = self.channels.active_mut() {
                    channel.input_clear();
                }
                self.refresh.raise(RefreshSignal::InputOnly);
                return;
            }
            // Unrecognized slash commands fall through as literal text.
        }
        self.send_active_input();
    }

    /// Send the active input buffer as a PRIVMSG, echo it locally, and
    /// clear the buffer.
    pub fn send_active_input(&mut self) {
        let Some((target, text)) = self
            .channels
            .active_mut()
            .map(|c| (c.name().to_string(), c.input_take()))
        else {
            return;
        };
        self.send_command("PRIVMSG", &format!("{target} :{text}"));
        let nick = self.config.nickname.clone();
        self.append_to(&target, &format!("<{nick}> {text}"));
    }
}

/// JOIN/PART carry the channel either bare or `:`-prefixed.
fn channel_param(params: &str) -> String {
    let first = params.split_whitespace().next().unwrap_or("");
    first.strip_prefix(':').unwrap_or(first).to_string()
}
