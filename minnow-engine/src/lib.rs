//! IRC client engine: connection, line reassembly, protocol parsing, and
//! the multi-channel conversation model behind a terminal front-end.
//!
//! The engine owns no threads and takes no locks. A single cooperative
//! loop drives [`Session::poll_network`], applies edge-triggered input,
//! drains the outgoing queue, and consumes the [`RefreshSignal`] once per
//! tick. `receive` never blocks ("no data" is an ordinary result), and
//! outgoing lines are queued and written non-blockingly so a congested
//! connection cannot stall input handling or redraw.

pub mod channel;
pub mod error;
pub mod reassembly;
pub mod session;
pub mod signal;
pub mod transport;
pub mod wire;

pub use channel::{BACKLOG_LINES, Channel, ChannelStore, STATUS_CHANNEL};
pub use error::{ParseError, TransportError};
pub use reassembly::LineReassembler;
pub use session::{Phase, Session, SessionConfig, UnknownTargetPolicy};
pub use signal::RefreshSignal;
pub use transport::{RECV_CHUNK, SendQueue, TcpTransport, Transport};
pub use wire::{Command, ParsedLine, format_command};
