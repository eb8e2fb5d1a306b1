//! Protocol line parsing and outgoing formatting.
//!
//! Incoming lines are split into an optional origin, a command token, and
//! an unparsed parameter string; command-specific splitting happens in
//! dispatch. Outgoing lines are plain `"<cmd> <message>\r\n"`.

use crate::error::ParseError;

/// Marker introducing the origin prefix on an incoming line.
const ORIGIN_MARKER: char = ':';

/// The command verbs the dispatcher understands.
///
/// Matching is case-insensitive on the wire token; anything else is carried
/// through as `Unknown` so dispatch stays exhaustive without stringly-typed
/// comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Privmsg,
    Notice,
    Join,
    Part,
    /// 001 RPL_WELCOME.
    Welcome,
    /// 376 RPL_ENDOFMOTD / 422 ERR_NOMOTD.
    MotdEnd,
    Unknown(String),
}

impl Command {
    fn from_token(token: &str) -> Self {
        let upper = token.to_ascii_uppercase();
        match upper.as_str() {
            "PING" => Command::Ping,
            "PRIVMSG" => Command::Privmsg,
            "NOTICE" => Command::Notice,
            "JOIN" => Command::Join,
            "PART" => Command::Part,
            "001" => Command::Welcome,
            "376" | "422" => Command::MotdEnd,
            _ => Command::Unknown(upper),
        }
    }
}

/// One parsed protocol line. Produced and consumed within a single
/// dispatch step.
#[derive(Debug, Clone)]
pub struct ParsedLine {
    /// Raw origin (`nick!user@host` or a server name), leading `:` stripped.
    pub origin: Option<String>,
    pub command: Command,
    /// Everything after the command token, left unparsed.
    pub params: String,
}

impl ParsedLine {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end();
        let (origin, rest) = if let Some(stripped) = line.strip_prefix(ORIGIN_MARKER) {
            match stripped.split_once(' ') {
                Some((origin, rest)) => (Some(origin.to_string()), rest),
                None => return Err(ParseError::OriginOnly(line.to_string())),
            }
        } else {
            (None, line)
        };
        let (token, params) = match rest.split_once(' ') {
            Some((token, params)) => (token, params),
            None => (rest, ""),
        };
        Ok(Self {
            origin,
            command: Command::from_token(token),
            params: params.to_string(),
        })
    }

    /// Nickname of the origin: the part before `!`. An origin without `!`
    /// is a server name, not a user, and yields no nickname.
    pub fn nickname(&self) -> Option<&str> {
        let origin = self.origin.as_deref()?;
        let (nick, _) = origin.split_once('!')?;
        Some(nick)
    }
}

/// Build an outgoing protocol line.
pub fn format_command(cmd: &str, message: &str) -> Vec<u8> {
    format!("{cmd} {message}\r\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_origin_command_params() {
        let line = ParsedLine::parse(":alice!u@h PRIVMSG #room :hello").unwrap();
        assert_eq!(line.origin.as_deref(), Some("alice!u@h"));
        assert_eq!(line.command, Command::Privmsg);
        assert_eq!(line.params, "#room :hello");
        assert_eq!(line.nickname(), Some("alice"));
    }

    #[test]
    fn parses_without_origin() {
        let line = ParsedLine::parse("PING :abc123").unwrap();
        assert_eq!(line.origin, None);
        assert_eq!(line.command, Command::Ping);
        assert_eq!(line.params, ":abc123");
        assert_eq!(line.nickname(), None);
    }

    #[test]
    fn command_matching_is_case_insensitive() {
        let line = ParsedLine::parse("privmsg #room :hi").unwrap();
        assert_eq!(line.command, Command::Privmsg);
    }

    #[test]
    fn command_without_params_has_empty_param_string() {
        let line = ParsedLine::parse("PING").unwrap();
        assert_eq!(line.command, Command::Ping);
        assert_eq!(line.params, "");
    }

    #[test]
    fn origin_without_command_is_an_error() {
        assert!(ParsedLine::parse(":irc.example.org").is_err());
    }

    #[test]
    fn server_origin_yields_no_nickname() {
        let line = ParsedLine::parse(":irc.example.org NOTICE * :hi").unwrap();
        assert_eq!(line.origin.as_deref(), Some("irc.example.org"));
        assert_eq!(line.nickname(), None);
    }

    #[test]
    fn numerics_map_to_phase_commands() {
        assert_eq!(ParsedLine::parse("001 tester :Welcome").unwrap().command, Command::Welcome);
        assert_eq!(ParsedLine::parse("376 tester :End of MOTD").unwrap().command, Command::MotdEnd);
        assert_eq!(ParsedLine::parse("422 tester :No MOTD").unwrap().command, Command::MotdEnd);
    }

    #[test]
    fn unrecognized_command_is_unknown() {
        let line = ParsedLine::parse(":x!u@h TOPIC #room :news").unwrap();
        assert_eq!(line.command, Command::Unknown("TOPIC".to_string()));
    }

    #[test]
    fn privmsg_round_trip_recovers_target_and_text() {
        let bytes = format_command("PRIVMSG", "#room :hello world");
        let text = std::str::from_utf8(&bytes).unwrap();
        assert!(text.ends_with("\r\n"));

        let line = ParsedLine::parse(text.trim_end()).unwrap();
        assert_eq!(line.command, Command::Privmsg);
        let (target, msg) = line.params.split_once(' ').unwrap();
        assert_eq!(target, "#room");
        assert_eq!(msg.strip_prefix(':').unwrap(), "hello world");
    }
}
