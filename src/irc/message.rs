/// IRC message parsing and serialization.
///
/// Implements RFC 2812 message format:
///   [`@`tags SPACE] [`:`prefix SPACE] command [SPACE params] [SPACE `:` trailing]
///
/// Messages are terminated by CR-LF (`\r\n`) on the wire, but parsing
/// operates on the content without the terminator. A leading `@`-tag block
/// is consumed through the next whitespace and discarded; the server never
/// acts on tags.
use std::fmt;

/// A parsed IRC message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Optional source prefix (server name or `nick!user@host`).
    /// Recorded when a client sends one, but carries no authority.
    pub prefix: Option<String>,
    /// The command (e.g. `PRIVMSG`, `001`, `NICK`).
    pub command: String,
    /// Middle parameters. Single tokens, never containing spaces.
    pub params: Vec<String>,
    /// Trailing parameter (after ` :`), may contain spaces. Empty if absent.
    pub trailing: String,
}

/// Errors that can occur during message parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,
    #[error("prefix present but missing command")]
    MissingCommand,
    #[error("Invalid character in parameter: {0}")]
    InvalidParam(String),
}

/// Split off the next space-delimited token.
fn split_token(s: &str) -> (&str, &str) {
    match s.find(' ') {
        Some(idx) => (&s[..idx], &s[idx + 1..]),
        None => (s, ""),
    }
}

fn trim_ws(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\r' | '\n' | '\t'))
}

impl Message {
    /// Parse a single IRC message from a line (without the trailing `\r\n`).
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = trim_ws(input);
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut rest = input;

        // Message-tags block: consumed through the next whitespace, discarded.
        if rest.starts_with('@') {
            let (_, r) = split_token(rest);
            rest = r.trim_start_matches(' ');
        }

        // Optional prefix runs until the first space.
        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (token, r) = split_token(stripped);
            if r.is_empty() {
                return Err(ParseError::MissingCommand);
            }
            prefix = Some(token.to_owned());
            rest = r.trim_start_matches(' ');
        }

        let (command, r) = split_token(rest);
        if command.is_empty() {
            return Err(ParseError::MissingCommand);
        }
        rest = r;

        let mut params = Vec::new();
        let mut trailing = String::new();

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(t) = rest.strip_prefix(':') {
                // Trailing parameter: everything after the colon, trimmed.
                trailing = trim_ws(t).to_owned();
                break;
            }
            let (token, r) = split_token(rest);
            if token.contains(['\n', '\r', '\t', ':']) {
                return Err(ParseError::InvalidParam(token.to_owned()));
            }
            params.push(token.to_owned());
            rest = r;
        }

        Ok(Message {
            prefix,
            command: command.to_owned(),
            params,
            trailing,
        })
    }

    /// Serialize to the IRC wire format (without trailing `\r\n`).
    pub fn to_wire(&self) -> String {
        let mut out = String::new();

        if let Some(ref prefix) = self.prefix {
            out.push(':');
            out.push_str(prefix);
            out.push(' ');
        }

        out.push_str(&self.command);

        for param in &self.params {
            out.push(' ');
            out.push_str(param);
        }

        if !self.trailing.is_empty() {
            out.push_str(" :");
            out.push_str(&self.trailing);
        }

        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Parsing basics ───────────────────────────────────────────

    #[test]
    fn parse_simple_command() {
        let msg = Message::parse("QUIT").unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, "QUIT");
        assert_eq!(msg.params, Vec::<String>::new());
        assert_eq!(msg.trailing, "");
    }

    #[test]
    fn parse_command_with_one_param() {
        let msg = Message::parse("NICK alice").unwrap();
        assert_eq!(msg.command, "NICK");
        assert_eq!(msg.params, vec!["alice"]);
    }

    #[test]
    fn parse_command_with_trailing() {
        let msg = Message::parse("PRIVMSG #chan :Hello everyone!").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#chan"]);
        assert_eq!(msg.trailing, "Hello everyone!");
    }

    #[test]
    fn parse_with_prefix() {
        let msg = Message::parse(":alice!user@host PRIVMSG #chan :hey friends").unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("alice!user@host"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#chan"]);
        assert_eq!(msg.trailing, "hey friends");
    }

    #[test]
    fn parse_user_command() {
        let msg = Message::parse("USER alice 0 * :Alice").unwrap();
        assert_eq!(msg.command, "USER");
        assert_eq!(msg.params, vec!["alice", "0", "*"]);
        assert_eq!(msg.trailing, "Alice");
    }

    #[test]
    fn parse_strips_crlf() {
        let msg = Message::parse("PING :server\r\n").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.trailing, "server");
    }

    #[test]
    fn parse_multiple_middle_params() {
        let msg = Message::parse("MODE #chan +o alice").unwrap();
        assert_eq!(msg.command, "MODE");
        assert_eq!(msg.params, vec!["#chan", "+o", "alice"]);
    }

    #[test]
    fn parse_collapses_repeated_spaces() {
        let msg = Message::parse("MODE   #chan  +k   hunter2").unwrap();
        assert_eq!(msg.params, vec!["#chan", "+k", "hunter2"]);
    }

    // ── Message tags ─────────────────────────────────────────────

    #[test]
    fn parse_discards_tag_block() {
        let msg = Message::parse("@time=2024-01-01T00:00:00Z PRIVMSG #chan :hi").unwrap();
        assert_eq!(msg.prefix, None);
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#chan"]);
        assert_eq!(msg.trailing, "hi");
    }

    #[test]
    fn parse_tags_then_prefix() {
        let msg = Message::parse("@id=1 :alice!u@h NICK bob").unwrap();
        assert_eq!(msg.prefix.as_deref(), Some("alice!u@h"));
        assert_eq!(msg.command, "NICK");
        assert_eq!(msg.params, vec!["bob"]);
    }

    // ── Parameter validation ─────────────────────────────────────

    #[test]
    fn parse_rejects_colon_inside_param() {
        let err = Message::parse("PRIVMSG ni:ck :hi").unwrap_err();
        assert_eq!(err, ParseError::InvalidParam("ni:ck".into()));
        assert_eq!(err.to_string(), "Invalid character in parameter: ni:ck");
    }

    #[test]
    fn parse_rejects_tab_inside_param() {
        let err = Message::parse("NICK al\tice").unwrap_err();
        assert_eq!(err, ParseError::InvalidParam("al\tice".into()));
    }

    // ── Trailing edge cases ──────────────────────────────────────

    #[test]
    fn parse_trailing_empty_is_absent() {
        // A bare `:` trailing trims to nothing; handlers treat it as a query.
        let msg = Message::parse("TOPIC #chan :").unwrap();
        assert_eq!(msg.params, vec!["#chan"]);
        assert_eq!(msg.trailing, "");
    }

    #[test]
    fn parse_trailing_keeps_inner_colons() {
        let msg = Message::parse("PRIVMSG #chan ::)").unwrap();
        assert_eq!(msg.trailing, ":)");
    }

    #[test]
    fn parse_trailing_trimmed() {
        let msg = Message::parse("KICK #chan bob :  go away  ").unwrap();
        assert_eq!(msg.params, vec!["#chan", "bob"]);
        assert_eq!(msg.trailing, "go away");
    }

    // ── Parse errors ─────────────────────────────────────────────

    #[test]
    fn parse_empty_input() {
        assert_eq!(Message::parse(""), Err(ParseError::Empty));
        assert_eq!(Message::parse("   \r\n"), Err(ParseError::Empty));
    }

    #[test]
    fn parse_prefix_only() {
        assert_eq!(
            Message::parse(":prefix_only"),
            Err(ParseError::MissingCommand)
        );
    }

    // ── Serialization ────────────────────────────────────────────

    #[test]
    fn serialize_simple() {
        let msg = Message {
            prefix: None,
            command: "QUIT".into(),
            params: vec![],
            trailing: String::new(),
        };
        assert_eq!(msg.to_wire(), "QUIT");
    }

    #[test]
    fn serialize_with_trailing() {
        let msg = Message {
            prefix: None,
            command: "PRIVMSG".into(),
            params: vec!["#chan".into()],
            trailing: "Hello everyone!".into(),
        };
        assert_eq!(msg.to_wire(), "PRIVMSG #chan :Hello everyone!");
    }

    #[test]
    fn serialize_with_prefix() {
        let msg = Message {
            prefix: Some("localhost".into()),
            command: "001".into(),
            params: vec!["alice".into()],
            trailing: "Welcome".into(),
        };
        assert_eq!(msg.to_wire(), ":localhost 001 alice :Welcome");
    }

    // ── Roundtrip ────────────────────────────────────────────────

    #[test]
    fn roundtrip_simple() {
        let input = "NICK alice";
        let msg = Message::parse(input).unwrap();
        assert_eq!(msg.to_wire(), input);
        assert_eq!(Message::parse(&msg.to_wire()).unwrap(), msg);
    }

    #[test]
    fn roundtrip_with_prefix_and_trailing() {
        let input = ":alice!user@host PRIVMSG #chan :Hello everyone!";
        let msg = Message::parse(input).unwrap();
        assert_eq!(msg.to_wire(), input);
    }

    #[test]
    fn roundtrip_numeric() {
        let input = ":localhost 001 alice :Welcome to the Internet Relay Network";
        let msg = Message::parse(input).unwrap();
        assert_eq!(msg.to_wire(), input);
        assert_eq!(Message::parse(&msg.to_wire()).unwrap(), msg);
    }

    #[test]
    fn roundtrip_mode() {
        let input = "MODE #chan +kl hunter2 10";
        let msg = Message::parse(input).unwrap();
        assert_eq!(msg.to_wire(), input);
        assert_eq!(Message::parse(&msg.to_wire()).unwrap(), msg);
    }
}
