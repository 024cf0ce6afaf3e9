/// End-to-end tests: real IRC clients against an in-process server.
///
/// Each test boots its own server on an ephemeral port inside a dedicated
/// runtime thread, then drives it with small blocking TCP clients:
///
/// - the PASS/NICK/USER handshake and welcome burst
/// - nickname collisions
/// - key-protected joins
/// - operator promotion when the last operator parts
/// - self-kick rejection
/// - nick changes propagating into channel membership
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use ircserv::config::Config;
use ircserv::irc::server::Server;

const PASSWORD: &str = "secret";

/// Start a server on an ephemeral port in its own runtime thread.
fn start_server() -> SocketAddr {
    let (addr_tx, addr_rx) = mpsc::channel();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        runtime.block_on(async move {
            let config = Config {
                port: 0,
                password: PASSWORD.into(),
            };
            let server = Server::bind(&config).await.expect("bind");
            addr_tx
                .send(server.local_addr().expect("local addr"))
                .expect("send addr");
            let _ = server.run().await;
        });
    });
    let addr = addr_rx.recv().expect("server address");
    SocketAddr::from(([127, 0, 0, 1], addr.port()))
}

/// Simple blocking IRC client for testing.
struct TestClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    lines: Vec<String>,
}

impl TestClient {
    fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(3)))
            .expect("read timeout");
        let writer = stream.try_clone().expect("clone stream");
        Self {
            reader: BufReader::new(stream),
            writer,
            lines: Vec::new(),
        }
    }

    /// Connect and complete the handshake, reading through the MOTD end.
    fn register(addr: SocketAddr, nick: &str) -> Self {
        let mut client = Self::connect(addr);
        client.send(&format!("PASS {PASSWORD}"));
        client.send(&format!("NICK {nick}"));
        client.send(&format!("USER {nick} 0 * :{nick}"));
        client.read_until(" 376 ").expect("welcome burst");
        client
    }

    fn send(&mut self, line: &str) {
        writeln!(self.writer, "{line}\r").expect("send");
        self.writer.flush().expect("flush");
    }

    /// Read lines until one contains the given substring; returns that line.
    fn read_until(&mut self, marker: &str) -> io::Result<String> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed",
                    ))
                }
                Ok(_) => {
                    let trimmed = line.trim_end().to_string();
                    self.lines.push(trimmed.clone());
                    if trimmed.contains(marker) {
                        return Ok(trimmed);
                    }
                }
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::TimedOut =>
                {
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("timeout waiting for {marker:?}; saw {:#?}", self.lines),
                    ));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Join a channel and read until the NAMES list ends.
    fn join(&mut self, channel: &str) {
        self.send(&format!("JOIN {channel}"));
        self.read_until(" 366 ").expect("names end");
    }
}

// ── Scenarios ────────────────────────────────────────────────────

#[test]
fn registration_happy_path() {
    let addr = start_server();
    let mut alice = TestClient::connect(addr);
    alice.send(&format!("PASS {PASSWORD}"));
    alice.send("NICK alice");
    alice.send("USER alice 0 * :Alice");

    let line = alice.read_until(" 001 ").expect("RPL_WELCOME");
    assert!(line.starts_with(":localhost 001 alice"), "{line}");
    // The MOTD follows the welcome burst.
    alice.read_until(" 376 ").expect("end of MOTD");
}

#[test]
fn wrong_password_is_rejected() {
    let addr = start_server();
    let mut alice = TestClient::connect(addr);
    alice.send("PASS letmein");
    let line = alice.read_until(" 464 ").expect("ERR_PASSWDMISMATCH");
    assert!(line.contains("Password incorrect"), "{line}");
}

#[test]
fn commands_require_registration() {
    let addr = start_server();
    let mut lurker = TestClient::connect(addr);
    lurker.send("JOIN #chan");
    lurker.read_until(" 451 ").expect("ERR_NOTREGISTERED");
}

#[test]
fn nick_collision() {
    let addr = start_server();
    let _alice = TestClient::register(addr, "alice");

    let mut intruder = TestClient::connect(addr);
    intruder.send(&format!("PASS {PASSWORD}"));
    intruder.send("NICK alice");
    let line = intruder.read_until(" 433 ").expect("ERR_NICKNAMEINUSE");
    assert!(line.contains("alice"), "{line}");
}

#[test]
fn channel_create_join_and_key() {
    let addr = start_server();
    let mut alice = TestClient::register(addr, "alice");
    alice.join("#chan");
    alice.send("MODE #chan +k hunter2");
    // The key echo masks the key with asterisks.
    let line = alice.read_until(" 324 ").expect("masked key echo");
    assert!(line.contains("*******"), "{line}");
    assert!(!line.contains("hunter2"), "{line}");

    let mut bob = TestClient::register(addr, "bob");
    bob.send("JOIN #chan wrong");
    let line = bob.read_until(" 475 ").expect("ERR_BADCHANNELKEY");
    assert!(line.contains("#chan"), "{line}");

    bob.send("JOIN #chan hunter2");
    bob.read_until(" 366 ").expect("names end");
    assert!(
        bob.lines.iter().any(|l| l.contains("JOIN") && l.contains("bob")),
        "bob saw no JOIN echo: {:#?}",
        bob.lines
    );

    // The join is broadcast to alice as well.
    let line = alice.read_until("JOIN").expect("join broadcast");
    assert!(line.starts_with(":bob!"), "{line}");
}

#[test]
fn operator_promotion_on_part() {
    let addr = start_server();
    let mut alice = TestClient::register(addr, "alice");
    alice.join("#chan");
    let mut bob = TestClient::register(addr, "bob");
    bob.join("#chan");

    alice.send("PART #chan");
    alice.read_until("PART").expect("own part echo");
    bob.read_until("PART").expect("part broadcast");

    // The channel keeps its topic lock from creation.
    bob.send("MODE #chan");
    let line = bob.read_until(" 324 ").expect("mode query");
    assert!(line.contains("+t"), "{line}");

    // bob was promoted: a mode change now succeeds and is broadcast.
    bob.send("MODE #chan +i");
    let line = bob.read_until("MODE #chan").expect("mode broadcast");
    assert!(line.contains("+i"), "{line}");
    assert!(
        !bob.lines.iter().any(|l| l.contains(" 482 ")),
        "bob was refused as operator: {:#?}",
        bob.lines
    );
}

#[test]
fn self_kick_rejected() {
    let addr = start_server();
    let mut alice = TestClient::register(addr, "alice");
    alice.join("#chan");
    let mut bob = TestClient::register(addr, "bob");
    bob.join("#chan");

    alice.send("KICK #chan alice :bye");
    let line = alice.read_until(" 482 ").expect("self-kick refusal");
    assert!(line.contains("You can't kick yourself"), "{line}");

    // alice is still a member and keeps receiving channel traffic.
    bob.send("PRIVMSG #chan :hello alice");
    let line = alice.read_until("hello alice").expect("channel message");
    assert!(line.contains("PRIVMSG"), "{line}");
}

#[test]
fn nick_change_propagates_to_channels() {
    let addr = start_server();
    let mut alice = TestClient::register(addr, "alice");
    alice.join("#chan");
    let mut bob = TestClient::register(addr, "bob");
    bob.join("#chan");
    alice.read_until("JOIN").expect("bob joins");

    bob.send("NICK bobby");
    let line = bob.read_until("NICK").expect("nick confirmation");
    assert!(line.contains("bobby"), "{line}");

    // Channel traffic still reaches the renamed session.
    alice.send("PRIVMSG #chan :hi bobby");
    let line = bob.read_until("hi bobby").expect("delivery after rename");
    assert!(line.starts_with(":alice!"), "{line}");

    // Membership queries reflect the new name.
    bob.send("NAMES #chan");
    let line = bob.read_until(" 353 ").expect("names reply");
    assert!(line.contains("bobby"), "{line}");

    // And the renamed session still counts as a member.
    bob.send("TOPIC #chan");
    bob.read_until(" 331 ").expect("topic query as member");
}

#[test]
fn invite_only_flow() {
    let addr = start_server();
    let mut alice = TestClient::register(addr, "alice");
    alice.join("#priv");
    alice.send("MODE #priv +i");
    alice.read_until("+i").expect("mode broadcast");

    let mut bob = TestClient::register(addr, "bob");
    bob.send("JOIN #priv");
    bob.read_until(" 473 ").expect("ERR_INVITEONLYCHAN");

    alice.send("INVITE bob #priv");
    alice.read_until(" 341 ").expect("RPL_INVITING");
    let line = bob.read_until("INVITE").expect("invite notification");
    assert!(line.contains("#priv"), "{line}");

    bob.send("JOIN #priv");
    bob.read_until(" 366 ").expect("join after invite");
}

#[test]
fn notice_failures_are_silent() {
    let addr = start_server();
    let mut alice = TestClient::register(addr, "alice");
    alice.send("NOTICE ghost :anyone there?");
    // A PING fences the check: its PONG must be the next reply, with no
    // error numeric in between.
    alice.send("PING :fence");
    alice.read_until("fence").expect("pong");
    assert!(
        !alice.lines.iter().any(|l| l.contains(" 401 ")),
        "NOTICE produced an error: {:#?}",
        alice.lines
    );
}

#[test]
fn quit_is_relayed_to_channel_peers() {
    let addr = start_server();
    let mut alice = TestClient::register(addr, "alice");
    alice.join("#chan");
    let mut bob = TestClient::register(addr, "bob");
    bob.join("#chan");
    alice.read_until("JOIN").expect("bob joins");

    bob.send("QUIT :gone fishing");
    let line = alice.read_until("QUIT").expect("quit relay");
    assert!(line.contains("gone fishing"), "{line}");
}
