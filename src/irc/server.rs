/// IRC server core — state management, client handling, command dispatch.
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use futures::SinkExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, RwLock};
use tokio_stream::StreamExt;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use super::channel::{Channel, JoinDenied};
use super::codec::{CodecError, IrcCodec};
use super::message::Message;
use super::replies;
use super::session::Session;
use crate::config::Config;

const MOTD_LINES: [&str; 2] = [
    "Welcome to ircserv.",
    "This server speaks the RFC 2812 core. Be excellent to each other.",
];

type Tx = mpsc::UnboundedSender<Message>;

/// Handle to send messages to a connected client.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub nick: String,
    pub username: String,
    pub realname: String,
    pub tx: Tx,
}

/// Shared server state.
#[derive(Debug)]
pub struct ServerState {
    /// Connection password every session must present via PASS.
    password: String,
    /// Every session that holds a nickname, registered or not.
    /// The key set doubles as the global nickname set.
    pub clients: HashMap<String, ClientHandle>,
    /// Channels: channel name → channel state.
    pub channels: HashMap<String, Channel>,
}

impl ServerState {
    pub fn new(password: &str) -> Self {
        Self {
            password: password.to_owned(),
            clients: HashMap::new(),
            channels: HashMap::new(),
        }
    }
}

/// Shared, thread-safe server state.
pub type SharedState = Arc<RwLock<ServerState>>;

/// Broadcast a message to a list of nicks via their client handles.
pub fn broadcast(state: &ServerState, nicks: &[String], msg: &Message) {
    for nick in nicks {
        if let Some(handle) = state.clients.get(nick) {
            let _ = handle.tx.send(msg.clone());
        }
    }
}

/// A bound, not-yet-running server.
pub struct Server {
    listener: TcpListener,
    state: SharedState,
}

impl Server {
    /// Bind the listening socket. Fails fast on port conflicts.
    pub async fn bind(config: &Config) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
        let state = Arc::new(RwLock::new(ServerState::new(&config.password)));
        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until a termination signal arrives.
    pub async fn run(self) -> std::io::Result<()> {
        let Server { listener, state } = self;

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigquit = signal(SignalKind::quit())?;
        let mut sigtstp = signal(SignalKind::from_raw(libc::SIGTSTP))?;

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (socket, addr) = accepted?;
                    info!(%addr, "new connection");
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_client(socket, state).await {
                            warn!(%addr, "client error: {e}");
                        }
                        info!(%addr, "disconnected");
                    });
                }
                _ = sigint.recv() => { info!("SIGINT received, shutting down"); break; }
                _ = sigterm.recv() => { info!("SIGTERM received, shutting down"); break; }
                _ = sigquit.recv() => { info!("SIGQUIT received, shutting down"); break; }
                _ = sigtstp.recv() => { info!("SIGTSTP received, shutting down"); break; }
            }
        }

        // Dropping the handles closes every outbound queue; connection
        // tasks wind down with the process.
        let mut st = state.write().await;
        st.channels.clear();
        st.clients.clear();
        info!("server state released");
        Ok(())
    }
}

/// What the dispatcher decided about the connection's future.
enum Flow {
    Continue,
    Quit,
}

/// Handle a single client connection.
async fn handle_client(socket: TcpStream, state: SharedState) -> Result<(), CodecError> {
    let mut framed = Framed::new(socket, IrcCodec);
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let mut session = Session::new();

    // A fatal stream error must still run the cleanup below, so it is
    // carried out of the loop instead of returned early.
    let mut fatal = None;

    loop {
        tokio::select! {
            // Incoming command from the client's TCP stream.
            frame = framed.next() => {
                match frame {
                    Some(Ok(msg)) => {
                        match dispatch(&state, &mut session, &tx, &msg).await {
                            Flow::Continue => {}
                            Flow::Quit => break,
                        }
                    }
                    Some(Err(e)) => {
                        fatal = Some(e);
                        break;
                    }
                    None => break, // connection closed
                }
            }

            // Outgoing message queued by a handler (ours or a peer's).
            Some(msg) = rx.recv() => {
                if let Err(e) = framed.send(msg).await {
                    fatal = Some(e);
                    break;
                }
            }
        }
    }

    // Release server-side state first, then deliver whatever is still
    // queued (the ERROR line on QUIT, late broadcasts) best-effort.
    if let Some(nick) = session.nick.take() {
        remove_client(&state, &nick, "Connection closed").await;
    }
    while let Ok(msg) = rx.try_recv() {
        if framed.send(msg).await.is_err() {
            break;
        }
    }
    match fatal {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Map a parsed command onto its handler, enforcing the registration gate.
async fn dispatch(state: &SharedState, session: &mut Session, tx: &Tx, msg: &Message) -> Flow {
    match msg.command.to_uppercase().as_str() {
        // Capability negotiation is not supported; CAP is a no-op.
        "CAP" => {}
        "PASS" => handle_pass(state, session, tx, msg).await,
        "NICK" => handle_nick(state, session, tx, msg).await,
        "USER" => handle_user(state, session, tx, msg).await,
        "QUIT" => return handle_quit(state, session, tx, msg).await,
        command if !session.registered => {
            debug!(command, "command before registration");
            let _ = tx.send(replies::err_not_registered(session.display_nick()));
        }
        "JOIN" => handle_join(state, session, tx, msg).await,
        "PART" => handle_part(state, session, tx, msg).await,
        "PRIVMSG" => handle_message(state, session, tx, msg, false).await,
        "NOTICE" => handle_message(state, session, tx, msg, true).await,
        "MODE" => handle_mode(state, session, tx, msg).await,
        "TOPIC" => handle_topic(state, session, tx, msg).await,
        "INVITE" => handle_invite(state, session, tx, msg).await,
        "KICK" => handle_kick(state, session, tx, msg).await,
        "NAMES" => handle_names(state, session, tx, msg).await,
        "MOTD" => send_motd(tx, session.display_nick()),
        "PING" => handle_ping(session, tx, msg),
        other => debug!(command = other, "unknown command ignored"),
    }
    Flow::Continue
}

// ── Registration ─────────────────────────────────────────────────

async fn handle_pass(state: &SharedState, session: &mut Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    if session.registered {
        let _ = tx.send(replies::err_already_registered(&nick));
        return;
    }
    let supplied = msg
        .params
        .first()
        .cloned()
        .unwrap_or_else(|| msg.trailing.clone());
    if supplied.is_empty() {
        let _ = tx.send(replies::err_need_more_params(&nick, "PASS"));
        return;
    }
    let st = state.read().await;
    if supplied == st.password {
        session.password_ok = true;
    } else {
        let _ = tx.send(replies::err_passwd_mismatch(&nick));
    }
}

async fn handle_nick(state: &SharedState, session: &mut Session, tx: &Tx, msg: &Message) {
    let current = session.display_nick().to_owned();
    if !session.password_ok {
        let _ = tx.send(replies::err_passwd_mismatch(&current));
        return;
    }
    let Some(new_nick) = msg.params.first().cloned() else {
        let _ = tx.send(replies::err_no_nickname_given(&current));
        return;
    };
    if new_nick.contains(['#', '@', ':', '&']) {
        let _ = tx.send(replies::err_erroneous_nickname(&current, &new_nick));
        return;
    }
    if session.nick.as_deref() == Some(new_nick.as_str()) {
        return; // same nick, nothing to do
    }

    let mut st = state.write().await;
    if st.clients.contains_key(&new_nick) {
        let _ = tx.send(replies::err_nickname_in_use(&current, &new_nick));
        return;
    }

    match session.nick.take() {
        Some(old) => {
            // Rename: confirm to self, rewrite the handle, and update every
            // channel that knows the old name — all under one lock.
            let _ = tx.send(replies::nick_change(&old, session.username(), &new_nick));
            if let Some(mut handle) = st.clients.remove(&old) {
                handle.nick = new_nick.clone();
                st.clients.insert(new_nick.clone(), handle);
            }
            for channel in st.channels.values_mut() {
                channel.rename_member(&old, &new_nick);
            }
        }
        None => {
            // First NICK: reserve the name.
            st.clients.insert(
                new_nick.clone(),
                ClientHandle {
                    nick: new_nick.clone(),
                    username: session.username.clone().unwrap_or_default(),
                    realname: session.realname.clone().unwrap_or_default(),
                    tx: tx.clone(),
                },
            );
        }
    }
    drop(st);

    session.nick = Some(new_nick);
    complete_registration(session, tx);
}

async fn handle_user(state: &SharedState, session: &mut Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    if session.registered {
        let _ = tx.send(replies::err_already_registered(&nick));
        return;
    }
    if !session.password_ok {
        let _ = tx.send(replies::err_passwd_mismatch(&nick));
        return;
    }
    let realname = if msg.trailing.is_empty() {
        msg.params.get(3).cloned()
    } else {
        Some(msg.trailing.clone())
    };
    let (Some(username), Some(realname)) = (msg.params.first().cloned(), realname) else {
        let _ = tx.send(replies::err_need_more_params(&nick, "USER"));
        return;
    };

    session.username = Some(username.clone());
    session.realname = Some(realname.clone());

    // NICK may have registered the handle already; keep it current.
    if let Some(current) = session.nick.clone() {
        let mut st = state.write().await;
        if let Some(handle) = st.clients.get_mut(&current) {
            handle.username = username;
            handle.realname = realname;
        }
    }
    complete_registration(session, tx);
}

/// Once all three gates pass, welcome the client and send the MOTD.
fn complete_registration(session: &mut Session, tx: &Tx) {
    if !session.ready_to_register() {
        return;
    }
    session.registered = true;
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();
    let _ = tx.send(replies::welcome(&nick, &user));
    let _ = tx.send(replies::your_host(&nick));
    let _ = tx.send(replies::created(&nick));
    let _ = tx.send(replies::my_info(&nick));
    send_motd(tx, &nick);
    info!(nick = %nick, "client registered");
}

fn send_motd(tx: &Tx, nick: &str) {
    let _ = tx.send(replies::motd_start(nick));
    for line in MOTD_LINES {
        let _ = tx.send(replies::motd_line(nick, line));
    }
    let _ = tx.send(replies::motd_end(nick));
}

// ── Leaving ──────────────────────────────────────────────────────

async fn handle_quit(state: &SharedState, session: &mut Session, tx: &Tx, msg: &Message) -> Flow {
    let reason = if msg.trailing.is_empty() {
        "Client Quit".to_owned()
    } else {
        msg.trailing.clone()
    };
    if let Some(nick) = session.nick.take() {
        let _ = tx.send(replies::error_closing(
            &nick,
            session.username(),
            "Closing connection",
        ));
        remove_client(state, &nick, &format!("Quit: {reason}")).await;
    }
    Flow::Quit
}

/// Remove a departing client: relay the quit to every peer sharing a
/// channel, purge the nick from all channels (promoting or destroying as
/// the invariants require), and drop the handle.
async fn remove_client(state: &SharedState, nick: &str, reason: &str) {
    let mut st = state.write().await;

    let username = st
        .clients
        .get(nick)
        .map(|handle| handle.username.clone())
        .unwrap_or_default();
    let quit_msg = replies::quit_relay(nick, &username, reason);

    let mut notified: HashSet<String> = HashSet::new();
    for channel in st.channels.values() {
        if channel.is_member(nick) {
            for member in channel.member_list() {
                if member != nick && notified.insert(member.clone()) {
                    if let Some(handle) = st.clients.get(&member) {
                        let _ = handle.tx.send(quit_msg.clone());
                    }
                }
            }
        }
    }

    // Quit relays are queued; now memberships can go, along with any
    // channel that empties out.
    st.channels.retain(|_, channel| {
        channel.remove_member(nick);
        channel.remove_invite(nick);
        !channel.is_empty()
    });

    st.clients.remove(nick);
    info!(nick, "cleaned up");
}

// ── Channels ─────────────────────────────────────────────────────

async fn handle_join(state: &SharedState, session: &Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();
    if msg.params.is_empty() {
        let _ = tx.send(replies::err_need_more_params(&nick, "JOIN"));
        return;
    }

    // JOIN allows comma-separated lists: JOIN #a,#b key_a,key_b
    let targets: Vec<String> = msg.params[0].split(',').map(str::to_owned).collect();
    let keys: Vec<String> = msg
        .params
        .get(1)
        .map(|list| list.split(',').map(str::to_owned).collect())
        .unwrap_or_default();

    let mut st = state.write().await;
    for (i, chan_name) in targets.iter().enumerate() {
        if !chan_name.starts_with(['#', '&']) {
            continue; // not a channel name
        }
        let key = keys.get(i).map(String::as_str);

        let Some(channel) = st.channels.get_mut(chan_name) else {
            // First join creates the channel; the founder becomes its sole
            // operator and gets the mode announcement.
            let channel = Channel::new(chan_name, &nick);
            let _ = tx.send(replies::join(&nick, &user, chan_name));
            let _ = tx.send(replies::mode_announce(chan_name, &channel.mode_string()));
            let _ = tx.send(replies::nam_reply(&nick, chan_name, &channel.member_names()));
            let _ = tx.send(replies::end_of_names(&nick, chan_name));
            st.channels.insert(chan_name.clone(), channel);
            continue;
        };

        if let Err(denied) = channel.check_join(&nick, key) {
            let reply = match denied {
                JoinDenied::AlreadyOn => replies::err_user_on_channel(&nick, &nick, chan_name),
                JoinDenied::Full => replies::err_channel_is_full(&nick, chan_name),
                JoinDenied::InviteOnly => replies::err_invite_only_chan(&nick, chan_name),
                JoinDenied::BadKey => replies::err_bad_channel_key(&nick, chan_name),
            };
            let _ = tx.send(reply);
            continue;
        }

        channel.add_member(&nick);
        let topic = channel.topic().to_owned();
        let names = channel.member_names();
        let members = channel.member_list();

        broadcast(&st, &members, &replies::join(&nick, &user, chan_name));
        if !topic.is_empty() {
            let _ = tx.send(replies::topic(&nick, chan_name, &topic));
        }
        let _ = tx.send(replies::nam_reply(&nick, chan_name, &names));
        let _ = tx.send(replies::end_of_names(&nick, chan_name));
    }
}

async fn handle_part(state: &SharedState, session: &Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();
    if msg.params.is_empty() {
        let _ = tx.send(replies::err_need_more_params(&nick, "PART"));
        return;
    }
    let reason = if msg.trailing.is_empty() {
        ".".to_owned()
    } else {
        msg.trailing.clone()
    };

    let mut st = state.write().await;
    for chan_name in msg.params[0].split(',').filter(|c| !c.is_empty()) {
        let Some(channel) = st.channels.get(chan_name) else {
            let _ = tx.send(replies::err_no_such_channel(&nick, chan_name));
            continue;
        };
        if !channel.is_member(&nick) {
            let _ = tx.send(replies::err_not_on_channel(&nick, chan_name));
            continue;
        }

        // Everyone, including the leaver, sees the PART before removal.
        let members = channel.member_list();
        broadcast(&st, &members, &replies::part(&nick, &user, chan_name, &reason));

        let now_empty = match st.channels.get_mut(chan_name) {
            Some(channel) => {
                channel.remove_member(&nick);
                channel.is_empty()
            }
            None => false,
        };
        if now_empty {
            st.channels.remove(chan_name);
        }
    }
}

async fn handle_kick(state: &SharedState, session: &Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();
    if msg.params.len() < 2 {
        let _ = tx.send(replies::err_need_more_params(&nick, "KICK"));
        return;
    }
    let chan_name = &msg.params[0];
    let reason = msg.trailing.clone();

    let mut guard = state.write().await;
    let st = &mut *guard;
    let Some(channel) = st.channels.get_mut(chan_name) else {
        let _ = tx.send(replies::err_no_such_channel(&nick, chan_name));
        return;
    };
    if !channel.is_member(&nick) {
        let _ = tx.send(replies::err_not_on_channel(&nick, chan_name));
        return;
    }
    if !channel.is_operator(&nick) {
        let _ = tx.send(replies::err_chanoprivs_needed(&nick, chan_name));
        return;
    }

    for target in msg.params[1].split(',').filter(|t| !t.is_empty()) {
        if target == nick {
            let _ = tx.send(replies::err_cannot_kick_self(&nick, chan_name));
            continue;
        }
        if !channel.is_member(target) {
            let _ = tx.send(replies::err_user_not_in_channel(&nick, target, chan_name));
            continue;
        }

        // The target sees their own KICK: broadcast first, remove after.
        let kick_msg = replies::kick(&nick, &user, chan_name, target, &reason);
        for member in channel.member_list() {
            if let Some(handle) = st.clients.get(&member) {
                let _ = handle.tx.send(kick_msg.clone());
            }
        }
        channel.remove_member(target);
    }

    let now_empty = channel.is_empty();
    if now_empty {
        st.channels.remove(chan_name);
    }
}

async fn handle_invite(state: &SharedState, session: &Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();
    if msg.params.len() < 2 {
        let _ = tx.send(replies::err_need_more_params(&nick, "INVITE"));
        return;
    }
    let target = &msg.params[0];
    let chan_name = &msg.params[1];

    let mut guard = state.write().await;
    let st = &mut *guard;
    let Some(channel) = st.channels.get_mut(chan_name) else {
        let _ = tx.send(replies::err_no_such_channel(&nick, chan_name));
        return;
    };
    if !channel.is_member(&nick) {
        let _ = tx.send(replies::err_not_on_channel(&nick, chan_name));
        return;
    }
    if channel.check_mode('i') && !channel.is_operator(&nick) {
        let _ = tx.send(replies::err_chanoprivs_needed(&nick, chan_name));
        return;
    }
    if !st.clients.contains_key(target) {
        let _ = tx.send(replies::err_no_such_nick(&nick, target));
        return;
    }
    if channel.is_member(target) {
        let _ = tx.send(replies::err_user_on_channel(&nick, target, chan_name));
        return;
    }

    channel.invite(target);
    let _ = tx.send(replies::inviting(&nick, &user, target, chan_name));
    if let Some(handle) = st.clients.get(target) {
        let _ = handle
            .tx
            .send(replies::invite_notify(&nick, &user, target, chan_name));
    }
}

async fn handle_topic(state: &SharedState, session: &Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();
    let Some(chan_name) = msg.params.first() else {
        let _ = tx.send(replies::err_need_more_params(&nick, "TOPIC"));
        return;
    };
    if !chan_name.starts_with(['#', '&']) {
        return;
    }

    let mut st = state.write().await;
    let Some(channel) = st.channels.get_mut(chan_name) else {
        let _ = tx.send(replies::err_no_such_channel(&nick, chan_name));
        return;
    };
    if !channel.is_member(&nick) {
        let _ = tx.send(replies::err_not_on_channel(&nick, chan_name));
        return;
    }

    if msg.trailing.is_empty() {
        // Query.
        let reply = if channel.topic().is_empty() {
            replies::no_topic(&nick, chan_name)
        } else {
            replies::topic(&nick, chan_name, channel.topic())
        };
        let _ = tx.send(reply);
        return;
    }

    if channel.check_mode('t') && !channel.is_operator(&nick) {
        let _ = tx.send(replies::err_chanoprivs_needed(&nick, chan_name));
        return;
    }

    channel.set_topic(&msg.trailing);
    let members = channel.member_list();
    broadcast(
        &st,
        &members,
        &replies::topic_change(&nick, &user, chan_name, &msg.trailing),
    );
}

async fn handle_mode(state: &SharedState, session: &Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();

    // Clients may put mode arguments in the trailing slot; fold them back.
    let mut params = msg.params.clone();
    if !msg.trailing.is_empty() {
        params.extend(
            msg.trailing
                .split(' ')
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        );
    }
    if params.is_empty() {
        let _ = tx.send(replies::err_need_more_params(&nick, "MODE"));
        return;
    }
    let target = params[0].clone();

    if !target.starts_with(['#', '&']) {
        // User modes are not implemented; only flag unknown targets.
        let st = state.read().await;
        if !st.clients.contains_key(&target) {
            let _ = tx.send(replies::err_no_such_channel(&nick, &target));
        }
        return;
    }

    let mut guard = state.write().await;
    let st = &mut *guard;
    let Some(channel) = st.channels.get_mut(&target) else {
        let _ = tx.send(replies::err_no_such_channel(&nick, &target));
        return;
    };

    if params.len() == 1 {
        // Bare query.
        let _ = tx.send(replies::channel_mode_is(&nick, &target, &channel.mode_string()));
        return;
    }
    if !channel.is_operator(&nick) {
        let _ = tx.send(replies::err_chanoprivs_needed(&nick, &target));
        return;
    }

    let outcome = channel.apply_modes(&nick, &params[1], &params[2..]);
    for reply in outcome.replies {
        let _ = tx.send(reply);
    }
    if !outcome.changes.is_empty() {
        let mode_msg = replies::mode_change(&nick, &user, &target, &outcome.changes);
        for member in channel.member_list() {
            if let Some(handle) = st.clients.get(&member) {
                let _ = handle.tx.send(mode_msg.clone());
            }
        }
    }
}

async fn handle_names(state: &SharedState, session: &Session, tx: &Tx, msg: &Message) {
    let nick = session.display_nick().to_owned();
    let Some(chan_name) = msg.params.first() else {
        return;
    };
    let st = state.read().await;
    if let Some(channel) = st.channels.get(chan_name) {
        let _ = tx.send(replies::nam_reply(&nick, chan_name, &channel.member_names()));
    }
    let _ = tx.send(replies::end_of_names(&nick, chan_name));
}

// ── Messaging ────────────────────────────────────────────────────

/// PRIVMSG and NOTICE share a body; NOTICE never reports errors back.
async fn handle_message(
    state: &SharedState,
    session: &Session,
    tx: &Tx,
    msg: &Message,
    is_notice: bool,
) {
    let nick = session.display_nick().to_owned();
    let user = session.username().to_owned();
    let command = if is_notice { "NOTICE" } else { "PRIVMSG" };

    let Some(target) = msg.params.first() else {
        if !is_notice {
            let _ = tx.send(replies::err_no_recipient(&nick, command));
        }
        return;
    };
    let text = &msg.trailing;
    if text.is_empty() {
        if !is_notice {
            let _ = tx.send(replies::err_no_text_to_send(&nick));
        }
        return;
    }

    let relay = if is_notice {
        replies::notice(&nick, &user, target, text)
    } else {
        replies::privmsg(&nick, &user, target, text)
    };

    let st = state.read().await;
    if target.starts_with(['#', '&']) {
        match st.channels.get(target) {
            Some(channel) if channel.is_member(&nick) => {
                let others: Vec<String> = channel
                    .member_list()
                    .into_iter()
                    .filter(|member| member != &nick)
                    .collect();
                broadcast(&st, &others, &relay);
            }
            _ => {
                if !is_notice {
                    let _ = tx.send(replies::err_cannot_send_to_chan(&nick, target));
                }
            }
        }
    } else {
        match st.clients.get(target) {
            Some(handle) => {
                let _ = handle.tx.send(relay);
            }
            None => {
                if !is_notice {
                    let _ = tx.send(replies::err_no_such_nick(&nick, target));
                }
            }
        }
    }
}

fn handle_ping(session: &Session, tx: &Tx, msg: &Message) {
    let token = if msg.trailing.is_empty() {
        msg.params.first().cloned().unwrap_or_default()
    } else {
        msg.trailing.clone()
    };
    let _ = tx.send(replies::pong(
        session.display_nick(),
        session.username(),
        &token,
    ));
}
