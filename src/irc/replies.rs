/// Server reply formatting — RFC 2812 numerics and relayed commands.
///
/// Every server-originated line carries `localhost` as its source; messages
/// relayed on behalf of a user carry `nick!user@localhost`. Producers return
/// [`Message`] values; the codec appends the `\r\n` terminator on encode.
use super::message::Message;

/// The server name used in every `:prefix` field.
pub const SERVER_NAME: &str = "localhost";

/// Version token advertised in the welcome burst.
const VERSION: &str = concat!("ircserv-", env!("CARGO_PKG_VERSION"));

/// The `nick!user@localhost` source string for user-originated broadcasts.
pub fn user_id(nick: &str, user: &str) -> String {
    format!("{nick}!{user}@{SERVER_NAME}")
}

fn server_reply(code: &str, params: Vec<String>, trailing: &str) -> Message {
    Message {
        prefix: Some(SERVER_NAME.into()),
        command: code.into(),
        params,
        trailing: trailing.into(),
    }
}

fn from_user(
    nick: &str,
    user: &str,
    command: &str,
    params: Vec<String>,
    trailing: &str,
) -> Message {
    Message {
        prefix: Some(user_id(nick, user)),
        command: command.into(),
        params,
        trailing: trailing.into(),
    }
}

// ── Registration / MOTD ──────────────────────────────────────────

pub fn welcome(nick: &str, user: &str) -> Message {
    server_reply(
        "001",
        vec![nick.into()],
        &format!(
            "Welcome to the Internet Relay Network {}",
            user_id(nick, user)
        ),
    )
}

pub fn your_host(nick: &str) -> Message {
    server_reply(
        "002",
        vec![nick.into()],
        &format!("Your host is {SERVER_NAME}, running version {VERSION}"),
    )
}

pub fn created(nick: &str) -> Message {
    server_reply("003", vec![nick.into()], "This server was created today")
}

pub fn my_info(nick: &str) -> Message {
    server_reply(
        "004",
        vec![
            nick.into(),
            SERVER_NAME.into(),
            VERSION.into(),
            "o".into(),
            "itkol".into(),
        ],
        "",
    )
}

pub fn motd_start(nick: &str) -> Message {
    server_reply(
        "375",
        vec![nick.into()],
        &format!("- {SERVER_NAME} Message of the day -"),
    )
}

pub fn motd_line(nick: &str, line: &str) -> Message {
    server_reply("372", vec![nick.into()], &format!("- {line}"))
}

pub fn motd_end(nick: &str) -> Message {
    server_reply("376", vec![nick.into()], "End of /MOTD command.")
}

// ── Relayed commands ─────────────────────────────────────────────

/// Self-addressed confirmation of a nickname change.
pub fn nick_change(old_nick: &str, user: &str, new_nick: &str) -> Message {
    from_user(old_nick, user, "NICK", vec![new_nick.into()], "")
}

pub fn join(nick: &str, user: &str, channel: &str) -> Message {
    from_user(nick, user, "JOIN", vec![], channel)
}

pub fn part(nick: &str, user: &str, channel: &str, reason: &str) -> Message {
    from_user(nick, user, "PART", vec![channel.into()], reason)
}

pub fn kick(nick: &str, user: &str, channel: &str, target: &str, reason: &str) -> Message {
    from_user(
        nick,
        user,
        "KICK",
        vec![channel.into(), target.into()],
        reason,
    )
}

pub fn privmsg(nick: &str, user: &str, target: &str, text: &str) -> Message {
    from_user(nick, user, "PRIVMSG", vec![target.into()], text)
}

pub fn notice(nick: &str, user: &str, target: &str, text: &str) -> Message {
    from_user(nick, user, "NOTICE", vec![target.into()], text)
}

pub fn topic_change(nick: &str, user: &str, channel: &str, topic: &str) -> Message {
    from_user(nick, user, "TOPIC", vec![channel.into()], topic)
}

/// Invite notification delivered to the invited user.
pub fn invite_notify(nick: &str, user: &str, target: &str, channel: &str) -> Message {
    from_user(nick, user, "INVITE", vec![target.into()], channel)
}

/// Aggregated mode-change broadcast, e.g. `MODE #chan +k-l`.
pub fn mode_change(nick: &str, user: &str, channel: &str, changes: &str) -> Message {
    from_user(
        nick,
        user,
        "MODE",
        vec![channel.into(), changes.into()],
        "",
    )
}

/// Server-originated mode announcement sent to a channel creator.
pub fn mode_announce(channel: &str, modes: &str) -> Message {
    server_reply("MODE", vec![channel.into(), modes.into()], "")
}

pub fn pong(nick: &str, user: &str, token: &str) -> Message {
    from_user(nick, user, "PONG", vec![], token)
}

/// Quit relay sent to every peer sharing a channel with the leaver.
pub fn quit_relay(nick: &str, user: &str, reason: &str) -> Message {
    from_user(nick, user, "QUIT", vec![], reason)
}

/// Final line sent to a closing connection.
pub fn error_closing(nick: &str, user: &str, reason: &str) -> Message {
    from_user(nick, user, "ERROR", vec![], reason)
}

// ── Channel queries ──────────────────────────────────────────────

pub fn topic(nick: &str, channel: &str, topic: &str) -> Message {
    server_reply("332", vec![nick.into(), channel.into()], topic)
}

pub fn no_topic(nick: &str, channel: &str) -> Message {
    server_reply("331", vec![nick.into(), channel.into()], "No topic is set")
}

pub fn nam_reply(nick: &str, channel: &str, names: &str) -> Message {
    server_reply(
        "353",
        vec![nick.into(), "@".into(), channel.into()],
        names,
    )
}

pub fn end_of_names(nick: &str, channel: &str) -> Message {
    server_reply(
        "366",
        vec![nick.into(), channel.into()],
        "End of /NAMES list.",
    )
}

pub fn channel_mode_is(nick: &str, channel: &str, modes: &str) -> Message {
    server_reply("324", vec![nick.into(), channel.into()], modes)
}

/// Mode query answer carrying a parameter (masked key or user limit).
pub fn channel_mode_is_with_param(nick: &str, channel: &str, modes: &str, param: &str) -> Message {
    server_reply(
        "324",
        vec![nick.into(), channel.into(), modes.into(), param.into()],
        "",
    )
}

/// Invite confirmation to the requester; sourced from the requester per
/// RFC 2812's RPL_INVITING shape.
pub fn inviting(nick: &str, user: &str, target: &str, channel: &str) -> Message {
    from_user(
        nick,
        user,
        "341",
        vec![nick.into(), target.into(), channel.into()],
        "",
    )
}

// ── Error numerics ───────────────────────────────────────────────

pub fn err_need_more_params(nick: &str, command: &str) -> Message {
    server_reply(
        "461",
        vec![nick.into(), command.into()],
        "Not enough parameters.",
    )
}

pub fn err_no_nickname_given(nick: &str) -> Message {
    server_reply("431", vec![nick.into()], "There is no nickname.")
}

pub fn err_erroneous_nickname(nick: &str, bad: &str) -> Message {
    server_reply("432", vec![nick.into(), bad.into()], "Erroneous nickname")
}

pub fn err_nickname_in_use(nick: &str, bad: &str) -> Message {
    server_reply(
        "433",
        vec![nick.into(), bad.into()],
        "Nickname is already in use.",
    )
}

pub fn err_no_such_nick(nick: &str, target: &str) -> Message {
    server_reply(
        "401",
        vec![nick.into(), target.into()],
        "No such nick/channel",
    )
}

pub fn err_no_such_channel(nick: &str, channel: &str) -> Message {
    server_reply(
        "403",
        vec![nick.into(), channel.into()],
        "No such channel",
    )
}

pub fn err_cannot_send_to_chan(nick: &str, channel: &str) -> Message {
    server_reply(
        "404",
        vec![nick.into(), channel.into()],
        "Cannot send to channel",
    )
}

pub fn err_not_on_channel(nick: &str, channel: &str) -> Message {
    server_reply(
        "442",
        vec![nick.into(), channel.into()],
        "The user is not on this channel.",
    )
}

pub fn err_user_on_channel(nick: &str, target: &str, channel: &str) -> Message {
    server_reply(
        "443",
        vec![nick.into(), target.into(), channel.into()],
        "Is already on channel",
    )
}

pub fn err_user_not_in_channel(nick: &str, target: &str, channel: &str) -> Message {
    server_reply(
        "441",
        vec![nick.into(), target.into(), channel.into()],
        "They aren't on that channel",
    )
}

pub fn err_chanoprivs_needed(nick: &str, channel: &str) -> Message {
    server_reply(
        "482",
        vec![nick.into(), channel.into()],
        "You're not channel operator",
    )
}

pub fn err_cannot_kick_self(nick: &str, channel: &str) -> Message {
    server_reply(
        "482",
        vec![nick.into(), channel.into()],
        "You can't kick yourself",
    )
}

pub fn err_invite_only_chan(nick: &str, channel: &str) -> Message {
    server_reply(
        "473",
        vec![nick.into(), channel.into()],
        "Cannot join channel (+i)",
    )
}

pub fn err_bad_channel_key(nick: &str, channel: &str) -> Message {
    server_reply(
        "475",
        vec![nick.into(), channel.into()],
        "Cannot join channel (+k)",
    )
}

pub fn err_channel_is_full(nick: &str, channel: &str) -> Message {
    server_reply(
        "471",
        vec![nick.into(), channel.into()],
        "Cannot join channel (+l)",
    )
}

pub fn err_unknown_mode(nick: &str, mode: char) -> Message {
    server_reply(
        "472",
        vec![nick.into(), mode.to_string()],
        "is unknown mode char to me",
    )
}

pub fn err_invalid_mode_param(nick: &str, channel: &str, mode: char, param: &str) -> Message {
    server_reply(
        "696",
        vec![
            nick.into(),
            channel.into(),
            mode.to_string(),
            param.into(),
        ],
        "Invalid mode parameter",
    )
}

pub fn err_no_recipient(nick: &str, command: &str) -> Message {
    server_reply(
        "411",
        vec![nick.into()],
        &format!("No recipient given ({command})"),
    )
}

pub fn err_no_text_to_send(nick: &str) -> Message {
    server_reply("412", vec![nick.into()], "No text to send")
}

pub fn err_already_registered(nick: &str) -> Message {
    server_reply("462", vec![nick.into()], "You may not reregister.")
}

pub fn err_passwd_mismatch(nick: &str) -> Message {
    server_reply("464", vec![nick.into()], "Password incorrect.")
}

pub fn err_not_registered(nick: &str) -> Message {
    server_reply("451", vec![nick.into()], "You have not registered")
}
