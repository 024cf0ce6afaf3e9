/// Channel state — membership, operators, invites, modes, topic.
///
/// Channels hold nickname strings only; sessions are resolved on demand
/// through the server's nick map. All three name sets are ordered, so
/// member listings are deterministic and "promote the lexicographically
/// first member" is well defined.
use std::collections::{BTreeMap, BTreeSet};

use super::message::Message;
use super::replies;

/// Why a join attempt was refused. Checks run in this order; the first
/// failure wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDenied {
    /// Joiner is already a member.
    AlreadyOn,
    /// `+l` set, channel at capacity, joiner not invited.
    Full,
    /// `+i` set, joiner not invited.
    InviteOnly,
    /// `+k` set, supplied key missing or wrong.
    BadKey,
}

/// Result of applying a MODE string: the sign+letter segments of every mode
/// that actually transitioned, plus any replies owed to the requester.
#[derive(Debug)]
pub struct ModeOutcome {
    pub changes: String,
    pub replies: Vec<Message>,
}

#[derive(Debug)]
pub struct Channel {
    name: String,
    topic: String,
    key: String,
    /// 0 means no limit.
    user_limit: usize,
    /// Flags over {i, t, k, l, o}.
    modes: BTreeMap<char, bool>,
    members: BTreeSet<String>,
    operators: BTreeSet<String>,
    invites: BTreeSet<String>,
}

impl Channel {
    /// Create a channel with its founder as sole member and operator.
    /// Topic protection is on by default.
    pub fn new(name: &str, founder: &str) -> Self {
        let mut channel = Channel {
            name: name.to_owned(),
            topic: String::new(),
            key: String::new(),
            user_limit: 0,
            modes: ['i', 't', 'k', 'l', 'o'].into_iter().map(|c| (c, false)).collect(),
            members: BTreeSet::new(),
            operators: BTreeSet::new(),
            invites: BTreeSet::new(),
        };
        channel.members.insert(founder.to_owned());
        channel.operators.insert(founder.to_owned());
        channel.set_mode('t', true);
        channel
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── Membership ───────────────────────────────────────────────

    pub fn is_member(&self, nick: &str) -> bool {
        self.members.contains(nick)
    }

    pub fn is_operator(&self, nick: &str) -> bool {
        self.operators.contains(nick)
    }

    pub fn is_invited(&self, nick: &str) -> bool {
        self.invites.contains(nick)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Member nicknames in iteration (sorted) order, for broadcast fan-out.
    pub fn member_list(&self) -> Vec<String> {
        self.members.iter().cloned().collect()
    }

    /// Check the join policy for `nick`. Does not mutate; the caller adds
    /// the member on success.
    pub fn check_join(&self, nick: &str, key: Option<&str>) -> Result<(), JoinDenied> {
        if self.is_member(nick) {
            return Err(JoinDenied::AlreadyOn);
        }
        let invited = self.is_invited(nick);
        if self.check_mode('l') && self.members.len() >= self.user_limit && !invited {
            return Err(JoinDenied::Full);
        }
        if self.check_mode('i') && !invited {
            return Err(JoinDenied::InviteOnly);
        }
        if self.check_mode('k') && key != Some(self.key.as_str()) {
            return Err(JoinDenied::BadKey);
        }
        Ok(())
    }

    /// Add a member: clears any pending invite, and seeds the operator set
    /// if it is somehow empty.
    pub fn add_member(&mut self, nick: &str) {
        self.members.insert(nick.to_owned());
        self.invites.remove(nick);
        if self.operators.is_empty() {
            self.operators.insert(nick.to_owned());
        }
    }

    /// Remove a member (part, kick, or disconnect). The member leaves the
    /// operator set too; if that empties it, the lexicographically first
    /// remaining member is promoted.
    pub fn remove_member(&mut self, nick: &str) {
        self.members.remove(nick);
        self.operators.remove(nick);
        self.repair_operators();
    }

    fn repair_operators(&mut self) {
        if self.operators.is_empty() {
            if let Some(first) = self.members.iter().next().cloned() {
                self.operators.insert(first);
            }
        }
    }

    /// Rewrite a nickname across the member, operator, and invite sets.
    pub fn rename_member(&mut self, old: &str, new: &str) {
        if self.members.remove(old) {
            self.members.insert(new.to_owned());
        }
        if self.operators.remove(old) {
            self.operators.insert(new.to_owned());
        }
        if self.invites.remove(old) {
            self.invites.insert(new.to_owned());
        }
    }

    // ── Operators & invites ──────────────────────────────────────

    /// Grant operator status. Returns whether anything changed.
    pub fn add_operator(&mut self, nick: &str) -> bool {
        if !self.is_member(nick) || !self.operators.insert(nick.to_owned()) {
            return false;
        }
        self.set_mode('o', true);
        true
    }

    /// Revoke operator status, promoting a replacement if the set empties.
    /// Returns whether anything changed.
    pub fn remove_operator(&mut self, nick: &str) -> bool {
        if !self.operators.remove(nick) {
            return false;
        }
        self.set_mode('o', false);
        self.repair_operators();
        true
    }

    pub fn invite(&mut self, nick: &str) {
        self.invites.insert(nick.to_owned());
    }

    pub fn remove_invite(&mut self, nick: &str) {
        self.invites.remove(nick);
    }

    // ── Modes, key, limit, topic ─────────────────────────────────

    pub fn check_mode(&self, flag: char) -> bool {
        self.modes.get(&flag).copied().unwrap_or(false)
    }

    /// Set a flag, reporting whether it transitioned.
    pub fn set_mode(&mut self, flag: char, value: bool) -> bool {
        match self.modes.get_mut(&flag) {
            Some(current) if *current != value => {
                *current = value;
                true
            }
            _ => false,
        }
    }

    pub fn set_key(&mut self, key: &str) {
        self.key = key.to_owned();
        self.set_mode('k', true);
    }

    pub fn remove_key(&mut self) {
        self.key.clear();
        self.set_mode('k', false);
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.user_limit = limit;
        self.set_mode('l', true);
    }

    pub fn remove_limit(&mut self) {
        self.user_limit = 0;
        self.set_mode('l', false);
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Set the topic. Setting a topic re-enables topic protection.
    pub fn set_topic(&mut self, topic: &str) {
        self.topic = topic.to_owned();
        self.set_mode('t', true);
    }

    /// Render the active flags as `+itk…`, or an empty string if none.
    pub fn mode_string(&self) -> String {
        let flags: String = self
            .modes
            .iter()
            .filter(|(_, &set)| set)
            .map(|(&flag, _)| flag)
            .collect();
        if flags.is_empty() {
            flags
        } else {
            format!("+{flags}")
        }
    }

    /// Render the NAMES listing, operators prefixed with `@`.
    pub fn member_names(&self) -> String {
        self.members
            .iter()
            .map(|nick| {
                if self.is_operator(nick) {
                    format!("@{nick}")
                } else {
                    nick.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ── Mode-change algorithm ────────────────────────────────────

    /// Apply a MODE string atomically. `+`/`-` toggle the direction; each
    /// mode letter consumes parameters from `args` as it requires them.
    /// The parameter index advances only when a mode actually took a
    /// parameter; modes already in the requested state consume nothing and
    /// produce no change segment.
    pub fn apply_modes(&mut self, nick: &str, mode_string: &str, args: &[String]) -> ModeOutcome {
        let mut adding = true;
        let mut arg_idx = 0usize;
        let mut changes = String::new();
        let mut replies_out = Vec::new();

        for mode in mode_string.chars() {
            if mode == '+' || mode == '-' {
                adding = mode == '+';
                continue;
            }
            let changed = match mode {
                'i' | 't' => self.set_mode(mode, adding),
                'k' => self.apply_key_mode(nick, adding, args, &mut arg_idx, &mut replies_out),
                'l' => self.apply_limit_mode(nick, adding, args, &mut arg_idx, &mut replies_out),
                'o' => self.apply_operator_mode(nick, adding, args, &mut arg_idx, &mut replies_out),
                // Ban masks are accepted but not implemented.
                'b' => false,
                other => {
                    replies_out.push(replies::err_unknown_mode(nick, other));
                    false
                }
            };
            if changed {
                changes.push(if adding { '+' } else { '-' });
                changes.push(mode);
            }
        }

        ModeOutcome {
            changes,
            replies: replies_out,
        }
    }

    fn apply_key_mode(
        &mut self,
        nick: &str,
        adding: bool,
        args: &[String],
        arg_idx: &mut usize,
        replies_out: &mut Vec<Message>,
    ) -> bool {
        if adding == self.check_mode('k') {
            return false;
        }
        if !adding {
            self.remove_key();
            return true;
        }
        let Some(key) = args.get(*arg_idx) else {
            replies_out.push(replies::err_need_more_params(nick, "MODE +k"));
            return false;
        };
        *arg_idx += 1;
        if key.chars().all(|c| c.is_ascii_alphanumeric()) {
            self.set_key(key);
            let masked = "*".repeat(key.len());
            replies_out.push(replies::channel_mode_is_with_param(
                nick,
                &self.name,
                &self.mode_string(),
                &masked,
            ));
            true
        } else {
            replies_out.push(replies::err_invalid_mode_param(nick, &self.name, 'k', key));
            false
        }
    }

    fn apply_limit_mode(
        &mut self,
        nick: &str,
        adding: bool,
        args: &[String],
        arg_idx: &mut usize,
        replies_out: &mut Vec<Message>,
    ) -> bool {
        if adding == self.check_mode('l') {
            return false;
        }
        if !adding {
            self.remove_limit();
            return true;
        }
        let Some(param) = args.get(*arg_idx) else {
            replies_out.push(replies::err_need_more_params(nick, "MODE +l"));
            return false;
        };
        *arg_idx += 1;
        match param.parse::<usize>() {
            Ok(limit) if limit > 0 => {
                self.set_limit(limit);
                replies_out.push(replies::channel_mode_is_with_param(
                    nick,
                    &self.name,
                    &self.mode_string(),
                    param,
                ));
                true
            }
            _ => {
                replies_out.push(replies::err_invalid_mode_param(nick, &self.name, 'l', param));
                false
            }
        }
    }

    fn apply_operator_mode(
        &mut self,
        nick: &str,
        adding: bool,
        args: &[String],
        arg_idx: &mut usize,
        replies_out: &mut Vec<Message>,
    ) -> bool {
        let Some(target) = args.get(*arg_idx) else {
            replies_out.push(replies::err_need_more_params(nick, "MODE o"));
            return false;
        };
        *arg_idx += 1;
        if !self.is_member(target) {
            replies_out.push(replies::err_user_not_in_channel(nick, target, &self.name));
            return false;
        }
        if adding {
            self.add_operator(target)
        } else {
            self.remove_operator(target)
        }
    }
}
