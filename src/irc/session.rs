/// Per-connection registration state.
///
/// A session is owned by its connection task. It tracks the three
/// registration gates (PASS accepted, NICK set, USER set) and the identity
/// the client registered with. Only once all three gates are satisfied does
/// the session become registered and gain access to the full command set.

#[derive(Debug, Default)]
pub struct Session {
    /// PASS gate: the connection password matched.
    pub password_ok: bool,
    /// NICK gate: the nickname currently held, if any.
    pub nick: Option<String>,
    /// USER gate: username from the USER command.
    pub username: Option<String>,
    pub realname: Option<String>,
    /// Set once all three gates pass; never cleared.
    pub registered: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// All three gates satisfied, welcome not yet sent.
    pub fn ready_to_register(&self) -> bool {
        !self.registered && self.password_ok && self.nick.is_some() && self.username.is_some()
    }

    /// Nickname for reply addressing; `*` until one is set.
    pub fn display_nick(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}
