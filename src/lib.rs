//! ircserv — an RFC 2812-subset IRC server.

pub mod config;
pub mod irc;
