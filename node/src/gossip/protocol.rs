//! Contains abstractions related
//! to the Gossip protocol.
//!
//! A custom and application-specific line protocol tailored to the gossip
//! mechanism: `BROADCAST:<hopCount>:<payload>` or `FORWARD:<hopCount>:<payload>`.

use std::error::Error;

use regex::Regex;

/// A gossip message on the wire. Ephemeral: constructed, transmitted once,
/// consumed by the receiving engine, discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum GossipMessage {
    Broadcast { hop_count: u32, payload: String },
    Forward { hop_count: u32, payload: String },
}

impl GossipMessage {
    /// Parses a string slice into a `GossipMessage`
    /// according to the protocol specification.
    ///
    /// The line is split on its first two colons only, so the payload may
    /// itself contain colons. A line with an unknown kind or a hop count
    /// that does not fit an integer is a protocol error.
    pub(crate) fn parse(message: &str) -> Result<Self, Box<dyn Error>> {
        // BROADCAST/FORWARD text protocol parsing
        let gossip_message_regex = Regex::new(r"^(BROADCAST|FORWARD):(\d+):(.*)$").unwrap();

        if let Some(captures) = gossip_message_regex.captures(message) {
            let hop_count = captures[2]
                .parse::<u32>()
                .map_err(|_| "invalid message (invalid hop count found)")?;
            let payload = captures[3].to_string();

            return Ok(match &captures[1] {
                "BROADCAST" => Self::Broadcast { hop_count, payload },
                _ => Self::Forward { hop_count, payload },
            });
        }

        Err(From::from("invalid message (protocol error)"))
    }

    /// Converts the current `GossipMessage` abstraction
    /// into a text-based representation,
    /// according to the protocol specification.
    pub(crate) fn to_protocol_text(&self) -> String {
        match *self {
            Self::Broadcast {
                hop_count,
                ref payload,
            } => format!("BROADCAST:{}:{}", hop_count, payload),
            Self::Forward {
                hop_count,
                ref payload,
            } => format!("FORWARD:{}:{}", hop_count, payload),
        }
    }
}
