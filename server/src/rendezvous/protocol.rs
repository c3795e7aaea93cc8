//! Contains utilities for the line protocol used
//! during the rendezvous handshake.

use std::error::Error;

use regex::Regex;

use super::PeerRecord;

/// Header line preceding the serialized roster records.
pub(crate) const ROSTER_HEADER: &str = "Connected Clients:";

/// Parses a registration line of the form `PORT:<n>`
/// into the peer's listening port.
pub(crate) fn parse_registration_line(line: &str) -> Result<u16, Box<dyn Error>> {
    // PORT text protocol parsing
    let registration_regex = Regex::new(r"^PORT:(\d+)$").unwrap();

    if let Some(captures) = registration_regex.captures(line) {
        let port = captures[1]
            .parse::<u16>()
            .map_err(|_| "invalid registration (port out of range)")?;

        if port == 0 {
            return Err(From::from("invalid registration (port out of range)"));
        }

        return Ok(port);
    }

    Err(From::from("invalid registration (protocol error)"))
}

/// Serializes a finalized roster according to the protocol specification:
/// the header line, one `host:port` record per line, and a terminating
/// blank line.
pub(crate) fn roster_text(records: &[PeerRecord]) -> String {
    let mut text = String::from(ROSTER_HEADER);
    text.push('\n');

    for record in records {
        text.push_str(&format!("{}:{}\n", record.host, record.port));
    }

    text.push('\n');
    text
}
