//! Contains utilities for the line protocol used
//! during the rendezvous handshake.

use std::error::Error;

use regex::Regex;

/// Header line preceding the serialized roster records.
pub(crate) const ROSTER_HEADER: &str = "Connected Clients:";

/// Builds the registration line announcing this node's listening port.
pub(crate) fn registration_line(listen_port: u16) -> String {
    format!("PORT:{}", listen_port)
}

/// Checks whether a received line is the roster header.
pub(crate) fn is_roster_header(line: &str) -> bool {
    line.starts_with(ROSTER_HEADER)
}

/// Parses a roster record of the form `host:port`. The split happens on the
/// last colon, so bracketed IPv6 hosts survive the round trip.
pub(crate) fn parse_roster_line(line: &str) -> Result<(String, u16), Box<dyn Error>> {
    // host:port text protocol parsing
    let roster_record_regex = Regex::new(r"^(.+):(\d+)$").unwrap();

    if let Some(captures) = roster_record_regex.captures(line) {
        let host = captures[1].to_string();
        let port = captures[2]
            .parse::<u16>()
            .map_err(|_| "invalid roster record (port out of range)")?;

        return Ok((host, port));
    }

    Err(From::from("invalid roster record (protocol error)"))
}
