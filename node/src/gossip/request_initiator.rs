//! Initiates outbound gossip deliveries to other peers.
//!
//! Every delivery is an independent, ephemeral connection:
//! connect, write one line, close.

use std::{
    io::{self, Write},
    net::TcpStream,
    thread,
    time::Duration,
};

use rand::Rng;

use crate::rendezvous::Peer;

use super::protocol::GossipMessage;

/// Inclusive bounds, in milliseconds, of the jitter applied before a
/// forward relay. Models network jitter and avoids synchronized relay bursts.
pub(crate) const JITTER_MIN_MS: u64 = 100;
pub(crate) const JITTER_MAX_MS: u64 = 190;

/// Delivers `message` to every peer in the roster. A failure for one
/// destination is reported and skipped; the fan-out continues.
pub(crate) fn broadcast_to_all(message: &GossipMessage, roster: &[Peer]) {
    for peer in roster {
        match deliver(message, peer) {
            Ok(()) => println!("message broadcast to peer {}", peer.get_id()),
            Err(err) => eprintln!(
                "failed to broadcast to peer [{}:{}]: {}",
                peer.get_host(),
                peer.get_port(),
                err
            ),
        }
    }
}

/// Delivers `message` to one uniformly chosen roster peer after a jittered
/// delay. Selection is independent per hop: the same peer, including the
/// sender, may be chosen again.
pub(crate) fn forward_to_random(message: &GossipMessage, roster: &[Peer]) {
    if roster.is_empty() {
        eprintln!("cannot forward: the roster is empty");
        return;
    }

    let mut rng = rand::rng();

    let delay = draw_jitter_delay(&mut rng);
    let peer = &roster[rng.random_range(0..roster.len())];

    println!(
        "forwarding the message to peer {} after {} milliseconds",
        peer.get_id(),
        delay.as_millis()
    );

    // The sleep is scoped to the handling thread; the listener keeps
    // accepting connections while the relay waits.
    thread::sleep(delay);

    match deliver(message, peer) {
        Ok(()) => println!("message forwarded to peer {}", peer.get_id()),
        Err(err) => eprintln!(
            "failed to forward to peer [{}:{}]: {}",
            peer.get_host(),
            peer.get_port(),
            err
        ),
    }
}

/// Draws a uniform delay within the jitter bounds.
fn draw_jitter_delay<R: Rng>(rng: &mut R) -> Duration {
    Duration::from_millis(rng.random_range(JITTER_MIN_MS..=JITTER_MAX_MS))
}

/// Sends one newline-terminated gossip line over a short-lived connection.
fn deliver(message: &GossipMessage, peer: &Peer) -> io::Result<()> {
    let mut request_stream = TcpStream::connect((peer.get_host(), peer.get_port()))?;

    request_stream.write_all(format!("{}\n", message.to_protocol_text()).as_bytes())?;

    Ok(())
}
