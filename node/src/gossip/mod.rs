//! Contains utilities related
//! to the Gossip protocol.
//!
//! Per message the engine picks between a full broadcast and a single-peer
//! relay with a fresh coin flip. A forward chain has no deduplication and,
//! unless a hop cap is configured, no upper bound on hop count: termination
//! is probabilistic only.

use rand::Rng;

use crate::rendezvous::Peer;

use protocol::GossipMessage;

pub(crate) mod protocol;
pub(crate) mod request_handler;
pub(crate) mod request_initiator;

/// Decides how an operator-authored payload enters the network, given a
/// uniform draw in [0,100). Even draws broadcast with a hop count of zero;
/// odd draws forward with a hop count of one (the first forward).
pub(crate) fn decide_origination(payload: String, draw: u32) -> GossipMessage {
    if draw % 2 == 0 {
        GossipMessage::Broadcast {
            hop_count: 0,
            payload,
        }
    } else {
        GossipMessage::Forward {
            hop_count: 1,
            payload,
        }
    }
}

/// Decides what becomes of a received forward carrying `hop_count` hops,
/// given a fresh uniform draw in [0,100).
///
/// Even draws convert to a broadcast with the hop count preserved (it is the
/// hops-before-broadcast metric). Odd draws forward again with the hop count
/// incremented by one, unless `max_hops` is set and already reached, in which
/// case the relay is forced to a broadcast instead of circulating further.
pub(crate) fn decide_relay(
    hop_count: u32,
    payload: String,
    draw: u32,
    max_hops: Option<u32>,
) -> GossipMessage {
    if draw % 2 == 0 {
        return GossipMessage::Broadcast { hop_count, payload };
    }

    if let Some(cap) = max_hops {
        if hop_count >= cap {
            return GossipMessage::Broadcast { hop_count, payload };
        }
    }

    GossipMessage::Forward {
        hop_count: hop_count + 1,
        payload,
    }
}

/// Runs one origination decision for an operator-authored payload
/// and delivers the resulting message.
pub(crate) fn originate(payload: String, roster: &[Peer]) {
    let draw: u32 = rand::rng().random_range(0..100);

    println!("generated random number: {}", draw);

    match decide_origination(payload, draw) {
        message @ GossipMessage::Broadcast { .. } => {
            println!("broadcasting the message to all peers");
            request_initiator::broadcast_to_all(&message, roster);
        }
        message @ GossipMessage::Forward { .. } => {
            request_initiator::forward_to_random(&message, roster);
        }
    }
}
