//! Responsible for processing gossip messages
//! received from other peers.

use std::{
    io::{BufRead, BufReader},
    net::TcpStream,
    sync::Arc,
};

use rand::Rng;

use crate::rendezvous::Peer;

use super::{protocol::GossipMessage, request_initiator};

/// Creates a handler for one inbound peer connection.
///
/// A request handler should never panic.
/// This is because request handlers are executed in separate threads.
/// A panic can terminate the thread, potentially causing the entire process to stop.
///
/// A line that fails to parse is dropped and the connection loop keeps
/// listening; receiving a broadcast is terminal (the payload is consumed,
/// nothing is relayed); receiving a forward triggers a fresh relay decision.
pub(crate) fn build_request_handler(
    stream: TcpStream,
    roster: Arc<Vec<Peer>>,
    max_hops: Option<u32>,
) -> impl FnOnce() + Send + 'static {
    move || {
        let remote_addr = match stream.peer_addr() {
            Ok(remote_addr) => remote_addr.to_string(),
            Err(_) => String::from("unknown"),
        };

        let reader = BufReader::new(stream);

        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(_) => return,
            };

            if line.is_empty() {
                continue;
            }

            let message = match GossipMessage::parse(&line) {
                Ok(message) => message,
                Err(err) => {
                    eprintln!(
                        "dropped an invalid gossip line from [{}]: {}",
                        remote_addr, err
                    );
                    continue;
                }
            };

            match message {
                GossipMessage::Broadcast { hop_count, payload } => {
                    // Terminal: no relay, no deduplication. Every receipt is
                    // an independent consumption.
                    println!("received broadcast message: {}", payload);
                    println!(
                        "the message was forwarded {} time(s) before being broadcast",
                        hop_count
                    );
                }
                GossipMessage::Forward { hop_count, payload } => {
                    println!(
                        "received forwarded message: {} (hop count: {})",
                        payload, hop_count
                    );

                    let draw: u32 = rand::rng().random_range(0..100);

                    println!("generated random number (on receive): {}", draw);

                    match super::decide_relay(hop_count, payload, draw, max_hops) {
                        message @ GossipMessage::Broadcast { .. } => {
                            println!("broadcasting the message to all peers");
                            request_initiator::broadcast_to_all(&message, &roster);
                        }
                        message @ GossipMessage::Forward { .. } => {
                            request_initiator::forward_to_random(&message, &roster);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod gossip_request_handler_test {
    use std::{
        io::{BufRead, BufReader, Write},
        net::{TcpListener, TcpStream},
        sync::Arc,
        thread,
    };

    use crate::rendezvous::Peer;

    use super::build_request_handler;

    /// Runs a handler against a scripted inbound connection and collects
    /// every line the handler sends out to the single roster peer.
    ///
    /// The hop cap is set to zero so that every received forward is
    /// deterministically converted to a broadcast, whatever the coin says.
    fn relay_lines_for(inbound: &str, expected_connections: usize) -> Vec<String> {
        let sink_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let sink_port = sink_listener.local_addr().unwrap().port();

        let sink = thread::spawn(move || {
            let mut lines = Vec::new();

            for _ in 0..expected_connections {
                let (stream, _) = sink_listener.accept().unwrap();
                let reader = BufReader::new(stream);

                for line in reader.lines() {
                    lines.push(line.unwrap());
                }
            }

            lines
        });

        let inbound_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let inbound_addr = inbound_listener.local_addr().unwrap();
        let inbound = inbound.to_string();

        let writer = thread::spawn(move || {
            let mut stream = TcpStream::connect(inbound_addr).unwrap();
            stream.write_all(inbound.as_bytes()).unwrap();
        });

        let (stream, _) = inbound_listener.accept().unwrap();
        writer.join().unwrap();

        let roster = Arc::new(vec![Peer::new(1, "127.0.0.1".to_string(), sink_port)]);

        build_request_handler(stream, roster, Some(0))();

        sink.join().unwrap()
    }

    #[test]
    fn forward_receipt_is_relayed_test() {
        let lines = relay_lines_for("FORWARD:3:test\n", 1);

        assert_eq!(lines, vec!["BROADCAST:3:test".to_string()]);
    }

    #[test]
    fn broadcast_receipt_is_terminal_test() {
        // A broadcast receipt triggers no outbound action, so only the
        // trailing forward reaches the sink.
        let lines = relay_lines_for("BROADCAST:2:done\nFORWARD:0:after\n", 1);

        assert_eq!(lines, vec!["BROADCAST:0:after".to_string()]);
    }

    #[test]
    fn duplicate_receipts_are_not_suppressed_test() {
        let lines = relay_lines_for("FORWARD:0:dup\nFORWARD:0:dup\n", 2);

        assert_eq!(
            lines,
            vec!["BROADCAST:0:dup".to_string(), "BROADCAST:0:dup".to_string()]
        );
    }

    #[test]
    fn invalid_line_is_dropped_and_the_loop_continues_test() {
        let lines = relay_lines_for("GARBAGE\nFORWARD:1:ok\n", 1);

        assert_eq!(lines, vec!["BROADCAST:1:ok".to_string()]);
    }
}
