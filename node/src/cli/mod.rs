//! Utilities for the Command Line Interface (CLI)
//! that represents a peer node.

use std::{env, error::Error, net::SocketAddr};

const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:5000";

/// Contains the arguments required to run a peer node: the node's own
/// listening port (positional), and optionally the rendezvous server
/// address and a hop cap for forwarded messages.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Args {
    listen_port: u16,
    server_addr: SocketAddr,
    max_hops: Option<u32>,
}

impl Args {
    /// Parses all received arguments, performs types
    /// verification and builds an `Args` instance.
    pub(crate) fn parse() -> Result<Self, Box<dyn Error>> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(mut args: impl Iterator<Item = String>) -> Result<Self, Box<dyn Error>> {
        let listen_port_arg = args
            .next()
            .ok_or("usage: node <listen-port> [server-addr=<host:port>] [max-hops=<n>]")?;

        let listen_port = listen_port_arg
            .parse::<u16>()
            .map_err(|_| "listen-port argument is missing or invalid")?;

        if listen_port == 0 {
            return Err(From::from("listen-port argument is missing or invalid"));
        }

        let mut server_addr = DEFAULT_SERVER_ADDR.parse::<SocketAddr>().unwrap(); // Safe unwrap
        let mut max_hops = None;

        for arg in args {
            if let Some(value) = arg.strip_prefix("server-addr=") {
                server_addr = value
                    .parse::<SocketAddr>()
                    .map_err(|_| "server-addr argument is invalid")?;
            } else if let Some(value) = arg.strip_prefix("max-hops=") {
                max_hops = Some(
                    value
                        .parse::<u32>()
                        .map_err(|_| "max-hops argument is invalid")?,
                );
            } else {
                return Err(From::from("invalid argument(s)"));
            }
        }

        Ok(Self {
            listen_port,
            server_addr,
            max_hops,
        })
    }

    /// Gets the port this node listens on for peer connections.
    pub(crate) fn get_listen_port(&self) -> u16 {
        self.listen_port
    }

    /// Gets the rendezvous server address.
    pub(crate) fn get_server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Gets the configured hop cap, if any.
    pub(crate) fn get_max_hops(&self) -> Option<u32> {
        self.max_hops
    }
}
