//! Contains utilities related to the rendezvous handshake:
//! registering with the coordination server and reading back
//! the finalized cohort roster.

use std::{
    error::Error,
    io::{BufRead, BufReader, Write},
    net::{SocketAddr, TcpStream},
    time::Instant,
};

pub(crate) mod protocol;

/// A single entry of the roster received from the rendezvous server.
///
/// The id is local to this node: it reflects the order in which the records
/// were received and is only used for the operator menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Peer {
    id: u32,
    host: String,
    port: u16,
}

impl Peer {
    pub(crate) fn new(id: u32, host: String, port: u16) -> Self {
        Self { id, host, port }
    }

    pub(crate) fn get_id(&self) -> u32 {
        self.id
    }

    pub(crate) fn get_host(&self) -> &str {
        &self.host
    }

    pub(crate) fn get_port(&self) -> u16 {
        self.port
    }
}

/// Registers with the rendezvous server and reads back the finalized roster.
///
/// Sends one `PORT:<listen_port>` line, then reads lines until the roster
/// header shows up, then collects `host:port` records until a blank line or
/// stream end. There is no read deadline: the call blocks until the server
/// has assembled a full cohort.
pub(crate) fn join(server_addr: SocketAddr, listen_port: u16) -> Result<Vec<Peer>, Box<dyn Error>> {
    let request_sent_at = Instant::now();

    let mut stream = TcpStream::connect(server_addr)
        .map_err(|err| format!("cannot reach the rendezvous server: {}", err))?;

    stream.write_all(format!("{}\n", protocol::registration_line(listen_port)).as_bytes())?;

    println!(
        "sent listening port {} to the rendezvous server",
        listen_port
    );

    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    // Everything before the roster header is ignored.
    loop {
        line.clear();

        if reader.read_line(&mut line)? == 0 {
            return Err(From::from(
                "the rendezvous server closed the connection before sending the roster",
            ));
        }

        if protocol::is_roster_header(line.trim_end()) {
            break;
        }
    }

    println!(
        "roster received after {} milliseconds",
        request_sent_at.elapsed().as_millis()
    );

    let mut roster = Vec::new();

    loop {
        line.clear();

        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let record = line.trim_end();

        if record.is_empty() {
            break;
        }

        let (host, port) = protocol::parse_roster_line(record)?;
        roster.push(Peer::new(roster.len() as u32 + 1, host, port));
    }

    Ok(roster)
}

#[cfg(test)]
mod rendezvous_join_test {
    use std::{
        io::{BufRead, BufReader, Write},
        net::TcpListener,
        thread,
    };

    use super::{join, Peer};

    #[test]
    fn join_reads_the_finalized_roster_test() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server_addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();

            let mut reader = BufReader::new(&stream);
            let mut registration = String::new();
            reader.read_line(&mut registration).unwrap();
            assert_eq!(registration.trim_end(), "PORT:6001");

            let mut writer = &stream;
            writer
                .write_all(
                    b"Connected Clients:\n127.0.0.1:6001\n127.0.0.1:6002\n127.0.0.1:6003\n\n",
                )
                .unwrap();
        });

        let roster = join(server_addr, 6001).unwrap();
        server.join().unwrap();

        assert_eq!(
            roster,
            vec![
                Peer::new(1, "127.0.0.1".to_string(), 6001),
                Peer::new(2, "127.0.0.1".to_string(), 6002),
                Peer::new(3, "127.0.0.1".to_string(), 6003),
            ]
        );
    }

    #[test]
    fn join_ignores_lines_before_the_roster_header_test() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server_addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();

            let mut writer = &stream;
            writer
                .write_all(b"welcome\nConnected Clients:\n127.0.0.1:6001\n\n")
                .unwrap();
        });

        let roster = join(server_addr, 6001).unwrap();
        server.join().unwrap();

        assert_eq!(roster, vec![Peer::new(1, "127.0.0.1".to_string(), 6001)]);
    }

    #[test]
    fn join_without_a_roster_is_an_error_test() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let server_addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            // The server closes the connection without sending anything.
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let result = join(server_addr, 6001);
        server.join().unwrap();

        assert!(result.is_err());
    }
}
