//! Responsible for processing incoming registration connections.

use std::{
    io::{BufRead, BufReader},
    net::TcpStream,
    sync::Arc,
    time::Duration,
};

use super::{protocol, Registration, RegistrationBatch};

/// Deadline for receiving the registration line. A peer that connects but
/// never sends `PORT:<n>` would otherwise pin a handler thread forever.
const REGISTRATION_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates a handler that reads one `PORT:<n>` line from an accepted
/// connection and appends the registration to the shared batch. The peer's
/// host is derived from the connection's remote address.
///
/// A registration handler should never panic.
/// This is because request handlers are executed in separate threads.
/// A panic can terminate the thread, potentially causing the entire process to stop.
///
/// A malformed first line is a protocol error for that connection only:
/// the connection is dropped and does not count toward the batch.
pub(crate) fn build_request_handler(
    stream: TcpStream,
    batch: Arc<RegistrationBatch>,
) -> impl FnOnce() + Send + 'static {
    move || {
        let remote_addr = match stream.peer_addr() {
            Ok(remote_addr) => remote_addr,
            Err(err) => {
                eprintln!("failed to identify a registering peer: {}", err);
                return;
            }
        };

        if let Err(err) = stream.set_read_timeout(Some(REGISTRATION_READ_TIMEOUT)) {
            eprintln!(
                "failed to configure the registration from [{}]: {}",
                remote_addr, err
            );
            return;
        }

        let mut first_line = String::new();
        {
            let mut reader = BufReader::new(&stream);

            if let Err(err) = reader.read_line(&mut first_line) {
                eprintln!(
                    "failed to read the registration from [{}]: {}",
                    remote_addr, err
                );
                return;
            }
        }

        let port = match protocol::parse_registration_line(first_line.trim_end()) {
            Ok(port) => port,
            Err(err) => {
                eprintln!("dropped the registration from [{}]: {}", remote_addr, err);
                return;
            }
        };

        let host = remote_addr.ip().to_string();

        println!("client connected from [{}] listening on port {}", host, port);

        batch.push(Registration::new(stream, host, port));
    }
}

#[cfg(test)]
mod registration_request_handler_test {
    use std::{
        io::Write,
        net::{TcpListener, TcpStream},
        sync::Arc,
        thread,
    };

    use crate::rendezvous::{assign_ids, RegistrationBatch};

    use super::build_request_handler;

    fn accepted_stream_with_first_line(line: &str) -> TcpStream {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let listener_addr = listener.local_addr().unwrap();
        let line = line.to_string();

        let writer = thread::spawn(move || {
            let mut client_side = TcpStream::connect(listener_addr).unwrap();
            client_side.write_all(line.as_bytes()).unwrap();
            client_side
        });

        let (server_side, _) = listener.accept().unwrap();
        writer.join().unwrap();

        server_side
    }

    #[test]
    fn valid_registration_joins_the_batch_test() {
        let batch = Arc::new(RegistrationBatch::new(1));

        let stream = accepted_stream_with_first_line("PORT:6001\n");
        build_request_handler(stream, Arc::clone(&batch))();

        let registrations = batch.wait_until_full();
        let records = assign_ids(&registrations);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].host, "127.0.0.1");
        assert_eq!(records[0].port, 6001);
    }

    #[test]
    fn malformed_registration_does_not_count_toward_the_batch_test() {
        let batch = Arc::new(RegistrationBatch::new(1));

        let stream = accepted_stream_with_first_line("HELLO:6001\n");
        build_request_handler(stream, Arc::clone(&batch))();

        // The cohort still needs one valid registration.
        let stream = accepted_stream_with_first_line("PORT:6002\n");
        build_request_handler(stream, Arc::clone(&batch))();

        let registrations = batch.wait_until_full();
        let records = assign_ids(&registrations);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].port, 6002);
    }
}
