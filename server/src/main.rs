use std::{error::Error, net::TcpListener, sync::Arc, thread};

use rendezvous::RegistrationBatch;

mod rendezvous;

/// Startup configuration of the rendezvous server. There are no runtime
/// arguments in this design: both values are fixed per deployment.
const LISTEN_PORT: u16 = 5000;
const BATCH_SIZE: usize = 10;

fn main() -> Result<(), Box<dyn Error>> {
    let listener = TcpListener::bind(format!("0.0.0.0:{}", LISTEN_PORT))
        .map_err(|err| format!("cannot establish a TCP local listener: {}", err))?;

    println!("rendezvous server is listening on port {}", LISTEN_PORT);

    let batch = Arc::new(RegistrationBatch::new(BATCH_SIZE));

    run_registration_listener(listener, Arc::clone(&batch));

    // One cohort per iteration. Cohorts are fully independent:
    // the batch is drained on every pass and no state carries over.
    loop {
        let registrations = batch.wait_until_full();

        println!(
            "{} clients connected, broadcasting the roster",
            registrations.len()
        );

        rendezvous::broadcast_roster(registrations);

        println!("rendezvous server is ready to accept the next cohort");
    }
}

/// Accepts registration connections indefinitely in a separate thread.
/// Each accepted connection is handed to its own registration handler
/// thread, so a slow or malformed registration never blocks the accept loop.
fn run_registration_listener(listener: TcpListener, batch: Arc<RegistrationBatch>) {
    thread::spawn(move || {
        for stream in listener.incoming() {
            let request_stream = match stream {
                Ok(request_stream) => request_stream,
                Err(err) => {
                    eprintln!("failed to accept a registration: {}", err);
                    continue;
                }
            };

            let request_handler = rendezvous::request_handler::build_request_handler(
                request_stream,
                Arc::clone(&batch),
            );

            thread::spawn(request_handler);
        }
    });
}
