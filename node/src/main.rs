use std::{
    error::Error,
    io::{self, Write},
    net::TcpListener,
    sync::{
        mpsc::{self, Sender},
        Arc, Mutex,
    },
    thread,
};

use cli::Args;
use rendezvous::Peer;

mod cli;
mod gossip;
mod rendezvous;

const LISTENER_THREAD_POOL_SIZE: u8 = 10;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse()?;

    let roster = rendezvous::join(args.get_server_addr(), args.get_listen_port())?;

    println!(
        "roster received with {} peer(s), ready to gossip",
        roster.len()
    );

    let roster = Arc::new(roster);

    // The listener is bound only after the roster read completed: a peer
    // never receives gossip before it knows its own cohort.
    let local_listener = TcpListener::bind(format!("0.0.0.0:{}", args.get_listen_port()))
        .map_err(|err| format!("cannot establish a TCP local listener: {}", err))?;

    let gossip_task_sender = spawn_background_threads(LISTENER_THREAD_POOL_SIZE)?;

    run_peer_listener(
        local_listener,
        Arc::clone(&roster),
        args.get_max_hops(),
        gossip_task_sender,
    );

    run_operator_loop(&roster)
}

/// Spawns `n` background threads to run tasks in parallel.
/// These threads remain alive as long as the main thread is running.
///
/// Tasks can be pushed and executed in these threads using the provided `Sender`.
fn spawn_background_threads(
    n: u8,
) -> Result<Sender<Box<dyn FnOnce() + Send + 'static>>, Box<dyn Error>> {
    if n == 0 {
        return Err(From::from("number of threads invalid"));
    }

    let (sender, receiver) = mpsc::channel::<Box<dyn FnOnce() + Send + 'static>>();
    let receiver = Arc::new(Mutex::new(receiver));

    for _ in 1..=n {
        let receiver = Arc::clone(&receiver);

        thread::spawn(move || loop {
            let task = {
                let receiver_lock = receiver.lock().unwrap();
                receiver_lock.recv().unwrap()
            };

            task();
        });
    }

    Ok(sender)
}

/// Accepts inbound peer connections indefinitely in a separate thread.
/// Each accepted connection is dispatched to the background thread pool,
/// so the accept loop never blocks on message processing.
fn run_peer_listener(
    listener: TcpListener,
    roster: Arc<Vec<Peer>>,
    max_hops: Option<u32>,
    task_sender: Sender<Box<dyn FnOnce() + Send + 'static>>,
) {
    thread::spawn(move || {
        for stream in listener.incoming() {
            let request_stream = match stream {
                Ok(request_stream) => request_stream,
                Err(err) => {
                    eprintln!("failed to accept a peer connection: {}", err);
                    continue;
                }
            };

            let request_handler = gossip::request_handler::build_request_handler(
                request_stream,
                Arc::clone(&roster),
                max_hops,
            );

            task_sender.send(Box::new(request_handler)).unwrap();
        }
    });
}

/// Reads payloads from the operator; each submission triggers one
/// origination decision with a fresh coin flip.
fn run_operator_loop(roster: &[Peer]) -> Result<(), Box<dyn Error>> {
    let stdin = io::stdin();

    loop {
        println!("\nlist of peers:");

        for peer in roster {
            println!(
                "\t{} => [{}:{}]",
                peer.get_id(),
                peer.get_host(),
                peer.get_port()
            );
        }

        print!("\nenter a message to gossip (or 'exit' to quit): ");
        io::stdout().flush()?;

        let mut line = String::new();

        if stdin.read_line(&mut line)? == 0 {
            break;
        }

        let payload = line.trim();

        if payload.eq_ignore_ascii_case("exit") {
            break;
        }

        if payload.is_empty() {
            continue;
        }

        gossip::originate(payload.to_string(), roster);
    }

    Ok(())
}
