//! Contains utilities related to cohort registration
//! and roster broadcast.

use std::{
    io::Write,
    mem,
    net::TcpStream,
    sync::{Condvar, Mutex},
    time::Instant,
};

pub(crate) mod protocol;
pub(crate) mod request_handler;

/// A registered peer of the cohort currently being assembled.
///
/// The registration connection is one-shot: it is kept open until the
/// cohort roster has been written back over it, then dropped.
#[derive(Debug)]
pub(crate) struct Registration {
    stream: TcpStream,
    host: String,
    port: u16,
    connected_at: Instant,
}

impl Registration {
    pub(crate) fn new(stream: TcpStream, host: String, port: u16) -> Self {
        Self {
            stream,
            host,
            port,
            connected_at: Instant::now(),
        }
    }
}

/// Identity record assigned to a registered peer
/// once its cohort is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PeerRecord {
    pub(crate) id: u32,
    pub(crate) host: String,
    pub(crate) port: u16,
}

/// The shared batch of registrations for the cohort currently being
/// assembled.
///
/// Registration handlers append under the lock and signal; the coordinating
/// loop blocks on the condition variable until the batch holds `capacity`
/// entries. This is the only structure mutated by multiple threads.
pub(crate) struct RegistrationBatch {
    entries: Mutex<Vec<Registration>>,
    filled: Condvar,
    capacity: usize,
}

impl RegistrationBatch {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            filled: Condvar::new(),
            capacity,
        }
    }

    /// Appends a registration under the lock and wakes the coordinating
    /// loop. Id assignment order is exactly the lock acquisition order.
    pub(crate) fn push(&self, registration: Registration) {
        let mut entries = self.entries.lock().unwrap();
        entries.push(registration);
        self.filled.notify_all();
    }

    /// Blocks until the current cohort reaches capacity, then takes exactly
    /// `capacity` entries out of the batch. Registrations that arrived past
    /// capacity stay behind and count toward the next cohort.
    ///
    /// There is no timeout: a short-by-one cohort blocks indefinitely.
    pub(crate) fn wait_until_full(&self) -> Vec<Registration> {
        let mut entries = self.entries.lock().unwrap();

        while entries.len() < self.capacity {
            entries = self.filled.wait(entries).unwrap();
        }

        if entries.len() == self.capacity {
            return mem::take(&mut *entries);
        }

        entries.drain(0..self.capacity).collect()
    }
}

/// Assigns sequential ids starting at 1, in arrival order,
/// to a finalized cohort.
pub(crate) fn assign_ids(registrations: &[Registration]) -> Vec<PeerRecord> {
    registrations
        .iter()
        .enumerate()
        .map(|(i, registration)| PeerRecord {
            id: i as u32 + 1,
            host: registration.host.clone(),
            port: registration.port,
        })
        .collect()
}

/// Writes the finalized roster to every registration of a cohort and closes
/// the connections. A write failure for one peer is reported and skipped;
/// delivery continues for the remaining peers.
pub(crate) fn broadcast_roster(registrations: Vec<Registration>) {
    let records = assign_ids(&registrations);
    let roster_text = protocol::roster_text(&records);

    if let Some(last_connected_at) = registrations
        .iter()
        .map(|registration| registration.connected_at)
        .max()
    {
        println!(
            "time between the last registration and the broadcast: {} milliseconds",
            last_connected_at.elapsed().as_millis()
        );
    }

    for (record, mut registration) in records.into_iter().zip(registrations) {
        match registration.stream.write_all(roster_text.as_bytes()) {
            Ok(()) => println!("sent the roster to [{}:{}]", record.host, record.port),
            Err(err) => eprintln!(
                "failed to broadcast the roster to [{}:{}]: {}",
                record.host, record.port, err
            ),
        }
        // Dropping the registration closes its connection.
    }
}
