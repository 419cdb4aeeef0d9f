//! In-process message mesh between workers.
//!
//! Every ordered pair of workers gets its own unbounded FIFO channel, so
//! messages from one source arrive in send order and every receive names its
//! source. A worker that exits drops its endpoints; peers waiting on it see a
//! disconnect instead of blocking forever.

use crossbeam_channel::{Receiver, Sender, unbounded};

use crate::error::{CorrError, Result};
use crate::matrix::Cell;
use crate::reduce::Discovery;

pub const COORDINATOR: usize = 0;

/// Messages exchanged between workers. Each carries its own length and
/// coordinates, so receivers never infer anything from cadence.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// A worker's computed block, one cell per `(x, y)` of its rows.
    Cells(Vec<Cell>),
    /// The assembled matrix, row-major.
    Matrix { dim: usize, values: Vec<f64> },
    /// Qualifying pairs found by a worker in its rows. May be empty.
    Discoveries(Vec<Discovery>),
    Barrier,
}

/// One worker's endpoints into the mesh.
#[derive(Debug)]
pub struct Communicator {
    rank: usize,
    size: usize,
    outboxes: Vec<Sender<Packet>>,
    inboxes: Vec<Receiver<Packet>>,
}

/// Builds a fully connected mesh of `size` workers; element `i` has rank `i`.
pub fn mesh(size: usize) -> Vec<Communicator> {
    let mut outboxes: Vec<Vec<Sender<Packet>>> = (0..size).map(|_| Vec::new()).collect();
    let mut inboxes: Vec<Vec<Receiver<Packet>>> = (0..size).map(|_| Vec::new()).collect();

    // inboxes[dst] is filled in source order because src is the outer loop.
    for outbox in outboxes.iter_mut() {
        for inbox in inboxes.iter_mut() {
            let (tx, rx) = unbounded();
            outbox.push(tx);
            inbox.push(rx);
        }
    }

    outboxes
        .into_iter()
        .zip(inboxes)
        .enumerate()
        .map(|(rank, (outboxes, inboxes))| Communicator {
            rank,
            size,
            outboxes,
            inboxes,
        })
        .collect()
}

impl Communicator {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == COORDINATOR
    }

    /// Ranks other than the coordinator, ascending.
    pub fn peers(&self) -> std::ops::Range<usize> {
        COORDINATOR + 1..self.size
    }

    pub fn send(&self, to: usize, packet: Packet) -> Result<()> {
        self.outboxes[to]
            .send(packet)
            .map_err(|_| CorrError::PeerDisconnected { peer: to })
    }

    /// Blocks until the next message from `from` arrives.
    pub fn recv(&self, from: usize) -> Result<Packet> {
        self.inboxes[from]
            .recv()
            .map_err(|_| CorrError::PeerDisconnected { peer: from })
    }

    /// Returns once every worker has reached the barrier. Peers report to the
    /// coordinator, which releases them after hearing from all of them.
    pub fn barrier(&self) -> Result<()> {
        if self.is_coordinator() {
            for peer in self.peers() {
                self.expect_barrier(peer)?;
            }
            for peer in self.peers() {
                self.send(peer, Packet::Barrier)?;
            }
        } else {
            self.send(COORDINATOR, Packet::Barrier)?;
            self.expect_barrier(COORDINATOR)?;
        }
        Ok(())
    }

    fn expect_barrier(&self, from: usize) -> Result<()> {
        match self.recv(from)? {
            Packet::Barrier => Ok(()),
            _ => Err(CorrError::UnexpectedPacket {
                peer: from,
                stage: "barrier",
            }),
        }
    }
}
