use crate::distributed::comm::{COORDINATOR, Communicator, Packet};
use crate::error::{CorrError, Result};
use crate::partition::{WorkRange, partition};
use crate::reduce::Discovery;
use crate::retention::RetentionRecord;

/// Folds every worker's discoveries into the coordinator's record.
///
/// `local` holds what this worker marked while scanning `found`. Peers ship
/// their pairs and get `None`; the coordinator returns the merged record.
pub fn merge_discoveries(
    comm: &Communicator,
    local: RetentionRecord,
    found: Vec<Discovery>,
) -> Result<Option<RetentionRecord>> {
    if !comm.is_coordinator() {
        tracing::debug!(rank = comm.rank(), pairs = found.len(), "sending discoveries");
        comm.send(COORDINATOR, Packet::Discoveries(found))?;
        return Ok(None);
    }

    let dim = local.variable_count();
    let mut record = local;
    for peer in comm.peers() {
        let owned = partition(dim, comm.size(), peer);
        match comm.recv(peer)? {
            Packet::Discoveries(pairs) => {
                validate_pairs(peer, owned, dim, &pairs)?;
                for d in &pairs {
                    record.mark_pair(d.x, d.y);
                }
                tracing::debug!(peer, pairs = pairs.len(), "discoveries merged");
            }
            _ => {
                return Err(CorrError::UnexpectedPacket {
                    peer,
                    stage: "reduce",
                });
            }
        }
    }
    Ok(Some(record))
}

fn validate_pairs(peer: usize, owned: WorkRange, dim: usize, pairs: &[Discovery]) -> Result<()> {
    match pairs.iter().find(|d| !owned.contains(d.x) || d.y >= dim) {
        Some(bad) => Err(CorrError::protocol(
            peer,
            "reduce",
            format!("pairs from rows {}..{}", owned.start, owned.finish),
            format!("pair ({}, {})", bad.x, bad.y),
        )),
        None => Ok(()),
    }
}
