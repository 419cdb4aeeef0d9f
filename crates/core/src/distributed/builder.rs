use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::distributed::comm::{COORDINATOR, Communicator, Packet};
use crate::error::{CorrError, Result};
use crate::matrix::{Cell, CorrelationMatrix};
use crate::partition::{WorkRange, partition};
use crate::pearson::correlation_row;

/// Full rows for every variable in `range`, row-major. Runs on the current
/// rayon pool.
pub fn compute_block(dataset: &Dataset, range: WorkRange) -> Vec<Cell> {
    let rows: Vec<Vec<Cell>> = range
        .indices()
        .into_par_iter()
        .map(|x| {
            correlation_row(dataset, x)
                .into_iter()
                .enumerate()
                .map(|(y, value)| Cell { x, y, value })
                .collect()
        })
        .collect();
    rows.into_iter().flatten().collect()
}

/// Checks a peer's block against the rows its partition assigns it.
fn validate_block(peer: usize, owned: WorkRange, dim: usize, cells: &[Cell]) -> Result<()> {
    let expected = owned.len() * dim;
    if cells.len() != expected {
        return Err(CorrError::protocol(
            peer,
            "gather",
            format!("{} cells", expected),
            format!("{} cells", cells.len()),
        ));
    }
    let mut seen = vec![false; expected];
    for cell in cells {
        if !owned.contains(cell.x) || cell.y >= dim {
            return Err(CorrError::protocol(
                peer,
                "gather",
                format!("cells in rows {}..{}", owned.start, owned.finish),
                format!("cell ({}, {})", cell.x, cell.y),
            ));
        }
        let slot = &mut seen[(cell.x - owned.start) * dim + cell.y];
        if *slot {
            return Err(CorrError::protocol(
                peer,
                "gather",
                "each cell once",
                format!("cell ({}, {}) repeated", cell.x, cell.y),
            ));
        }
        *slot = true;
    }
    Ok(())
}

/// Writes this worker's block locally and moves every block to the
/// coordinator. On return the coordinator's `local` is complete; a peer's
/// `local` only holds its own rows.
pub fn gather(comm: &Communicator, local: &mut CorrelationMatrix, block: Vec<Cell>) -> Result<()> {
    for &cell in &block {
        local.write(cell);
    }

    if !comm.is_coordinator() {
        tracing::debug!(rank = comm.rank(), cells = block.len(), "sending block");
        return comm.send(COORDINATOR, Packet::Cells(block));
    }

    let dim = local.dim();
    for peer in comm.peers() {
        let owned = partition(dim, comm.size(), peer);
        match comm.recv(peer)? {
            Packet::Cells(cells) => {
                validate_block(peer, owned, dim, &cells)?;
                for cell in cells {
                    local.write(cell);
                }
                tracing::debug!(peer, rows = owned.len(), "block received");
            }
            _ => {
                return Err(CorrError::UnexpectedPacket {
                    peer,
                    stage: "gather",
                });
            }
        }
    }
    Ok(())
}
