use crate::distributed::comm::{COORDINATOR, Communicator, Packet};
use crate::error::{CorrError, Result};
use crate::matrix::CorrelationMatrix;

/// Replaces every peer's local matrix with the coordinator's.
pub fn broadcast_matrix(comm: &Communicator, local: &mut CorrelationMatrix) -> Result<()> {
    let dim = local.dim();

    if comm.is_coordinator() {
        let values = local.to_row_major();
        for peer in comm.peers() {
            comm.send(
                peer,
                Packet::Matrix {
                    dim,
                    values: values.clone(),
                },
            )?;
        }
        return Ok(());
    }

    match comm.recv(COORDINATOR)? {
        Packet::Matrix { dim: sent, values } => {
            if sent != dim {
                return Err(CorrError::protocol(
                    COORDINATOR,
                    "broadcast",
                    format!("dimension {}", dim),
                    format!("dimension {}", sent),
                ));
            }
            let cells = values.len();
            *local = CorrelationMatrix::from_row_major(dim, values).map_err(|_| {
                CorrError::protocol(
                    COORDINATOR,
                    "broadcast",
                    format!("{} cells", dim * dim),
                    format!("{} cells", cells),
                )
            })?;
            tracing::debug!(rank = comm.rank(), dim, "matrix replica received");
            Ok(())
        }
        _ => Err(CorrError::UnexpectedPacket {
            peer: COORDINATOR,
            stage: "broadcast",
        }),
    }
}
