use rmfs_core::StationId;
use rmfs_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MateError {
    /// A reservation the scheduler relied on was violated (double lock of a
    /// rendezvous waypoint).  Coordination bug; not recovered locally.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("no assist request registered for {0}")]
    UnknownRequest(StationId),
}

pub type MateResult<T> = Result<T, MateError>;
