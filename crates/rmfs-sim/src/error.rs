use rmfs_alloc::AllocError;
use rmfs_core::FleetError;
use rmfs_layout::LayoutError;
use rmfs_ledger::LedgerError;
use rmfs_mate::MateError;
use rmfs_order::OrderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    CountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error(transparent)]
    Fleet(#[from] FleetError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Mate(#[from] MateError),

    #[error(transparent)]
    Alloc(#[from] AllocError),
}

pub type SimResult<T> = Result<T, SimError>;
