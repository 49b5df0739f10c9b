use rmfs_core::OrderId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order {0} not found in the book")]
    UnknownOrder(OrderId),

    #[error("order {0} is not pending")]
    NotPending(OrderId),

    #[error("order {0} is not assigned")]
    NotAssigned(OrderId),

    /// A batching decision failed hard (remote optimizer unreachable,
    /// malformed or inconsistent response).  The tick's decision cycle is
    /// aborted rather than run on a schedule that may be wrong.
    #[error("batching policy failure: {0}")]
    Policy(String),
}

pub type OrderResult<T> = Result<T, OrderError>;
