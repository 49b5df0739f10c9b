use rmfs_order::OrderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AllocError {
    #[error(transparent)]
    Order(#[from] OrderError),
}

pub type AllocResult<T> = Result<T, AllocError>;
