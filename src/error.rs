//! Cache errors

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    #[error("Key not found")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, CacheError>;
