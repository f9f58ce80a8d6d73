use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document nesting exceeds {max_depth} levels")]
    DepthExceeded { max_depth: usize },
}
