use thiserror::Error;

use super::{GroupId, SwathId};

#[derive(Debug, Error, PartialEq)]
pub enum SwathError {
    #[error("far range {far} m must exceed near range {near} m")]
    InvalidRange { near: f64, far: f64 },
    #[error("swath geometry contains a non-finite value")]
    NonFinite,
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("group {0} is closed")]
    GroupClosed(GroupId),
    #[error("group {0} belongs to the running tracking session")]
    GroupInUse(GroupId),
    #[error("swath {0} not found")]
    SwathNotFound(SwathId),
}
