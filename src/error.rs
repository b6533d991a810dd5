use grid_util::point::Point;
use thiserror::Error;

/// Which end of a query an [PathError::ImpossibleEndpoint] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Finish,
}

impl core::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Finish => write!(f, "finish"),
        }
    }
}

/// Errors reported before any search work is done. An unreachable goal is not an error,
/// it is reported as [None] by the search functions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("{endpoint} position {position} is an obstacle")]
    ImpossibleEndpoint { endpoint: Endpoint, position: Point },
}

/// Failures of [OrderedMultiTree](crate::avl::OrderedMultiTree) operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node is not present in the tree")]
    NodeNotFound,
}
