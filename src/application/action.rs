use strum::Display;

use crate::domain::Entity;

/// The operation kinds a container tracks through request/success/failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Operation {
    FetchList,
    Fetch,
    Create,
    Update,
    PartialUpdate,
    Delete,
}

impl Operation {
    /// Reads set `loading`; everything else sets `updating`.
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::FetchList | Operation::Fetch)
    }
}

/// Payload of a successful operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<E> {
    Listed(Vec<E>),
    Fetched(E),
    Created(E),
    Updated(E),
    PartiallyUpdated(E),
    Deleted,
}

impl<E> Response<E> {
    pub fn operation(&self) -> Operation {
        match self {
            Response::Listed(_) => Operation::FetchList,
            Response::Fetched(_) => Operation::Fetch,
            Response::Created(_) => Operation::Create,
            Response::Updated(_) => Operation::Update,
            Response::PartiallyUpdated(_) => Operation::PartialUpdate,
            Response::Deleted => Operation::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action<E: Entity> {
    Request(Operation),
    Success(Response<E>),
    Failure(Operation, String),
    Reset,
}

impl<E: Entity> Action<E> {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Action::Request(op) | Action::Failure(op, _) => Some(*op),
            Action::Success(response) => Some(response.operation()),
            Action::Reset => None,
        }
    }
}
