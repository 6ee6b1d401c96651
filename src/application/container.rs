use super::{Action, Response};
use crate::domain::Entity;

/// Per-entity container: what the views render and watch.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState<E: Entity> {
    pub loading: bool,
    pub updating: bool,
    /// Set when the most recent create/update/delete resolved successfully.
    pub update_success: bool,
    pub error_message: Option<String>,
    pub entities: Vec<E>,
    pub entity: E,
}

impl<E: Entity> Default for EntityState<E> {
    fn default() -> Self {
        Self {
            loading: false,
            updating: false,
            update_success: false,
            error_message: None,
            entities: Vec::new(),
            entity: E::default(),
        }
    }
}

/// Pure transition function of the container.
pub fn reduce<E: Entity>(state: EntityState<E>, action: Action<E>) -> EntityState<E> {
    match action {
        Action::Request(op) if op.is_read() => EntityState {
            error_message: None,
            update_success: false,
            loading: true,
            ..state
        },
        Action::Request(_) => EntityState {
            error_message: None,
            update_success: false,
            updating: true,
            ..state
        },
        Action::Failure(_, message) => EntityState {
            loading: false,
            updating: false,
            update_success: false,
            error_message: Some(message),
            ..state
        },
        Action::Success(Response::Listed(entities)) => EntityState {
            loading: false,
            entities,
            ..state
        },
        Action::Success(Response::Fetched(entity)) => EntityState {
            loading: false,
            entity,
            ..state
        },
        Action::Success(
            Response::Created(entity) | Response::Updated(entity) | Response::PartiallyUpdated(entity),
        ) => EntityState {
            updating: false,
            update_success: true,
            entity,
            ..state
        },
        Action::Success(Response::Deleted) => EntityState {
            updating: false,
            update_success: true,
            entity: E::default(),
            ..state
        },
        Action::Reset => EntityState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Operation;
    use crate::domain::{EntityId, Task, UserInfo};

    fn user(id: i64) -> UserInfo {
        UserInfo {
            id: Some(EntityId(id)),
            ..Default::default()
        }
    }

    fn flags<E: Entity>(state: &EntityState<E>) -> (bool, bool, bool) {
        (state.loading, state.updating, state.update_success)
    }

    #[test]
    fn test_fetch_list_scenario() {
        let state = EntityState::<UserInfo>::default();

        let state = reduce(state, Action::Request(Operation::FetchList));
        assert!(state.loading);

        let state = reduce(state, Action::Success(Response::Listed(vec![user(1)])));
        assert!(!state.loading);
        assert_eq!(state.entities, vec![user(1)]);
    }

    #[test]
    fn test_delete_scenario() {
        let state = EntityState {
            entity: user(5),
            ..EntityState::<UserInfo>::default()
        };

        let state = reduce(state, Action::Request(Operation::Delete));
        assert!(state.updating);

        let state = reduce(state, Action::Success(Response::Deleted));
        assert_eq!(flags(&state), (false, false, true));
        assert_eq!(state.entity, UserInfo::default());
    }

    #[test]
    fn test_requests_clear_error_and_completion_flag() {
        let dirty = EntityState {
            update_success: true,
            error_message: Some("boom".to_string()),
            ..EntityState::<Task>::default()
        };

        for op in [Operation::FetchList, Operation::Fetch] {
            let state = reduce(dirty.clone(), Action::Request(op));
            assert_eq!(flags(&state), (true, false, false));
            assert_eq!(state.error_message, None);
        }

        for op in [
            Operation::Create,
            Operation::Update,
            Operation::PartialUpdate,
            Operation::Delete,
        ] {
            let state = reduce(dirty.clone(), Action::Request(op));
            assert_eq!(flags(&state), (false, true, false));
            assert_eq!(state.error_message, None);
        }
    }

    #[test]
    fn test_failure_clears_progress_and_stores_payload() {
        let busy = EntityState {
            loading: true,
            updating: true,
            update_success: true,
            entities: vec![Task::default()],
            ..EntityState::<Task>::default()
        };

        let state = reduce(busy, Action::Failure(Operation::Update, "HTTP 500".to_string()));
        assert_eq!(flags(&state), (false, false, false));
        assert_eq!(state.error_message.as_deref(), Some("HTTP 500"));
        assert_eq!(state.entities.len(), 1);
    }

    #[test]
    fn test_fetch_success_keeps_other_flags() {
        let state = EntityState {
            updating: true,
            ..EntityState::<UserInfo>::default()
        };
        let state = reduce(state, Action::Request(Operation::Fetch));
        let state = reduce(state, Action::Success(Response::Fetched(user(2))));

        assert_eq!(flags(&state), (false, true, false));
        assert_eq!(state.entity, user(2));
    }

    #[test]
    fn test_create_and_update_store_the_saved_entity() {
        for response in [
            Response::Created(user(3)),
            Response::Updated(user(3)),
            Response::PartiallyUpdated(user(3)),
        ] {
            let state = reduce(
                EntityState::<UserInfo>::default(),
                Action::Request(response.operation()),
            );
            let state = reduce(state, Action::Success(response));
            assert_eq!(flags(&state), (false, false, true));
            assert_eq!(state.entity, user(3));
        }
    }

    #[test]
    fn test_reset_always_returns_initial_state() {
        let messy = EntityState {
            loading: true,
            updating: true,
            update_success: true,
            error_message: Some("x".to_string()),
            entities: vec![user(1), user(2)],
            entity: user(1),
        };

        assert_eq!(reduce(messy, Action::Reset), EntityState::default());
        assert_eq!(
            reduce(EntityState::<UserInfo>::default(), Action::Reset),
            EntityState::default()
        );
    }
}
