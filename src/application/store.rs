use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{reduce, Action, EntityState, Operation, Services, EntityService};
use crate::domain::{Comment, Entity, EntityKind, Message, Project, Related, Task, UserInfo};

/// Monotonic stamp handed out when an operation is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch<E: Entity> {
    pub ticket: Ticket,
    pub action: Action<E>,
}

/// Everything that travels over the store channel.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    Project(Dispatch<Project>),
    Task(Dispatch<Task>),
    Comment(Dispatch<Comment>),
    UserInfo(Dispatch<UserInfo>),
    Message(Dispatch<Message>),
}

/// Container of one entity kind plus the bookkeeping that keeps late responses out.
#[derive(Debug, Default)]
pub struct EntitySlice<E: Entity> {
    state: EntityState<E>,
    latest: HashMap<Operation, Ticket>,
    floor: Option<Ticket>,
    /// Bumped on every applied create/update/delete success. Unlike
    /// `update_success` it is not cleared by the follow-up list request.
    completions: u64,
}

impl<E: Entity> EntitySlice<E> {
    pub fn state(&self) -> &EntityState<E> {
        &self.state
    }

    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// Applies one dispatch. Returns false when it was dropped as stale.
    pub fn apply(&mut self, dispatch: Dispatch<E>) -> bool {
        let Dispatch { ticket, action } = dispatch;

        if self.floor.is_some_and(|floor| ticket < floor) {
            tracing::warn!(
                "Dropping {} action {:?} issued before the last reset",
                E::KIND,
                action.operation()
            );
            return false;
        }

        match &action {
            Action::Request(op) => {
                let latest = self.latest.entry(*op).or_insert(ticket);
                *latest = (*latest).max(ticket);
            }
            Action::Success(_) | Action::Failure(_, _) => {
                if let Some(op) = action.operation() {
                    if let Some(latest) = self.latest.get(&op) {
                        if ticket < *latest {
                            tracing::warn!(
                                "Dropping stale {} {} response (ticket {} < {})",
                                E::KIND,
                                op,
                                ticket.0,
                                latest.0
                            );
                            return false;
                        }
                    }
                }
            }
            Action::Reset => {
                self.latest.clear();
                self.floor = Some(ticket);
            }
        }

        if matches!(&action, Action::Success(response) if !response.operation().is_read()) {
            self.completions += 1;
        }

        self.state = reduce(std::mem::take(&mut self.state), action);
        true
    }
}

/// Flags of one slice, independent of the entity type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliceStatus {
    pub loading: bool,
    pub updating: bool,
    pub error_message: Option<String>,
    pub count: usize,
    pub completions: u64,
}

impl<E: Entity> From<&EntitySlice<E>> for SliceStatus {
    fn from(slice: &EntitySlice<E>) -> Self {
        let state = slice.state();
        Self {
            loading: state.loading,
            updating: state.updating,
            error_message: state.error_message.clone(),
            count: state.entities.len(),
            completions: slice.completions(),
        }
    }
}

/// Entities that have a slice in the [`Store`].
pub trait StoreEntity: Entity {
    fn wrap(dispatch: Dispatch<Self>) -> StoreAction;
    fn slice(store: &Store) -> &EntitySlice<Self>;
    fn slice_mut(store: &mut Store) -> &mut EntitySlice<Self>;
    fn service(services: &Services) -> &EntityService<Self>;
}

impl StoreEntity for Project {
    fn wrap(dispatch: Dispatch<Self>) -> StoreAction {
        StoreAction::Project(dispatch)
    }
    fn slice(store: &Store) -> &EntitySlice<Self> {
        &store.projects
    }
    fn slice_mut(store: &mut Store) -> &mut EntitySlice<Self> {
        &mut store.projects
    }
    fn service(services: &Services) -> &EntityService<Self> {
        &services.projects
    }
}

impl StoreEntity for Task {
    fn wrap(dispatch: Dispatch<Self>) -> StoreAction {
        StoreAction::Task(dispatch)
    }
    fn slice(store: &Store) -> &EntitySlice<Self> {
        &store.tasks
    }
    fn slice_mut(store: &mut Store) -> &mut EntitySlice<Self> {
        &mut store.tasks
    }
    fn service(services: &Services) -> &EntityService<Self> {
        &services.tasks
    }
}

impl StoreEntity for Comment {
    fn wrap(dispatch: Dispatch<Self>) -> StoreAction {
        StoreAction::Comment(dispatch)
    }
    fn slice(store: &Store) -> &EntitySlice<Self> {
        &store.comments
    }
    fn slice_mut(store: &mut Store) -> &mut EntitySlice<Self> {
        &mut store.comments
    }
    fn service(services: &Services) -> &EntityService<Self> {
        &services.comments
    }
}

impl StoreEntity for UserInfo {
    fn wrap(dispatch: Dispatch<Self>) -> StoreAction {
        StoreAction::UserInfo(dispatch)
    }
    fn slice(store: &Store) -> &EntitySlice<Self> {
        &store.user_infos
    }
    fn slice_mut(store: &mut Store) -> &mut EntitySlice<Self> {
        &mut store.user_infos
    }
    fn service(services: &Services) -> &EntityService<Self> {
        &services.user_infos
    }
}

impl StoreEntity for Message {
    fn wrap(dispatch: Dispatch<Self>) -> StoreAction {
        StoreAction::Message(dispatch)
    }
    fn slice(store: &Store) -> &EntitySlice<Self> {
        &store.messages
    }
    fn slice_mut(store: &mut Store) -> &mut EntitySlice<Self> {
        &mut store.messages
    }
    fn service(services: &Services) -> &EntityService<Self> {
        &services.messages
    }
}

/// One slice per entity kind. Owned by the UI loop (or a CLI command) and
/// fed from the receiving half of the dispatcher channel.
#[derive(Debug, Default)]
pub struct Store {
    projects: EntitySlice<Project>,
    tasks: EntitySlice<Task>,
    comments: EntitySlice<Comment>,
    user_infos: EntitySlice<UserInfo>,
    messages: EntitySlice<Message>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: StoreAction) -> bool {
        match action {
            StoreAction::Project(d) => self.projects.apply(d),
            StoreAction::Task(d) => self.tasks.apply(d),
            StoreAction::Comment(d) => self.comments.apply(d),
            StoreAction::UserInfo(d) => self.user_infos.apply(d),
            StoreAction::Message(d) => self.messages.apply(d),
        }
    }

    /// Applies everything currently queued without waiting. Returns how many actions were applied.
    pub fn drain(&mut self, rx: &mut UnboundedReceiver<StoreAction>) -> usize {
        let mut applied = 0;
        while let Ok(action) = rx.try_recv() {
            if self.apply(action) {
                applied += 1;
            }
        }
        applied
    }

    pub fn state<E: StoreEntity>(&self) -> &EntityState<E> {
        E::slice(self).state()
    }

    pub fn status(&self, kind: EntityKind) -> SliceStatus {
        match kind {
            EntityKind::Project => (&self.projects).into(),
            EntityKind::Task => (&self.tasks).into(),
            EntityKind::Comment => (&self.comments).into(),
            EntityKind::UserInfo => (&self.user_infos).into(),
            EntityKind::Message => (&self.messages).into(),
        }
    }

    /// Collections available to resolve relation fields on submit.
    pub fn related(&self) -> Related<'_> {
        Related {
            projects: &self.projects.state.entities,
            tasks: &self.tasks.state.entities,
        }
    }
}

/// Sending half of the store channel, shared by every service.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: UnboundedSender<StoreAction>,
    tickets: Arc<AtomicU64>,
}

impl Dispatcher {
    pub fn channel() -> (Self, UnboundedReceiver<StoreAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                tickets: Arc::new(AtomicU64::new(0)),
            },
            rx,
        )
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.tickets.fetch_add(1, AtomicOrdering::SeqCst) + 1)
    }

    pub fn send<E: StoreEntity>(&self, ticket: Ticket, action: Action<E>) {
        if self.tx.send(E::wrap(Dispatch { ticket, action })).is_err() {
            tracing::debug!("Store channel closed, dropping {} action", E::KIND);
        }
    }
}
