use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Action, AppResult, Dispatcher, Operation, Response, StoreEntity, Ticket, ViewEffect};
use crate::domain::{Comment, Criteria, EntityId, EntityKind, Message, Project, Task, UserInfo};
use crate::ports::{EntityRepository, RepositoryError};

/// Action creators of one entity kind: each call emits Request, awaits the
/// repository, then emits Success or Failure.
pub struct EntityService<E: StoreEntity> {
    repository: Arc<dyn EntityRepository<E>>,
    dispatcher: Dispatcher,
    last_criteria: RwLock<Criteria>,
}

impl<E: StoreEntity> EntityService<E> {
    pub fn new(repository: Arc<dyn EntityRepository<E>>, dispatcher: Dispatcher) -> Self {
        Self {
            repository,
            dispatcher,
            last_criteria: RwLock::new(Criteria::default()),
        }
    }

    fn begin(&self, op: Operation) -> Ticket {
        let ticket = self.dispatcher.issue();
        tracing::debug!("{} {} requested (ticket {})", E::KIND, op, ticket.0);
        self.dispatcher.send::<E>(ticket, Action::Request(op));
        ticket
    }

    fn finish<T>(
        &self,
        ticket: Ticket,
        op: Operation,
        result: Result<T, RepositoryError>,
        respond: impl FnOnce(&T) -> Response<E>,
    ) -> AppResult<T> {
        match result {
            Ok(value) => {
                self.dispatcher.send::<E>(ticket, Action::Success(respond(&value)));
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("{} {} failed: {}", E::KIND, op, e);
                self.dispatcher.send::<E>(ticket, Action::Failure(op, e.to_string()));
                Err(e.into())
            }
        }
    }

    pub async fn get_entities(&self, criteria: &Criteria) -> AppResult<Vec<E>> {
        *self.last_criteria.write().await = criteria.clone();

        let ticket = self.begin(Operation::FetchList);
        let result = self.repository.list(criteria).await;
        self.finish(ticket, Operation::FetchList, result, |entities| {
            Response::Listed(entities.clone())
        })
    }

    pub async fn get_entity(&self, id: EntityId) -> AppResult<E> {
        let ticket = self.begin(Operation::Fetch);
        let result = self.repository.get(id).await;
        self.finish(ticket, Operation::Fetch, result, |entity| {
            Response::Fetched(entity.clone())
        })
    }

    /// Creates the entity, then re-fetches the list with the last criteria used.
    pub async fn create_entity(&self, entity: &E) -> AppResult<E> {
        let ticket = self.begin(Operation::Create);
        let result = self.repository.create(entity).await;
        let created = self.finish(ticket, Operation::Create, result, |entity| {
            Response::Created(entity.clone())
        })?;

        self.refresh().await;
        Ok(created)
    }

    pub async fn update_entity(&self, entity: &E) -> AppResult<E> {
        let ticket = self.begin(Operation::Update);
        let result = self.repository.update(entity).await;
        self.finish(ticket, Operation::Update, result, |entity| {
            Response::Updated(entity.clone())
        })
    }

    pub async fn partial_update(&self, entity: &E) -> AppResult<E> {
        let ticket = self.begin(Operation::PartialUpdate);
        let result = self.repository.partial_update(entity).await;
        self.finish(ticket, Operation::PartialUpdate, result, |entity| {
            Response::PartiallyUpdated(entity.clone())
        })
    }

    /// Deletes the entity, then re-fetches the list with the last criteria used.
    pub async fn delete_entity(&self, id: EntityId) -> AppResult<()> {
        let ticket = self.begin(Operation::Delete);
        let result = self.repository.delete(id).await;
        self.finish(ticket, Operation::Delete, result, |_| Response::Deleted)?;

        self.refresh().await;
        Ok(())
    }

    pub fn reset(&self) {
        self.dispatcher.send::<E>(self.dispatcher.issue(), Action::Reset);
    }

    async fn refresh(&self) {
        let criteria = self.last_criteria.read().await.clone();
        // Failure is already recorded in the container
        let _ = self.get_entities(&criteria).await;
    }
}

/// Every entity service, wired to the same dispatcher.
pub struct Services {
    pub projects: EntityService<Project>,
    pub tasks: EntityService<Task>,
    pub comments: EntityService<Comment>,
    pub user_infos: EntityService<UserInfo>,
    pub messages: EntityService<Message>,
}

impl Services {
    pub fn new(
        dispatcher: Dispatcher,
        projects: Arc<dyn EntityRepository<Project>>,
        tasks: Arc<dyn EntityRepository<Task>>,
        comments: Arc<dyn EntityRepository<Comment>>,
        user_infos: Arc<dyn EntityRepository<UserInfo>>,
        messages: Arc<dyn EntityRepository<Message>>,
    ) -> Self {
        Self {
            projects: EntityService::new(projects, dispatcher.clone()),
            tasks: EntityService::new(tasks, dispatcher.clone()),
            comments: EntityService::new(comments, dispatcher.clone()),
            user_infos: EntityService::new(user_infos, dispatcher.clone()),
            messages: EntityService::new(messages, dispatcher),
        }
    }

    pub fn service<E: StoreEntity>(&self) -> &EntityService<E> {
        E::service(self)
    }

    pub async fn fetch_list(&self, kind: EntityKind, criteria: &Criteria) -> AppResult<()> {
        match kind {
            EntityKind::Project => self.projects.get_entities(criteria).await.map(drop),
            EntityKind::Task => self.tasks.get_entities(criteria).await.map(drop),
            EntityKind::Comment => self.comments.get_entities(criteria).await.map(drop),
            EntityKind::UserInfo => self.user_infos.get_entities(criteria).await.map(drop),
            EntityKind::Message => self.messages.get_entities(criteria).await.map(drop),
        }
    }

    pub async fn fetch(&self, kind: EntityKind, id: EntityId) -> AppResult<()> {
        match kind {
            EntityKind::Project => self.projects.get_entity(id).await.map(drop),
            EntityKind::Task => self.tasks.get_entity(id).await.map(drop),
            EntityKind::Comment => self.comments.get_entity(id).await.map(drop),
            EntityKind::UserInfo => self.user_infos.get_entity(id).await.map(drop),
            EntityKind::Message => self.messages.get_entity(id).await.map(drop),
        }
    }

    pub async fn delete(&self, kind: EntityKind, id: EntityId) -> AppResult<()> {
        match kind {
            EntityKind::Project => self.projects.delete_entity(id).await,
            EntityKind::Task => self.tasks.delete_entity(id).await,
            EntityKind::Comment => self.comments.delete_entity(id).await,
            EntityKind::UserInfo => self.user_infos.delete_entity(id).await,
            EntityKind::Message => self.messages.delete_entity(id).await,
        }
    }

    pub fn reset(&self, kind: EntityKind) {
        match kind {
            EntityKind::Project => self.projects.reset(),
            EntityKind::Task => self.tasks.reset(),
            EntityKind::Comment => self.comments.reset(),
            EntityKind::UserInfo => self.user_infos.reset(),
            EntityKind::Message => self.messages.reset(),
        }
    }

    /// Runs a view effect. Navigation belongs to the caller and is ignored here.
    pub async fn execute(&self, effect: ViewEffect) -> AppResult<()> {
        match effect {
            ViewEffect::Reset(kind) => {
                self.reset(kind);
                Ok(())
            }
            ViewEffect::FetchList(kind, criteria) => self.fetch_list(kind, &criteria).await,
            ViewEffect::Fetch(kind, id) => self.fetch(kind, id).await,
            ViewEffect::FetchRelated(kind) => {
                for target in kind.relation_targets() {
                    self.fetch_list(target, &Criteria::all()).await?;
                }
                Ok(())
            }
            ViewEffect::Navigate(_) => Ok(()),
        }
    }
}
