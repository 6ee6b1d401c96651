use async_trait::async_trait;
use chrono::Utc;
use std::marker::PhantomData;

use super::{ApiClient, ApiResponse};
use crate::domain::{Criteria, Entity, EntityId};
use crate::ports::{EntityRepository, RepositoryError, RepositoryResult};

/// Page size used when walking every page of a collection.
const FULL_LIST_PAGE_SIZE: u32 = 100;

/// `EntityRepository` over the backend's standard collection/resource endpoints.
pub struct RestRepository<E: Entity> {
    client: ApiClient,
    page_size: Option<u32>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> RestRepository<E> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            page_size: None,
            _entity: PhantomData,
        }
    }

    /// Page size applied to list calls whose criteria do not set one.
    pub fn with_page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    fn collection_path(&self) -> &'static str {
        E::KIND.resource()
    }

    fn item_path(&self, id: EntityId) -> String {
        format!("{}/{}", E::KIND.resource(), id)
    }

    fn require_id(&self, entity: &E) -> RepositoryResult<EntityId> {
        entity
            .id()
            .ok_or_else(|| RepositoryError::MissingId(entity.title()))
    }

    pub fn build_list_params(&self, criteria: &Criteria, cache_buster: i64) -> Vec<(String, String)> {
        let mut criteria = criteria.clone();
        if criteria.size.is_none() {
            criteria.size = self.page_size;
        }

        let mut params = criteria.to_query_params();
        params.push(("cacheBuster".to_string(), cache_buster.to_string()));
        params
    }

    async fn fetch_page(&self, criteria: &Criteria) -> RepositoryResult<ApiResponse<Vec<E>>> {
        let params = self.build_list_params(criteria, Utc::now().timestamp_millis());
        let path = format!("{}{}", self.collection_path(), self.build_query_string(&params));
        self.client.get::<Vec<E>>(&path).await
    }

    async fn fetch_all_pages(&self, criteria: &Criteria) -> RepositoryResult<Vec<E>> {
        let size = criteria.size.unwrap_or(FULL_LIST_PAGE_SIZE);
        let mut entities = Vec::new();
        let mut page = 0;

        loop {
            let page_criteria = Criteria {
                page: Some(page),
                size: Some(size),
                all_pages: false,
                ..criteria.clone()
            };
            let response = self.fetch_page(&page_criteria).await?;
            let fetched = response.data.len();
            entities.extend(response.data);

            if !has_more_pages(entities.len(), fetched, size, response.total_count) {
                break;
            }
            page += 1;
        }

        tracing::debug!("{} full list: {} entities in {} pages", E::KIND, entities.len(), page + 1);
        Ok(entities)
    }

    fn build_query_string(&self, params: &[(String, String)]) -> String {
        if params.is_empty() {
            return String::new();
        }

        format!(
            "?{}",
            params
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&")
        )
    }
}

/// Whether another page is worth requesting. Without a total count, a short
/// page is the last one.
fn has_more_pages(collected: usize, fetched: usize, size: u32, total: Option<u64>) -> bool {
    if fetched == 0 {
        return false;
    }
    match total {
        Some(total) => (collected as u64) < total,
        None => fetched >= size as usize,
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for RestRepository<E> {
    async fn list(&self, criteria: &Criteria) -> RepositoryResult<Vec<E>> {
        if criteria.all_pages {
            return self.fetch_all_pages(criteria).await;
        }

        let response = self.fetch_page(criteria).await?;
        if let Some(total) = response.total_count {
            tracing::debug!("{} list: {} of {} entities", E::KIND, response.data.len(), total);
        }
        Ok(response.data)
    }

    async fn get(&self, id: EntityId) -> RepositoryResult<E> {
        Ok(self.client.get(&self.item_path(id)).await?.data)
    }

    async fn create(&self, entity: &E) -> RepositoryResult<E> {
        Ok(self.client.post(self.collection_path(), entity).await?.data)
    }

    async fn update(&self, entity: &E) -> RepositoryResult<E> {
        let id = self.require_id(entity)?;
        Ok(self.client.put(&self.item_path(id), entity).await?.data)
    }

    async fn partial_update(&self, entity: &E) -> RepositoryResult<E> {
        let id = self.require_id(entity)?;
        Ok(self.client.patch(&self.item_path(id), entity).await?.data)
    }

    async fn delete(&self, id: EntityId) -> RepositoryResult<()> {
        self.client.delete(&self.item_path(id)).await?;
        Ok(())
    }
}
