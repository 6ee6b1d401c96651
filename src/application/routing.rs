use std::fmt;
use std::str::FromStr;

use crate::domain::{Criteria, DomainError, EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    New,
    Detail(EntityId),
    Edit(EntityId),
    Delete(EntityId),
}

impl View {
    pub fn id(&self) -> Option<EntityId> {
        match self {
            View::Detail(id) | View::Edit(id) | View::Delete(id) => Some(*id),
            View::List | View::New => None,
        }
    }

    /// Views that end with a create/update/delete and then go back to the list.
    pub fn completes(&self) -> bool {
        matches!(self, View::New | View::Edit(_) | View::Delete(_))
    }
}

/// `/<entity>[/new | /{id}[/edit | /delete]][?query]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub kind: EntityKind,
    pub view: View,
    pub query: Option<String>,
}

/// Side effects a screen asks for when it becomes active or completes.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEffect {
    Reset(EntityKind),
    FetchList(EntityKind, Criteria),
    Fetch(EntityKind, EntityId),
    /// Fetch the collections the kind's relation fields choose from.
    FetchRelated(EntityKind),
    Navigate(Route),
}

impl Route {
    pub fn new(kind: EntityKind, view: View) -> Self {
        Self { kind, view, query: None }
    }

    pub fn list(kind: EntityKind) -> Self {
        Self::new(kind, View::List)
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    /// Same entity, different view, query string carried over.
    pub fn to(&self, view: View) -> Self {
        Self {
            kind: self.kind,
            view,
            query: self.query.clone(),
        }
    }

    pub fn criteria(&self) -> Criteria {
        self.query.as_deref().map(Criteria::from_query).unwrap_or_default()
    }

    pub fn activation_effects(&self) -> Vec<ViewEffect> {
        let kind = self.kind;
        match self.view {
            View::List => vec![ViewEffect::FetchList(kind, self.criteria())],
            View::Detail(id) | View::Delete(id) => vec![ViewEffect::Fetch(kind, id)],
            View::New => vec![ViewEffect::Reset(kind), ViewEffect::FetchRelated(kind)],
            View::Edit(id) => vec![ViewEffect::Fetch(kind, id), ViewEffect::FetchRelated(kind)],
        }
    }

    /// Effect to run once the completion flag rises on this route.
    pub fn completion_effect(&self) -> Option<ViewEffect> {
        self.view
            .completes()
            .then(|| ViewEffect::Navigate(self.to(View::List)))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.kind.segment())?;
        match self.view {
            View::List => {}
            View::New => write!(f, "/new")?,
            View::Detail(id) => write!(f, "/{id}")?,
            View::Edit(id) => write!(f, "/{id}/edit")?,
            View::Delete(id) => write!(f, "/{id}/delete")?,
        }
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

impl FromStr for Route {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidRoute(s.to_string());

        let (path, query) = match s.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (s, None),
        };
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        let kind = segments
            .first()
            .and_then(|segment| segment.parse::<EntityKind>().ok())
            .ok_or_else(invalid)?;

        let view = match segments[1..] {
            [] => View::List,
            ["new"] => View::New,
            [id] => View::Detail(id.parse().map_err(|_| invalid())?),
            [id, "edit"] => View::Edit(id.parse().map_err(|_| invalid())?),
            [id, "delete"] => View::Delete(id.parse().map_err(|_| invalid())?),
            _ => return Err(invalid()),
        };

        Ok(Route::new(kind, view).with_query(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Filter, FilterOp};

    #[test]
    fn test_parse_every_route_shape() {
        let cases = [
            ("/project", EntityKind::Project, View::List),
            ("/task/new", EntityKind::Task, View::New),
            ("/comment/3", EntityKind::Comment, View::Detail(EntityId(3))),
            ("/user-info/4/edit", EntityKind::UserInfo, View::Edit(EntityId(4))),
            ("/message/5/delete", EntityKind::Message, View::Delete(EntityId(5))),
        ];

        for (path, kind, view) in cases {
            let route: Route = path.parse().unwrap();
            assert_eq!(route, Route::new(kind, view));
            assert_eq!(route.to_string(), path);
        }
    }

    #[test]
    fn test_invalid_routes_are_rejected() {
        for path in ["/", "/projects", "/task/abc", "/task/1/archive", "/task/new/edit"] {
            assert!(path.parse::<Route>().is_err(), "{path} should not parse");
        }
    }

    #[test]
    fn test_activation_effects_per_view() {
        let route: Route = "/task?status.equals=NEW".parse().unwrap();
        assert_eq!(
            route.activation_effects(),
            vec![ViewEffect::FetchList(
                EntityKind::Task,
                Criteria::default().with_filter(Filter::new("status", FilterOp::Equals, "NEW"))
            )]
        );

        let route = Route::new(EntityKind::Task, View::New);
        assert_eq!(
            route.activation_effects(),
            vec![
                ViewEffect::Reset(EntityKind::Task),
                ViewEffect::FetchRelated(EntityKind::Task)
            ]
        );

        let route = Route::new(EntityKind::Comment, View::Edit(EntityId(2)));
        assert_eq!(
            route.activation_effects(),
            vec![
                ViewEffect::Fetch(EntityKind::Comment, EntityId(2)),
                ViewEffect::FetchRelated(EntityKind::Comment)
            ]
        );

        let route = Route::new(EntityKind::Message, View::Delete(EntityId(8)));
        assert_eq!(
            route.activation_effects(),
            vec![ViewEffect::Fetch(EntityKind::Message, EntityId(8))]
        );
    }

    #[test]
    fn test_completion_navigates_back_keeping_query() {
        let route: Route = "/project/7/edit?page=2&sort=projectName,asc".parse().unwrap();
        let expected: Route = "/project?page=2&sort=projectName,asc".parse().unwrap();

        assert_eq!(route.completion_effect(), Some(ViewEffect::Navigate(expected)));
        assert_eq!(Route::list(EntityKind::Project).completion_effect(), None);
        assert_eq!(
            Route::new(EntityKind::Project, View::Detail(EntityId(1))).completion_effect(),
            None
        );
    }
}
