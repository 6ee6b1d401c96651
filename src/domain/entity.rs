use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::{Comment, DomainError, DomainResult, Message, Project, Task, UserInfo};

/// Backend-assigned numeric identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId(id)
    }
}

impl FromStr for EntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(EntityId)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

/// The five tracked entity kinds. The kebab-case name doubles as the route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum EntityKind {
    Project,
    Task,
    Comment,
    UserInfo,
    Message,
}

impl EntityKind {
    pub fn segment(&self) -> &'static str {
        self.into()
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            EntityKind::Project => Project::fields(),
            EntityKind::Task => Task::fields(),
            EntityKind::Comment => Comment::fields(),
            EntityKind::UserInfo => UserInfo::fields(),
            EntityKind::Message => Message::fields(),
        }
    }

    /// Kinds whose collections a form of this kind needs for its relation fields.
    pub fn relation_targets(&self) -> Vec<EntityKind> {
        self.fields()
            .iter()
            .filter_map(|f| match f.kind {
                FieldKind::Relation(target) => Some(target),
                _ => None,
            })
            .collect()
    }

    /// Collection path on the REST backend, relative to the base url.
    pub fn resource(&self) -> &'static str {
        match self {
            EntityKind::Project => "api/projects",
            EntityKind::Task => "api/tasks",
            EntityKind::Comment => "api/comments",
            EntityKind::UserInfo => "api/user-infos",
            EntityKind::Message => "api/messages",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Project => "Project",
            EntityKind::Task => "Task",
            EntityKind::Comment => "Comment",
            EntityKind::UserInfo => "User Info",
            EntityKind::Message => "Message",
        }
    }

    pub fn plural_label(&self) -> &'static str {
        match self {
            EntityKind::Project => "Projects",
            EntityKind::Task => "Tasks",
            EntityKind::Comment => "Comments",
            EntityKind::UserInfo => "User Infos",
            EntityKind::Message => "Messages",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number { min: Option<i64>, max: Option<i64> },
    Choice(&'static [&'static str]),
    DateTime,
    Date,
    Relation(EntityKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn text(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Text, required: false }
    }

    pub const fn required_text(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Text, required: true }
    }

    pub const fn choice(name: &'static str, label: &'static str, values: &'static [&'static str]) -> Self {
        Self { name, label, kind: FieldKind::Choice(values), required: false }
    }

    pub const fn number(name: &'static str, label: &'static str, min: Option<i64>, max: Option<i64>) -> Self {
        Self { name, label, kind: FieldKind::Number { min, max }, required: false }
    }

    pub const fn date_time(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::DateTime, required: false }
    }

    pub const fn date(name: &'static str, label: &'static str) -> Self {
        Self { name, label, kind: FieldKind::Date, required: false }
    }

    pub const fn relation(name: &'static str, label: &'static str, kind: EntityKind) -> Self {
        Self { name, label, kind: FieldKind::Relation(kind), required: false }
    }
}

/// Typed value of a single field, already in wire representation.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Number(Option<i64>),
    Choice(Option<String>),
    DateTime(Option<DateTime<Utc>>),
    Date(Option<NaiveDate>),
    Relation(Option<EntityId>),
}

impl FieldValue {
    pub fn into_text(self, field: &str) -> DomainResult<Option<String>> {
        match self {
            FieldValue::Text(v) => Ok(v),
            _ => Err(DomainError::WrongType(field.to_string())),
        }
    }

    pub fn into_required_text(self, field: &str) -> DomainResult<String> {
        self.into_text(field)?
            .ok_or_else(|| DomainError::MissingField(field.to_string()))
    }

    pub fn into_number(self, field: &str) -> DomainResult<Option<i64>> {
        match self {
            FieldValue::Number(v) => Ok(v),
            _ => Err(DomainError::WrongType(field.to_string())),
        }
    }

    pub fn into_choice<T: FromStr>(self, field: &str) -> DomainResult<Option<T>> {
        match self {
            FieldValue::Choice(None) => Ok(None),
            FieldValue::Choice(Some(raw)) => {
                raw.parse::<T>()
                    .map(Some)
                    .map_err(|_| DomainError::InvalidChoice {
                        field: field.to_string(),
                        value: raw,
                    })
            }
            _ => Err(DomainError::WrongType(field.to_string())),
        }
    }

    pub fn into_date_time(self, field: &str) -> DomainResult<Option<DateTime<Utc>>> {
        match self {
            FieldValue::DateTime(v) => Ok(v),
            _ => Err(DomainError::WrongType(field.to_string())),
        }
    }

    pub fn into_date(self, field: &str) -> DomainResult<Option<NaiveDate>> {
        match self {
            FieldValue::Date(v) => Ok(v),
            _ => Err(DomainError::WrongType(field.to_string())),
        }
    }

    pub fn into_relation(self, field: &str) -> DomainResult<Option<EntityId>> {
        match self {
            FieldValue::Relation(v) => Ok(v),
            _ => Err(DomainError::WrongType(field.to_string())),
        }
    }
}

/// Collections fetched ahead of a form submit, used to resolve relation fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct Related<'a> {
    pub projects: &'a [Project],
    pub tasks: &'a [Task],
}

impl<'a> Related<'a> {
    pub fn project(&self, id: EntityId) -> Option<&'a Project> {
        self.projects.iter().find(|p| p.id == Some(id))
    }

    pub fn task(&self, id: EntityId) -> Option<&'a Task> {
        self.tasks.iter().find(|t| t.id == Some(id))
    }
}

/// A flat record exchanged with the backend.
pub trait Entity:
    Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn id(&self) -> Option<EntityId>;

    /// Editable fields in form order. The identifier is never part of this list.
    fn fields() -> &'static [FieldSpec];

    fn get_field(&self, name: &str) -> DomainResult<FieldValue>;

    fn set_field(&mut self, name: &str, value: FieldValue, related: &Related<'_>) -> DomainResult<()>;

    /// Short human label for tables and dialogs.
    fn title(&self) -> String;

    /// Extra marker shown next to the title in lists.
    fn badge(&self) -> Option<String> {
        None
    }

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::fields().iter().find(|f| f.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_segments_round_trip_through_strum() {
        assert_eq!(EntityKind::UserInfo.segment(), "user-info");
        assert_eq!("user-info".parse::<EntityKind>().unwrap(), EntityKind::UserInfo);
        assert_eq!("task".parse::<EntityKind>().unwrap(), EntityKind::Task);
        assert!("tasks".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_relation_targets_follow_field_specs() {
        assert_eq!(EntityKind::Task.relation_targets(), vec![EntityKind::Project]);
        assert_eq!(EntityKind::Comment.relation_targets(), vec![EntityKind::Task]);
        assert!(EntityKind::Message.relation_targets().is_empty());
    }

    #[test]
    fn test_resources_match_backend_collections() {
        assert_eq!(EntityKind::Project.resource(), "api/projects");
        assert_eq!(EntityKind::UserInfo.resource(), "api/user-infos");
    }

    #[test]
    fn test_entity_id_parsing() {
        assert_eq!(" 42 ".parse::<EntityId>().unwrap(), EntityId(42));
        assert_eq!(
            "abc".parse::<EntityId>(),
            Err(DomainError::InvalidId("abc".to_string()))
        );
    }

    #[test]
    fn test_choice_value_rejects_unknown_variant() {
        use super::super::TaskAndProjectStatus;

        let ok = FieldValue::Choice(Some("ACTIVE".to_string()))
            .into_choice::<TaskAndProjectStatus>("status")
            .unwrap();
        assert_eq!(ok, Some(TaskAndProjectStatus::Active));

        let err = FieldValue::Choice(Some("PAUSED".to_string()))
            .into_choice::<TaskAndProjectStatus>("status")
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidChoice { .. }));
    }
}
