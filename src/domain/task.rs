use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use super::{
    Comment, DomainError, DomainResult, Entity, EntityId, EntityKind, FieldSpec, FieldValue, Project,
    Related, TaskAndProjectStatus,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskAndProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Project>>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("author", "Author"),
    FieldSpec::text("implementer", "Implementer"),
    FieldSpec::required_text("name", "Name"),
    FieldSpec::text("text", "Text"),
    FieldSpec::text("comment", "Comment"),
    FieldSpec::choice("status", "Status", TaskAndProjectStatus::VARIANTS),
    FieldSpec::date_time("created", "Created"),
    FieldSpec::date_time("edited", "Edited"),
    FieldSpec::relation("project", "Project", EntityKind::Project),
];

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get_field(&self, name: &str) -> DomainResult<FieldValue> {
        Ok(match name {
            "author" => FieldValue::Text(self.author.clone()),
            "implementer" => FieldValue::Text(self.implementer.clone()),
            "name" => FieldValue::Text(self.name.clone()),
            "text" => FieldValue::Text(self.text.clone()),
            "comment" => FieldValue::Text(self.comment.clone()),
            "status" => FieldValue::Choice(self.status.map(|s| s.to_string())),
            "created" => FieldValue::DateTime(self.created),
            "edited" => FieldValue::DateTime(self.edited),
            "project" => FieldValue::Relation(self.project_id()),
            _ => return Err(DomainError::UnknownField(name.to_string())),
        })
    }

    fn set_field(&mut self, name: &str, value: FieldValue, related: &Related<'_>) -> DomainResult<()> {
        match name {
            "author" => self.author = value.into_text(name)?,
            "implementer" => self.implementer = value.into_text(name)?,
            "name" => self.name = Some(value.into_required_text(name)?),
            "text" => self.text = value.into_text(name)?,
            "comment" => self.comment = value.into_text(name)?,
            "status" => self.status = value.into_choice(name)?,
            "created" => self.created = value.into_date_time(name)?,
            "edited" => self.edited = value.into_date_time(name)?,
            "project" => {
                // An identifier missing from the fetched projects clears the relation.
                self.project = value
                    .into_relation(name)?
                    .and_then(|id| related.project(id))
                    .cloned()
                    .map(Box::new);
            }
            _ => return Err(DomainError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    fn title(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("Task #{id}"),
            (None, None) => "New task".to_string(),
        }
    }
}

impl Task {
    pub fn project_id(&self) -> Option<EntityId> {
        self.project.as_ref().and_then(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64, name: &str) -> Project {
        Project {
            id: Some(EntityId(id)),
            project_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_project_relation_is_resolved_from_fetched_collection() {
        let projects = vec![project(1, "Apollo"), project(2, "Gemini")];
        let related = Related {
            projects: &projects,
            ..Default::default()
        };

        let mut task = Task::default();
        task.set_field("project", FieldValue::Relation(Some(EntityId(2))), &related)
            .unwrap();
        assert_eq!(task.project.as_deref(), Some(&projects[1]));
        assert_eq!(task.project_id(), Some(EntityId(2)));

        task.set_field("project", FieldValue::Relation(Some(EntityId(9))), &related)
            .unwrap();
        assert_eq!(task.project, None);
    }

    #[test]
    fn test_nested_project_is_sent_as_object() {
        let task = Task {
            name: Some("Design".to_string()),
            project: Some(Box::new(project(1, "Apollo"))),
            ..Default::default()
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["project"]["id"], 1);
        assert_eq!(json["project"]["projectName"], "Apollo");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_status_field_uses_wire_names() {
        let task = Task {
            status: Some(TaskAndProjectStatus::Ended),
            ..Default::default()
        };
        assert_eq!(
            task.get_field("status").unwrap(),
            FieldValue::Choice(Some("ENDED".to_string()))
        );
        assert!(task.get_field("priority").is_err());
    }
}
