use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use super::{
    DomainError, DomainResult, Entity, EntityId, EntityKind, FieldSpec, FieldValue, ProjectStatus,
    Related, Task,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    /// Owned by the backend; never edited through the project form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("projectUrl", "Project Url"),
    FieldSpec::text("description", "Description"),
    FieldSpec::required_text("projectName", "Project Name"),
    FieldSpec::text("comment", "Comment"),
    FieldSpec::choice("status", "Status", ProjectStatus::VARIANTS),
    FieldSpec::date_time("created", "Created"),
    FieldSpec::date_time("edited", "Edited"),
];

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get_field(&self, name: &str) -> DomainResult<FieldValue> {
        Ok(match name {
            "projectUrl" => FieldValue::Text(self.project_url.clone()),
            "description" => FieldValue::Text(self.description.clone()),
            "projectName" => FieldValue::Text(self.project_name.clone()),
            "comment" => FieldValue::Text(self.comment.clone()),
            "status" => FieldValue::Choice(self.status.map(|s| s.to_string())),
            "created" => FieldValue::DateTime(self.created),
            "edited" => FieldValue::DateTime(self.edited),
            _ => return Err(DomainError::UnknownField(name.to_string())),
        })
    }

    fn set_field(&mut self, name: &str, value: FieldValue, _related: &Related<'_>) -> DomainResult<()> {
        match name {
            "projectUrl" => self.project_url = value.into_text(name)?,
            "description" => self.description = value.into_text(name)?,
            "projectName" => self.project_name = Some(value.into_required_text(name)?),
            "comment" => self.comment = value.into_text(name)?,
            "status" => self.status = value.into_choice(name)?,
            "created" => self.created = value.into_date_time(name)?,
            "edited" => self.edited = value.into_date_time(name)?,
            _ => return Err(DomainError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    fn title(&self) -> String {
        match (&self.project_name, self.id) {
            (Some(name), _) => name.clone(),
            (None, Some(id)) => format!("Project #{id}"),
            (None, None) => "New project".to_string(),
        }
    }

    fn badge(&self) -> Option<String> {
        match self.task_count() {
            0 => None,
            1 => Some("1 task".to_string()),
            n => Some(format!("{n} tasks")),
        }
    }
}

impl Project {
    pub fn task_count(&self) -> usize {
        self.tasks.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case_without_absent_fields() {
        let project = Project {
            project_name: Some("Apollo".to_string()),
            status: Some(ProjectStatus::Active),
            ..Default::default()
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "projectName": "Apollo", "status": "ACTIVE" })
        );
    }

    #[test]
    fn test_backend_payload_with_nulls_and_tasks() {
        let json = r#"{
            "id": 7,
            "projectUrl": null,
            "projectName": "Apollo",
            "status": "STOPED",
            "created": "2021-05-01T07:30:00Z",
            "tasks": [{ "id": 1, "name": "Design" }]
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.id, Some(EntityId(7)));
        assert_eq!(project.project_url, None);
        assert_eq!(project.status, Some(ProjectStatus::Stoped));
        assert_eq!(project.task_count(), 1);
        assert_eq!(project.title(), "Apollo");
    }

    #[test]
    fn test_required_name_cannot_be_cleared() {
        let mut project = Project::default();
        let err = project
            .set_field("projectName", FieldValue::Text(None), &Related::default())
            .unwrap_err();
        assert_eq!(err, DomainError::MissingField("projectName".to_string()));
    }
}
