use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use super::{
    CommentStatus, DomainError, DomainResult, Entity, EntityId, EntityKind, FieldSpec, FieldValue,
    Related, Task,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Comment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CommentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<Box<Task>>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("author", "Author"),
    FieldSpec::text("text", "Text"),
    FieldSpec::choice("status", "Status", CommentStatus::VARIANTS),
    FieldSpec::date_time("created", "Created"),
    FieldSpec::date_time("edited", "Edited"),
    FieldSpec::relation("task", "Task", EntityKind::Task),
];

impl Entity for Comment {
    const KIND: EntityKind = EntityKind::Comment;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get_field(&self, name: &str) -> DomainResult<FieldValue> {
        Ok(match name {
            "author" => FieldValue::Text(self.author.clone()),
            "text" => FieldValue::Text(self.text.clone()),
            "status" => FieldValue::Choice(self.status.map(|s| s.to_string())),
            "created" => FieldValue::DateTime(self.created),
            "edited" => FieldValue::DateTime(self.edited),
            "task" => FieldValue::Relation(self.task.as_ref().and_then(|t| t.id)),
            _ => return Err(DomainError::UnknownField(name.to_string())),
        })
    }

    fn set_field(&mut self, name: &str, value: FieldValue, related: &Related<'_>) -> DomainResult<()> {
        match name {
            "author" => self.author = value.into_text(name)?,
            "text" => self.text = value.into_text(name)?,
            "status" => self.status = value.into_choice(name)?,
            "created" => self.created = value.into_date_time(name)?,
            "edited" => self.edited = value.into_date_time(name)?,
            "task" => {
                self.task = value
                    .into_relation(name)?
                    .and_then(|id| related.task(id))
                    .cloned()
                    .map(Box::new);
            }
            _ => return Err(DomainError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    fn title(&self) -> String {
        match (&self.text, self.id) {
            (Some(text), _) => preview(text, 40),
            (None, Some(id)) => format!("Comment #{id}"),
            (None, None) => "New comment".to_string(),
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() > max_chars {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{cut}…")
    } else {
        first_line.to_string()
    }
}
