use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::VariantNames;

use super::{
    DomainError, DomainResult, Entity, EntityId, EntityKind, FieldSpec, FieldValue, MessageStatus,
    Related,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    // Spelled as the backend spells it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recepient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<DateTime<Utc>>,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec::text("author", "Author"),
    FieldSpec::text("recepient", "Recepient"),
    FieldSpec::text("text", "Text"),
    FieldSpec::choice("status", "Status", MessageStatus::VARIANTS),
    FieldSpec::date_time("created", "Created"),
    FieldSpec::date_time("edited", "Edited"),
];

impl Entity for Message {
    const KIND: EntityKind = EntityKind::Message;

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn fields() -> &'static [FieldSpec] {
        FIELDS
    }

    fn get_field(&self, name: &str) -> DomainResult<FieldValue> {
        Ok(match name {
            "author" => FieldValue::Text(self.author.clone()),
            "recepient" => FieldValue::Text(self.recepient.clone()),
            "text" => FieldValue::Text(self.text.clone()),
            "status" => FieldValue::Choice(self.status.map(|s| s.to_string())),
            "created" => FieldValue::DateTime(self.created),
            "edited" => FieldValue::DateTime(self.edited),
            _ => return Err(DomainError::UnknownField(name.to_string())),
        })
    }

    fn set_field(&mut self, name: &str, value: FieldValue, _related: &Related<'_>) -> DomainResult<()> {
        match name {
            "author" => self.author = value.into_text(name)?,
            "recepient" => self.recepient = value.into_text(name)?,
            "text" => self.text = value.into_text(name)?,
            "status" => self.status = value.into_choice(name)?,
            "created" => self.created = value.into_date_time(name)?,
            "edited" => self.edited = value.into_date_time(name)?,
            _ => return Err(DomainError::UnknownField(name.to_string())),
        }
        Ok(())
    }

    fn title(&self) -> String {
        let from = self.author.as_deref().unwrap_or("?");
        let to = self.recepient.as_deref().unwrap_or("?");
        match self.id {
            Some(id) => format!("#{id} {from} → {to}"),
            None => format!("{from} → {to}"),
        }
    }

    fn badge(&self) -> Option<String> {
        self.is_unread().then(|| "unread".to_string())
    }
}

impl Message {
    pub fn is_unread(&self) -> bool {
        matches!(self.status, Some(MessageStatus::New))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recepient_keeps_backend_spelling() {
        let message = Message {
            recepient: Some("bob".to_string()),
            status: Some(MessageStatus::Readed),
            ..Default::default()
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json, serde_json::json!({ "recepient": "bob", "status": "READED" }));
        assert!(!message.is_unread());
    }

    #[test]
    fn test_title_names_both_parties() {
        let message = Message {
            id: Some(EntityId(3)),
            author: Some("alice".to_string()),
            recepient: Some("bob".to_string()),
            ..Default::default()
        };
        assert_eq!(message.title(), "#3 alice → bob");
    }
}
