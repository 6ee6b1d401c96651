use crate::domain::datetime::{self, default_local, format_date, to_local};
use crate::domain::{DomainError, DomainResult, Entity, EntityId, EntityKind, FieldKind, FieldSpec, FieldValue, Related};

/// What a successful submit dispatches.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<E> {
    Create(E),
    Update(E),
}

/// Editable, local-text representation of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityForm {
    pub kind: EntityKind,
    pub is_new: bool,
    fields: &'static [FieldSpec],
    values: Vec<String>,
}

impl EntityForm {
    /// Blank form. Date-times start at the beginning of the local day and
    /// choices at the first value of their set.
    pub fn for_new<E: Entity>() -> Self {
        let values = E::fields()
            .iter()
            .map(|spec| match spec.kind {
                FieldKind::DateTime => default_local(),
                FieldKind::Choice(values) => values.first().map(|v| v.to_string()).unwrap_or_default(),
                _ => String::new(),
            })
            .collect();

        Self {
            kind: E::KIND,
            is_new: true,
            fields: E::fields(),
            values,
        }
    }

    /// Form over a loaded entity. A choice the entity leaves unset shows the
    /// first value of its set, as a new form does.
    pub fn for_edit<E: Entity>(entity: &E) -> Self {
        let values = E::fields()
            .iter()
            .map(|spec| {
                let value = entity.get_field(spec.name).map(display_value).unwrap_or_default();
                match spec.kind {
                    FieldKind::Choice(values) if value.is_empty() => {
                        values.first().map(|v| v.to_string()).unwrap_or_default()
                    }
                    _ => value,
                }
            })
            .collect();

        Self {
            kind: E::KIND,
            is_new: false,
            fields: E::fields(),
            values,
        }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.index_of(name).map(|i| self.values[i].as_str())
    }

    pub fn value_at(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> DomainResult<()> {
        let index = self
            .index_of(name)
            .ok_or_else(|| DomainError::UnknownField(name.to_string()))?;
        self.values[index] = value.into();
        Ok(())
    }

    pub fn set_at(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value.into();
        }
    }

    /// Steps a choice or relation field to the next (or previous) option.
    /// Relation options are the identifiers of the fetched related collection.
    pub fn cycle(&mut self, index: usize, related: &Related<'_>, forward: bool) {
        let Some(spec) = self.fields.get(index) else {
            return;
        };

        let mut options: Vec<String> = match spec.kind {
            FieldKind::Choice(values) => values.iter().map(|v| v.to_string()).collect(),
            FieldKind::Relation(EntityKind::Project) => related
                .projects
                .iter()
                .filter_map(|p| p.id.map(|id| id.to_string()))
                .collect(),
            FieldKind::Relation(EntityKind::Task) => related
                .tasks
                .iter()
                .filter_map(|t| t.id.map(|id| id.to_string()))
                .collect(),
            _ => return,
        };
        if !spec.required {
            options.insert(0, String::new());
        }
        if options.is_empty() {
            return;
        }

        let current = options.iter().position(|o| *o == self.values[index]);
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % options.len(),
            (Some(0), false) => options.len() - 1,
            (Some(i), false) => i - 1,
        };
        self.values[index] = options.swap_remove(next);
    }

    /// Every field error, in form order. Empty means the form can be submitted.
    pub fn validate(&self) -> Vec<DomainError> {
        self.fields
            .iter()
            .zip(&self.values)
            .filter_map(|(spec, raw)| parse_field(spec, raw).err())
            .collect()
    }

    /// Builds the entity to dispatch: a blank entity for new forms, the loaded
    /// one otherwise, with every form field written over it. On edit, a
    /// relation still pointing at the loaded record is left as loaded, even
    /// when that record is not among the fetched related entities.
    pub fn submit<E: Entity>(&self, loaded: &E, related: &Related<'_>) -> Result<Submission<E>, Vec<DomainError>> {
        let mut errors = Vec::new();
        let mut entity = if self.is_new { E::default() } else { loaded.clone() };

        for (spec, raw) in self.fields.iter().zip(&self.values) {
            let result = parse_field(spec, raw).and_then(|value| {
                let untouched_relation = !self.is_new
                    && matches!(spec.kind, FieldKind::Relation(_))
                    && loaded.get_field(spec.name).ok().as_ref() == Some(&value);
                if untouched_relation {
                    return Ok(());
                }
                entity.set_field(spec.name, value, related)
            });
            if let Err(e) = result {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        if self.is_new {
            Ok(Submission::Create(entity))
        } else {
            Ok(Submission::Update(entity))
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

fn display_value(value: FieldValue) -> String {
    match value {
        FieldValue::Text(v) | FieldValue::Choice(v) => v.unwrap_or_default(),
        FieldValue::Number(v) => v.map(|n| n.to_string()).unwrap_or_default(),
        FieldValue::DateTime(v) => v.as_ref().map(to_local).unwrap_or_default(),
        FieldValue::Date(v) => v.as_ref().map(format_date).unwrap_or_default(),
        FieldValue::Relation(v) => v.map(|id| id.to_string()).unwrap_or_default(),
    }
}

/// Local text of one field to its wire value.
pub fn parse_field(spec: &FieldSpec, raw: &str) -> DomainResult<FieldValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() && spec.required {
        return Err(DomainError::MissingField(spec.name.to_string()));
    }

    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Text((!trimmed.is_empty()).then(|| raw.to_string()))),
        FieldKind::Number { min, max } => {
            if trimmed.is_empty() {
                return Ok(FieldValue::Number(None));
            }
            let n = trimmed.parse::<i64>().map_err(|_| DomainError::NotANumber {
                field: spec.name.to_string(),
                value: trimmed.to_string(),
            })?;
            if let Some(min) = min.filter(|min| n < *min) {
                return Err(DomainError::BelowMinimum { field: spec.name.to_string(), min });
            }
            if let Some(max) = max.filter(|max| n > *max) {
                return Err(DomainError::AboveMaximum { field: spec.name.to_string(), max });
            }
            Ok(FieldValue::Number(Some(n)))
        }
        FieldKind::Choice(values) => {
            if trimmed.is_empty() {
                return Ok(FieldValue::Choice(None));
            }
            if !values.contains(&trimmed) {
                return Err(DomainError::InvalidChoice {
                    field: spec.name.to_string(),
                    value: trimmed.to_string(),
                });
            }
            Ok(FieldValue::Choice(Some(trimmed.to_string())))
        }
        FieldKind::DateTime => datetime::to_wire(trimmed).map(FieldValue::DateTime),
        FieldKind::Date => datetime::parse_date(trimmed).map(FieldValue::Date),
        FieldKind::Relation(_) => {
            if trimmed.is_empty() {
                return Ok(FieldValue::Relation(None));
            }
            trimmed.parse::<EntityId>().map(|id| FieldValue::Relation(Some(id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Project, Task, TaskAndProjectStatus, UserInfo};
    use chrono::{TimeZone, Utc};

    fn project(id: i64) -> Project {
        Project {
            id: Some(EntityId(id)),
            project_name: Some(format!("P{id}")),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_form_prefills_defaults() {
        let form = EntityForm::for_new::<Task>();
        assert!(form.is_new);
        assert_eq!(form.value("status"), Some("NEW"));
        assert_eq!(form.value("created"), Some(default_local().as_str()));
        assert_eq!(form.value("name"), Some(""));
    }

    #[test]
    fn test_create_submission_has_no_identifier() {
        let projects = vec![project(1)];
        let related = Related { projects: &projects, ..Default::default() };

        let mut form = EntityForm::for_new::<Task>();
        form.set("name", "Write docs").unwrap();
        form.set("project", "1").unwrap();

        // Even a stale loaded entity must not leak its id into a create
        let loaded = Task { id: Some(EntityId(99)), ..Default::default() };
        let Ok(Submission::Create(task)) = form.submit(&loaded, &related) else {
            panic!("expected a create submission");
        };

        assert_eq!(task.id, None);
        assert_eq!(task.name.as_deref(), Some("Write docs"));
        assert_eq!(task.status, Some(TaskAndProjectStatus::New));
        assert_eq!(task.project_id(), Some(EntityId(1)));
        assert!(serde_json::to_value(&task).unwrap().get("id").is_none());
    }

    #[test]
    fn test_edit_submission_merges_changes_into_loaded_entity() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let loaded = Task {
            id: Some(EntityId(5)),
            name: Some("Old".to_string()),
            author: Some("ann".to_string()),
            created: Some(created),
            comments: Some(vec![]),
            ..Default::default()
        };

        let mut form = EntityForm::for_edit(&loaded);
        assert_eq!(form.value("created"), Some(to_local(&created).as_str()));
        form.set("name", "New").unwrap();

        let Ok(Submission::Update(task)) = form.submit(&loaded, &Related::default()) else {
            panic!("expected an update submission");
        };

        assert_eq!(task.id, Some(EntityId(5)));
        assert_eq!(task.name.as_deref(), Some("New"));
        assert_eq!(task.author.as_deref(), Some("ann"));
        assert_eq!(task.created, Some(created));
        assert_eq!(task.comments, Some(vec![]));
    }

    #[test]
    fn test_validation_reports_each_bad_field() {
        let mut form = EntityForm::for_new::<UserInfo>();
        form.set("name", "Ada").unwrap();
        form.set("hours", "170").unwrap();
        form.set("birthday", "yesterday").unwrap();
        form.set("status", "ASLEEP").unwrap();

        let errors = form.validate();
        assert_eq!(
            errors,
            vec![
                DomainError::MissingField("email".to_string()),
                DomainError::AboveMaximum { field: "hours".to_string(), max: 169 },
                DomainError::InvalidChoice { field: "status".to_string(), value: "ASLEEP".to_string() },
                DomainError::InvalidDate("yesterday".to_string()),
            ]
        );
        assert!(form.submit(&UserInfo::default(), &Related::default()).is_err());

        form.set("hours", "-1").unwrap();
        assert!(form
            .validate()
            .contains(&DomainError::BelowMinimum { field: "hours".to_string(), min: 0 }));
        form.set("hours", "lots").unwrap();
        assert!(matches!(form.validate()[1], DomainError::NotANumber { .. }));
    }

    #[test]
    fn test_unknown_relation_id_clears_relation() {
        let loaded = Task {
            id: Some(EntityId(1)),
            name: Some("T".to_string()),
            project: Some(Box::new(project(3))),
            ..Default::default()
        };
        let mut form = EntityForm::for_edit(&loaded);
        assert_eq!(form.value("project"), Some("3"));

        form.set("project", "42").unwrap();
        let Ok(Submission::Update(task)) = form.submit(&loaded, &Related::default()) else {
            panic!("expected an update submission");
        };
        assert_eq!(task.project, None);
    }

    #[test]
    fn test_untouched_relation_survives_missing_related_entry() {
        let loaded = Task {
            id: Some(EntityId(1)),
            name: Some("T".to_string()),
            project: Some(Box::new(project(25))),
            ..Default::default()
        };
        // Only the first page of projects was fetched
        let projects = vec![project(1), project(2)];
        let related = Related { projects: &projects, ..Default::default() };

        let mut form = EntityForm::for_edit(&loaded);
        form.set("name", "Renamed").unwrap();
        let Ok(Submission::Update(task)) = form.submit(&loaded, &related) else {
            panic!("expected an update submission");
        };

        assert_eq!(task.name.as_deref(), Some("Renamed"));
        assert_eq!(task.project, Some(Box::new(project(25))));

        // Choosing another project still resolves against the fetched ones
        form.set("project", "2").unwrap();
        let Ok(Submission::Update(task)) = form.submit(&loaded, &related) else {
            panic!("expected an update submission");
        };
        assert_eq!(task.project_id(), Some(EntityId(2)));
    }

    #[test]
    fn test_edit_form_fills_unset_choice_with_first_value() {
        let loaded = Task {
            id: Some(EntityId(8)),
            name: Some("No status".to_string()),
            status: None,
            ..Default::default()
        };
        let form = EntityForm::for_edit(&loaded);
        assert_eq!(form.value("status"), Some("NEW"));

        let closed = Task {
            status: Some(TaskAndProjectStatus::Closed),
            ..loaded
        };
        assert_eq!(EntityForm::for_edit(&closed).value("status"), Some("CLOSED"));
    }

    #[test]
    fn test_cycle_walks_choices_and_relations() {
        let mut form = EntityForm::for_new::<Task>();
        let status = form.fields().iter().position(|f| f.name == "status").unwrap();
        form.cycle(status, &Related::default(), true);
        // Optional choice: blank option first, then the variants in order
        assert_eq!(form.value("status"), Some("CLOSED"));
        form.cycle(status, &Related::default(), false);
        form.cycle(status, &Related::default(), false);
        assert_eq!(form.value("status"), Some(""));

        let projects = vec![project(4), project(6)];
        let related = Related { projects: &projects, ..Default::default() };
        let relation = form.fields().iter().position(|f| f.name == "project").unwrap();
        form.cycle(relation, &related, true);
        assert_eq!(form.value("project"), Some("4"));
        form.cycle(relation, &related, true);
        form.cycle(relation, &related, true);
        assert_eq!(form.value("project"), Some(""));
    }
}
