use serde::{Deserialize, Serialize};

/// Store-assigned row id. Zero means "not yet persisted".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.0.fmt(f) }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    #[serde(default)]
    pub id: TodoId,
    #[serde(default)]
    pub completed: bool,
    pub text: String,
}

impl Todo {
    pub fn new(text: impl Into<String>) -> Self {
        Self { id: TodoId::default(), completed: false, text: text.into() }
    }

    /// Merges a partial update into this todo.
    ///
    /// `completed` is taken whenever it is present. `text` is taken only when
    /// present and non-empty, so an update can never clear the text.
    pub fn apply(&mut self, update: UpdateTodo) {
        if let Some(completed) = update.completed { self.completed = completed; }
        if let Some(text) = update.text.filter(|t| !t.is_empty()) { self.text = text; }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct UpdateTodo {
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> Todo { Todo { id: TodoId(1), completed: false, text: "a".into() } }

    #[test]
    fn completed_only_keeps_text() {
        let mut todo = stored();
        todo.apply(UpdateTodo { completed: Some(true), text: Some(String::new()) });
        assert_eq!(todo, Todo { id: TodoId(1), completed: true, text: "a".into() });
    }

    #[test]
    fn text_only_keeps_completed() {
        let mut todo = stored();
        todo.apply(UpdateTodo { completed: None, text: Some("b".into()) });
        assert_eq!(todo, Todo { id: TodoId(1), completed: false, text: "b".into() });
    }

    #[test]
    fn explicit_false_overrides_true() {
        let mut todo = Todo { completed: true, ..stored() };
        todo.apply(UpdateTodo { completed: Some(false), text: None });
        assert!(!todo.completed);
    }

    #[test]
    fn empty_update_is_noop() {
        let mut todo = stored();
        todo.apply(UpdateTodo::default());
        assert_eq!(todo, stored());
    }

    #[test]
    fn update_body_fields_are_optional() {
        let update: UpdateTodo = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(update, UpdateTodo { completed: Some(true), text: None });
    }
}
