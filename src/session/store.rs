use crate::error::{ChatError, EditRejection, Result};
use crate::model::ModelRegistry;
use crate::session::ids::IdClock;
use crate::session::{title_from_content, Message, Session};
use std::collections::HashMap;
use tracing::{debug, info};

/// In-memory session arena. Sessions are indexed by id; `order` holds the
/// sidebar order, newest first.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    order: Vec<String>,
    current: Option<String>,
    clock: IdClock,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_clock(clock: IdClock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn list_sessions(&self) -> impl Iterator<Item = &Session> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_deref().and_then(|id| self.sessions.get(id))
    }

    pub fn create_session(&mut self) -> &Session {
        let tick = self.clock.tick();
        let session = Session::new(tick.id(), tick.at);
        self.insert_front(session)
    }

    pub fn create_session_with_models(
        &mut self,
        registry: &ModelRegistry,
        model_ids: &[String],
    ) -> Result<&Session> {
        if model_ids.is_empty() {
            return Err(ChatError::EmptyModelScope);
        }
        if let Some(unknown) = model_ids.iter().find(|id| !registry.contains(id)) {
            return Err(ChatError::ModelNotFound(unknown.clone()));
        }

        let scope: Vec<String> = registry
            .list_models()
            .iter()
            .filter(|model| model_ids.contains(&model.id))
            .map(|model| model.id.clone())
            .collect();

        let tick = self.clock.tick();
        let mut session = Session::new(tick.id(), tick.at);
        session.model_scope = Some(scope);
        Ok(self.insert_front(session))
    }

    /// Adds an already-populated session at the end of the list without
    /// touching the current pointer.
    pub fn insert_seeded(&mut self, session: Session) {
        self.order.retain(|id| id != &session.id);
        self.order.push(session.id.clone());
        self.sessions.insert(session.id.clone(), session);
    }

    pub fn select_session(&mut self, session_id: &str) -> Result<()> {
        if !self.sessions.contains_key(session_id) {
            return Err(ChatError::SessionNotFound(session_id.to_string()));
        }
        self.current = Some(session_id.to_string());
        debug!(session = session_id, "session selected");
        Ok(())
    }

    /// Drops a session's one-shot model scope so later dispatches follow the
    /// registry's active flags again.
    pub fn clear_model_scope(&mut self, session_id: &str) -> Result<()> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))?;
        if session.model_scope.take().is_some() {
            debug!(session = session_id, "model scope consumed");
        }
        Ok(())
    }

    pub fn append_messages(&mut self, session_id: &str, messages: Vec<Message>) -> Result<()> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))?;

        if messages.is_empty() {
            return Ok(());
        }

        if session.messages.is_empty() {
            if let Some(first_user) = messages.iter().find(|message| message.is_user()) {
                session.title = title_from_content(&first_user.content);
            }
        }

        debug!(
            session = session_id,
            appended = messages.len(),
            total = session.messages.len() + messages.len(),
            "messages appended"
        );
        session.messages.extend(messages);
        Ok(())
    }

    pub fn edit_message(
        &mut self,
        session_id: &str,
        message_id: &str,
        new_content: &str,
    ) -> Result<()> {
        let session = self
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| ChatError::SessionNotFound(session_id.to_string()))?;

        let message = session
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)
            .ok_or_else(|| ChatError::InvalidEdit {
                message_id: message_id.to_string(),
                reason: EditRejection::MessageMissing,
            })?;

        if !message.is_user() {
            return Err(ChatError::InvalidEdit {
                message_id: message_id.to_string(),
                reason: EditRejection::NotUserMessage,
            });
        }

        let trimmed = new_content.trim();
        if trimmed.is_empty() {
            return Err(ChatError::EmptyContent);
        }

        message.content = trimmed.to_string();
        debug!(session = session_id, message = message_id, "message edited");
        Ok(())
    }

    fn insert_front(&mut self, session: Session) -> &Session {
        let id = session.id.clone();
        info!(session = %id, scoped = session.model_scope.is_some(), "session created");
        self.order.insert(0, id.clone());
        self.current = Some(id.clone());
        self.sessions.insert(id.clone(), session);
        &self.sessions[&id]
    }
}

#[cfg(test)]
mod tests {
    use super::SessionStore;
    use crate::error::{ChatError, EditRejection};
    use crate::model::ModelRegistry;
    use crate::session::ids::IdClock;
    use crate::session::{Message, Session, DEFAULT_TITLE};
    use chrono::{DateTime, TimeZone, Utc};

    fn frozen() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("fixed timestamp should be valid")
    }

    fn store() -> SessionStore {
        SessionStore::with_clock(IdClock::with_source(frozen))
    }

    fn conversation(store: &mut SessionStore) -> String {
        let session_id = store.create_session().id.clone();
        store
            .append_messages(
                &session_id,
                vec![
                    Message::user("u1", "What is Rust?", frozen()),
                    Message::assistant("u1-0", "chatgpt", "A language.", frozen()),
                ],
            )
            .expect("append should succeed");
        session_id
    }

    #[test]
    fn create_session_inserts_at_front_and_becomes_current() {
        let mut store = store();
        let first = store.create_session().id.clone();
        let second = store.create_session().id.clone();

        assert_ne!(first, second);
        let order: Vec<&str> = store.list_sessions().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec![second.as_str(), first.as_str()]);
        assert_eq!(store.current_session_id(), Some(second.as_str()));

        let current = store.current_session().expect("current session should exist");
        assert_eq!(current.title, DEFAULT_TITLE);
        assert!(current.messages.is_empty());
        assert!(current.model_scope.is_none());
    }

    #[test]
    fn select_unknown_session_fails_without_state_change() {
        let mut store = store();
        let id = store.create_session().id.clone();

        let error = store
            .select_session("missing")
            .expect_err("unknown session should fail");
        assert_eq!(error, ChatError::SessionNotFound("missing".to_string()));
        assert_eq!(store.current_session_id(), Some(id.as_str()));
    }

    #[test]
    fn select_switches_current_session() {
        let mut store = store();
        let older = store.create_session().id.clone();
        store.create_session();

        store.select_session(&older).expect("select should succeed");
        assert_eq!(store.current_session_id(), Some(older.as_str()));
    }

    #[test]
    fn first_append_sets_title_and_later_appends_keep_it() {
        let mut store = store();
        let id = conversation(&mut store);
        assert_eq!(store.get(&id).map(|s| s.title.as_str()), Some("What is Rust?..."));

        store
            .append_messages(&id, vec![Message::user("u2", "Something else", frozen())])
            .expect("append should succeed");
        let session = store.get(&id).expect("session should exist");
        assert_eq!(session.title, "What is Rust?...");
        assert_eq!(session.messages.len(), 3);
        assert_eq!(session.messages[2].id, "u2");
    }

    #[test]
    fn append_to_unknown_session_is_not_found() {
        let mut store = store();
        let error = store
            .append_messages("nope", vec![Message::user("u", "x", frozen())])
            .expect_err("unknown session should fail");
        assert_eq!(error, ChatError::SessionNotFound("nope".to_string()));
    }

    #[test]
    fn edit_user_message_preserves_identity() {
        let mut store = store();
        let id = conversation(&mut store);

        store
            .edit_message(&id, "u1", "  What is Cargo?  ")
            .expect("user edit should succeed");
        let edited = store
            .get(&id)
            .and_then(|s| s.message("u1"))
            .expect("message should exist");
        assert_eq!(edited.content, "What is Cargo?");
        assert_eq!(edited.id, "u1");
        assert_eq!(edited.timestamp, frozen());
        assert_eq!(edited.model_id, "user");
    }

    #[test]
    fn edit_assistant_message_is_rejected_and_content_kept() {
        let mut store = store();
        let id = conversation(&mut store);

        let error = store
            .edit_message(&id, "u1-0", "rewritten")
            .expect_err("assistant edit should fail");
        assert_eq!(
            error,
            ChatError::InvalidEdit {
                message_id: "u1-0".to_string(),
                reason: EditRejection::NotUserMessage,
            }
        );
        let reply = store.get(&id).and_then(|s| s.message("u1-0")).expect("reply exists");
        assert_eq!(reply.content, "A language.");
    }

    #[test]
    fn edit_missing_message_or_blank_content_fails() {
        let mut store = store();
        let id = conversation(&mut store);

        let missing = store
            .edit_message(&id, "nope", "x")
            .expect_err("missing message should fail");
        assert!(matches!(
            missing,
            ChatError::InvalidEdit {
                reason: EditRejection::MessageMissing,
                ..
            }
        ));

        let blank = store
            .edit_message(&id, "u1", "   ")
            .expect_err("blank edit should fail");
        assert_eq!(blank, ChatError::EmptyContent);
    }

    #[test]
    fn scoped_session_records_registry_ordered_unique_scope() {
        let registry = ModelRegistry::default();
        let mut store = store();

        let session = store
            .create_session_with_models(
                &registry,
                &["deepseek".to_string(), "chatgpt".to_string(), "deepseek".to_string()],
            )
            .expect("scoped session should be created");
        assert_eq!(
            session.model_scope,
            Some(vec!["chatgpt".to_string(), "deepseek".to_string()])
        );
        assert!(store.current_session().is_some());
    }

    #[test]
    fn scoped_session_validation_leaves_store_untouched() {
        let registry = ModelRegistry::default();
        let mut store = store();

        let empty = store
            .create_session_with_models(&registry, &[])
            .expect_err("empty scope should fail");
        assert_eq!(empty, ChatError::EmptyModelScope);

        let unknown = store
            .create_session_with_models(&registry, &["claude".to_string(), "grok".to_string()])
            .expect_err("unknown id should fail");
        assert_eq!(unknown, ChatError::ModelNotFound("grok".to_string()));

        assert!(store.is_empty());
        assert!(store.current_session().is_none());
    }

    #[test]
    fn clearing_scope_restores_plain_session() {
        let registry = ModelRegistry::default();
        let mut store = store();
        let id = store
            .create_session_with_models(&registry, &["claude".to_string()])
            .expect("scoped session should be created")
            .id
            .clone();

        store.clear_model_scope(&id).expect("session exists");
        assert!(store.get(&id).and_then(|s| s.model_scope.as_ref()).is_none());
        assert_eq!(
            store.clear_model_scope("missing"),
            Err(ChatError::SessionNotFound("missing".to_string()))
        );
    }

    #[test]
    fn seeded_sessions_append_in_order_without_selecting() {
        let mut store = store();
        store.insert_seeded(Session::new("example-1", frozen()));
        store.insert_seeded(Session::new("example-2", frozen()));

        let order: Vec<&str> = store.list_sessions().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["example-1", "example-2"]);
        assert!(store.current_session_id().is_none());
    }
}
