use crate::config::DispatchConfig;
use crate::error::{ChatError, Result};
use crate::model::{Model, ModelRegistry};
use crate::session::ids::IdClock;
use crate::session::store::SessionStore;
use crate::session::{Message, Session};
use tracing::{debug, info, warn};

pub const DEFAULT_REPLY_TEMPLATE: &str = "This is a simulated response from {model}. In a real implementation, this would be the actual AI response to: \"{content}\"";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Input was blank after trimming.
    Skipped,
    /// No session was open. One was created and the message was not sent.
    SessionCreated { session_id: String },
    Sent {
        session_id: String,
        user_message_id: String,
        replies: usize,
    },
}

/// Fans a user message out to every target model of the current session,
/// synthesizing a placeholder reply for each.
#[derive(Debug)]
pub struct Dispatcher {
    reply_template: String,
    resend_after_autocreate: bool,
    clock: IdClock,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(&DispatchConfig::default())
    }
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig) -> Self {
        Self::with_clock(config, IdClock::default())
    }

    pub fn with_clock(config: &DispatchConfig, clock: IdClock) -> Self {
        Self {
            reply_template: config.reply_template.clone(),
            resend_after_autocreate: config.resend_after_autocreate,
            clock,
        }
    }

    /// Models that receive the next dispatch into `session`: the active models,
    /// narrowed to its one-shot scope when present. Registry order.
    pub fn target_models<'r>(registry: &'r ModelRegistry, session: &Session) -> Vec<&'r Model> {
        let active = registry.active_models();
        match &session.model_scope {
            Some(scope) => active
                .into_iter()
                .filter(|model| scope.contains(&model.id))
                .collect(),
            None => active,
        }
    }

    pub fn send_message(
        &mut self,
        registry: &ModelRegistry,
        store: &mut SessionStore,
        content: &str,
    ) -> Result<DispatchOutcome> {
        let content = content.trim();
        if content.is_empty() {
            debug!("blank message ignored");
            return Ok(DispatchOutcome::Skipped);
        }

        let session_id = match store.current_session_id() {
            Some(id) => id.to_string(),
            None => {
                let session_id = store.create_session().id.clone();
                if !self.resend_after_autocreate {
                    warn!(
                        session = %session_id,
                        "no open session; created one and dropped the message"
                    );
                    return Ok(DispatchOutcome::SessionCreated { session_id });
                }
                info!(session = %session_id, "no open session; sending to a new one");
                session_id
            }
        };

        let session = store
            .get(&session_id)
            .ok_or_else(|| ChatError::SessionNotFound(session_id.clone()))?;
        let targets = Self::target_models(registry, session);
        let scoped = session.model_scope.is_some();

        let tick = self.clock.tick();
        let user_message_id = tick.id();
        let mut batch = Vec::with_capacity(targets.len() + 1);
        batch.push(Message::user(user_message_id.clone(), content, tick.at));
        for (index, model) in targets.iter().enumerate() {
            batch.push(Message::assistant(
                tick.indexed_id(index),
                &model.id,
                self.placeholder_reply(&model.name, content),
                tick.at,
            ));
        }

        let replies = targets.len();
        store.append_messages(&session_id, batch)?;
        if scoped {
            store.clear_model_scope(&session_id)?;
        }
        debug!(session = %session_id, replies, "message dispatched");

        Ok(DispatchOutcome::Sent {
            session_id,
            user_message_id,
            replies,
        })
    }

    fn placeholder_reply(&self, model_name: &str, content: &str) -> String {
        self.reply_template
            .replace("{model}", model_name)
            .replace("{content}", content)
    }
}
