//! In-memory builder sessions, keyed by id and scoped to the signed-in user.
//!
//! Sessions are working memory only; they vanish on restart, on exit from the
//! first step, after a successful generation, and once left idle past the TTL.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use crate::builder::actions::{self, Outcome, WizardAction};
use crate::builder::record::CollectorRecord;
use crate::builder::wizard::Wizard;
use crate::builder::BuilderError;

#[derive(Debug, Clone)]
struct Session {
    owner: String,
    wizard: Wizard,
    last_touched: Instant,
}

impl Session {
    fn is_live(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_touched) < ttl
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Sessions untouched for `ttl` are treated as abandoned and dropped.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::default(),
            ttl,
        }
    }

    /// Opens a new session. Idle sessions are swept first so abandoned
    /// wizards cannot pile up.
    pub async fn start(&self, owner: &str) -> (Uuid, Wizard) {
        let id = Uuid::new_v4();
        let wizard = Wizard::new();
        let now = Instant::now();

        let mut sessions = self.inner.write().await;
        self.sweep(&mut sessions, now);
        sessions.insert(
            id,
            Session {
                owner: owner.to_string(),
                wizard: wizard.clone(),
                last_touched: now,
            },
        );
        tracing::debug!(session_id = %id, "Started builder session");
        (id, wizard)
    }

    /// Drops every session idle longer than the TTL. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.inner.write().await;
        self.sweep(&mut sessions, Instant::now())
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, s| s.is_live(now, self.ttl));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, "Evicted idle builder sessions");
        }
        evicted
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The caller's live session, with its idle clock reset.
    fn touch<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, Session>,
        owner: &str,
        id: Uuid,
    ) -> Result<&'a mut Session, BuilderError> {
        let now = Instant::now();
        let session = sessions
            .get_mut(&id)
            .filter(|s| s.owner == owner && s.is_live(now, self.ttl))
            .ok_or(BuilderError::UnknownSession(id))?;
        session.last_touched = now;
        Ok(session)
    }

    pub async fn snapshot(&self, owner: &str, id: Uuid) -> Result<Wizard, BuilderError> {
        let mut sessions = self.inner.write().await;
        self.touch(&mut sessions, owner, id).map(|s| s.wizard.clone())
    }

    /// Applies one action; an `Exited` outcome drops the session. Failed
    /// actions leave the stored wizard untouched.
    pub async fn apply(
        &self,
        owner: &str,
        id: Uuid,
        action: WizardAction,
    ) -> Result<(Outcome, Wizard), BuilderError> {
        let mut sessions = self.inner.write().await;
        let session = self.touch(&mut sessions, owner, id)?;

        let mut wizard = session.wizard.clone();
        let outcome = actions::apply(&mut wizard, action)?;
        match outcome {
            Outcome::Updated(_) => session.wizard = wizard.clone(),
            Outcome::Exited => {
                sessions.remove(&id);
                tracing::debug!(session_id = %id, "Builder session exited");
            }
        }
        Ok((outcome, wizard))
    }

    /// The record of a session that has reached review.
    pub async fn review_record(&self, owner: &str, id: Uuid) -> Result<CollectorRecord, BuilderError> {
        let wizard = self.snapshot(owner, id).await?;
        if !wizard.step().is_review() {
            return Err(BuilderError::NotAtReview(wizard.step()));
        }
        Ok(wizard.into_record())
    }

    pub async fn discard(&self, owner: &str, id: Uuid) -> Result<(), BuilderError> {
        let mut sessions = self.inner.write().await;
        self.touch(&mut sessions, owner, id)?;
        sessions.remove(&id);
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}
