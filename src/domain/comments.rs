use crate::actions::{CondoActions, Notifier, Role, Session, Toast};
use crate::config::CondoConfig;
use crate::core::{CondoError, Result};
use crate::optimistic::{
    CollectionAction, CollectionSource, ControllerOptions, DispatchReport, Keyed, OptimisticView,
    Patchable, PendingFlag, Submission,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const COMMENT_MAX_LEN: usize = 2000;
pub const INVALID_COMMENT_TITLE: &str = "Invalid comment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadKind {
    Occurrence,
    Discussion,
}

impl fmt::Display for ThreadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Occurrence => "occurrence",
            Self::Discussion => "discussion",
        };
        write!(f, "{label}")
    }
}

impl FromStr for ThreadKind {
    type Err = CondoError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "occurrence" => Ok(Self::Occurrence),
            "discussion" => Ok(Self::Discussion),
            _ => Err(CondoError::validation(format!("unknown thread kind '{raw}'"))),
        }
    }
}

/// The entity a comment thread hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadRef {
    pub kind: ThreadKind,
    pub id: Uuid,
}

impl ThreadRef {
    pub fn occurrence(id: Uuid) -> Self {
        Self {
            kind: ThreadKind::Occurrence,
            id,
        }
    }

    pub fn discussion(id: Uuid) -> Self {
        Self {
            kind: ThreadKind::Discussion,
            id,
        }
    }
}

impl fmt::Display for ThreadRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub thread: ThreadRef,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Keyed for Comment {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

// Comments are only ever added or deleted.
impl Patchable for Comment {
    type Patch = Infallible;

    fn apply_patch(&mut self, patch: &Infallible) {
        match *patch {}
    }
}

/// Trims and checks comment content before it is staged.
pub fn validate_comment(content: &str) -> Result<String> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CondoError::validation("comment must not be blank"));
    }
    if content.chars().count() > COMMENT_MAX_LEN {
        return Err(CondoError::validation(format!(
            "comment must be at most {COMMENT_MAX_LEN} characters"
        )));
    }
    Ok(content.to_string())
}

struct ThreadSource {
    actions: Arc<dyn CondoActions>,
    thread: ThreadRef,
}

#[async_trait]
impl CollectionSource<Comment> for ThreadSource {
    async fn fetch(&self) -> Result<Vec<Comment>> {
        self.actions.list_comments(self.thread).await
    }
}

/// Comment section of an occurrence or a discussion.
///
/// New comments render under a temporary id; the thread refreshes after each
/// confirmed mutation so the server-assigned id replaces it.
pub struct CommentThread {
    session: Session,
    thread: ThreadRef,
    actions: Arc<dyn CondoActions>,
    notifier: Arc<dyn Notifier>,
    view: OptimisticView<Comment>,
    submitting: PendingFlag,
}

impl CommentThread {
    pub fn new(
        session: Session,
        thread: ThreadRef,
        actions: Arc<dyn CondoActions>,
        notifier: Arc<dyn Notifier>,
        config: &CondoConfig,
    ) -> Self {
        let options = ControllerOptions {
            refresh_after_success: true,
            ..config.controller_options()
        };
        let source = Arc::new(ThreadSource {
            actions: Arc::clone(&actions),
            thread,
        });
        let view = OptimisticView::new(
            format!("comments:{thread}"),
            source,
            Arc::clone(&notifier),
            options,
        );

        Self {
            session,
            thread,
            actions,
            notifier,
            view,
            submitting: PendingFlag::new(),
        }
    }

    pub fn thread(&self) -> ThreadRef {
        self.thread
    }

    pub fn view(&self) -> &OptimisticView<Comment> {
        &self.view
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.is_pending()
    }

    pub async fn load(&self) -> Result<()> {
        self.view.refresh().await?;
        Ok(())
    }

    /// Visible comments, oldest first.
    pub fn comments(&self) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self.view.visible()?.into_iter().collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    pub async fn add(&self, content: &str) -> Result<Submission<DispatchReport<Comment>>> {
        let content = validate_comment(content).map_err(|err| self.reject_input(err))?;
        let Some(_token) = self.submitting.try_begin() else {
            debug!(thread = %self.thread, "comment submit ignored while pending");
            return Ok(Submission::Busy);
        };

        let speculative = Comment {
            id: Uuid::new_v4(),
            thread: self.thread,
            author_id: self.session.user_id,
            content: content.clone(),
            created_at: Utc::now(),
        };

        let report = self
            .view
            .dispatch(
                CollectionAction::add(speculative),
                self.actions
                    .add_comment(self.thread, self.session.user_id, content),
            )
            .await?;
        Ok(Submission::Completed(report))
    }

    /// Deletes a comment. Authors may delete their own comments, managers any.
    pub async fn delete(&self, comment_id: Uuid) -> Result<DispatchReport<()>> {
        let comment = self
            .view
            .visible()?
            .into_iter()
            .find(|comment| comment.id == comment_id)
            .ok_or_else(|| {
                self.reject_input(CondoError::not_found(format!("comment {comment_id}")))
            })?;

        if comment.author_id != self.session.user_id {
            self.session
                .require_role(&[Role::Manager], "delete other users' comments")
                .map_err(|err| self.reject_input(err))?;
        }

        self.view
            .dispatch(
                CollectionAction::delete(comment_id),
                self.actions.delete_comment(self.thread, comment_id),
            )
            .await
    }

    fn reject_input(&self, err: CondoError) -> CondoError {
        self.notifier
            .notify(Toast::error(INVALID_COMMENT_TITLE, err.to_string()));
        err
    }
}
