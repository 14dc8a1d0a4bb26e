//! Interactive edit session: selection, prompt, submission, and state.
//!
//! The session is the single owner of all mutable state: the current
//! selection (with its preview registration), the prompt, the phase of the
//! in-flight submission, and the last result or error. Rendering layers read
//! it through [`EditSession::snapshot`] and feed intents back through the
//! three public operations.

use crate::data_url;
use crate::edit::{EditProvider, EditRequest};
use crate::error::{Result, RetouchError};
use crate::preview::{PreviewHandle, PreviewStore};
use std::sync::Arc;
use tracing::error;

/// Shown when submission is attempted without an image or a prompt.
const VALIDATION_MESSAGE: &str = "Please upload an image and provide a prompt.";

/// Prefix for every failed-submission message.
const FAILURE_PREFIX: &str = "Failed to edit image: ";

/// Stand-in for a failure that carries no text of its own.
const UNKNOWN_FAILURE: &str = "An unknown error occurred.";

/// Lifecycle of an edit submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No submission made since the last selection.
    #[default]
    Idle,
    /// A submission is in flight. At most one at a time.
    Loading,
    /// The most recent submission produced an edited image.
    Succeeded,
    /// The most recent submission failed.
    Failed,
}

/// An image selected for editing, together with its display preview.
///
/// Dropping it releases the preview registration.
#[derive(Debug)]
struct SelectedImage {
    bytes: Arc<Vec<u8>>,
    mime_type: String,
    preview: PreviewHandle,
}

/// Read-only view of session state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current submission phase.
    pub phase: SessionPhase,
    /// Preview URL of the current selection, if any.
    pub preview_url: Option<String>,
    /// Data URL of the edited image from the last successful submission.
    pub edited_data_url: Option<String>,
    /// Displayable error or validation message, if any.
    pub error: Option<String>,
}

/// State controller for one interactive editing session.
pub struct EditSession {
    provider: Box<dyn EditProvider>,
    previews: Arc<PreviewStore>,
    image: Option<SelectedImage>,
    prompt: String,
    phase: SessionPhase,
    edited: Option<String>,
    error: Option<String>,
}

impl EditSession {
    /// Creates a session backed by the given provider and preview store.
    pub fn new(provider: Box<dyn EditProvider>, previews: Arc<PreviewStore>) -> Self {
        Self {
            provider,
            previews,
            image: None,
            prompt: String::new(),
            phase: SessionPhase::Idle,
            edited: None,
            error: None,
        }
    }

    /// Replaces the current selection.
    ///
    /// The previous preview registration (if any) is released, prior results
    /// and errors are cleared, and the phase returns to [`SessionPhase::Idle`].
    /// Valid in any phase.
    pub fn select_image(&mut self, bytes: Vec<u8>, mime_type: impl Into<String>) {
        let mime_type = mime_type.into();
        // Dropping the previous selection revokes its preview registration.
        self.image = None;

        let bytes = Arc::new(bytes);
        let preview = self.previews.create(Arc::clone(&bytes), &mime_type);
        self.image = Some(SelectedImage {
            bytes,
            mime_type,
            preview,
        });
        self.edited = None;
        self.error = None;
        self.phase = SessionPhase::Idle;
    }

    /// Updates the edit instruction. Valid in any phase; no side effects.
    pub fn set_prompt(&mut self, text: impl Into<String>) {
        self.prompt = text.into();
    }

    /// Submits the current selection and prompt for editing.
    ///
    /// A no-op while a submission is already in flight. Without a selection
    /// or with a blank prompt, surfaces an inline validation message and
    /// leaves the phase untouched. Otherwise transitions to
    /// [`SessionPhase::Loading`] and settles in exactly one of
    /// [`SessionPhase::Succeeded`] or [`SessionPhase::Failed`].
    pub async fn submit_edit(&mut self) {
        if self.phase == SessionPhase::Loading {
            return;
        }

        let source_url = match &self.image {
            Some(image) if !self.prompt.trim().is_empty() => {
                data_url::encode(&image.bytes, &image.mime_type)
            }
            _ => {
                self.error = Some(VALIDATION_MESSAGE.to_owned());
                return;
            }
        };

        self.phase = SessionPhase::Loading;
        self.edited = None;
        self.error = None;

        match self.run_edit(&source_url).await {
            Ok(edited_url) => {
                self.edited = Some(edited_url);
                self.phase = SessionPhase::Succeeded;
            }
            Err(err) => {
                error!("edit request failed: {err}");
                self.error = Some(failure_message(&err));
                self.phase = SessionPhase::Failed;
            }
        }
    }

    /// Returns a read-only view of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            preview_url: self.image.as_ref().map(|i| i.preview.url().to_owned()),
            edited_data_url: self.edited.clone(),
            error: self.error.clone(),
        }
    }

    /// The wire round trip: the selection's data URL is split back into
    /// MIME type and payload, decoupling the upload representation from the
    /// request representation.
    async fn run_edit(&self, source_url: &str) -> Result<String> {
        let (mime_type, payload) = data_url::decode(source_url)?;
        let request = EditRequest::new(payload, mime_type, self.prompt.clone());
        let edited = self.provider.edit(&request).await?;
        Ok(edited.to_data_url())
    }
}

fn failure_message(err: &RetouchError) -> String {
    let detail = err.to_string();
    if detail.is_empty() {
        return format!("{FAILURE_PREFIX}{UNKNOWN_FAILURE}");
    }
    format!("{FAILURE_PREFIX}{detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditedImage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum MockBehavior {
        Image(Vec<u8>, &'static str),
        Fail(&'static str),
    }

    struct MockProvider {
        behavior: MockBehavior,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EditProvider for MockProvider {
        async fn edit(&self, _request: &EditRequest) -> Result<EditedImage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Image(data, mime) => Ok(EditedImage::new(data.clone(), *mime)),
                MockBehavior::Fail(msg) => Err(RetouchError::Api {
                    status: 429,
                    message: (*msg).to_owned(),
                }),
            }
        }

        fn name(&self) -> &str {
            "mock"
        }

        async fn health_check(&self) -> Result<()> {
            Ok(())
        }
    }

    fn session_with(
        behavior: MockBehavior,
    ) -> (EditSession, Arc<PreviewStore>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = MockProvider {
            behavior,
            calls: Arc::clone(&calls),
        };
        let store = PreviewStore::new();
        let session = EditSession::new(Box::new(provider), Arc::clone(&store));
        (session, store, calls)
    }

    #[tokio::test]
    async fn test_submit_without_image_surfaces_validation_message() {
        let (mut session, _store, calls) =
            session_with(MockBehavior::Image(b"x".to_vec(), "image/png"));
        session.set_prompt("Add a sunset");

        session.submit_edit().await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.error.as_deref(), Some(VALIDATION_MESSAGE));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submit_with_blank_prompt_surfaces_validation_message() {
        let (mut session, _store, calls) =
            session_with(MockBehavior::Image(b"x".to_vec(), "image/png"));
        session.select_image(b"input".to_vec(), "image/png");
        session.set_prompt("   ");

        session.submit_edit().await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert_eq!(snapshot.error.as_deref(), Some(VALIDATION_MESSAGE));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let (mut session, _store, calls) =
            session_with(MockBehavior::Image(b"edited".to_vec(), "image/jpeg"));
        session.select_image(b"input".to_vec(), "image/png");
        session.set_prompt("Add a sunset");

        session.submit_edit().await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Succeeded);
        assert_eq!(
            snapshot.edited_data_url.as_deref(),
            Some("data:image/jpeg;base64,ZWRpdGVk")
        );
        assert!(snapshot.error.is_none());
        assert!(snapshot.preview_url.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_submission_preserves_service_message() {
        let (mut session, _store, _calls) = session_with(MockBehavior::Fail("quota exceeded"));
        session.select_image(b"input".to_vec(), "image/png");
        session.set_prompt("Add a sunset");

        session.submit_edit().await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Failed);
        let message = snapshot.error.unwrap();
        assert!(message.starts_with(FAILURE_PREFIX), "got: {message}");
        assert!(message.ends_with("quota exceeded"), "got: {message}");
        assert!(snapshot.edited_data_url.is_none());
    }

    #[tokio::test]
    async fn test_submission_never_settles_in_loading() {
        for behavior in [
            MockBehavior::Image(b"edited".to_vec(), "image/png"),
            MockBehavior::Fail("boom"),
        ] {
            let (mut session, _store, _calls) = session_with(behavior);
            session.select_image(b"input".to_vec(), "image/png");
            session.set_prompt("Add a sunset");

            session.submit_edit().await;
            assert_ne!(session.snapshot().phase, SessionPhase::Loading);
        }
    }

    #[tokio::test]
    async fn test_loading_guard_rejects_resubmission() {
        let (mut session, _store, calls) =
            session_with(MockBehavior::Image(b"edited".to_vec(), "image/png"));
        session.select_image(b"input".to_vec(), "image/png");
        session.set_prompt("Add a sunset");
        session.phase = SessionPhase::Loading;

        session.submit_edit().await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Loading);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_reselecting_replaces_preview_and_clears_state() {
        let (mut session, store, _calls) = session_with(MockBehavior::Fail("boom"));
        session.select_image(b"first".to_vec(), "image/png");
        let first_url = session.snapshot().preview_url.unwrap();

        session.set_prompt("Add a sunset");
        session.submit_edit().await;
        assert_eq!(session.snapshot().phase, SessionPhase::Failed);

        session.select_image(b"second".to_vec(), "image/jpeg");

        // Old registration released, new one live.
        assert_eq!(store.len(), 1);
        assert!(!store.contains(&first_url));
        let second_url = session.snapshot().preview_url.unwrap();
        let (mime, bytes) = store.resolve(&second_url).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(*bytes, b"second".to_vec());

        // Prior result and error are gone, phase back to Idle.
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Idle);
        assert!(snapshot.error.is_none());
        assert!(snapshot.edited_data_url.is_none());
    }

    #[tokio::test]
    async fn test_dropping_session_releases_preview() {
        let (mut session, store, _calls) =
            session_with(MockBehavior::Image(b"edited".to_vec(), "image/png"));
        session.select_image(b"input".to_vec(), "image/png");
        assert_eq!(store.len(), 1);

        drop(session);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failure_message_fallback() {
        let err = RetouchError::Api {
            status: 500,
            message: "internal".into(),
        };
        assert_eq!(
            failure_message(&err),
            "Failed to edit image: API error: 500 - internal"
        );
    }
}
