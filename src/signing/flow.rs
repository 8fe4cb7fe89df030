//! Defines the [SigningFlow] struct, the adapter that binds a [SigningQueue] and its document
//! sessions to a [SigningApi] and to the host application.
//!
//! Loading is an explicit async pipeline: the document list is fetched, sign data for every
//! listed document is pre-fetched concurrently, the responses are transformed into
//! [SigningDocument]s and the queue is built from them. A failed pre-fetch only affects its own
//! document, which stays in the queue without content.

use chrono::{Local, NaiveDate};
use futures::future::join_all;
use log::{debug, info, warn};

use crate::config::SigningConfig;
use crate::error::{SigningError, SigningResult};
use crate::signing::api::SigningApi;
use crate::signing::document::autofill::InvestorAutoFillData;
use crate::signing::document::session::DocumentSession;
use crate::signing::document::SigningDocument;
use crate::signing::queue::{QueueEvent, SigningQueue};
use crate::signing::submission::SubmissionPipeline;

/// Callbacks into the application hosting a [SigningFlow].
pub trait SigningFlowHost {
    /// Called once after every successful load, with `(0, 0)` when nothing is left to sign,
    /// and after every successful submission.
    fn on_progress(&self, _signed: usize, _total: usize) {}

    /// Called exactly once, when every document is signed or the signer moves past an
    /// empty queue.
    fn on_complete(&self) {}
}

impl SigningFlowHost for () {}

/// A [SigningFlowHost] built from two closures.
pub struct CallbackHost<P, C> {
    on_progress: P,
    on_complete: C,
}

impl<P, C> CallbackHost<P, C>
where
    P: Fn(usize, usize),
    C: Fn(),
{
    #[inline]
    pub fn new(on_progress: P, on_complete: C) -> Self {
        Self {
            on_progress,
            on_complete,
        }
    }
}

impl<P, C> SigningFlowHost for CallbackHost<P, C>
where
    P: Fn(usize, usize),
    C: Fn(),
{
    fn on_progress(&self, signed: usize, total: usize) {
        (self.on_progress)(signed, total)
    }

    fn on_complete(&self) {
        (self.on_complete)()
    }
}

/// The top-level state of a [SigningFlow].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Nothing has been loaded yet.
    Idle,

    /// The document list could not be fetched. [SigningFlow::retry()] loads again.
    Failed { message: String },

    /// The signer has no documents assigned, or every assigned document was declined.
    NoDocuments,

    /// Documents are queued and at least one is still unsigned.
    Ready,

    /// Every document has been signed.
    Complete,
}

/// Drives one signer through their queue of documents.
pub struct SigningFlow<A, H = ()> {
    api: A,
    host: H,
    config: SigningConfig,
    autofill: InvestorAutoFillData,
    signing_date: Option<NaiveDate>,
    documents: Vec<SigningDocument>,
    queue: SigningQueue,
    session: Option<DocumentSession>,
    pipeline: SubmissionPipeline,
    state: FlowState,
    completion_reported: bool,
    last_error: Option<String>,
}

impl<A, H> SigningFlow<A, H>
where
    A: SigningApi,
    H: SigningFlowHost,
{
    /// Creates a new, unloaded [SigningFlow].
    pub fn new(api: A, host: H, config: SigningConfig, autofill: InvestorAutoFillData) -> Self {
        Self {
            api,
            host,
            config,
            autofill,
            signing_date: None,
            documents: Vec::new(),
            queue: SigningQueue::default(),
            session: None,
            pipeline: SubmissionPipeline::new(),
            state: FlowState::Idle,
            completion_reported: false,
            last_error: None,
        }
    }

    /// Fixes the date used for DATE_SIGNED fields instead of the local calendar date at the
    /// moment each document is opened.
    #[inline]
    pub fn with_signing_date(mut self, date: NaiveDate) -> Self {
        self.signing_date = Some(date);
        self
    }

    #[inline]
    pub fn api(&self) -> &A {
        &self.api
    }

    #[inline]
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    #[inline]
    pub fn queue(&self) -> &SigningQueue {
        &self.queue
    }

    #[inline]
    pub fn documents(&self) -> &[SigningDocument] {
        &self.documents
    }

    /// Returns the open document session, if any.
    #[inline]
    pub fn session(&self) -> Option<&DocumentSession> {
        self.session.as_ref()
    }

    #[inline]
    pub fn session_mut(&mut self) -> Option<&mut DocumentSession> {
        self.session.as_mut()
    }

    /// Returns the message of the most recent failed submission, cleared on success.
    #[inline]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns `(signed, total)` for the queue.
    #[inline]
    pub fn progress(&self) -> (usize, usize) {
        (self.queue.signed_count(), self.queue.total_count())
    }

    /// Loads the signer's documents and opens the first one that can be signed.
    ///
    /// A failure to fetch the document list moves the flow to [FlowState::Failed] rather than
    /// returning an error.
    pub async fn load(&mut self) -> &FlowState {
        self.session = None;
        self.queue = SigningQueue::default();
        self.documents.clear();

        let listed = match self
            .api
            .list_documents(self.config.fund_id.as_deref())
            .await
        {
            Ok(Some(list)) => list.documents,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("failed to load signing documents: {}", err);

                self.state = FlowState::Failed {
                    message: err.to_string(),
                };

                return &self.state;
            }
        };

        let api = &self.api;

        let sign_data = join_all(
            listed
                .iter()
                .map(|document| api.fetch_sign_data(&document.signing_token)),
        )
        .await;

        self.documents = listed
            .into_iter()
            .zip(sign_data)
            .map(|(listed, sign_data)| {
                let sign_data = sign_data
                    .map_err(|err| {
                        warn!("failed to load sign data for document {}: {}", listed.id, err);
                    })
                    .ok();

                listed.into_signing_document(sign_data)
            })
            .collect();

        self.queue = SigningQueue::from_documents(&self.documents);

        let (signed, total) = self.progress();

        info!("loaded {} documents, {} of {} signed", self.queue.len(), signed, total);

        self.host.on_progress(signed, total);

        if total == 0 {
            debug!("no documents to sign");

            self.state = FlowState::NoDocuments;
        } else if self.queue.is_complete() {
            self.complete();
        } else {
            self.state = FlowState::Ready;

            match self.queue.next_enterable() {
                Some(index) => {
                    if let Err(err) = self.open_document(index) {
                        warn!("could not open document at queue position {}: {}", index, err);
                    }
                }
                None => debug!("no enterable documents"),
            }
        }

        &self.state
    }

    /// Loads again after the document list failed to load. Does nothing in any other state.
    pub async fn retry(&mut self) -> &FlowState {
        if matches!(self.state, FlowState::Failed { .. }) {
            return self.load().await;
        }

        &self.state
    }

    /// Moves past an empty queue, reporting completion to the host.
    pub fn skip_empty(&mut self) {
        if self.state == FlowState::NoDocuments {
            self.report_complete();
        }
    }

    /// Opens the document at `index` in a fresh session, discarding any open session.
    pub fn open_document(&mut self, index: usize) -> SigningResult<&mut DocumentSession> {
        let document = self
            .documents
            .get(index)
            .ok_or(SigningError::NoSuchDocument(index))?;

        if !self.queue.is_enterable(index) {
            return Err(SigningError::NotEnterable(index));
        }

        let session =
            DocumentSession::open(document, &self.autofill, &self.config, self.signing_date())?;

        if !self.queue.open(index) {
            return Err(SigningError::DocumentUnavailable(document.id.clone()));
        }

        Ok(self.session.insert(session))
    }

    /// Closes the open document without signing it. Unsubmitted edits are lost.
    pub fn abandon(&mut self) {
        if let Some(index) = self.queue.abandon() {
            debug!("abandoned document at queue position {}", index);
        }

        self.session = None;
    }

    /// Submits the open document. On success the queue advances and the next document, if
    /// any, is opened. On failure the session is kept for a retry.
    ///
    /// A session that does not validate is refused before anything is sent, leaving the queue
    /// and [SigningFlow::last_error()] untouched.
    pub async fn submit(&mut self) -> SigningResult<Vec<QueueEvent>> {
        let index = self.queue.active().ok_or(SigningError::NoOpenDocument)?;
        let session = self.session.as_mut().ok_or(SigningError::NoOpenDocument)?;

        let submission = SubmissionPipeline::prepare(session)?;

        if let Err(err) = self.pipeline.send(&self.api, &submission).await {
            SubmissionPipeline::release(session);
            self.queue.on_submit_failure(index);
            self.last_error = Some(err.to_string());

            return Err(err);
        }

        self.last_error = None;
        self.session = None;

        let events = self.queue.on_submit_success(index);

        for event in &events {
            match *event {
                QueueEvent::Progress { signed, total } => self.host.on_progress(signed, total),
                QueueEvent::Opened(next) => self.start_session(next),
                QueueEvent::Blocked(next) => {
                    warn!("next document at queue position {} is unavailable", next);
                }
                QueueEvent::Completed => self.complete(),
            }
        }

        Ok(events)
    }

    fn signing_date(&self) -> NaiveDate {
        self.signing_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Creates the session for a document the queue has already opened.
    fn start_session(&mut self, index: usize) {
        let Some(document) = self.documents.get(index) else {
            return;
        };

        match DocumentSession::open(document, &self.autofill, &self.config, self.signing_date()) {
            Ok(session) => self.session = Some(session),
            Err(err) => {
                warn!("could not open document at queue position {}: {}", index, err);

                self.queue.abandon();
            }
        }
    }

    fn complete(&mut self) {
        self.state = FlowState::Complete;
        self.report_complete();
    }

    fn report_complete(&mut self) {
        if !self.completion_reported {
            self.completion_reported = true;
            self.host.on_complete();
        }
    }
}
