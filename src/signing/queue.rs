//! Defines the [SigningQueue] struct, the ordered list of documents assigned to one signer and
//! the state machine that gates which of them may be opened.
//!
//! Documents are signed strictly in order. The document at index `i` is enterable only once
//! the nearest earlier document that was not declined has been signed. Declined documents are
//! terminal, never enterable, and do not count towards the queue total.

use log::{debug, info};

use crate::signing::document::{RecipientStatus, SigningDocument};

/// The lifecycle state of one document in a [SigningQueue].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueItemStatus {
    Pending,
    Signing,
    Signed,
    Declined,
}

impl QueueItemStatus {
    /// Returns `true` for the terminal states.
    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(self, QueueItemStatus::Signed | QueueItemStatus::Declined)
    }
}

impl From<RecipientStatus> for QueueItemStatus {
    fn from(status: RecipientStatus) -> Self {
        match status {
            RecipientStatus::Signed => QueueItemStatus::Signed,
            RecipientStatus::Declined => QueueItemStatus::Declined,
            RecipientStatus::Pending | RecipientStatus::Sent | RecipientStatus::Viewed => {
                QueueItemStatus::Pending
            }
        }
    }
}

/// One document in a [SigningQueue].
#[derive(Debug, Clone, PartialEq)]
pub struct SigningQueueItem {
    pub id: String,
    pub title: String,
    pub status: QueueItemStatus,
    pub signing_token: String,

    /// `false` when the document's sign data could not be fetched. Such a document keeps its
    /// place in the queue but cannot be opened.
    pub openable: bool,
}

impl From<&SigningDocument> for SigningQueueItem {
    fn from(document: &SigningDocument) -> Self {
        Self {
            id: document.id.clone(),
            title: document.title.clone(),
            status: document.recipient_status.into(),
            signing_token: document.signing_token.clone(),
            openable: document.is_openable(),
        }
    }
}

/// Something the host should react to after a queue transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    /// The document at this index was opened for signing.
    Opened(usize),

    /// Signing progress changed.
    Progress { signed: usize, total: usize },

    /// The document at this index is next in line but has no content to open.
    Blocked(usize),

    /// Every document in the queue has been signed.
    Completed,
}

/// The ordered signing queue for one signer.
#[derive(Debug, Clone, Default)]
pub struct SigningQueue {
    items: Vec<SigningQueueItem>,
    active: Option<usize>,
}

impl SigningQueue {
    /// Creates a new [SigningQueue] over the given items, in signing order.
    pub fn new(items: Vec<SigningQueueItem>) -> Self {
        Self {
            items,
            active: None,
        }
    }

    /// Creates a new [SigningQueue] over the given documents, in signing order.
    pub fn from_documents(documents: &[SigningDocument]) -> Self {
        Self::new(documents.iter().map(SigningQueueItem::from).collect())
    }

    #[inline]
    pub fn items(&self) -> &[SigningQueueItem] {
        &self.items
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&SigningQueueItem> {
        self.items.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the index of the document currently open for signing.
    #[inline]
    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Returns `true` if the document at `index` may be opened, ignoring whether its content
    /// is available.
    pub fn is_enterable(&self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };

        if item.status.is_settled() {
            return false;
        }

        self.items[..index]
            .iter()
            .rev()
            .find(|previous| previous.status != QueueItemStatus::Declined)
            .map_or(true, |previous| previous.status == QueueItemStatus::Signed)
    }

    /// Returns the index of the first enterable document.
    pub fn next_enterable(&self) -> Option<usize> {
        (0..self.items.len()).find(|index| self.is_enterable(*index))
    }

    /// Opens the document at `index` for signing. Returns `false`, leaving the queue
    /// unchanged, if the document is not enterable or has no content.
    pub fn open(&mut self, index: usize) -> bool {
        if !self.is_enterable(index) || !self.items[index].openable {
            debug!("refusing to open queue position {}", index);

            return false;
        }

        self.items[index].status = QueueItemStatus::Signing;
        self.active = Some(index);

        debug!("opened {} at queue position {}", self.items[index].id, index);

        true
    }

    /// Closes the open document without signing it. The document stays in the `Signing` state
    /// and can be opened again.
    pub fn abandon(&mut self) -> Option<usize> {
        self.active.take()
    }

    /// Marks the document at `index` as signed and advances the queue.
    ///
    /// Returns the resulting events in order: progress, then either the next document opened,
    /// the next document blocked on missing content, or completion of the whole queue.
    /// Returns no events if the document was not being signed.
    pub fn on_submit_success(&mut self, index: usize) -> Vec<QueueEvent> {
        match self.items.get(index) {
            Some(item) if item.status == QueueItemStatus::Signing => {}
            _ => return Vec::new(),
        }

        self.items[index].status = QueueItemStatus::Signed;

        if self.active == Some(index) {
            self.active = None;
        }

        let (signed, total) = (self.signed_count(), self.total_count());

        info!("signed {} ({} of {})", self.items[index].id, signed, total);

        let mut events = vec![QueueEvent::Progress { signed, total }];

        match self.next_enterable() {
            Some(next) if self.open(next) => events.push(QueueEvent::Opened(next)),
            Some(next) => events.push(QueueEvent::Blocked(next)),
            None if self.is_complete() => {
                info!("all {} documents signed", total);

                events.push(QueueEvent::Completed);
            }
            None => {}
        }

        events
    }

    /// Records a failed submission for the document at `index`. The document stays open in
    /// the `Signing` state so the signer can retry.
    pub fn on_submit_failure(&mut self, index: usize) {
        debug!("submission failed at queue position {}", index);
    }

    /// Returns the number of signed documents.
    pub fn signed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == QueueItemStatus::Signed)
            .count()
    }

    /// Returns the number of documents that count towards completion: every document that
    /// was not declined.
    pub fn total_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status != QueueItemStatus::Declined)
            .count()
    }

    /// Returns `true` if at least one document counts towards completion and all of them are
    /// signed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        let total = self.total_count();

        total > 0 && self.signed_count() == total
    }
}
