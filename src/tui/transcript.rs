//! Transcript view that forwards every change to the event loop as an
//! [`Action`], so the state behind the screen is only ever touched by
//! `update()` on the UI thread.

use std::sync::mpsc::Sender;

use log::warn;

use crate::core::action::Action;
use crate::core::message::ChatMessage;
use crate::core::view::{PlaceholderId, TranscriptView};

pub struct ChannelTranscript {
    tx: Sender<Action>,
}

impl ChannelTranscript {
    pub fn new(tx: Sender<Action>) -> Self {
        Self { tx }
    }

    fn send(&self, action: Action) {
        // Only fails once the event loop is gone, at which point nothing is drawn anyway
        if self.tx.send(action).is_err() {
            warn!("Dropped transcript update: receiver gone");
        }
    }
}

impl TranscriptView for ChannelTranscript {
    fn append(&self, message: &ChatMessage) {
        self.send(Action::Append(message.clone()));
    }

    fn insert_placeholder(&self, id: &PlaceholderId) {
        self.send(Action::InsertPlaceholder(id.clone()));
    }

    fn remove_placeholder(&self, id: &PlaceholderId) {
        self.send(Action::RemovePlaceholder(id.clone()));
    }

    fn scroll_to_bottom(&self) {
        self.send(Action::ScrollToBottom);
    }
}
