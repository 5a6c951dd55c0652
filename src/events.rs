//! Store notifications.
//!
//! The persistence store broadcasts two events to interested listeners:
//! data saved (with the saved blocks and derived metadata) and data
//! cleared. Delivery is best-effort and synchronous with the triggering
//! call; listeners must not assume ordering across stores.

use crate::model::{Block, EnvelopeMetadata};

#[derive(Debug, Clone)]
pub enum StoreEvent {
    DataSaved {
        blocks: Vec<Block>,
        metadata: EnvelopeMetadata,
    },
    DataCleared,
}

pub type StoreListener = Box<dyn Fn(&StoreEvent)>;

/// Synchronous listener registry.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<StoreListener>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: StoreListener) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &StoreEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}
