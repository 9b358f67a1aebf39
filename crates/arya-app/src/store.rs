// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::HashMap;

use tracing::debug;

use crate::{ListSnapshot, ScreenKey};

/// Parked list screens, keyed by screen. The runtime owns one store per
/// record type and hands snapshots back when a screen is re-entered.
#[derive(Debug, Clone)]
pub struct PageStore<T> {
    entries: HashMap<ScreenKey, ListSnapshot<T>>,
}

impl<T> Default for PageStore<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> PageStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, screen: ScreenKey, snapshot: ListSnapshot<T>) {
        debug!(
            screen = screen.as_str(),
            items = snapshot.state.items.len(),
            "parked list state"
        );
        self.entries.insert(screen, snapshot);
    }

    pub fn take(&mut self, screen: ScreenKey) -> Option<ListSnapshot<T>> {
        self.entries.remove(&screen)
    }

    pub fn contains(&self, screen: ScreenKey) -> bool {
        self.entries.contains_key(&screen)
    }

    /// Forget a screen after a mutation touched its records.
    pub fn invalidate(&mut self, screen: ScreenKey) {
        if self.entries.remove(&screen).is_some() {
            debug!(screen = screen.as_str(), "invalidated parked list state");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::PageStore;
    use crate::{ListSnapshot, PaginationState, ScreenKey};

    fn snapshot(items: Vec<u8>) -> ListSnapshot<u8> {
        ListSnapshot {
            state: PaginationState {
                items,
                ..PaginationState::default()
            },
            search_query: String::new(),
            unfiltered: None,
            generation: 0,
        }
    }

    #[test]
    fn take_hands_back_saved_state_once() {
        let mut store = PageStore::new();
        store.save(ScreenKey::AryaSamaj, snapshot(vec![1, 2]));

        let restored = store.take(ScreenKey::AryaSamaj).expect("saved snapshot");
        assert_eq!(restored.state.items, vec![1, 2]);
        assert!(store.take(ScreenKey::AryaSamaj).is_none());
    }

    #[test]
    fn invalidate_only_touches_named_screen() {
        let mut store = PageStore::new();
        store.save(ScreenKey::EkalArya, snapshot(vec![1]));
        store.save(ScreenKey::AryaPariwar, snapshot(vec![2]));

        store.invalidate(ScreenKey::EkalArya);
        assert!(!store.contains(ScreenKey::EkalArya));
        assert!(store.contains(ScreenKey::AryaPariwar));
        assert_eq!(store.len(), 1);
    }
}
