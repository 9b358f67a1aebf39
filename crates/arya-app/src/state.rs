// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ScreenKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppMode {
    Nav,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_screen: ScreenKey,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_screen: ScreenKey::EkalArya,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    NextScreen,
    PrevScreen,
    ShowScreen(ScreenKey),
    EnterSearch,
    ExitToNav,
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    ScreenChanged { from: ScreenKey, to: ScreenKey },
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextScreen => self.rotate_screen(1),
            AppCommand::PrevScreen => self.rotate_screen(-1),
            AppCommand::ShowScreen(screen) => self.switch_to(screen),
            AppCommand::EnterSearch => {
                self.mode = AppMode::Search;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) -> AppEvent {
        let message = message.into();
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<AppEvent> {
        let screens = ScreenKey::ALL;
        let current = screens
            .iter()
            .position(|screen| *screen == self.active_screen)
            .unwrap_or(0) as isize;
        let len = screens.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.switch_to(screens[next])
    }

    fn switch_to(&mut self, screen: ScreenKey) -> Vec<AppEvent> {
        if screen == self.active_screen {
            return Vec::new();
        }
        let from = self.active_screen;
        self.active_screen = screen;
        let mut events = Vec::new();
        if self.mode != AppMode::Nav {
            self.mode = AppMode::Nav;
            events.push(AppEvent::ModeChanged(self.mode));
        }
        events.push(AppEvent::ScreenChanged { from, to: screen });
        events
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::ScreenKey;

    #[test]
    fn screen_rotation_wraps() {
        let mut state = AppState {
            active_screen: ScreenKey::Activities,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextScreen);
        assert_eq!(state.active_screen, ScreenKey::EkalArya);
        assert_eq!(
            events,
            vec![AppEvent::ScreenChanged {
                from: ScreenKey::Activities,
                to: ScreenKey::EkalArya,
            }]
        );

        state.dispatch(AppCommand::PrevScreen);
        assert_eq!(state.active_screen, ScreenKey::Activities);
    }

    #[test]
    fn leaving_screen_drops_search_mode() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::EnterSearch);

        let events = state.dispatch(AppCommand::ShowScreen(ScreenKey::AryaSamaj));
        assert_eq!(state.mode, AppMode::Nav);
        assert_eq!(events.first(), Some(&AppEvent::ModeChanged(AppMode::Nav)));
    }

    #[test]
    fn showing_current_screen_is_silent() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::ShowScreen(ScreenKey::EkalArya)).is_empty());
    }

    #[test]
    fn mode_transitions() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::EnterSearch);
        assert_eq!(state.mode, AppMode::Search);

        state.dispatch(AppCommand::ExitToNav);
        assert_eq!(state.mode, AppMode::Nav);
    }
}
