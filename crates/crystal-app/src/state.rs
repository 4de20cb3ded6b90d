// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{RecordId, Screen};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Search,
    ConfirmDelete(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleState {
    pub mode: InputMode,
    pub active_screen: Screen,
    pub status_line: Option<String>,
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self {
            mode: InputMode::Browse,
            active_screen: Screen::Users,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    NextScreen,
    PrevScreen,
    StartSearch,
    FinishSearch,
    AskDelete(RecordId),
    DeclineDelete,
    ConfirmDelete,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    ModeChanged(InputMode),
    ScreenChanged(Screen),
    DeleteConfirmed(RecordId),
    StatusUpdated(String),
    StatusCleared,
}

impl ConsoleState {
    pub fn dispatch(&mut self, command: ConsoleCommand) -> Vec<ConsoleEvent> {
        match command {
            ConsoleCommand::NextScreen => self.rotate_screen(1),
            ConsoleCommand::PrevScreen => self.rotate_screen(-1),
            ConsoleCommand::StartSearch => self.set_mode(InputMode::Search),
            ConsoleCommand::FinishSearch => {
                if self.mode != InputMode::Search {
                    return Vec::new();
                }
                self.set_mode(InputMode::Browse)
            }
            ConsoleCommand::AskDelete(id) => {
                let prompt = format!("delete {id}? y/n");
                let mut events = self.set_mode(InputMode::ConfirmDelete(id));
                events.push(self.set_status(&prompt));
                events
            }
            ConsoleCommand::DeclineDelete => {
                if !matches!(self.mode, InputMode::ConfirmDelete(_)) {
                    return Vec::new();
                }
                let mut events = self.set_mode(InputMode::Browse);
                events.push(self.set_status("delete canceled"));
                events
            }
            ConsoleCommand::ConfirmDelete => {
                let InputMode::ConfirmDelete(id) = self.mode.clone() else {
                    return Vec::new();
                };
                let mut events = self.set_mode(InputMode::Browse);
                events.push(ConsoleEvent::DeleteConfirmed(id));
                events
            }
            ConsoleCommand::SetStatus(message) => vec![self.set_status(&message)],
            ConsoleCommand::ClearStatus => {
                self.status_line = None;
                vec![ConsoleEvent::StatusCleared]
            }
        }
    }

    fn rotate_screen(&mut self, delta: isize) -> Vec<ConsoleEvent> {
        if self.mode != InputMode::Browse {
            return Vec::new();
        }
        self.active_screen = self.active_screen.rotate(delta);
        vec![ConsoleEvent::ScreenChanged(self.active_screen)]
    }

    fn set_mode(&mut self, mode: InputMode) -> Vec<ConsoleEvent> {
        self.mode = mode;
        vec![ConsoleEvent::ModeChanged(self.mode.clone())]
    }

    fn set_status(&mut self, message: &str) -> ConsoleEvent {
        self.status_line = Some(message.to_owned());
        ConsoleEvent::StatusUpdated(message.to_owned())
    }
}
