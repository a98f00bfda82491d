//! Client input handling: keyboard shortcuts, room code entry and board clicks

use crate::rendering::BoardLayout;
use macroquad::prelude::*;
use shared::{Packet, ROOM_CODE_LEN};

/// Actions the player can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    CreateRoom,
    JoinRoom(String),
    MakeMove(u8),
    ResetGame,
    Quit,
}

impl ClientCommand {
    /// Packet to send for this command, `None` for local-only commands
    pub fn into_packet(self) -> Option<Packet> {
        match self {
            ClientCommand::CreateRoom => Some(Packet::CreateRoom),
            ClientCommand::JoinRoom(room_code) => Some(Packet::JoinRoom { room_code }),
            ClientCommand::MakeMove(cell) => Some(Packet::MakeMove { cell }),
            ClientCommand::ResetGame => Some(Packet::ResetGame),
            ClientCommand::Quit => None,
        }
    }
}

/// Line editor for typing a room code
#[derive(Debug, Default)]
pub struct JoinCodeEditor {
    buffer: String,
}

impl JoinCodeEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a character; anything but letters and digits is ignored
    pub fn push(&mut self, c: char) {
        if c.is_ascii_alphanumeric() && self.buffer.len() < ROOM_CODE_LEN {
            self.buffer.push(c.to_ascii_uppercase());
        }
    }

    pub fn pop(&mut self) {
        self.buffer.pop();
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    /// Returns the code once it has full length
    pub fn submit(&self) -> Option<String> {
        if self.buffer.len() == ROOM_CODE_LEN {
            Some(self.buffer.clone())
        } else {
            None
        }
    }
}

pub struct InputManager {
    join_code: Option<JoinCodeEditor>,
}

impl InputManager {
    pub fn new() -> Self {
        Self { join_code: None }
    }

    /// Room code being typed, if the player is entering one
    pub fn join_code(&self) -> Option<&str> {
        self.join_code.as_ref().map(|editor| editor.text())
    }

    /// Samples this frame's input and returns the resulting commands
    pub fn update(&mut self, layout: &BoardLayout) -> Vec<ClientCommand> {
        let mut commands = Vec::new();

        // Always drain typed characters so shortcut letters never leak
        // into a code entry started on a later frame
        let mut typed = Vec::new();
        while let Some(c) = get_char_pressed() {
            typed.push(c);
        }

        if let Some(editor) = self.join_code.as_mut() {
            for c in typed {
                editor.push(c);
            }
            if is_key_pressed(KeyCode::Backspace) {
                editor.pop();
            }
            if is_key_pressed(KeyCode::Enter) {
                if let Some(code) = editor.submit() {
                    commands.push(ClientCommand::JoinRoom(code));
                    self.join_code = None;
                }
            } else if is_key_pressed(KeyCode::Escape) {
                self.join_code = None;
            }
            return commands;
        }

        if is_key_pressed(KeyCode::C) {
            commands.push(ClientCommand::CreateRoom);
        }
        if is_key_pressed(KeyCode::J) {
            self.join_code = Some(JoinCodeEditor::new());
        }
        if is_key_pressed(KeyCode::R) {
            commands.push(ClientCommand::ResetGame);
        }
        if is_key_pressed(KeyCode::Escape) {
            commands.push(ClientCommand::Quit);
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            let (x, y) = mouse_position();
            if let Some(cell) = layout.cell_at(x, y) {
                commands.push(ClientCommand::MakeMove(cell as u8));
            }
        }

        commands
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
