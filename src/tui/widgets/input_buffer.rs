//! Single-line text input with cursor management.
//!
//! Used for the wizard's form fields and the login form. Multi-line
//! description editing goes through `ratatui_textarea` instead.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A simple text input buffer with cursor positioning.
#[derive(Debug, Clone, Default)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
    masked: bool,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that renders as bullets (passwords).
    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    /// Replace the content and put the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.content = text.to_string();
        self.cursor = self.content.len();
    }

    /// Apply an editing key. Returns true if the content changed.
    ///
    /// Cursor movement is consumed but reports false; keys the buffer does
    /// not understand are left to the caller via [`InputBuffer::handles`].
    pub fn apply_key(&mut self, key: &KeyEvent) -> bool {
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.insert_char(c);
                true
            }
            (_, KeyCode::Backspace) => {
                let before = self.content.len();
                self.backspace();
                before != self.content.len()
            }
            (_, KeyCode::Delete) => {
                let before = self.content.len();
                self.delete();
                before != self.content.len()
            }
            (_, KeyCode::Left) => {
                self.move_left();
                false
            }
            (_, KeyCode::Right) => {
                self.move_right();
                false
            }
            (_, KeyCode::Home) => {
                self.move_home();
                false
            }
            (_, KeyCode::End) => {
                self.move_end();
                false
            }
            _ => false,
        }
    }

    /// Whether [`InputBuffer::apply_key`] does something with `key`.
    pub fn handles(key: &KeyEvent) -> bool {
        matches!(
            (key.modifiers, key.code),
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(_))
                | (
                    _,
                    KeyCode::Backspace
                        | KeyCode::Delete
                        | KeyCode::Left
                        | KeyCode::Right
                        | KeyCode::Home
                        | KeyCode::End
                )
        )
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.content.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.content.len() {
            let next = self.content[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.content.len());
            self.content.drain(self.cursor..next);
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.content[..self.cursor]
                .char_indices()
                .next_back()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.content.len() {
            self.cursor = self.content[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.content.len());
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    /// Take the content out, resetting the buffer.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    /// What to draw: the content, or one bullet per char when masked.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.content.chars().count())
        } else {
            self.content.clone()
        }
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }
}
