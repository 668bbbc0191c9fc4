// tradechat — a terminal chat client for marketplace conversations
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/// Multi-line message composer. One flat buffer with `\n` separators and a
/// byte cursor that always sits on a char boundary.
#[derive(Debug, Default)]
pub struct InputState {
    text: String,
    cursor: usize,
}

impl InputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '\r' => {}
                c => self.insert_char(c),
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_up(&mut self) {
        let (row, col) = self.cursor_position();
        if row > 0 {
            self.cursor = self.offset_at(row - 1, col);
        }
    }

    pub fn move_down(&mut self) {
        let (row, col) = self.cursor_position();
        if row + 1 < self.lines().count() {
            self.cursor = self.offset_at(row + 1, col);
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    #[must_use]
    pub fn line_count(&self) -> u16 {
        u16::try_from(self.lines().count()).unwrap_or(u16::MAX)
    }

    /// Cursor as (line index, char column).
    #[must_use]
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let col = before.rsplit('\n').next().map_or(0, |line| line.chars().count());
        (row, col)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset].rfind('\n').map_or(0, |i| i + 1)
    }

    fn line_end(&self, offset: usize) -> usize {
        self.text[offset..].find('\n').map_or(self.text.len(), |i| offset + i)
    }

    /// Byte offset of (row, col), clamping col to the line length.
    fn offset_at(&self, row: usize, col: usize) -> usize {
        let mut start = 0;
        for (i, line) in self.lines().enumerate() {
            if i == row {
                let clamped = line.char_indices().nth(col).map_or(line.len(), |(b, _)| b);
                return start + clamped;
            }
            start += line.len() + 1;
        }
        self.text.len()
    }
}
