use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// One-line editor for the list route's query string (`status.equals=NEW&sort=name,desc`).
pub struct SearchBar {
    query: String,
    cursor_position: usize,
    is_focused: bool,
}

impl SearchBar {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            cursor_position: 0,
            is_focused: false,
        }
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.is_focused
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.cursor_position = self.query.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self.byte_index();
        self.query.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let mut chars: Vec<char> = self.query.chars().collect();
            if self.cursor_position <= chars.len() {
                chars.remove(self.cursor_position - 1);
                self.query = chars.into_iter().collect();
                self.cursor_position -= 1;
            }
        }
    }

    fn byte_index(&self) -> usize {
        self.query
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.query.len())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.is_focused {
            "Query (Enter to apply, Esc to cancel)"
        } else {
            "Query (press / to edit)"
        };

        let border_style = if self.is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style);

        let search_text = if self.query.is_empty() {
            if self.is_focused {
                "e.g. status.equals=NEW&sort=created,desc"
            } else {
                "No filters"
            }
        } else {
            &self.query
        };

        let text_style = if self.query.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let paragraph = Paragraph::new(search_text).block(block).style(text_style);

        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            let cursor_y = area.y + 1;

            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(ratatui::layout::Position { x: cursor_x, y: cursor_y });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_multibyte_query() {
        let mut bar = SearchBar::new();
        bar.set_query("name.contains=caf");
        bar.insert_char('é');
        bar.insert_char('!');
        assert_eq!(bar.query(), "name.contains=café!");

        bar.delete_char();
        bar.delete_char();
        assert_eq!(bar.query(), "name.contains=caf");
    }
}
