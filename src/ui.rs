//! Rendering of surface fields with ratatui.
//!
//! Layout, top to bottom: title, body, key hints, status line. A body with a
//! `pos` field renders as a selectable list, otherwise as scrolling text.

use crate::styles::{parse_style, ARTICLE_FIELD, LIST_HIGHLIGHT_SYMBOL};
use crate::surface::{FIELD_BODY, FIELD_HEAD, FIELD_HINT, FIELD_MSG, FIELD_OFFSET, FIELD_POS};
use ratatui::prelude::*;
use ratatui::widgets::{Block, List, ListItem, ListState, Paragraph, Wrap};
use std::collections::HashMap;

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("")
}

/// Split an area into title, body, hint and status rows
pub fn surface_layout(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2], chunks[3])
}

/// Draw every field of a surface into the frame
pub fn render_surface(frame: &mut Frame, fields: &HashMap<String, String>) {
    let area = frame.area();
    let info = parse_style(field(fields, "info"));

    let background = Block::default().style(parse_style(field(fields, "background")));
    frame.render_widget(background, area);

    let (head, body, hint, msg) = surface_layout(area);

    frame.render_widget(Paragraph::new(field(fields, FIELD_HEAD)).style(info), head);

    let lines: Vec<&str> = field(fields, FIELD_BODY).lines().collect();
    match field(fields, FIELD_POS).parse::<usize>() {
        Ok(pos) => {
            let items: Vec<ListItem> = lines.iter().map(|l| ListItem::new(*l)).collect();
            let list = List::new(items)
                .style(parse_style(field(fields, "listnormal")))
                .highlight_style(parse_style(field(fields, "listfocus")))
                .highlight_symbol(LIST_HIGHLIGHT_SYMBOL);
            let mut state = ListState::default();
            if !lines.is_empty() {
                state.select(Some(pos.min(lines.len() - 1)));
            }
            frame.render_stateful_widget(list, body, &mut state);
        }
        Err(_) => {
            let offset = field(fields, FIELD_OFFSET).parse::<u16>().unwrap_or(0);
            let text = Paragraph::new(lines.join("\n"))
                .style(parse_style(field(fields, ARTICLE_FIELD)))
                .wrap(Wrap { trim: false })
                .scroll((offset, 0));
            frame.render_widget(text, body);
        }
    }

    frame.render_widget(Paragraph::new(field(fields, FIELD_HINT)).style(info), hint);
    frame.render_widget(Paragraph::new(field(fields, FIELD_MSG)), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn fields(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_layout_rows() {
        let (head, body, hint, msg) = surface_layout(Rect::new(0, 0, 40, 10));
        assert_eq!(head.height, 1);
        assert_eq!(body.height, 7);
        assert_eq!(hint.y, 8);
        assert_eq!(msg.y, 9);
    }

    #[test]
    fn test_render_list_and_status() {
        let backend = TestBackend::new(30, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        let fields = fields(&[
            (FIELD_HEAD, "Your feeds"),
            (FIELD_BODY, "first\nsecond"),
            (FIELD_POS, "1"),
            (FIELD_MSG, "macro-"),
        ]);
        terminal.draw(|f| render_surface(f, &fields)).unwrap();

        let buffer = terminal.backend().buffer().clone();
        let row = |y: u16| -> String {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(row(0).starts_with("Your feeds"));
        assert!(row(2).contains("» second"));
        assert!(row(5).starts_with("macro-"));
    }
}
