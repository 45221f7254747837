use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::gallery::Entry;

pub const HELP_TEXT: &str =
    "←/h prev | →/l next | g/G first/last | <num>⏎ go to | q quit";

/// `3/120  IMG_0042.jpg  [loading]`
pub fn status_line(position: Option<(usize, usize)>, name: Option<&str>, entry: &Entry, goto: &str) -> Line<'static> {
    let Some((current, total)) = position else {
        return Line::from(Span::styled(
            " no pictures found ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ));
    };

    let mut spans = vec![
        Span::styled(
            format!(" {}/{} ", current + 1, total),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} ", name.unwrap_or("?"))),
    ];

    let (label, color) = match entry {
        Entry::Absent | Entry::Pending => ("loading", Color::DarkGray),
        Entry::Ready(picture) => {
            spans.push(Span::styled(
                format!(" {}x{} ", picture.width, picture.height),
                Style::default().fg(Color::DarkGray),
            ));
            ("", Color::Reset)
        }
        Entry::Failed(_) => ("failed", Color::Red),
    };
    if !label.is_empty() {
        spans.push(Span::styled(format!(" [{label}] "), Style::default().fg(color)));
    }
    if !goto.is_empty() {
        spans.push(Span::styled(
            format!(" go to: {goto} "),
            Style::default().fg(Color::Cyan),
        ));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::gallery::Picture;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn shows_position_name_and_state() {
        let line = status_line(Some((2, 10)), Some("c.jpg"), &Entry::Pending, "");
        let text = text(&line);
        assert!(text.contains("3/10"));
        assert!(text.contains("c.jpg"));
        assert!(text.contains("[loading]"));
    }

    #[test]
    fn shows_dimensions_when_ready() {
        let entry = Entry::Ready(Arc::new(Picture::solid(64, 48, [0, 0, 0])));
        let line = status_line(Some((0, 1)), Some("a.png"), &entry, "12");
        let text = text(&line);
        assert!(text.contains("64x48"));
        assert!(text.contains("go to: 12"));
    }

    #[test]
    fn empty_collection_message() {
        let line = status_line(None, None, &Entry::Absent, "");
        assert!(text(&line).contains("no pictures found"));
    }
}
