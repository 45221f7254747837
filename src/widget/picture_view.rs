//! Half-block picture rendering
//!
//! Each terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background. With the usual
//! 1:2 cell shape this keeps pixels roughly square.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Paragraph, Widget, Wrap},
};

use crate::gallery::{Entry, Picture};

const UPPER_HALF_BLOCK: &str = "▀";

/// Renders the current cache entry: the picture, or a placeholder
pub struct PictureView<'a> {
    entry: &'a Entry,
}

impl<'a> PictureView<'a> {
    pub fn new(entry: &'a Entry) -> Self {
        Self { entry }
    }
}

impl Widget for PictureView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.entry {
            Entry::Ready(picture) => render_picture(picture, area, buf),
            Entry::Pending | Entry::Absent => render_placeholder("loading…", Color::DarkGray, area, buf),
            Entry::Failed(err) => {
                render_placeholder(&format!("failed to load: {err}"), Color::Red, area, buf)
            }
        }
    }
}

/// Size in half-block pixels that fits `area` keeping the picture's aspect ratio
pub fn fitted_size(picture: &Picture, area: Rect) -> (u32, u32) {
    let avail_w = u32::from(area.width);
    let avail_h = u32::from(area.height) * 2;
    if picture.width == 0 || picture.height == 0 || avail_w == 0 || avail_h == 0 {
        return (0, 0);
    }

    let ratio = picture.aspect_ratio();
    let by_width = (avail_w, (avail_w as f32 / ratio).round() as u32);
    if by_width.1 <= avail_h {
        (by_width.0, by_width.1.max(1))
    } else {
        (((avail_h as f32 * ratio).round() as u32).clamp(1, avail_w), avail_h)
    }
}

fn render_picture(picture: &Picture, area: Rect, buf: &mut Buffer) {
    let (w, h) = fitted_size(picture, area);
    if w == 0 || h == 0 {
        return;
    }

    let cols = w as u16;
    let rows = h.div_ceil(2) as u16;
    let left = area.x + (area.width - cols) / 2;
    let top = area.y + (area.height - rows) / 2;

    let sample = |x: u32, y: u32| {
        let sx = x * picture.width / w;
        let sy = y * picture.height / h;
        let [r, g, b] = picture.pixel(sx, sy);
        Color::Rgb(r, g, b)
    };

    for row in 0..rows {
        for col in 0..cols {
            let x = u32::from(col);
            let y = u32::from(row) * 2;
            let upper = sample(x, y);
            let lower = if y + 1 < h { sample(x, y + 1) } else { Color::Reset };
            if let Some(cell) = buf.cell_mut((left + col, top + row)) {
                cell.set_symbol(UPPER_HALF_BLOCK).set_fg(upper).set_bg(lower);
            }
        }
    }
}

fn render_placeholder(message: &str, color: Color, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let middle = Rect {
        y: area.y + area.height / 2,
        height: 1.max(area.height - area.height / 2).min(2),
        ..area
    };
    Paragraph::new(Line::from(message.to_string()).centered())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .render(middle, buf);
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::gallery::LoadError;

    #[test]
    fn fitted_size_limited_by_width() {
        let pic = Picture::solid(200, 100, [0, 0, 0]);
        assert_eq!(fitted_size(&pic, Rect::new(0, 0, 20, 20)), (20, 10));
    }

    #[test]
    fn fitted_size_limited_by_height() {
        let pic = Picture::solid(100, 400, [0, 0, 0]);
        // 10 rows give 20 half-block pixels of height
        assert_eq!(fitted_size(&pic, Rect::new(0, 0, 40, 10)), (5, 20));
    }

    #[test]
    fn fitted_size_of_empty_area() {
        let pic = Picture::solid(10, 10, [0, 0, 0]);
        assert_eq!(fitted_size(&pic, Rect::new(0, 0, 0, 5)), (0, 0));
    }

    #[test]
    fn renders_colours_as_half_blocks() {
        // 2x2: top row red, bottom row blue
        let mut pixels = vec![255, 0, 0, 255, 0, 0];
        pixels.extend([0, 0, 255, 0, 0, 255]);
        let entry = Entry::Ready(Arc::new(Picture::new(pixels, 2, 2)));

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        PictureView::new(&entry).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), UPPER_HALF_BLOCK);
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn picture_is_centred() {
        let entry = Entry::Ready(Arc::new(Picture::solid(2, 2, [9, 9, 9])));
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        PictureView::new(&entry).render(area, &mut buf);

        // Fits as 2x2 pixels -> 2 columns, one row, centred at column 4
        assert_eq!(buf[(4, 0)].symbol(), UPPER_HALF_BLOCK);
        assert_eq!(buf[(5, 0)].symbol(), UPPER_HALF_BLOCK);
        assert_eq!(buf[(3, 0)].symbol(), " ");
        assert_eq!(buf[(6, 0)].symbol(), " ");
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn pending_shows_loading_placeholder() {
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        PictureView::new(&Entry::Pending).render(area, &mut buf);
        assert!(row_text(&buf, 2).contains("loading"));
    }

    #[test]
    fn failure_shows_error() {
        let entry = Entry::Failed(LoadError::Decode {
            path: PathBuf::from("x.jpg"),
            detail: "bad".to_string(),
        });
        let area = Rect::new(0, 0, 60, 4);
        let mut buf = Buffer::empty(area);
        PictureView::new(&entry).render(area, &mut buf);
        assert!(row_text(&buf, 2).contains("failed to load"));
    }
}
