//! Offscreen rendering: draw a widget into a buffer and read it back as text.

use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

/// Render `widget` into a `width` × `height` buffer and return its text.
pub fn render_to_text(widget: impl Widget, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    widget.render(area, &mut buf);
    buffer_text(&buf)
}

/// Buffer contents, one line per row, trailing blanks trimmed.
pub fn buffer_text(buf: &Buffer) -> String {
    let width = usize::from(buf.area.width).max(1);
    let mut out = String::with_capacity(buf.content.len() + usize::from(buf.area.height));
    for row in buf.content.chunks(width) {
        let line: String = row.iter().map(|cell| cell.symbol()).collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
