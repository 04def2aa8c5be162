//! The page of text shown over the backdrop.

use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::Line,
    widgets::{Block, BorderType, Paragraph, Wrap},
};

/// Widest the panel gets, in columns.
const MAX_PANEL_WIDTH: u16 = 72;

const SHOWCASE: &str = "\
starfall

An animated starfield rendered in your terminal.

Stars drift and twinkle, and about a third of them leave a short trail.
Move the mouse across the sky and nearby stars scatter away from the
pointer. Stop moving it and they drift back to where they started.

Scroll this page with the mouse wheel or the arrow keys. The backdrop
follows at different rates, so larger stars move further than small ones.

Every few seconds a meteor streaks down from the top of the sky. At most
five are in flight at once.

Resize the window and a new sky is generated for the new size.

Keys
  q, Esc      quit
  c           cycle text color
  s           cycle animation speed
  m           toggle meteors
  r           generate a new sky
  b           toggle the animated backdrop
  arrows      scroll
  PgUp/PgDn   scroll a page
  Home/End    jump to top or bottom

Pass --content <file> to show your own text here, or set `content` in
the config file.
";

/// A scrollable text page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    title: String,
    lines: Vec<String>,
    /// Index of the first visible row.
    offset: u16,
    /// Rows visible in the last rendered panel.
    visible: u16,
    /// Text width of the last rendered panel, used to count wrapped rows.
    wrap_width: u16,
}

impl Page {
    /// Build a page from raw text.
    pub fn from_text(title: impl Into<String>, text: &str) -> Self {
        Self {
            title: title.into(),
            lines: text.lines().map(str::to_string).collect(),
            offset: 0,
            visible: 0,
            wrap_width: 0,
        }
    }

    /// The built-in page.
    pub fn showcase() -> Self {
        Self::from_text("starfall", SHOWCASE)
    }

    /// Load `path`, or the built-in page when no path is given.
    pub fn load(path: Option<&Path>) -> color_eyre::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::showcase());
        };
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read content file {}", path.display()))?;
        let title = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "content".to_string());
        tracing::info!(path = %path.display(), lines = text.lines().count(), "loaded content");
        Ok(Self::from_text(title, &text))
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    fn paragraph(&self, color: Color) -> Paragraph<'_> {
        let text: Vec<Line> = self
            .lines
            .iter()
            .map(|line| Line::from(line.as_str()).fg(color))
            .collect();
        Paragraph::new(text).wrap(Wrap { trim: false })
    }

    /// Rows the text occupies once wrapped to the panel width.
    fn rendered_rows(&self) -> usize {
        if self.wrap_width == 0 {
            return self.lines.len();
        }
        self.paragraph(Color::Reset).line_count(self.wrap_width)
    }

    fn max_offset(&self) -> u16 {
        let rows = u16::try_from(self.rendered_rows()).unwrap_or(u16::MAX);
        rows.saturating_sub(self.visible.max(1))
    }

    /// Scroll by `delta` lines; returns whether the offset changed.
    pub fn scroll_by(&mut self, delta: i32) -> bool {
        let target = (i32::from(self.offset) + delta).clamp(0, i32::from(self.max_offset()));
        self.set_offset(target as u16)
    }

    pub fn page_size(&self) -> i32 {
        i32::from(self.visible.saturating_sub(1).max(1))
    }

    pub fn scroll_to_top(&mut self) -> bool {
        self.set_offset(0)
    }

    pub fn scroll_to_bottom(&mut self) -> bool {
        self.set_offset(self.max_offset())
    }

    fn set_offset(&mut self, offset: u16) -> bool {
        let changed = offset != self.offset;
        self.offset = offset;
        changed
    }

    /// Panel rectangle inside `area`, shifted by `shift` cells and kept on screen.
    pub fn panel_rect(area: Rect, shift: (i16, i16)) -> Rect {
        let width = area.width.saturating_sub(4).min(MAX_PANEL_WIDTH);
        let height = area.height.saturating_sub(4);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - height) / 2;

        let max_x = area.right().saturating_sub(width);
        let max_y = area.bottom().saturating_sub(height);
        let shift_x = (i32::from(x) + i32::from(shift.0)).clamp(i32::from(area.x), i32::from(max_x));
        let shift_y = (i32::from(y) + i32::from(shift.1)).clamp(i32::from(area.y), i32::from(max_y));
        Rect::new(shift_x as u16, shift_y as u16, width, height)
    }

    /// Render the panel into `area`, offset by the pointer tilt.
    pub fn render(&mut self, frame: &mut Frame, area: Rect, color: Color, shift: (i16, i16)) {
        let panel = Self::panel_rect(area, shift);
        if panel.width < 3 || panel.height < 3 {
            return;
        }
        self.visible = panel.height - 2;
        self.wrap_width = panel.width - 2;
        self.offset = self.offset.min(self.max_offset());

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(color).dim())
            .title(Line::from(format!(" {} ", self.title)).bold().fg(color));

        let paragraph = self.paragraph(color).block(block).scroll((self.offset, 0));
        frame.render_widget(paragraph, panel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    fn page(lines: usize, visible: u16) -> Page {
        let text: Vec<String> = (0..lines).map(|i| format!("line {i}")).collect();
        let mut page = Page::from_text("test", &text.join("\n"));
        page.visible = visible;
        page
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut page = page(30, 10);
        assert!(!page.scroll_by(-5));
        assert!(page.scroll_by(3));
        assert_eq!(page.offset(), 3);
        assert!(page.scroll_by(100));
        assert_eq!(page.offset(), 20);
        assert!(!page.scroll_by(1));
        assert!(page.scroll_to_top());
        assert_eq!(page.offset(), 0);
        assert!(page.scroll_to_bottom());
        assert_eq!(page.offset(), 20);
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_wrapped_page_scrolls_to_its_end() {
        let mut text: Vec<String> = (0..20)
            .map(|i| format!("paragraph {i} {}", "word ".repeat(18)))
            .collect();
        text.push("THE END".to_string());
        let mut page = Page::from_text("long", &text.join("\n"));
        let mut terminal = Terminal::new(TestBackend::new(44, 20)).unwrap();
        let draw = |page: &mut Page, terminal: &mut Terminal<TestBackend>| {
            terminal
                .draw(|frame| {
                    let area = frame.area();
                    page.render(frame, area, Color::White, (0, 0));
                })
                .unwrap();
        };

        draw(&mut page, &mut terminal);
        assert!(!screen_text(&terminal).contains("THE END"));
        assert!(page.scroll_to_bottom());
        // Every source line wraps, so the end lies past the raw line count
        assert!(usize::from(page.offset()) > page.lines.len());
        draw(&mut page, &mut terminal);
        assert!(screen_text(&terminal).contains("THE END"));
        assert!(!page.scroll_by(1));
    }

    #[test]
    fn test_short_page_does_not_scroll() {
        let mut page = page(5, 10);
        assert!(!page.scroll_by(4));
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_panel_is_centered_and_shift_clamped() {
        let area = Rect::new(0, 0, 100, 30);
        let panel = Page::panel_rect(area, (0, 0));
        assert_eq!(panel, Rect::new(14, 2, 72, 26));

        let shifted = Page::panel_rect(area, (2, 1));
        assert_eq!(shifted, Rect::new(16, 3, 72, 26));

        let clamped = Page::panel_rect(area, (100, -100));
        assert_eq!(clamped, Rect::new(28, 0, 72, 26));
    }

    #[test]
    fn test_showcase_has_text() {
        let page = Page::showcase();
        assert!(page.lines.len() > 10);
        assert_eq!(page.title, "starfall");
    }

    #[test]
    fn test_missing_content_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-content.txt");
        assert!(Page::load(Some(&missing)).is_err());
        assert_eq!(Page::load(None).unwrap(), Page::showcase());
    }

    #[test]
    fn test_load_titles_page_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "first\nsecond\n").unwrap();
        let page = Page::load(Some(&path)).unwrap();
        assert_eq!(page.title, "notes.txt");
        assert_eq!(page.lines, vec!["first", "second"]);
    }
}
