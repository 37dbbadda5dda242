use std::{
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::Duration,
};

use color_eyre::eyre::Result;
use ratatui::{
    Frame, Terminal,
    crossterm::event::{KeyCode, KeyEvent, KeyModifiers},
    layout::{Constraint, Layout, Rect, Size},
    prelude::Backend,
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use strum::VariantArray;
use tracing::{debug, error};

use crate::{
    display::Radix,
    engine::{EditingEngine, MemoryEngine},
    errors::ViewResult,
    indication::{IndicationRegistry, ViewportIndicator},
    notifications::Notifications,
    overlay::Selection,
    view::{DataView, QueryOptions},
};

pub enum Event {
    Crossterm(CrosstermEvent),
    Quit,
}

pub enum CrosstermEvent {
    Resize,
    KeyPress(KeyEvent),
    MouseScroll { up: bool },
}

impl From<CrosstermEvent> for Event {
    fn from(value: CrosstermEvent) -> Self {
        Self::Crossterm(value)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub enum RunningState {
    #[default]
    Running,
    Finished,
}

const MOUSE_SCROLL_LINES: i64 = 3;
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

const KEY_HELP: &[(&str, &str)] = &[
    ("Arrows", "Move cursor"),
    ("PgUp/PgDn", "Scroll a page"),
    ("Home/End", "Start/end of file"),
    ("n / N", "Next/previous match"),
    ("v", "Start/finish selection"),
    ("Esc", "Clear selection"),
    ("r", "Cycle byte radix"),
    ("a", "Cycle address radix"),
    ("?", "Toggle this help"),
    ("q", "Quit"),
];

pub struct App {
    state: RunningState,
    rx: Receiver<Event>,
    view: DataView<MemoryEngine>,
    options: QueryOptions,
    notifications: Notifications,
    /// File offset of the cursor.
    cursor: u64,
    show_help: bool,
}

impl App {
    pub fn new(rx: Receiver<Event>, view: DataView<MemoryEngine>, options: QueryOptions) -> Self {
        let cursor = view
            .search_results()
            .current()
            .unwrap_or_else(|| view.top());
        Self {
            state: RunningState::Running,
            rx,
            view,
            options,
            notifications: Notifications::default(),
            cursor,
            show_help: false,
        }
    }
    fn is_running(&self) -> bool {
        self.state == RunningState::Running
    }
    pub fn run(&mut self, mut terminal: Terminal<impl Backend>) -> Result<()> {
        if self.view.search_results().overflow() {
            let limit = self.options.limit;
            self.notifications
                .notify(format!("Over {limit} matches, showing the first {limit}"), Color::Yellow);
        }
        self.draw(&mut terminal)?;

        while self.is_running() {
            let msg = if self.notifications.is_some() {
                match self.rx.recv_timeout(FRAME_INTERVAL) {
                    Ok(msg) => Some(msg),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => Some(Event::Quit),
                }
            } else {
                Some(self.rx.recv().unwrap_or(Event::Quit))
            };
            match msg {
                Some(Event::Quit) => self.state = RunningState::Finished,
                Some(Event::Crossterm(CrosstermEvent::Resize)) => (),
                Some(Event::Crossterm(CrosstermEvent::KeyPress(key))) => self.handle_key_press(key),
                Some(Event::Crossterm(CrosstermEvent::MouseScroll { up })) => {
                    let lines = if up { -MOUSE_SCROLL_LINES } else { MOUSE_SCROLL_LINES };
                    let result = self.view.scroll_lines(lines);
                    self.report(result);
                }
                None => (),
            }
            self.notifications.expire();
            self.draw(&mut terminal)?
        }
        Ok(())
    }

    fn handle_key_press(&mut self, key: KeyEvent) {
        let bpr = self.view.bytes_per_row() as i64;
        let page = bpr * self.view.config().lines_displayed as i64;
        let result = match key.code {
            KeyCode::Char('q') => {
                self.state = RunningState::Finished;
                Ok(())
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state = RunningState::Finished;
                Ok(())
            }
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Up => self.move_cursor(-bpr),
            KeyCode::Down => self.move_cursor(bpr),
            KeyCode::PageUp => self.move_cursor(-page),
            KeyCode::PageDown => self.move_cursor(page),
            KeyCode::Home => self.set_cursor(0),
            KeyCode::End => self.set_cursor(self.last_offset()),
            KeyCode::Char('n') => self.step_hit(true),
            KeyCode::Char('N') => self.step_hit(false),
            KeyCode::Char('v') => self.toggle_selection(),
            KeyCode::Esc => self.view.set_selection(Selection::default()),
            KeyCode::Char('r') => {
                let radix = next_variant(self.view.config().radix, Radix::VARIANTS);
                self.view.set_radix(radix)
            }
            KeyCode::Char('a') => {
                let current = self.view.config().address_radix;
                let radix = next_variant(current, Radix::ADDRESS_VARIANTS);
                self.view.set_address_radix(radix);
                Ok(())
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                Ok(())
            }
            _ => Ok(()),
        };
        self.report(result);
    }

    /// Logs and surfaces a failed display update, leaving the previous display in place.
    fn report(&mut self, result: ViewResult<()>) {
        if let Err(e) = result {
            error!("Failed to update display: {e}");
            self.notifications.notify("Failed to update display", Color::Red);
        }
    }

    fn last_offset(&self) -> u64 {
        self.view.store().offset_max().saturating_sub(1)
    }

    fn move_cursor(&mut self, delta: i64) -> ViewResult<()> {
        let target = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as u64)
        };
        self.set_cursor(target)
    }

    /// Moves the cursor, scrolling it into view and extending a selection in progress.
    fn set_cursor(&mut self, offset: u64) -> ViewResult<()> {
        self.cursor = offset.min(self.last_offset());

        let bpr = self.view.bytes_per_row() as u64;
        let visible = bpr * self.view.config().lines_displayed as u64;
        let top = self.view.top();
        if self.cursor < top {
            self.view.seek(self.cursor)?;
        } else if self.cursor >= top + visible {
            self.view.seek(self.cursor - (visible - bpr))?;
        }

        let mut selection = *self.view.selection();
        if selection.making_selection() {
            selection.extend_to(self.cursor);
            self.view.set_selection(selection)?;
        }
        Ok(())
    }

    fn step_hit(&mut self, forward: bool) -> ViewResult<()> {
        let hit = if forward {
            self.view.select_next_hit()?
        } else {
            self.view.select_prev_hit()?
        };
        match hit {
            Some(offset) => {
                self.cursor = offset;
                let results = self.view.search_results();
                debug!("Match {} of {}", results.index() + 1, results.len());
            }
            None => self.notifications.notify("No matches", Color::Yellow),
        }
        Ok(())
    }

    fn toggle_selection(&mut self) -> ViewResult<()> {
        let mut selection = *self.view.selection();
        if selection.making_selection() {
            selection.commit();
        } else {
            selection = Selection::begin(self.cursor);
        }
        self.view.set_selection(selection)
    }

    pub fn draw(&mut self, terminal: &mut Terminal<impl Backend>) -> Result<()> {
        terminal.draw(|frame| self.render_app(frame))?;
        Ok(())
    }

    fn render_app(&mut self, frame: &mut Frame) {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        frame.render_widget(self.header_line(), header);
        frame.render_widget(Paragraph::new(self.body_lines()), body);
        frame.render_widget(self.footer_line(), footer);
        frame.render_widget(&self.notifications, body);

        if self.show_help {
            render_help(frame, body);
        }
    }

    fn header_line(&self) -> Line<'_> {
        let engine = self.view.engine();
        let name = engine.path().map(|p| p.as_str()).unwrap_or("<memory>");
        let config = self.view.config();
        Line::from(vec![
            Span::raw(name).bold(),
            Span::raw(format!(
                " | {} bytes | {} | addr {}",
                engine.file_size(),
                config.radix.short_name(),
                config.address_radix.short_name(),
            )),
        ])
        .reversed()
    }

    fn footer_line(&self) -> Line<'_> {
        let config = self.view.config();
        let mut spans = vec![Span::raw(format!(
            "Cursor: {}",
            config.address_radix.format(self.cursor)
        ))];
        let selection = self.view.selection();
        if let Some(range) = selection.highlighted() {
            spans.push(Span::raw(format!(
                " | Selected: {}-{} ({} bytes)",
                config.address_radix.format(*range.start()),
                config.address_radix.format(*range.end()),
                range.end() - range.start() + 1
            )));
        }
        let results = self.view.search_results();
        if !results.is_empty() {
            let overflow = if results.overflow() { "+" } else { "" };
            spans.push(Span::raw(format!(
                " | Match {}/{}{overflow}",
                results.index() + 1,
                results.len()
            )));
        } else if !self.view.replace_results().is_empty() {
            spans.push(Span::raw(format!(
                " | {} replaced",
                self.view.replace_results().len()
            )));
        }
        spans.push(Span::raw(" | ? for help").dark_gray());
        Line::from(spans)
    }

    fn body_lines(&self) -> Vec<Line<'static>> {
        let rendered = self.view.render();
        let registry = self.view.overlay().registry();
        let cells = self.view.visible_cells();
        let bpr = self.view.bytes_per_row();
        let width = address_width(&self.view);
        let physical_width = physical_row_width(self.view.config().radix, bpr);

        rendered
            .address
            .lines()
            .zip(rendered.physical.lines())
            .zip(rendered.logical.lines())
            .enumerate()
            .map(|(row, ((address, physical), logical))| {
                let first = row * bpr;
                let row_offset = self.view.top() + first as u64;
                let style_at = |column: usize| {
                    let cell = cells.get(first + column).copied().unwrap_or_default();
                    let mut style = indication_style(registry, cell);
                    if row_offset + column as u64 == self.cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    style
                };

                let mut spans = vec![Span::raw(format!("{address:>width$}  ")).dark_gray()];
                let mut used = 0;
                for (column, token) in physical.split(' ').enumerate() {
                    if column > 0 {
                        spans.push(Span::raw(" "));
                        used += 1;
                    }
                    spans.push(Span::styled(token.to_owned(), style_at(column)));
                    used += token.len();
                }
                spans.push(Span::raw(" ".repeat(physical_width - used + 2)));
                // Logical tokens are single characters joined by spaces.
                for (column, c) in logical.chars().step_by(2).enumerate() {
                    spans.push(Span::styled(c.to_string(), style_at(column)));
                }
                Line::from(spans)
            })
            .collect()
    }
}

fn render_help(frame: &mut Frame, area: Rect) {
    let width = KEY_HELP
        .iter()
        .map(|(key, action)| key.len() + action.len() + 3)
        .max()
        .unwrap_or_default() as u16
        + 2;
    let height = KEY_HELP.len() as u16 + 2;
    let area = centered_rect_size(Size::new(width, height), area);

    let lines: Vec<Line> = KEY_HELP
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::raw(*key).bold(),
                Span::raw(format!(" - {action}")),
            ])
        })
        .collect();
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(Block::new().borders(Borders::ALL).title("Keys")),
        area,
    );
}

/// A `size` rect centered in `parent`, shrunk to fit.
fn centered_rect_size(size: Size, parent: Rect) -> Rect {
    let width = size.width.min(parent.width);
    let height = size.height.min(parent.height);
    Rect {
        x: parent.x + (parent.width - width) / 2,
        y: parent.y + (parent.height - height) / 2,
        width,
        height,
    }
}

fn next_variant<T: Copy + PartialEq>(current: T, variants: &[T]) -> T {
    let index = variants.iter().position(|v| *v == current).unwrap_or(0);
    variants[(index + 1) % variants.len()]
}

fn indicator_style(indicator: ViewportIndicator) -> Style {
    match indicator {
        ViewportIndicator::Selected => Style::new().bg(Color::DarkGray),
        ViewportIndicator::SearchResult => Style::new().bg(Color::Yellow).fg(Color::Black),
        ViewportIndicator::Replacement => Style::new().bg(Color::Green).fg(Color::Black),
        ViewportIndicator::BytePos1b => Style::new()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    }
}

/// Combined style of every indication set in `cell`.
fn indication_style(registry: &IndicationRegistry, cell: u8) -> Style {
    registry
        .categories()
        .filter_map(|category| registry.css_selector_for(category, cell).ok())
        .filter_map(|selector| selector.parse::<ViewportIndicator>().ok())
        .fold(Style::new(), |style, indicator| {
            style.patch(indicator_style(indicator))
        })
}

fn address_width<E: EditingEngine>(view: &DataView<E>) -> usize {
    let config = view.config();
    config
        .address_radix
        .format(view.store().offset_max())
        .len()
        .max(4)
}

/// Characters in a full row of the byte column.
fn physical_row_width(radix: Radix, bytes_per_row: usize) -> usize {
    bytes_per_row * (radix.pad_width() + 1) - 1
}

/// Plain-text rendering of the visible rows, for `--dump`.
pub fn dump<E: EditingEngine>(view: &DataView<E>) -> String {
    let rendered = view.render();
    let width = address_width(view);
    let physical_width = physical_row_width(view.config().radix, view.bytes_per_row());
    rendered
        .address
        .lines()
        .zip(rendered.physical.lines())
        .zip(rendered.logical.lines())
        .map(|((address, physical), logical)| {
            format!("{address:>width$}  {physical:<physical_width$}  {logical}\n")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::view::ViewConfig;

    fn view(data: &[u8]) -> DataView<MemoryEngine> {
        let registry = Arc::new(IndicationRegistry::viewport_default().unwrap());
        DataView::new(MemoryEngine::new(data.to_vec()), registry, ViewConfig::default()).unwrap()
    }

    #[test]
    fn test_dump() {
        let view = view(b"Hello, world!\n\x00\xffmore");
        let dump = dump(&view);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "   0  48 65 6c 6c 6f 2c 20 77 6f 72 6c 64 21 0a 00 ff  H e l l o ,   w o r l d ! \u{2591} \u{2591} \u{ff}"
        );
        assert!(lines[1].starts_with("  10  6d 6f 72 65   "));
        assert!(lines[1].ends_with("  m o r e"));
    }

    #[test]
    fn test_indication_style() {
        let registry = IndicationRegistry::viewport_default().unwrap();
        assert_eq!(indication_style(&registry, 0), Style::new());

        let category = registry
            .category_by_indicator_name(ViewportIndicator::SearchResult)
            .unwrap();
        let cell = registry
            .packed_value(category, ViewportIndicator::SearchResult)
            .unwrap();
        assert_eq!(
            indication_style(&registry, cell),
            indicator_style(ViewportIndicator::SearchResult)
        );
    }

    #[test]
    fn test_centered_rect_size() {
        let parent = Rect::new(2, 1, 20, 10);
        assert_eq!(
            centered_rect_size(Size::new(10, 4), parent),
            Rect::new(7, 4, 10, 4)
        );
        assert_eq!(centered_rect_size(Size::new(30, 30), parent), parent);
    }

    #[test]
    fn test_next_variant() {
        assert_eq!(next_variant(Radix::Binary, Radix::VARIANTS), Radix::Octal);
        assert_eq!(next_variant(Radix::Hexadecimal, Radix::VARIANTS), Radix::Binary);
    }

    #[test]
    fn test_address_radix_skips_binary() {
        let mut radix = Radix::Hexadecimal;
        let mut seen = Vec::new();
        for _ in 0..4 {
            radix = next_variant(radix, Radix::ADDRESS_VARIANTS);
            seen.push(radix);
        }
        assert_eq!(
            seen,
            [Radix::Decimal, Radix::Octal, Radix::Hexadecimal, Radix::Decimal]
        );
    }
}
