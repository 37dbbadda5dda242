use std::time::{Duration, Instant};

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear},
};
use tracing::debug;

/// How long a status message stays on screen.
pub const NOTIFICATION_LIFETIME: Duration = Duration::from_millis(3500);

/// A single short-lived status message, drawn over the top of the byte view.
#[derive(Default)]
pub struct Notifications {
    inner: Option<Notification>,
}

#[derive(Debug)]
struct Notification {
    text: String,
    color: Color,
    shown_at: Instant,
}

impl Notifications {
    /// Shows `text`, replacing whatever was shown before.
    pub fn notify<S: AsRef<str>>(&mut self, text: S, color: Color) {
        let text = text.as_ref();
        debug!("Notification: {text}, Color: {color}");
        self.inner = Some(Notification {
            text: text.to_owned(),
            color,
            shown_at: Instant::now(),
        });
    }
    pub fn is_some(&self) -> bool {
        self.inner.is_some()
    }
    /// Drops the current message once it has been up for [`NOTIFICATION_LIFETIME`].
    pub fn expire(&mut self) {
        if self
            .inner
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= NOTIFICATION_LIFETIME)
        {
            self.inner = None;
        }
    }
}

impl Widget for &Notifications {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(notification) = &self.inner else {
            return;
        };
        let width = (area.width / 2).max(notification.text.len() as u16 + 2);
        let bar = Rect {
            x: area.x + area.width.saturating_sub(width) / 2,
            y: area.y,
            width: width.min(area.width),
            height: area.height.min(2),
        };
        if bar.height == 0 {
            return;
        }

        Clear.render(bar, buf);
        let block = Block::new()
            .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
            .border_style(Style::from(notification.color));
        let inner = block.inner(bar);
        Line::raw(&notification.text).centered().render(inner, buf);
        block.render(bar, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expire_keeps_fresh_message() {
        let mut notifications = Notifications::default();
        assert!(!notifications.is_some());
        notifications.notify("No matches", Color::Yellow);
        notifications.expire();
        assert!(notifications.is_some());
    }

    #[test]
    fn test_expire_drops_old_message() {
        let mut notifications = Notifications::default();
        notifications.notify("No matches", Color::Yellow);
        if let Some(n) = notifications.inner.as_mut() {
            n.shown_at -= NOTIFICATION_LIFETIME;
        }
        notifications.expire();
        assert!(!notifications.is_some());
    }

    #[test]
    fn test_render_draws_text() {
        let mut notifications = Notifications::default();
        notifications.notify("hi", Color::Red);
        let area = Rect::new(0, 0, 20, 4);
        let mut buf = Buffer::empty(area);
        (&notifications).render(area, &mut buf);
        let top: String = (0..20).map(|x| buf[(x, 0)].symbol().to_owned()).collect();
        assert!(top.contains("hi"), "{top:?}");
    }
}
