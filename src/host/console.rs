//! Terminal rendering of status indicators and notifications.

use async_trait::async_trait;
use console::{Color, Style};

use super::{NotificationResponse, Ui};
use crate::actions::StatusItem;

/// Writes status lines, notifications and diagnostics to stderr.
///
/// A terminal has no clickable affordance, so notifications resolve as
/// dismissed right after they are printed.
#[derive(Debug, Default, Clone)]
pub struct ConsoleUi {
    colors: bool,
}

impl ConsoleUi {
    pub fn new() -> Self {
        Self {
            colors: console::colors_enabled_stderr(),
        }
    }

    /// Force colors on or off.
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    fn style(&self, color: Option<&str>, background: Option<&str>) -> Style {
        let mut style = Style::new().for_stderr();
        if !self.colors {
            return style.force_styling(false);
        }
        if let Some(fg) = color.and_then(named_color) {
            style = style.fg(fg);
        }
        if let Some(bg) = background.and_then(named_color) {
            style = style.bg(bg);
        }
        style
    }

    /// Single-line rendering of a status indicator.
    pub fn render_status(&self, item: &StatusItem) -> String {
        let label = item.name.as_deref().unwrap_or(&item.id);
        let text = self
            .style(item.color.as_deref(), item.background_color.as_deref())
            .apply_to(&item.text);
        match &item.tooltip {
            Some(tooltip) => format!("[{label}] {text} ({tooltip})"),
            None => format!("[{label}] {text}"),
        }
    }
}

/// Map a color name to a terminal color. Theme ids and hex colors are not
/// representable and render unstyled.
fn named_color(name: &str) -> Option<Color> {
    match name.trim().to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" | "purple" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        _ => None,
    }
}

#[async_trait]
impl Ui for ConsoleUi {
    fn show_status(&self, item: &StatusItem) {
        eprintln!("{}", self.render_status(item));
    }

    fn hide_status(&self, id: &str) {
        crate::debug_event!("status", "hidden", "{id}");
    }

    async fn notify(&self, message: &str, open_label: &str) -> NotificationResponse {
        let accent = self.style(Some("cyan"), None).bold();
        eprintln!("{} {message} [{open_label}]", accent.apply_to("notify:"));
        NotificationResponse::Dismissed
    }

    fn show_error(&self, message: &str) {
        let accent = self.style(Some("red"), None).bold();
        eprintln!("{} {message}", accent.apply_to("error:"));
        tracing::warn!("{message}");
    }
}
