use tui::layout::{Constraint, Layout, Rect, Size};
pub const TAB_BAR_HEIGHT: u16 = 3;
pub const STATUS_LINE_HEIGHT: u16 = 1;
pub const LOG_PANE_HEIGHT: u16 = 8;

/// Pre-computed layout areas for the main draw loop.
pub struct LayoutAreas {
    pub tab_bar: [Rect; 2],
    pub main: Rect,
    /// Errors, notices and the text input prompt.
    pub status: Rect,
    pub logs: Option<Rect>,
}

impl LayoutAreas {
    pub fn new(size: Size) -> Self {
        let rect = Rect::new(0, 0, size.width, size.height);
        Self::from_rect(rect, false, false)
    }

    pub fn update(&mut self, area: Rect, full_screen: bool, show_logs: bool) {
        *self = Self::from_rect(area, full_screen, show_logs);
    }

    fn from_rect(area: Rect, full_screen: bool, show_logs: bool) -> Self {
        let tab_height = if full_screen { 0 } else { TAB_BAR_HEIGHT };
        let log_height = if show_logs { LOG_PANE_HEIGHT } else { 0 };

        let [tab, main, logs, status] = Layout::vertical([
            Constraint::Length(tab_height),
            Constraint::Fill(1),
            Constraint::Length(log_height),
            Constraint::Length(STATUS_LINE_HEIGHT),
        ])
        .areas(area);

        LayoutAreas {
            tab_bar: if full_screen { [Rect::ZERO, Rect::ZERO] } else { Self::split_tab_bar(tab) },
            main,
            status,
            logs: show_logs.then_some(logs),
        }
    }

    fn split_tab_bar(area: Rect) -> [Rect; 2] {
        Layout::horizontal([Constraint::Percentage(85), Constraint::Percentage(15)]).areas(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_pane_sits_above_status_line() {
        let mut layout = LayoutAreas::new(Size::new(100, 40));
        assert!(layout.logs.is_none());
        assert_eq!(layout.tab_bar[0].height, TAB_BAR_HEIGHT);

        layout.update(Rect::new(0, 0, 100, 40), false, true);
        let logs = layout.logs.unwrap();
        assert_eq!(logs.height, LOG_PANE_HEIGHT);
        assert_eq!(layout.status.y, 39);
        assert_eq!(logs.y + logs.height, layout.status.y);
        assert_eq!(layout.main.height, 40 - TAB_BAR_HEIGHT - LOG_PANE_HEIGHT - STATUS_LINE_HEIGHT);
    }

    #[test]
    fn full_screen_drops_tab_bar() {
        let mut layout = LayoutAreas::new(Size::new(80, 24));
        layout.update(Rect::new(0, 0, 80, 24), true, false);
        assert_eq!(layout.tab_bar[0], Rect::ZERO);
        assert_eq!(layout.main.y, 0);
    }
}
