use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::{theme, util};

const HELP_ENTRIES: &[(&str, &str)] = &[
    ("1-5", "Jump to view by number"),
    ("Tab / Shift+Tab", "Cycle views"),
    ("j/k  Up/Down", "Navigate list / scroll"),
    ("h/l  Left/Right", "Switch panes"),
    ("Enter", "Select item"),
    ("n", "New PR for current branch (GitHub)"),
    ("r", "Refresh current view"),
    ("o", "Open in browser"),
    ("y", "Copy link"),
    ("t", "Link a ticket (Jira)"),
    ("s", "Change ticket status (Jira)"),
    ("d", "Unlink ticket / delete view"),
    ("c", "Configure Jira"),
    ("/", "Filter issues (Browser)"),
    ("u / m / x", "Unassigned / Mine / clear filters (Browser)"),
    ("L", "Load more issues (Browser)"),
    ("a", "Add saved view (Browser)"),
    ("e", "Rename saved view (Browser)"),
    ("?", "Toggle this help"),
    ("q / Ctrl+C", "Quit"),
];

pub fn draw_help(f: &mut Frame, area: Rect) {
    let height = HELP_ENTRIES.len() as u16 + 4;
    let popup = util::centered_rect(area, 56, height);
    f.render_widget(Clear, popup);

    let mut lines = vec![Line::from("")];
    for (key, desc) in HELP_ENTRIES {
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<18}", key), theme::HELP_KEY),
            Span::styled(*desc, theme::HELP_DESC),
        ]));
    }

    let block = Block::default()
        .title(" Keybindings ")
        .borders(Borders::ALL)
        .border_style(theme::HELP_TITLE);
    f.render_widget(Paragraph::new(lines).block(block), popup);
}
