use ratatui::style::{Color, Modifier, Style};

// Tab bar
pub const TAB_ACTIVE: Style = Style::new().fg(Color::Black).bg(Color::Cyan);
pub const TAB_INACTIVE: Style = Style::new().fg(Color::Gray).bg(Color::DarkGray);

// Status bar
pub const STATUS_BAR: Style = Style::new().fg(Color::White).bg(Color::DarkGray);
pub const STATUS_ERROR: Style = Style::new().fg(Color::Red).bg(Color::DarkGray);

// List items
pub const LIST_SELECTED: Style = Style::new()
    .fg(Color::White)
    .bg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);
pub const LIST_NORMAL: Style = Style::new().fg(Color::White);

// Borders
pub const BORDER_ACTIVE: Style = Style::new().fg(Color::Cyan);
pub const BORDER_INACTIVE: Style = Style::new().fg(Color::DarkGray);

// Help overlay
pub const HELP_TITLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const HELP_KEY: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
pub const HELP_DESC: Style = Style::new().fg(Color::White);

// Footer hints
pub const HINT_KEY: Style = Style::new().fg(Color::Yellow).bg(Color::DarkGray);
pub const HINT_DESC: Style = Style::new().fg(Color::Gray).bg(Color::DarkGray);

// Empty state
pub const EMPTY_STATE: Style = Style::new().fg(Color::DarkGray);

// Branch label
pub const BRANCH_LABEL: Style = Style::new().fg(Color::Yellow);

// PRs
pub const PR_APPROVED: Style = Style::new().fg(Color::Green);
pub const PR_CHANGES_REQUESTED: Style = Style::new().fg(Color::Red);
pub const PR_PENDING_REVIEW: Style = Style::new().fg(Color::Yellow);
pub const PR_DRAFT: Style = Style::new().fg(Color::DarkGray);
pub const PR_SIZE: Style = Style::new().fg(Color::Magenta);

// Jira
pub const JIRA_TODO: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);
pub const JIRA_IN_PROGRESS: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const JIRA_DONE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
pub const JIRA_BUG: Style = Style::new().fg(Color::Red);
pub const JIRA_STORY: Style = Style::new().fg(Color::Green);
pub const JIRA_TASK: Style = Style::new().fg(Color::Blue);
pub const SEARCH_INPUT: Style = Style::new().fg(Color::Yellow);
pub const POPUP: Style = Style::new().fg(Color::White).bg(Color::DarkGray);

// Sprint group headers in the browser
pub const SPRINT_ACTIVE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
pub const SPRINT_OTHER: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const SPRINT_BACKLOG: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::BOLD);

// Duck mascot
pub const DUCK: Style = Style::new().fg(Color::Yellow).bg(Color::DarkGray);

// Modal input fields
pub const FIELD_ACTIVE: Style = Style::new().fg(Color::Yellow);
pub const FIELD_INACTIVE: Style = Style::new().fg(Color::Gray);
