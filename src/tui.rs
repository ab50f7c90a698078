use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;

use crate::error::Result;
use crate::fmt::ars;
use crate::models::{Kind, ViewMode};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);
pub const MUTED_STYLE: Style = Style::new().fg(Color::DarkGray);
pub const NOTICE_STYLE: Style = Style::new().fg(Color::Yellow);
pub const INCOME_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const EXPENSE_STYLE: Style = Style::new().fg(Color::Red);
pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);
const ACTIVE_TAB_STYLE: Style = Style::new().add_modifier(Modifier::BOLD.union(Modifier::REVERSED));

pub fn kind_style(kind: Kind) -> Style {
    match kind {
        Kind::Income => INCOME_STYLE,
        Kind::Expense => EXPENSE_STYLE,
    }
}

/// Signed peso amount: green above zero, red below, muted at zero.
pub fn money_span(amount: f64) -> Span<'static> {
    if amount < 0.0 {
        Span::styled(ars(amount), EXPENSE_STYLE)
    } else if amount > 0.0 {
        Span::styled(ars(amount), INCOME_STYLE)
    } else {
        Span::styled(ars(0.0), MUTED_STYLE)
    }
}

/// One tab per view, the active one reversed.
pub fn view_tabs(active: ViewMode) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for view in [ViewMode::Personal, ViewMode::Shared, ViewMode::Combined] {
        let style = if view == active { ACTIVE_TAB_STYLE } else { MUTED_STYLE };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!(" {} ", view.label()), style));
    }
    spans
}

pub enum ViewAction {
    Continue,
    Close,
}

pub trait TerminalView {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ViewAction;
}

/// Run a view until it closes or Ctrl-C. The terminal is restored on exit and on panic.
pub fn run_view(view: &mut dyn TerminalView) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    break Ok(());
                }
                if let ViewAction::Close = view.handle_key(key.code) {
                    break Ok(());
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}
