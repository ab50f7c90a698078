use chrono::NaiveDate;
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::error::Result;
use crate::fmt::usd;
use crate::ledger::MonthCursor;
use crate::models::{Kind, ViewMode};
use crate::snapshot::{DashboardSnapshot, LedgerSource};
use crate::tui::{
    kind_style, money_span, run_view, view_tabs, TerminalView, ViewAction, HEADER_STYLE,
    MUTED_STYLE, NOTICE_STYLE, SELECTED_STYLE,
};

use super::summary::signed_amount;

/// Categories shown in the chart; the rest are still in the register.
const CHART_CATEGORIES: usize = 8;

struct Dashboard {
    source: LedgerSource,
    today: NaiveDate,
    snapshot: DashboardSnapshot,
    selected: usize,
    status_message: Option<String>,
}

impl Dashboard {
    fn new(source: LedgerSource, view: ViewMode, today: NaiveDate) -> Result<Self> {
        let (snapshot, fallback) =
            source.snapshot_or_personal(view, MonthCursor::current(today), today)?;
        Ok(Self {
            source,
            today,
            snapshot,
            selected: 0,
            status_message: fallback.map(|e| e.to_string()),
        })
    }

    /// Replace the snapshot for a new view or month. The old one is dropped whole.
    fn show(&mut self, view: ViewMode, cursor: MonthCursor) {
        match self.source.snapshot_or_personal(view, cursor, self.today) {
            Ok((snapshot, fallback)) => {
                self.snapshot = snapshot;
                self.selected = 0;
                self.status_message = fallback.map(|e| e.to_string());
            }
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    fn header_line(&self) -> Line<'static> {
        let snap = &self.snapshot;
        let first = snap.first_name();
        let mut spans = vec![Span::styled(
            if first.is_empty() {
                " economia".to_string()
            } else {
                format!(" Hello, {first}.")
            },
            HEADER_STYLE,
        )];
        spans.extend(view_tabs(snap.view));
        if let (ViewMode::Shared, Some(shared)) = (snap.view, &snap.shared) {
            spans.push(Span::styled(
                format!("  {} ({})", shared.name, shared.members),
                MUTED_STYLE,
            ));
        }
        Line::from(spans)
    }

    fn draw_stats(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let snap = &self.snapshot;
        let month_title = if snap.is_current_month {
            format!(" {} (current)", snap.cursor.label())
        } else {
            format!(" {}", snap.cursor.label())
        };
        let lines = vec![
            Line::from(Span::styled(month_title, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(vec![Span::raw(" Balance        "), money_span(snap.summary.balance)]),
            Line::from(vec![Span::raw(" Income         "), money_span(snap.summary.month_income)]),
            Line::from(vec![Span::raw(" Expenses       "), money_span(-snap.summary.month_expenses)]),
            Line::from(vec![Span::raw(" Net            "), money_span(snap.summary.month_net())]),
            Line::from(format!(" Dollars        {}", usd(snap.usd_balance))),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_breakdown(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let shares = self.snapshot.breakdown_shares();
        let block = Block::default()
            .title(" Expenses by Category")
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::NONE);

        if shares.is_empty() {
            frame.render_widget(
                Paragraph::new(vec![Line::from(""), Line::from(" No expenses this month.")])
                    .style(MUTED_STYLE)
                    .block(block),
                area,
            );
            return;
        }

        let bars: Vec<Bar> = shares
            .iter()
            .take(CHART_CATEGORIES)
            .map(|(name, total, pct)| {
                Bar::default()
                    .value(total.round().max(0.0) as u64)
                    .label(Line::from(format!(" {name}")))
                    .text_value(format!("{pct}%"))
                    .style(kind_style(Kind::Expense))
            })
            .collect();
        let chart = BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, area);
    }

    fn draw_register(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let rows = &self.snapshot.register;
        let mut lines = vec![Line::from(Span::styled(
            format!(" Transactions ({})", rows.len()),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        if rows.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(" Nothing recorded this month.", MUTED_STYLE)));
            frame.render_widget(Paragraph::new(lines), area);
            return;
        }

        let visible = area.height.saturating_sub(1) as usize;
        let start = self.selected.saturating_sub(visible.saturating_sub(1));
        for (i, entry) in rows.iter().enumerate().skip(start).take(visible) {
            let who = entry.author.as_deref().unwrap_or("");
            let mut line = Line::from(vec![
                Span::raw(format!(" {} ", entry.txn.occurred_at.format("%d/%m"))),
                Span::raw(format!("{:<28.28} ", entry.txn.description)),
                Span::styled(
                    format!("{:<14.14} ", entry.category.as_deref().unwrap_or("")),
                    MUTED_STYLE,
                ),
                Span::styled(format!("{who:<8.8} "), MUTED_STYLE),
                Span::styled(format!("{:>16}", signed_amount(entry)), kind_style(entry.txn.kind)),
            ]);
            if i == self.selected {
                line = line.style(SELECTED_STYLE);
            }
            lines.push(line);
        }
        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl TerminalView for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = MUTED_STYLE;

        let [header_area, sep1, body_area, sep2, register_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(10),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(Paragraph::new(self.header_line()), header_area);

        let sep_line = "━".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget, sep2);

        let [stats_area, chart_area] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(body_area);
        self.draw_stats(frame, stats_area);
        self.draw_breakdown(frame, chart_area);
        self.draw_register(frame, register_area);

        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(NOTICE_STYLE),
                hints_area,
            );
        } else {
            frame.render_widget(
                Paragraph::new(
                    " Left/Right=month  1/2/3 or Tab=view  Up/Down=scroll  q=quit",
                )
                .style(MUTED_STYLE),
                hints_area,
            );
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        let view = self.snapshot.view;
        let mut cursor = self.snapshot.cursor;
        self.status_message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Left | KeyCode::Char('h') => {
                cursor.prev();
                self.show(view, cursor);
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if cursor.next(self.today) {
                    self.show(view, cursor);
                } else {
                    self.status_message = Some("Already at the current month.".to_string());
                }
            }
            KeyCode::Char('1') => self.show(ViewMode::Personal, cursor),
            KeyCode::Char('2') => self.show(ViewMode::Shared, cursor),
            KeyCode::Char('3') => self.show(ViewMode::Combined, cursor),
            KeyCode::Tab => self.show(view.next(), cursor),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                let last = self.snapshot.register.len().saturating_sub(1);
                self.selected = (self.selected + 1).min(last);
            }
            _ => {}
        }
        ViewAction::Continue
    }
}

pub fn run(view: ViewMode) -> Result<()> {
    let (settings, conn, profile) = super::open_session()?;
    let source = LedgerSource::load(&conn, profile, settings.ledger_limit)?;
    drop(conn);

    let mut dashboard = Dashboard::new(source, view, super::today())?;
    run_view(&mut dashboard)
}
