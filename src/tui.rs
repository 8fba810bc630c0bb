// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use crate::controller::{Controller, PendingFetch, Side, Surface, Trigger};
use crate::error::ConvertError;
use crate::models::{
    list_currencies, option_label, ConversionResult, CurrencyEntry, Flag, OTHERS_LABEL, POPULAR_LABEL,
};
use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::stream::{FuturesUnordered, StreamExt};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

const FADE: Duration = Duration::from_millis(300);
const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Amount,
    From,
    To,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Amount => Focus::From,
            Focus::From => Focus::To,
            Focus::To => Focus::Amount,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Amount => Focus::To,
            Focus::From => Focus::Amount,
            Focus::To => Focus::From,
        }
    }

    fn side(self) -> Option<Side> {
        match self {
            Focus::Amount => None,
            Focus::From => Some(Side::From),
            Focus::To => Some(Side::To),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ResultView {
    Empty,
    Loading,
    Shown { result: ConversionResult, since: Instant },
    Error,
}

/// What the result and flag regions currently show.
pub struct Display {
    result: ResultView,
    from_flag: Option<Flag>,
    to_flag: Option<Flag>,
}

impl Display {
    fn new() -> Self {
        Self {
            result: ResultView::Empty,
            from_flag: None,
            to_flag: None,
        }
    }

    fn is_fading(&self) -> bool {
        matches!(&self.result, ResultView::Shown { since, .. } if since.elapsed() < FADE)
    }
}

impl Surface for Display {
    fn render_loading(&mut self) {
        self.result = ResultView::Loading;
    }

    fn render(&mut self, result: &ConversionResult) {
        self.result = ResultView::Shown {
            result: result.clone(),
            since: Instant::now(),
        };
    }

    fn render_error(&mut self, _error: &ConvertError) {
        self.result = ResultView::Error;
    }

    fn update_flag(&mut self, side: Side, flag: &Flag) {
        match side {
            Side::From => self.from_flag = Some(flag.clone()),
            Side::To => self.to_flag = Some(flag.clone()),
        }
    }
}

pub struct App {
    controller: Controller,
    display: Display,
    focus: Focus,
    currencies: Vec<&'static CurrencyEntry>,
    popular_len: usize,
    in_flight: FuturesUnordered<PendingFetch>,
    should_quit: bool,
}

impl App {
    pub fn new(controller: Controller) -> App {
        let groups = list_currencies();
        App {
            controller,
            display: Display::new(),
            focus: Focus::Amount,
            popular_len: groups.popular.len(),
            currencies: groups.ordered().collect(),
            in_flight: FuturesUnordered::new(),
            should_quit: false,
        }
    }

    pub fn start(&mut self) {
        let pending = self.controller.start(&mut self.display);
        self.in_flight.push(pending);
    }

    fn trigger(&mut self, trigger: Trigger) {
        let pending = self.controller.handle(trigger, &mut self.display);
        self.in_flight.push(pending);
    }

    fn selected(&self, side: Side) -> &'static CurrencyEntry {
        let selection = self.controller.selection();
        match side {
            Side::From => selection.from,
            Side::To => selection.to,
        }
    }

    fn selected_index(&self, side: Side) -> usize {
        let current = self.selected(side);
        self.currencies
            .iter()
            .position(|entry| entry.code == current.code)
            .unwrap_or(0)
    }

    fn select(&mut self, side: Side, index: usize) {
        let entry = self.currencies[index];
        let trigger = match side {
            Side::From => Trigger::FromChanged(entry),
            Side::To => Trigger::ToChanged(entry),
        };
        self.trigger(trigger);
    }

    pub fn next(&mut self, side: Side) {
        let i = self.selected_index(side);
        let i = if i >= self.currencies.len() - 1 { 0 } else { i + 1 };
        self.select(side, i);
    }

    pub fn previous(&mut self, side: Side) {
        let i = self.selected_index(side);
        let i = if i == 0 { self.currencies.len() - 1 } else { i - 1 };
        self.select(side, i);
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('s') if ctrl => self.trigger(Trigger::Swap),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Enter => self.trigger(Trigger::Submit),
            code => match self.focus.side() {
                None => self.edit_amount(code),
                Some(side) => self.on_selector_key(side, code),
            },
        }
    }

    fn edit_amount(&mut self, code: KeyCode) {
        let mut input = self.controller.selection().amount_input.clone();
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            _ => return,
        }
        self.trigger(Trigger::AmountChanged(input));
    }

    fn on_selector_key(&mut self, side: Side, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.next(side),
            KeyCode::Up | KeyCode::Char('k') => self.previous(side),
            KeyCode::Char('s') => self.trigger(Trigger::Swap),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(TICK);
    app.start();

    loop {
        terminal.draw(|f| draw_ui(f, &app))?;
        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            Some(completion) = app.in_flight.next(), if !app.in_flight.is_empty() => {
                app.controller.complete(completion, &mut app.display);
            }
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => app.on_key(key),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            _ = tick.tick() => {}
        }
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn draw_ui(f: &mut Frame, app: &App) {
    let picker = app.focus.side();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(match picker {
            Some(_) => vec![Constraint::Min(40), Constraint::Length(38)],
            None => vec![Constraint::Min(40)],
        })
        .split(f.size());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Min(1),
        ])
        .split(columns[0]);

    let title = Paragraph::new("Currency Converter")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    let amount = Paragraph::new(app.controller.selection().amount_input.as_str()).block(
        Block::default()
            .title("Amount")
            .borders(Borders::ALL)
            .border_style(border_style(app.focus == Focus::Amount)),
    );
    f.render_widget(amount, chunks[1]);

    let flags = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    draw_currency(f, app, Side::From, flags[0]);
    draw_currency(f, app, Side::To, flags[1]);

    draw_result(f, app, chunks[3]);

    let help = Paragraph::new(
        "Tab focus · ↑/↓ currency · Enter convert · s/Ctrl-S swap · Esc quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[4]);

    if let Some(side) = picker {
        draw_picker(f, app, side, columns[1]);
    }
}

fn draw_currency(f: &mut Frame, app: &App, side: Side, area: Rect) {
    let (title, flag, focused) = match side {
        Side::From => ("From", &app.display.from_flag, app.focus == Focus::From),
        Side::To => ("To", &app.display.to_flag, app.focus == Focus::To),
    };
    let entry = app.selected(side);

    let mut lines = vec![Line::from(vec![
        Span::raw(flag.as_ref().map_or(String::new(), |flag| format!("{} ", flag.emoji))),
        Span::styled(option_label(entry), Style::default().add_modifier(Modifier::BOLD)),
    ])];
    if let Some(flag) = flag {
        lines.push(Line::from(Span::styled(
            flag.alt.clone(),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(Span::styled(
            flag.url.clone(),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(border_style(focused)),
    );
    f.render_widget(widget, area);
}

fn draw_result(f: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.display.result {
        ResultView::Empty => vec![Line::from("Press Enter to convert")],
        ResultView::Loading => vec![Line::from(Span::styled(
            "⟳ Getting exchange rate...",
            Style::default().fg(Color::Cyan),
        ))],
        ResultView::Shown { result, .. } => {
            let style = if app.display.is_fading() {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };
            let mut lines = vec![
                Line::from(Span::styled(result.amount_line(), style.add_modifier(Modifier::BOLD))),
                Line::from(Span::styled(result.rate_line(), style)),
            ];
            if let Some(table) = app.controller.last_rates() {
                let updated = table
                    .provider_updated
                    .clone()
                    .unwrap_or_else(|| table.fetched_at.format("%Y-%m-%d %H:%M:%S").to_string());
                lines.push(Line::from(Span::styled(
                    format!("Rates as of {}", updated),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines
        }
        ResultView::Error => vec![Line::from(Span::styled(
            format!("⚠ {}", ConvertError::USER_MESSAGE),
            Style::default().fg(Color::Red),
        ))],
    };

    let widget = Paragraph::new(lines).block(Block::default().title("Result").borders(Borders::ALL));
    f.render_widget(widget, area);
}

fn draw_picker(f: &mut Frame, app: &App, side: Side, area: Rect) {
    let header = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut items = Vec::with_capacity(app.currencies.len() + 2);
    items.push(ListItem::new(Line::from(Span::styled(POPULAR_LABEL, header))));
    for (i, entry) in app.currencies.iter().enumerate() {
        if i == app.popular_len {
            items.push(ListItem::new(Line::from(Span::styled(OTHERS_LABEL, header))));
        }
        items.push(ListItem::new(format!("  {}", option_label(entry))));
    }

    let index = app.selected_index(side);
    let row = if index < app.popular_len { index + 1 } else { index + 2 };
    let mut state = ListState::default();
    state.select(Some(row));

    let title = match side {
        Side::From => "From currency",
        Side::To => "To currency",
    };
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    f.render_stateful_widget(list, area, &mut state);
}

pub async fn start_tui(controller: Controller) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(controller);
    let res = run_app(&mut terminal, app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}
