use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use grade_calculator::{
    format_number, EditOutcome, EnterAction, Letter, Session, SessionStore, Summary, GRADING_SCALE,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;
use tracing::info;

/// Editable column of the subjects table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Credits,
    Marks,
}

impl Field {
    pub fn next(&self) -> Self {
        match self {
            Field::Name => Field::Credits,
            Field::Credits => Field::Marks,
            Field::Marks => Field::Name,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Field::Name => Field::Marks,
            Field::Credits => Field::Name,
            Field::Marks => Field::Credits,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Field::Name => "Subject Name",
            Field::Credits => "Credits",
            Field::Marks => "Marks (0-100)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Editing { buffer: String },
    ConfirmReset,
}

pub struct App {
    pub session: Session,
    pub store: Box<dyn SessionStore>,
    pub state: TableState,
    pub field: Field,
    pub mode: Mode,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        let session = Session::restore(store.as_ref());
        let mut state = TableState::default();
        state.select(Some(0));

        Self {
            session,
            store,
            state,
            field: Field::Name,
            mode: Mode::Browse,
            should_quit: false,
        }
    }

    pub fn selected(&self) -> usize {
        self.state
            .selected()
            .unwrap_or(0)
            .min(self.session.len().saturating_sub(1))
    }

    fn selected_id(&self) -> Option<String> {
        self.session.get(self.selected()).map(|s| s.id.clone())
    }

    pub fn summary(&self) -> Summary {
        self.session.summary()
    }

    fn persist(&self) {
        self.session.persist(self.store.as_ref());
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn next(&mut self) {
        let len = self.session.len();
        let i = if self.selected() >= len - 1 { 0 } else { self.selected() + 1 };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.session.len();
        let i = if self.selected() == 0 { len - 1 } else { self.selected() - 1 };
        self.state.select(Some(i));
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    pub fn begin_edit(&mut self) {
        let buffer = match self.session.get(self.selected()) {
            Some(subject) => match self.field {
                Field::Name => subject.name.clone(),
                Field::Credits => format_number(subject.credits),
                Field::Marks => subject.marks.map(format_number).unwrap_or_default(),
            },
            None => return,
        };
        self.mode = Mode::Editing { buffer };
    }

    /// Apply the edit buffer to the focused field. Rejected input is dropped.
    pub fn commit_edit(&mut self) -> EditOutcome {
        let buffer = match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Editing { buffer } => buffer,
            other => {
                self.mode = other;
                return EditOutcome::Rejected;
            }
        };
        let Some(id) = self.selected_id() else {
            return EditOutcome::Rejected;
        };

        let outcome = match self.field {
            Field::Name => self.session.update_name(&id, &buffer),
            Field::Credits => self.session.update_credits(&id, &buffer),
            Field::Marks => self.session.update_marks(&id, &buffer),
        };
        if outcome.is_applied() {
            self.persist();
        }
        outcome
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Browse;
    }

    pub fn add_subject(&mut self) {
        let index = self.session.add_subject();
        self.persist();
        self.state.select(Some(index));
        self.field = Field::Name;
    }

    pub fn clear_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            if self.session.clear_subject(&id) {
                self.persist();
            }
        }
    }

    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            if self.session.remove_subject(&id) {
                self.persist();
                let row = self.selected();
                self.state.select(Some(row));
            }
        }
    }

    pub fn request_reset(&mut self) {
        if !self.session.is_pristine() {
            self.mode = Mode::ConfirmReset;
        }
    }

    pub fn confirm_reset(&mut self) {
        self.session.reset_all_and_forget(self.store.as_ref());
        info!("session reset");
        self.state.select(Some(0));
        self.field = Field::Name;
        self.mode = Mode::Browse;
    }

    /// Enter on the marks column: next row, or a fresh one at the end
    fn advance_from_marks(&mut self) {
        let current = self.selected();
        let action = self.session.enter_pressed(current);
        let row = match action {
            EnterAction::Appended(row) => {
                self.persist();
                row
            }
            EnterAction::FocusRow(row) => row,
        };
        self.state.select(Some(row));
        self.field = Field::Name;
        self.begin_edit();
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::Editing { .. } => self.handle_edit_key(key),
            Mode::ConfirmReset => self.handle_confirm_key(key),
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => self.state.select(Some(0)),
            KeyCode::End => {
                let last = self.session.len() - 1;
                self.state.select(Some(last));
            }
            KeyCode::BackTab => self.field = self.field.previous(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.field = self.field.previous();
                } else {
                    self.field = self.field.next();
                }
            }
            KeyCode::Left => self.field = self.field.previous(),
            KeyCode::Right => self.field = self.field.next(),
            KeyCode::Enter | KeyCode::Char('e') => self.begin_edit(),
            KeyCode::Char('a') => self.add_subject(),
            KeyCode::Char('x') => self.clear_selected(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Char('R') => self.request_reset(),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.cancel_edit(),
            KeyCode::Enter => {
                self.commit_edit();
                if self.field == Field::Marks {
                    self.advance_from_marks();
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.commit_edit();
                self.field = if key.code == KeyCode::BackTab {
                    self.field.previous()
                } else {
                    self.field.next()
                };
                self.begin_edit();
            }
            KeyCode::Backspace => {
                if let Mode::Editing { buffer } = &mut self.mode {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Mode::Editing { buffer } = &mut self.mode {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => self.confirm_reset(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.mode = Mode::Browse,
            _ => {}
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            app.handle_key(key);
            if app.should_quit {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(4), // Summary cards
            Constraint::Min(5),    // Subjects
            Constraint::Length(4), // Grading scale
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0]);
    render_summary(f, chunks[1], &app.summary());
    render_table(f, chunks[2], app);
    render_scale(f, chunks[3]);
    render_status_bar(f, chunks[4], app);

    if app.mode == Mode::ConfirmReset {
        let area = f.size();
        render_confirm_dialog(f, area);
    }
}

pub fn letter_color(letter: Letter) -> Color {
    match letter {
        Letter::O => Color::Green,
        Letter::APlus => Color::LightGreen,
        Letter::A => Color::Cyan,
        Letter::BPlus => Color::Blue,
        Letter::B => Color::Magenta,
        Letter::C => Color::Red,
        Letter::P => Color::DarkGray,
        Letter::F => Color::Red,
    }
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "Grade Calculator",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            "Calculate your Semester Grade Point Average (SGPA)",
            Style::default().fg(Color::DarkGray),
        ),
    ])])
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_summary(f: &mut Frame, area: Rect, summary: &Summary) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" SGPA "))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(summary.progress())
        .label(summary.sgpa_display());
    f.render_widget(gauge, cards[0]);

    let percentage = Paragraph::new(Line::from(Span::styled(
        summary.percentage_display(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Percentage "));
    f.render_widget(percentage, cards[1]);

    let credits = Paragraph::new(Line::from(Span::styled(
        format_number(summary.total_credits),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().borders(Borders::ALL).title(" Total Credits "));
    f.render_widget(credits, cards[2]);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = [Field::Name, Field::Credits, Field::Marks]
        .into_iter()
        .map(|field| {
            let mut style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
            if field == app.field {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(field.title()).style(style)
        })
        .chain(std::iter::once(
            Cell::from("Grade").style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let selected = app.selected();
    let rows = app.session.subjects().iter().enumerate().map(|(i, subject)| {
        let value_for = |field: Field| -> String {
            match field {
                Field::Name if subject.name.is_empty() => "e.g., Artificial Intelligence".to_string(),
                Field::Name => truncate(&subject.name, 38),
                Field::Credits => format_number(subject.credits),
                Field::Marks => subject.marks.map(format_number).unwrap_or_else(|| "0-100".to_string()),
            }
        };

        let cells = [Field::Name, Field::Credits, Field::Marks].into_iter().map(|field| {
            let focused = i == selected && field == app.field;
            match (&app.mode, focused) {
                (Mode::Editing { buffer }, true) => Cell::from(format!("{}▏", buffer))
                    .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
                (_, true) => Cell::from(value_for(field))
                    .style(Style::default().add_modifier(Modifier::UNDERLINED)),
                _ => {
                    let placeholder = match field {
                        Field::Name => subject.name.is_empty(),
                        Field::Marks => subject.marks.is_none(),
                        Field::Credits => false,
                    };
                    let style = if placeholder {
                        Style::default().fg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    Cell::from(value_for(field)).style(style)
                }
            }
        });

        let grade_cell = match subject.grade() {
            Some(grade) => Cell::from(grade.letter.as_str()).style(
                Style::default()
                    .fg(letter_color(grade.letter))
                    .add_modifier(Modifier::BOLD),
            ),
            None => Cell::from("-"),
        };

        Row::new(cells.chain(std::iter::once(grade_cell)).collect::<Vec<_>>()).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(45),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Subjects "),
    )
    .highlight_style(Style::default().add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_scale(f: &mut Frame, area: Rect) {
    let spans_for = |bands: &[grade_calculator::ScaleBand]| -> Line<'static> {
        let mut spans = Vec::new();
        for band in bands {
            spans.push(Span::styled(
                format!(" {:<2}", band.letter.as_str()),
                Style::default()
                    .fg(letter_color(band.letter))
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(format!(" {:<10}", band.range_label)));
        }
        Line::from(spans)
    };

    let (top, bottom) = GRADING_SCALE.split_at(4);
    let legend = Paragraph::new(vec![spans_for(top), spans_for(bottom)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Grading Scale "),
    );

    f.render_widget(legend, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let status_spans = match app.mode {
        Mode::Editing { .. } => vec![
            Span::styled(" EDIT ", Style::default().fg(Color::Black).bg(Color::Yellow)),
            Span::raw(" "),
            key("Enter"),
            Span::raw(" Save | "),
            key("Tab"),
            Span::raw(" Next field | "),
            key("Esc"),
            Span::raw(" Cancel"),
        ],
        _ => {
            let mut spans = vec![
                Span::styled(
                    format!(" Row: {}/{} ", app.selected() + 1, app.session.len()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(" | "),
                key("Enter"),
                Span::raw(" Edit | "),
                key("Tab"),
                Span::raw(" Field | "),
                key("a"),
                Span::raw(" Add | "),
                key("x"),
                Span::raw(" Clear | "),
            ];
            if app.session.len() > 1 {
                spans.push(key("d"));
                spans.push(Span::raw(" Remove | "));
            }
            if !app.session.is_pristine() {
                spans.push(key("R"));
                spans.push(Span::raw(" Reset all | "));
            }
            spans.push(Span::styled("q", Style::default().fg(Color::Red)));
            spans.push(Span::raw(" Quit"));
            spans
        }
    };

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_confirm_dialog(f: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(50, 7, area);

    let content = vec![
        Line::from(Span::styled(
            "Are you absolutely sure?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("This will permanently delete all your data."),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red)),
            Span::raw(" Continue   "),
            Span::styled("n", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]),
    ];

    let dialog = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Reset All "),
        );

    f.render_widget(Clear, dialog_area);
    f.render_widget(dialog, dialog_area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (area.width as u32 * percent_x as u32 / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    }
}
