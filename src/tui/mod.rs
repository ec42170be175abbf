//! TUI module - Terminal dashboard with ratatui

use std::io::{Stdout, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::ValueEnum;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState, Tabs, Wrap},
};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::warn;

use crate::ai::GenerativeService;
use crate::coach::{Coach, Role};
use crate::enrichment::{DetailUpdate, ExerciseDetail, Panel, stream_detail};
use crate::exercises::{Exercise, MuscleGroup, filter_exercises, muscle_groups};
use crate::generator::{ALLOWED_DAYS, GeneratorStep, RoutineGenerator};
use crate::models::{GOALS, ProfileField};
use crate::planner::{self, DeleteOutcome, ExerciseField, Planner, WorkoutState};
use crate::session::{Session, Tab};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const NO_SERVICE: &str = "GEMINI_API_KEY não configurada";

/// Questionnaire rows on the generator tab
const GENERATOR_FIELDS: &[&str] = &["Dias por semana", "Intensidade", "Experiência", "Foco", "Equipamento"];

/// Active text input, if any
enum Input {
    None,
    Search,
    Rename(String),
    Profile(ProfileField, String),
    Chat(String),
}

/// Remote work queued by a key press, run outside the draw loop
enum Pending {
    Generate,
    Coach(String),
}

/// App state for TUI
pub struct App {
    session: Session,
    planner: Planner,
    service: Option<Arc<dyn GenerativeService>>,
    detail: Option<ExerciseDetail>,
    updates: Option<mpsc::Receiver<DetailUpdate>>,
    generator: RoutineGenerator,
    generator_cursor: usize,
    coach: Option<Coach>,
    pending: Option<Pending>,
    input: Input,
    workout_cursor: usize,
    exercise_cursor: usize,
    library_cursor: usize,
    profile_cursor: usize,
    search: String,
    muscle: Option<MuscleGroup>,
    status: String,
    should_quit: bool,
}

fn step(cursor: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        0
    } else if down {
        (cursor + 1).min(len - 1)
    } else {
        cursor.saturating_sub(1)
    }
}

fn value_name<T: ValueEnum>(value: T) -> String {
    value
        .to_possible_value()
        .map(|v| v.get_name().to_string())
        .unwrap_or_default()
}

fn cycle<T: ValueEnum + PartialEq + Copy>(current: T, forward: bool) -> T {
    let variants = T::value_variants();
    let n = variants.len();
    let i = variants.iter().position(|v| *v == current).unwrap_or(0);
    if forward { variants[(i + 1) % n] } else { variants[(i + n - 1) % n] }
}

fn cycle_days(days: u8, forward: bool) -> u8 {
    let (lo, hi) = (*ALLOWED_DAYS.start(), *ALLOWED_DAYS.end());
    match (forward, days) {
        (true, d) if d >= hi => lo,
        (true, d) => d + 1,
        (false, d) if d <= lo => hi,
        (false, d) => d - 1,
    }
}

fn next_goal(current: &str) -> &'static str {
    match GOALS.iter().position(|g| *g == current) {
        Some(i) => GOALS[(i + 1) % GOALS.len()],
        None => GOALS[0],
    }
}

impl App {
    /// Dashboard over an authenticated session. Without a service the
    /// library has no exercise detail view.
    pub fn new(session: Session, service: Option<Arc<dyn GenerativeService>>) -> Self {
        Self {
            session,
            planner: Planner::new(),
            service,
            detail: None,
            updates: None,
            generator: RoutineGenerator::default(),
            generator_cursor: 0,
            coach: None,
            pending: None,
            input: Input::None,
            workout_cursor: 0,
            exercise_cursor: 0,
            library_cursor: 0,
            profile_cursor: 0,
            search: String::new(),
            muscle: None,
            status: String::new(),
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run the TUI application. Needs a multi-threaded tokio runtime.
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let runtime = Handle::current();

        while !self.should_quit {
            self.planner.expire(Instant::now());
            self.poll_detail();
            if self.pending.is_some() {
                self.status = "Processando...".to_string();
                terminal.draw(|frame| self.render(frame))?;
                tokio::task::block_in_place(|| runtime.block_on(self.run_pending()));
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        restore_terminal()?;
        Ok(())
    }

    fn poll_detail(&mut self) {
        let (Some(rx), Some(detail)) = (self.updates.as_mut(), self.detail.as_mut()) else {
            return;
        };
        while let Ok(update) = rx.try_recv() {
            detail.apply(update);
        }
        if detail.is_complete() {
            self.updates = None;
        }
    }

    /// Run whatever a key press queued
    async fn run_pending(&mut self) {
        match self.pending.take() {
            Some(Pending::Generate) => self.generate().await,
            Some(Pending::Coach(message)) => self.ask_coach(&message).await,
            None => {}
        }
    }

    async fn generate(&mut self) {
        let Some(service) = self.service.clone() else {
            self.status = NO_SERVICE.to_string();
            return;
        };
        self.status = match self.session.generate(&mut self.generator, service.as_ref()).await {
            Ok(count) => format!("Rotina gerada: {count} treinos. s: salvar | Esc: descartar"),
            Err(e) => e.to_string(),
        };
    }

    async fn ask_coach(&mut self, message: &str) {
        let Some(service) = self.service.clone() else {
            self.status = NO_SERVICE.to_string();
            return;
        };
        if let Some(coach) = self.coach.as_mut() {
            coach
                .send(service.as_ref(), message, self.session.profile(), self.session.workouts())
                .await;
        }
        self.status.clear();
    }

    fn open_coach(&mut self) {
        if self.coach.is_none() {
            self.coach = Some(Coach::new(self.session.profile()));
        }
        self.input = Input::Chat(String::new());
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.planner.disarm();
        self.session.set_tab(tab);
        self.status.clear();
    }

    fn logout(&mut self) {
        self.session.logout();
        self.planner = Planner::new();
        self.generator = RoutineGenerator::default();
        self.coach = None;
        self.close_detail();
        self.should_quit = true;
    }

    fn open_detail(&mut self, exercise: &'static Exercise) {
        let Some(service) = &self.service else {
            self.status = NO_SERVICE.to_string();
            return;
        };
        self.detail = Some(ExerciseDetail::new(exercise));
        self.updates = Some(stream_detail(service.clone(), exercise));
    }

    fn close_detail(&mut self) {
        self.detail = None;
        self.updates = None;
    }

    fn library(&self) -> Vec<&'static Exercise> {
        filter_exercises(&self.search, self.muscle)
    }

    fn highlighted_workout(&self) -> Option<String> {
        match self.planner.selected() {
            Some(id) => Some(id.to_string()),
            None => self.session.workouts().get(self.workout_cursor).map(|w| w.id.clone()),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(3)])
            .split(frame.area());

        let tabs = Tab::all();
        let selected = tabs.iter().position(|t| *t == self.session.tab()).unwrap_or(0);
        let titles: Vec<String> = tabs
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} {}", i + 1, t.title()))
            .collect();
        let header = Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(Color::Magenta).bold())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("FitPlanner - {}", self.session.identity().unwrap_or("-"))),
            );
        frame.render_widget(header, chunks[0]);

        let body = if let (Input::Chat(draft), Some(coach)) = (&self.input, &self.coach) {
            let split = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);
            self.render_coach(frame, split[1], coach, draft);
            split[0]
        } else {
            chunks[1]
        };

        match self.session.tab() {
            Tab::Library => self.render_library(frame, body),
            Tab::Profile => self.render_profile(frame, body),
            Tab::AiGenerator => self.render_generator(frame, body),
            Tab::Routines => self.render_routines(frame, body),
        }

        let help = match (&self.input, self.session.tab()) {
            (Input::Search, _) => "type to search | Enter/Esc: done",
            (Input::Rename(_), _) | (Input::Profile(..), _) => "Enter: save | Esc: cancel",
            (Input::Chat(_), _) => "Enter: send | Esc: close coach",
            (_, Tab::Library) => "/: search | m: muscle | Enter: detail | Esc: close | a: add to workout | c: coach | q: quit",
            (_, Tab::Profile) => "Enter: edit field | c: coach | L: logout | q: quit",
            (_, Tab::AiGenerator) => match self.generator.step() {
                GeneratorStep::Questionnaire => "Up/Down: field | Left/Right: change | g: generate | c: coach | q: quit",
                GeneratorStep::Review(_) => "s: save routine | Esc: discard | q: quit",
            },
            _ => "n: new | Enter: open | Esc: close | r: rename | d: delete | K/J: move | +/-: sets | x: remove | c: coach | q: quit",
        };
        let footer_text = if self.status.is_empty() {
            help.to_string()
        } else {
            format!("{}  |  {}", self.status, help)
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }

    fn render_routines(&self, frame: &mut Frame, area: Rect) {
        let now = Instant::now();
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let items: Vec<ListItem> = self
            .session
            .workouts()
            .iter()
            .map(|w| {
                let (marker, style) = match self.planner.state(&w.id, now) {
                    WorkoutState::PendingDelete => ("! ", Style::default().fg(Color::Red).bold()),
                    WorkoutState::Editing => ("> ", Style::default().fg(Color::Magenta)),
                    WorkoutState::NotSelected => ("  ", Style::default()),
                };
                ListItem::new(format!("{marker}{} ({})", w.title, w.exercises.len())).style(style)
            })
            .collect();
        let mut list_state = ListState::default();
        if self.planner.selected().is_none() && !items.is_empty() {
            list_state.select(Some(self.workout_cursor));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Treinos"))
            .highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(list, chunks[0], &mut list_state);

        let workout = self
            .planner
            .selected()
            .and_then(|id| self.session.workouts().iter().find(|w| w.id == id));
        let Some(workout) = workout else {
            let hint = Paragraph::new("Selecione um treino (Enter) ou crie um novo (n)")
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(hint, chunks[1]);
            return;
        };

        let title = match &self.input {
            Input::Rename(buffer) => format!("{buffer}_"),
            _ => workout.title.clone(),
        };
        let rows: Vec<Row> = workout
            .exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                Row::new(vec![
                    Cell::from(format!("{}", i + 1)),
                    Cell::from(ex.name.clone()),
                    Cell::from(ex.sets.to_string()),
                    Cell::from(ex.reps.clone()),
                    Cell::from(ex.rest.clone()),
                ])
            })
            .collect();
        let mut table_state = TableState::default();
        if !workout.exercises.is_empty() {
            table_state.select(Some(self.exercise_cursor));
        }
        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Min(20),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(8),
            ],
        )
        .header(Row::new(vec!["#", "Exercício", "Sets", "Reps", "Rest"]).style(Style::default().bold()))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_stateful_widget(table, chunks[1], &mut table_state);
    }

    fn render_library(&self, frame: &mut Frame, area: Rect) {
        let exercises = self.library();
        let rows: Vec<Row> = exercises
            .iter()
            .map(|e| {
                Row::new(vec![
                    Cell::from(e.id),
                    Cell::from(e.name),
                    Cell::from(e.muscle.label()),
                    Cell::from(e.instructions),
                ])
            })
            .collect();
        let mut state = TableState::default();
        if !exercises.is_empty() {
            state.select(Some(self.library_cursor.min(exercises.len() - 1)));
        }
        let title = format!(
            "{} exercícios | busca: {}{} | músculo: {}",
            exercises.len(),
            self.search,
            if matches!(self.input, Input::Search) { "_" } else { "" },
            self.muscle.map(|m| m.label()).unwrap_or("Todos"),
        );
        let table = Table::new(
            rows,
            [
                Constraint::Length(8),
                Constraint::Length(36),
                Constraint::Length(18),
                Constraint::Min(20),
            ],
        )
        .header(Row::new(vec!["ID", "Nome", "Músculo", "Instruções"]).style(Style::default().bold()))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title));

        let Some(detail) = &self.detail else {
            frame.render_stateful_widget(table, area, &mut state);
            return;
        };
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        frame.render_stateful_widget(table, chunks[0], &mut state);
        self.render_detail(frame, chunks[1], detail);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect, detail: &ExerciseDetail) {
        let mut lines = vec![
            Line::from(detail.exercise.instructions),
            Line::from(""),
        ];

        match &detail.image {
            Panel::Loading => lines.push(Line::from("Imagem: gerando...")),
            Panel::Ready(image) => lines.push(Line::from(format!(
                "Imagem: {} {} ({} bytes)",
                image.mime_type,
                image.aspect_ratio,
                image.data.len()
            ))),
            Panel::Failed(msg) => lines.push(Line::from(format!("Imagem: {msg}"))),
        }
        lines.push(Line::from(""));

        match &detail.analysis {
            Panel::Loading => lines.push(Line::from("Análise: carregando...")),
            Panel::Ready(a) => {
                lines.push(Line::from("Execução").bold());
                lines.extend(a.execution.lines().map(|l| Line::from(l.to_string())));
                lines.push(Line::from(format!("Músculos: {}", a.muscles)));
                lines.push(Line::from(format!("Dica: {}", a.tip)).fg(Color::Yellow));
            }
            Panel::Failed(msg) => lines.push(Line::from(format!("Análise: {msg}"))),
        }
        lines.push(Line::from(""));

        match &detail.videos {
            Panel::Loading => lines.push(Line::from("Vídeos: buscando...")),
            Panel::Ready(videos) if !videos.is_empty() => {
                for v in videos {
                    lines.push(Line::from(format!("{} - {}", v.title, v.uri)));
                }
            }
            Panel::Ready(_) => lines.push(Line::from(format!("Buscar no YouTube: {}", detail.search_url()))),
            Panel::Failed(msg) => lines.push(Line::from(format!("Vídeos: {msg}"))),
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(detail.exercise.name));
        frame.render_widget(paragraph, area);
    }

    fn render_generator(&self, frame: &mut Frame, area: Rect) {
        match self.generator.step() {
            GeneratorStep::Questionnaire => {
                let q = &self.generator.questionnaire;
                let values = [
                    q.days_per_week().to_string(),
                    value_name(q.intensity),
                    value_name(q.experience),
                    value_name(q.focus),
                    value_name(q.equipment),
                ];
                let items: Vec<ListItem> = GENERATOR_FIELDS
                    .iter()
                    .zip(values)
                    .map(|(label, value)| ListItem::new(format!("{label:18} < {value} >")))
                    .collect();
                let mut state = ListState::default();
                state.select(Some(self.generator_cursor));
                let goal = match self.session.profile().goal.as_str() {
                    "" => "defina no Perfil".to_string(),
                    goal => goal.to_string(),
                };
                let list = List::new(items)
                    .block(Block::default().borders(Borders::ALL).title(format!("Arquiteto IA | objetivo: {goal}")))
                    .highlight_style(Style::default().bg(Color::DarkGray));
                frame.render_stateful_widget(list, area, &mut state);
            }
            GeneratorStep::Review(routine) => {
                let mut lines = Vec::new();
                for workout in routine {
                    lines.push(Line::from(workout.title.clone()).bold());
                    for ex in &workout.exercises {
                        lines.push(Line::from(format!("  {} {}x{} | {}", ex.name, ex.sets, ex.reps, ex.rest)));
                    }
                    lines.push(Line::from(""));
                }
                let paragraph = Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::ALL).title("Rotina sugerida"));
                frame.render_widget(paragraph, area);
            }
        }
    }

    fn render_coach(&self, frame: &mut Frame, area: Rect, coach: &Coach, draft: &str) {
        let mut lines = Vec::new();
        for turn in coach.transcript() {
            let line = match turn.role {
                Role::User => Line::from(format!("Você: {}", turn.text)).fg(Color::Cyan),
                Role::Assistant => Line::from(format!("Coach: {}", turn.text)),
            };
            lines.push(line);
            lines.push(Line::from(""));
        }
        lines.push(Line::from(format!("> {draft}_")).bold());
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title("Coach AI"));
        frame.render_widget(paragraph, area);
    }

    fn render_profile(&self, frame: &mut Frame, area: Rect) {
        let profile = self.session.profile();
        let items: Vec<ListItem> = ProfileField::all()
            .iter()
            .map(|field| {
                let value = match &self.input {
                    Input::Profile(editing, buffer) if editing == field => format!("{buffer}_"),
                    _ => profile.get(*field).to_string(),
                };
                ListItem::new(format!("{:12} {}", field.label(), value))
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(self.profile_cursor));
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Perfil"))
            .highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn handle_events(&mut self) -> Result<()> {
        if !event::poll(Duration::from_millis(100))? {
            return Ok(());
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }
            let result = match self.input {
                Input::None => self.handle_key(key),
                _ => self.handle_input(key),
            };
            if let Err(e) = result {
                warn!(error = %e, "action failed");
                self.status = "Erro ao salvar".to_string();
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.input = Input::None,
            KeyCode::Enter => match std::mem::replace(&mut self.input, Input::None) {
                Input::Chat(message) => {
                    if !message.trim().is_empty() {
                        self.pending = Some(Pending::Coach(message));
                    }
                    self.input = Input::Chat(String::new());
                }
                Input::Rename(title) => {
                    if let Some(id) = self.planner.selected().map(str::to_string) {
                        self.session
                            .update(|data| self.planner.rename_workout(&mut data.workouts, &id, &title))?;
                    }
                }
                Input::Profile(field, value) => self.session.set_profile_field(field, &value)?,
                Input::Search | Input::None => {}
            },
            KeyCode::Backspace => match &mut self.input {
                Input::Search => {
                    self.search.pop();
                    self.library_cursor = 0;
                }
                Input::Rename(buffer) | Input::Profile(_, buffer) | Input::Chat(buffer) => {
                    buffer.pop();
                }
                Input::None => {}
            },
            KeyCode::Char(c) => match &mut self.input {
                Input::Search => {
                    self.search.push(c);
                    self.library_cursor = 0;
                }
                Input::Rename(buffer) | Input::Profile(_, buffer) | Input::Chat(buffer) => buffer.push(c),
                Input::None => {}
            },
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                if let Some(tab) = Tab::all().get(index) {
                    self.switch_tab(*tab);
                }
                return Ok(());
            }
            KeyCode::Char('c') => {
                self.open_coach();
                return Ok(());
            }
            KeyCode::Char('L') => {
                self.logout();
                return Ok(());
            }
            _ => {}
        }

        match self.session.tab() {
            Tab::Library => self.handle_library_key(key),
            Tab::Profile => self.handle_profile_key(key),
            Tab::AiGenerator => self.handle_generator_key(key),
            Tab::Routines => self.handle_routine_key(key),
        }
    }

    fn handle_routine_key(&mut self, key: KeyEvent) -> Result<()> {
        let selected = self.planner.selected().map(str::to_string);
        let exercise_count = selected
            .as_deref()
            .and_then(|id| self.session.workouts().iter().find(|w| w.id == id))
            .map_or(0, |w| w.exercises.len());

        match (key.code, selected) {
            (KeyCode::Down | KeyCode::Up, None) => {
                let down = key.code == KeyCode::Down;
                self.workout_cursor = step(self.workout_cursor, self.session.workouts().len(), down);
            }
            (KeyCode::Down | KeyCode::Up, Some(_)) => {
                let down = key.code == KeyCode::Down;
                self.exercise_cursor = step(self.exercise_cursor, exercise_count, down);
            }
            (KeyCode::Enter, None) => {
                if let Some(id) = self.highlighted_workout() {
                    self.planner.select(self.session.workouts(), &id);
                    self.exercise_cursor = 0;
                }
            }
            (KeyCode::Esc, _) => self.planner.close(),
            (KeyCode::Char('n'), _) => {
                self.session.update(|data| self.planner.create_workout(&mut data.workouts))?;
                self.exercise_cursor = 0;
            }
            (KeyCode::Char('r'), Some(id)) => {
                let title = self
                    .session
                    .workouts()
                    .iter()
                    .find(|w| w.id == id)
                    .map(|w| w.title.clone())
                    .unwrap_or_default();
                self.input = Input::Rename(title);
            }
            (KeyCode::Char('d'), _) => {
                if let Some(id) = self.highlighted_workout() {
                    let now = Instant::now();
                    let outcome = self
                        .session
                        .update(|data| self.planner.toggle_delete(&mut data.workouts, &id, now))?;
                    self.status = match outcome {
                        Some(DeleteOutcome::Armed) => "Pressione d novamente para excluir".to_string(),
                        Some(DeleteOutcome::Deleted) => "Treino excluído".to_string(),
                        None => String::new(),
                    };
                    self.workout_cursor = self.workout_cursor.min(self.session.workouts().len().saturating_sub(1));
                }
            }
            (KeyCode::Char(c @ ('K' | 'J')), Some(id)) => {
                let direction = if c == 'K' { planner::Direction::Up } else { planner::Direction::Down };
                let index = self.exercise_cursor;
                let moved = self
                    .session
                    .update(|data| self.planner.reorder(&mut data.workouts, &id, index, direction))?;
                if moved {
                    self.exercise_cursor = step(index, exercise_count, direction == planner::Direction::Down);
                }
            }
            (KeyCode::Char(c @ ('+' | '-')), Some(id)) => {
                let index = self.exercise_cursor;
                let current = self
                    .session
                    .workouts()
                    .iter()
                    .find(|w| w.id == id)
                    .and_then(|w| w.exercises.get(index))
                    .map(|e| e.sets);
                if let Some(sets) = current {
                    let sets = if c == '+' { sets + 1 } else { sets.saturating_sub(1) };
                    self.session.update(|data| {
                        self.planner
                            .edit_field(&mut data.workouts, &id, index, ExerciseField::Sets, &sets.to_string())
                    })?;
                }
            }
            (KeyCode::Char('x'), Some(id)) => {
                let index = self.exercise_cursor;
                self.session
                    .update(|data| self.planner.remove_exercise(&mut data.workouts, &id, index))?;
                self.exercise_cursor = self.exercise_cursor.min(exercise_count.saturating_sub(2));
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_library_key(&mut self, key: KeyEvent) -> Result<()> {
        let exercises = self.library();
        match key.code {
            KeyCode::Down | KeyCode::Up => {
                self.library_cursor = step(self.library_cursor, exercises.len(), key.code == KeyCode::Down);
            }
            KeyCode::Char('/') => self.input = Input::Search,
            KeyCode::Enter => {
                if let Some(exercise) = exercises.get(self.library_cursor).copied() {
                    self.open_detail(exercise);
                }
            }
            KeyCode::Esc => self.close_detail(),
            KeyCode::Char('m') => {
                let groups = muscle_groups();
                self.muscle = match self.muscle.and_then(|m| groups.iter().position(|g| *g == m)) {
                    None => groups.first().copied(),
                    Some(i) => groups.get(i + 1).copied(),
                };
                self.library_cursor = 0;
            }
            KeyCode::Char('a') => {
                let exercise = exercises.get(self.library_cursor.min(exercises.len().saturating_sub(1)));
                match (self.planner.selected().map(str::to_string), exercise) {
                    (Some(id), Some(exercise)) => {
                        self.session
                            .update(|data| self.planner.add_exercise(&mut data.workouts, &id, exercise))?;
                        self.status = format!("{} adicionado", exercise.name);
                    }
                    (None, _) => self.status = "Abra um treino antes de adicionar".to_string(),
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_profile_key(&mut self, key: KeyEvent) -> Result<()> {
        let fields = ProfileField::all();
        match key.code {
            KeyCode::Down | KeyCode::Up => {
                self.profile_cursor = step(self.profile_cursor, fields.len(), key.code == KeyCode::Down);
            }
            KeyCode::Enter => {
                let field = fields[self.profile_cursor];
                let current = self.session.profile().get(field).to_string();
                if field == ProfileField::Goal {
                    self.session.set_profile_field(field, next_goal(&current))?;
                } else {
                    self.input = Input::Profile(field, current);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_generator_key(&mut self, key: KeyEvent) -> Result<()> {
        if matches!(self.generator.step(), GeneratorStep::Review(_)) {
            match key.code {
                KeyCode::Char('s') => {
                    let saved = self.session.save_generated(&mut self.generator)?;
                    self.status = format!("{saved} treinos salvos");
                }
                KeyCode::Esc => {
                    self.generator.take_routine();
                    self.status.clear();
                }
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Down | KeyCode::Up => {
                let down = key.code == KeyCode::Down;
                self.generator_cursor = step(self.generator_cursor, GENERATOR_FIELDS.len(), down);
            }
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                let q = &mut self.generator.questionnaire;
                match self.generator_cursor {
                    0 => {
                        q.set_days_per_week(cycle_days(q.days_per_week(), forward));
                    }
                    1 => q.intensity = cycle(q.intensity, forward),
                    2 => q.experience = cycle(q.experience, forward),
                    3 => q.focus = cycle(q.focus, forward),
                    _ => q.equipment = cycle(q.equipment, forward),
                }
            }
            KeyCode::Char('g') | KeyCode::Enter => self.pending = Some(Pending::Generate),
            _ => {}
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
