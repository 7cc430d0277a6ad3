pub mod app_dirs;
pub mod bank;
pub mod celebration;
pub mod config;
pub mod handoff;
pub mod quiz;
pub mod reflex;
pub mod runtime;
pub mod session_log;
pub mod stats;
pub mod time_series;
pub mod ui;
pub mod util;

use crate::{
    bank::{catalog::Catalog, select::selector_for, Bank, BankError, Question},
    config::{Config, ConfigStore, FileConfigStore},
    handoff::Handoff,
    quiz::{Outcome, Phase, Quiz},
    reflex::Reflex,
    runtime::GameEvent,
    session_log::SessionLog,
    stats::ProgressDb,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// timed choice games in the terminal with coins, xp and progress tracking
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal quiz trainer with per-question countdowns, coin and xp scoring, a rapid-fire reflex mode, weak-spot practice that replays the questions you miss, and historical progress tracking."
)]
pub struct Cli {
    /// id of the embedded question bank to play
    #[clap(short = 'b', long, default_value = "finance-kids-spending")]
    bank: String,

    /// play a question bank from a json file instead of an embedded one
    #[clap(short = 'F', long)]
    file: Option<PathBuf>,

    /// game mode to run the bank in
    #[clap(short = 'm', long, value_enum, default_value_t = Mode::Quiz)]
    mode: Mode,

    /// number of questions to play (default: the whole bank)
    #[clap(short = 'c', long)]
    count: Option<usize>,

    /// shuffle the question order
    #[clap(long)]
    shuffle: bool,

    /// practice mode: play your most-missed questions first
    #[clap(long)]
    practice: bool,

    /// seconds allowed per question (overrides bank settings)
    #[clap(short = 't', long)]
    time_limit: Option<u64>,

    /// seconds on the clock in reflex mode
    #[clap(short = 'd', long)]
    duration: Option<u64>,

    /// list the embedded banks and exit
    #[clap(short = 'l', long)]
    list: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum Mode {
    Quiz,
    Reflex,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Playing,
    Results,
    History,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortBy {
    Question,
    MissRate,
    AvgResponse,
    Attempts,
}

#[derive(Debug)]
pub struct HistoryState {
    pub scroll_offset: usize,
    pub sort_by: SortBy,
    pub sort_ascending: bool,
}

impl Default for HistoryState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            // Worst questions first, same order the practice selector uses
            sort_by: SortBy::MissRate,
            sort_ascending: false,
        }
    }
}

/// The active round, one variant per game mode
#[derive(Debug)]
pub enum Game {
    Quiz(Quiz),
    Reflex(Reflex),
}

impl Game {
    pub fn on_tick(&mut self) {
        match self {
            Game::Quiz(quiz) => quiz.on_tick(),
            Game::Reflex(reflex) => reflex.on_tick(),
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Game::Quiz(quiz) => quiz.is_complete(),
            Game::Reflex(reflex) => reflex.is_complete(),
        }
    }

    pub fn abandon(&mut self) {
        match self {
            Game::Quiz(quiz) => quiz.abandon(),
            Game::Reflex(reflex) => reflex.abandon(),
        }
    }

    pub fn celebration_active(&self) -> bool {
        match self {
            Game::Quiz(quiz) => quiz.celebration.is_active,
            Game::Reflex(reflex) => reflex.celebration.is_active,
        }
    }

    pub fn progress_db(&self) -> Option<&ProgressDb> {
        match self {
            Game::Quiz(quiz) => quiz.progress_db.as_ref(),
            Game::Reflex(reflex) => reflex.progress_db.as_ref(),
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub game: Game,
    pub bank: Bank,
    pub config: Config,
    pub handoff: Handoff,
    pub state: AppState,
    pub history_state: HistoryState,
}

impl App {
    pub fn new(cli: Cli, bank: Bank, config: Config) -> Self {
        let game = Self::build_game(&cli, &bank, &config);
        let handoff = config.starting_handoff();

        Self {
            game,
            bank,
            cli: Some(cli),
            config,
            handoff,
            state: AppState::Playing,
            history_state: HistoryState::default(),
        }
    }

    fn build_game(cli: &Cli, bank: &Bank, config: &Config) -> Game {
        match cli.mode {
            Mode::Quiz => {
                let mut scoring = config.scoring_for(bank);
                if cli.time_limit.is_some() {
                    scoring.default_time_limit_secs = cli.time_limit;
                }

                let db = ProgressDb::new().ok();
                let count = cli.count.unwrap_or(bank.len()).clamp(1, bank.len());
                let mut questions = {
                    let selector = selector_for(cli.practice, cli.shuffle, db.as_ref(), &bank.id);
                    selector.select(&bank.questions, count)
                };
                if cli.time_limit.is_some() {
                    // A -t on the command line beats per-question limits too
                    for question in &mut questions {
                        question.time_limit_secs = None;
                    }
                }
                let pass_mark = config.pass_mark_for_count(bank, questions.len());

                let mut quiz = Quiz::with_db(bank, questions, scoring, pass_mark, db);
                quiz.session_log = SessionLog::new();
                Game::Quiz(quiz)
            }
            Mode::Reflex => {
                let scoring = config.scoring_for(bank);
                let duration = cli.duration.unwrap_or(config.reflex_duration_secs);
                let mut reflex = Reflex::with_db(
                    bank,
                    scoring,
                    duration,
                    config.reflex_pass_score,
                    ProgressDb::new().ok(),
                );
                reflex.session_log = SessionLog::new();
                Game::Reflex(reflex)
            }
        }
    }

    /// Rebuilds the round for the current bank from scratch
    pub fn reset(&mut self) {
        let cli = self.cli.clone().unwrap();
        self.game = Self::build_game(&cli, &self.bank, &self.config);
        self.state = AppState::Playing;
        self.history_state = HistoryState::default();
    }

    /// Moves on to the handoff's next bank. Returns false when there is
    /// no continuation to play.
    pub fn advance_to_next(&mut self) -> bool {
        let next = match &self.handoff.next_game {
            Some(next) => next.clone(),
            None => return false,
        };
        let bank = match Bank::load(&next.id) {
            Ok(bank) => bank,
            Err(_) => return false,
        };

        let mut cli = self.cli.clone().unwrap();
        cli.bank = next.id;
        cli.file = None;

        self.bank = bank;
        self.game = Self::build_game(&cli, &self.bank, &self.config);
        self.cli = Some(cli);
        self.handoff.next_game = None;
        self.state = AppState::Playing;
        self.history_state = HistoryState::default();
        true
    }

    /// Banks the finished round into the running totals and decides
    /// whether the track continues. Only ever called on a complete game.
    pub fn finish_session(&mut self, width: u16, height: u16) {
        let (coins, xp, passed) = match &self.game {
            Game::Quiz(quiz) => {
                let summary = quiz.summary();
                (summary.coins_awarded, summary.xp_awarded, summary.passed)
            }
            Game::Reflex(reflex) => {
                let summary = reflex.summary();
                (summary.coins_awarded, summary.xp_awarded, summary.passed)
            }
        };

        self.handoff.apply(coins, xp);

        if passed {
            self.handoff.next_game = Catalog::embedded()
                .ok()
                .and_then(|catalog| catalog.next_after(&self.bank.id));
            match &mut self.game {
                Game::Quiz(quiz) => quiz.celebration.start(width, height),
                Game::Reflex(reflex) => reflex.celebration.start(width, height),
            }
        } else {
            self.handoff.next_game = None;
        }

        self.state = AppState::Results;
    }
}

/// Maps a pressed key to a choice id: digits pick by position, letters
/// match the choice id itself.
fn choice_for_key(question: Option<&Question>, c: char) -> Option<String> {
    let question = question?;
    if let Some(digit) = c.to_digit(10) {
        if digit == 0 {
            return None;
        }
        return question
            .choices
            .get(digit as usize - 1)
            .map(|choice| choice.id.clone());
    }
    let key = c.to_ascii_lowercase().to_string();
    question
        .choices
        .iter()
        .find(|choice| choice.id == key)
        .map(|choice| choice.id.clone())
}

fn load_bank(cli: &Cli) -> Result<Bank, BankError> {
    match &cli.file {
        Some(path) => Bank::from_path(path),
        None => Bank::load(&cli.bank),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        let catalog = Catalog::embedded()?;
        for entry in catalog.entries() {
            println!(
                "{:<26} {:<24} {:<20} seq {}  {} questions",
                entry.id,
                entry.title,
                format!("{}/{}", entry.topic, entry.audience),
                entry.sequence,
                entry.questions
            );
        }
        return Ok(());
    }

    let config = FileConfigStore::new().load();

    let bank = match load_bank(&cli) {
        Ok(bank) => bank,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli, bank, config);
    start_tui(&mut terminal, &mut app)?;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

#[derive(Debug)]
enum ExitType {
    Replay,
    Next,
    Quit,
}

/// Whether a tick warrants a fresh frame: a live round, falling
/// confetti, or the transition tick that lands on the results screen.
/// A failed finish starts no confetti, so the transition must draw
/// on its own.
fn should_draw_on_tick(just_completed: bool, celebration_active: bool, complete: bool) -> bool {
    just_completed || celebration_active || !complete
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: &mut App,
) -> Result<(), Box<dyn Error>> {
    // Always enable ticking for countdowns and celebration animations
    let should_tick = true;

    let game_events = runtime::game_events(should_tick, Duration::from_millis(TICK_RATE_MS));

    loop {
        let mut exit_type: ExitType = ExitType::Quit;
        terminal.draw(|f| ui(app, f))?;

        loop {
            let app = &mut app;

            match game_events.recv()? {
                GameEvent::Tick => {
                    let was_complete = app.game.is_complete();
                    app.game.on_tick();
                    let just_completed = !was_complete && app.game.is_complete();

                    if just_completed {
                        let size = terminal.size().unwrap_or_default();
                        app.finish_session(size.width, size.height);
                    }

                    if should_draw_on_tick(
                        just_completed,
                        app.game.celebration_active(),
                        app.game.is_complete(),
                    ) {
                        terminal.draw(|f| ui(app, f))?;
                    }
                }
                GameEvent::Resize => {
                    terminal.draw(|f| ui(app, f))?;
                }
                GameEvent::Key(key) => {
                    match key.code {
                        KeyCode::Esc => {
                            if !app.game.is_complete() {
                                app.game.abandon();
                            }
                            break;
                        }
                        KeyCode::Left => {
                            exit_type = ExitType::Replay;
                            break;
                        }
                        KeyCode::Right => {
                            if app.handoff.next_game.is_some() {
                                exit_type = ExitType::Next;
                                break;
                            }
                        }
                        KeyCode::Backspace => {
                            if app.state == AppState::History {
                                app.state = AppState::Results;
                            }
                        }
                        KeyCode::Up => {
                            if app.state == AppState::History {
                                app.history_state.scroll_offset =
                                    app.history_state.scroll_offset.saturating_sub(1);
                            }
                        }
                        KeyCode::Down => {
                            if app.state == AppState::History {
                                // The render clamps this to the table height
                                app.history_state.scroll_offset += 1;
                            }
                        }
                        KeyCode::PageUp => {
                            if app.state == AppState::History {
                                app.history_state.scroll_offset =
                                    app.history_state.scroll_offset.saturating_sub(10);
                            }
                        }
                        KeyCode::PageDown => {
                            if app.state == AppState::History {
                                app.history_state.scroll_offset += 10;
                            }
                        }
                        KeyCode::Home => {
                            if app.state == AppState::History {
                                app.history_state.scroll_offset = 0;
                            }
                        }
                        KeyCode::Char(c) => {
                            if key.modifiers.contains(KeyModifiers::CONTROL)
                                && key.code == KeyCode::Char('c')
                            // ctrl+c to quit
                            {
                                if !app.game.is_complete() {
                                    app.game.abandon();
                                }
                                break;
                            }

                            match app.state {
                                AppState::Playing => {
                                    let size = terminal.size().unwrap_or_default();
                                    let was_complete = app.game.is_complete();

                                    match &mut app.game {
                                        Game::Quiz(quiz) => {
                                            if quiz.phase == Phase::Answered {
                                                // Any key skips the rest of the reveal
                                                quiz.advance();
                                            } else if let Some(choice_id) =
                                                choice_for_key(quiz.current_question(), c)
                                            {
                                                if quiz.submit_choice(&choice_id) {
                                                    let correct = matches!(
                                                        quiz.last_answer().map(|a| a.outcome),
                                                        Some(Outcome::Correct)
                                                    );
                                                    if correct {
                                                        quiz.celebrate_answer(
                                                            size.width,
                                                            size.height,
                                                        );
                                                    }
                                                }
                                            }
                                        }
                                        Game::Reflex(reflex) => {
                                            if let Some(choice_id) =
                                                choice_for_key(reflex.current_question(), c)
                                            {
                                                reflex.answer(&choice_id);
                                            }
                                        }
                                    }

                                    if !was_complete && app.game.is_complete() {
                                        app.finish_session(size.width, size.height);
                                    }
                                }
                                AppState::Results => match key.code {
                                    KeyCode::Char('r') => {
                                        exit_type = ExitType::Replay;
                                        break;
                                    }
                                    KeyCode::Char('n') => {
                                        if app.handoff.next_game.is_some() {
                                            exit_type = ExitType::Next;
                                            break;
                                        }
                                    }
                                    KeyCode::Char('s') => {
                                        app.state = AppState::History;
                                    }
                                    _ => {}
                                },
                                AppState::History => match key.code {
                                    KeyCode::Char('r') => {
                                        exit_type = ExitType::Replay;
                                        break;
                                    }
                                    KeyCode::Char('b') => {
                                        app.state = AppState::Results;
                                    }
                                    KeyCode::Char('1') => {
                                        app.history_state.sort_by = SortBy::Question;
                                        app.history_state.scroll_offset = 0;
                                    }
                                    KeyCode::Char('2') => {
                                        app.history_state.sort_by = SortBy::MissRate;
                                        app.history_state.scroll_offset = 0;
                                    }
                                    KeyCode::Char('3') => {
                                        app.history_state.sort_by = SortBy::AvgResponse;
                                        app.history_state.scroll_offset = 0;
                                    }
                                    KeyCode::Char('4') => {
                                        app.history_state.sort_by = SortBy::Attempts;
                                        app.history_state.scroll_offset = 0;
                                    }
                                    KeyCode::Char(' ') => {
                                        // Toggle sort direction
                                        app.history_state.sort_ascending =
                                            !app.history_state.sort_ascending;
                                        app.history_state.scroll_offset = 0;
                                    }
                                    _ => {}
                                },
                            }
                        }
                        _ => {}
                    }
                    terminal.draw(|f| ui(app, f))?;
                }
            }
        }

        match exit_type {
            ExitType::Replay => {
                app.reset();
            }
            ExitType::Next => {
                if !app.advance_to_next() {
                    break;
                }
            }
            ExitType::Quit => {
                break;
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let screen = ui::screen::current_screen(&app.state);
    screen.render(app, f);
}
