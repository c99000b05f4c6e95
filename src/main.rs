mod ui;

use blitztype::{
    clock::Clock,
    config::{ConfigStore, FileConfigStore},
    controller::SessionController,
    corpus::Corpus,
    history::{CsvResultStore, HttpResultStore, ResultStore, StoreConsumer},
    runtime::{EventBus, GameEvent},
    session::{GameDuration, RoundResult},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::{mpsc::Sender, Arc},
    thread,
};

/// arcade-style terminal typing game
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type the phrase before the countdown runs out. Live wpm, accuracy and mistake tracking, with finished rounds recorded locally and optionally to a results backend."
)]
pub struct Cli {
    /// round length in seconds
    #[clap(short = 's', long, value_enum)]
    duration: Option<GameDuration>,

    /// results backend base url, e.g. http://localhost:8000
    #[clap(short = 'b', long)]
    backend_url: Option<String>,

    /// candidate phrase for the round corpus; repeat to supply several
    #[clap(short = 'p', long = "phrase")]
    phrases: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Typing,
    Results,
}

pub struct App {
    pub controller: SessionController,
    pub screen: Screen,
    pub history: Vec<RoundResult>,
    pub last_result: Option<RoundResult>,
    history_store: Arc<dyn ResultStore>,
    events: Sender<GameEvent>,
}

impl App {
    pub fn new(
        controller: SessionController,
        history_store: Arc<dyn ResultStore>,
        events: Sender<GameEvent>,
    ) -> Self {
        let app = Self {
            controller,
            screen: Screen::Typing,
            history: vec![],
            last_result: None,
            history_store,
            events,
        };
        app.request_history();
        app
    }

    /// Refreshes the history list off the event loop; the rows come back
    /// as a bus event, so an unreachable backend only leaves the list
    /// empty and never stalls input handling.
    fn request_history(&self) {
        let store = Arc::clone(&self.history_store);
        let tx = self.events.clone();
        thread::spawn(move || {
            let _ = tx.send(GameEvent::History(store.recent()));
        });
    }

    pub fn try_again(&mut self) {
        self.controller.try_again();
        self.screen = Screen::Typing;
        self.last_result = None;
    }

    /// Moves to the results screen once the round under way has finished.
    pub fn check_round_over(&mut self) {
        if self.screen == Screen::Typing && self.controller.session().has_finished() {
            self.last_result = self.controller.session().result().cloned();
            // requested before the freshly recorded round lands, so the
            // list stays previous rounds
            self.request_history();
            self.screen = Screen::Results;
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = FileConfigStore::new().load();
    // a file value outside {15, 30, 60} falls back to the default round
    // length; the flag goes through the value-enum and can't be invalid
    let duration = cli.duration.unwrap_or_else(|| config.duration_or_default());
    let backend_url = cli.backend_url.clone().or_else(|| config.backend_url.clone());
    let phrases = if cli.phrases.is_empty() {
        config.phrases.clone()
    } else {
        cli.phrases.clone()
    };

    let csv = Arc::new(CsvResultStore::new());
    let mut stores: Vec<Box<dyn ResultStore>> = vec![Box::new(Arc::clone(&csv))];
    let history_store: Arc<dyn ResultStore> = match backend_url {
        Some(url) => {
            let http = Arc::new(HttpResultStore::new(url));
            stores.push(Box::new(Arc::clone(&http)));
            http
        }
        None => csv,
    };

    let bus = EventBus::new();
    bus.spawn_input_reader();
    let clock = Clock::new(bus.clock_sender());
    let controller = SessionController::new(
        clock,
        Corpus::new(phrases),
        duration,
        Box::new(StoreConsumer::new(stores)),
    );
    let mut app = App::new(controller, history_store, bus.sender());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app, &bus);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    bus: &EventBus,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match bus.recv()? {
            GameEvent::Clock(signal) => {
                app.controller.handle_clock(signal);
                app.check_round_over();
            }
            GameEvent::Resize => {}
            GameEvent::History(rows) => app.history = rows,
            GameEvent::Key(key) => {
                if key.code == KeyCode::Esc
                    || (key.modifiers.contains(KeyModifiers::CONTROL)
                        && key.code == KeyCode::Char('c'))
                {
                    break;
                }
                // restart works from every screen and session state
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('r')
                {
                    app.try_again();
                    continue;
                }

                match app.screen {
                    Screen::Typing => match key.code {
                        KeyCode::Backspace => app.controller.backspace(),
                        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.controller.type_char(c);
                            app.check_round_over();
                        }
                        _ => {}
                    },
                    Screen::Results => {
                        if key.code == KeyCode::Char('r') {
                            app.try_again();
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
