//! Terminal integration: clue text and commands arrive on stdin (or a
//! watched file), suggestions print to stdout.

use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, bail};

use crate::config::Setting;
use crate::session::ports::{ClueSource, ConfigStore, SuggestionSink};
use crate::session::{BankRequest, Event, Session, Suggestion};
use crate::source::{BankLoader, BankUpdate};

const HELP: &str = "\
commands:
  clue <text>          set the clue, e.g. `clue c_t` or `clue ___ ___`
  type <text>          narrow suggestions by what you have typed so far
  submit <text>        send a guess (a number picks that suggestion in index mode)
  pick <n>             send suggestion n
  sort <0-3>           alphabetical, popularity, difficulty, popularity then difficulty
  index on|off         number suggestions and allow numeric picks
  official on|off      include the official word list
  custom <a, b, ...>   replace the custom word list
  lang <language>      switch game language
  set <key> <value>    change any setting
  show                 print the current suggestions
  quit                 leave";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Clue(String),
    Type(String),
    Submit(String),
    Pick(usize),
    Set(Setting),
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (name, rest) = line.trim_start().split_once(' ').unwrap_or((line.trim(), ""));
        let command = match name {
            "clue" => Command::Clue(rest.to_string()),
            "type" => Command::Type(rest.to_string()),
            "submit" => Command::Submit(rest.to_string()),
            "pick" => match rest.trim().parse() {
                Ok(index) => Command::Pick(index),
                Err(_) => bail!("pick needs a suggestion number, got '{}'", rest.trim()),
            },
            "sort" => Command::Set(Setting::parse("sorting_mode", rest)?),
            "index" => Command::Set(Setting::parse("index_mode", rest)?),
            "official" => Command::Set(Setting::parse("enable_official_word_list", rest)?),
            "custom" => Command::Set(Setting::parse("custom_word_list", rest)?),
            "lang" => Command::Set(Setting::parse("language", rest)?),
            "set" => {
                let (key, value) = rest.trim_start().split_once(' ').unwrap_or((rest.trim(), ""));
                Command::Set(Setting::parse(key, value)?)
            }
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => bail!("empty command"),
            other => bail!("unknown command '{other}', try `help`"),
        };
        Ok(command)
    }
}

pub struct TerminalSink<W: Write> {
    out: W,
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(err) = self.out.write_fmt(format_args!("{args}\n")) {
            log::debug!("terminal write failed: {err}");
        }
    }

    fn flush(&mut self) {
        if let Err(err) = self.out.flush() {
            log::debug!("terminal flush failed: {err}");
        }
    }
}

impl<W: Write> SuggestionSink for TerminalSink<W> {
    fn render(&mut self, suggestions: &[Suggestion]) {
        if suggestions.is_empty() {
            self.line(format_args!("  (no suggestions)"));
        }
        for suggestion in suggestions {
            match suggestion.display_index {
                Some(index) => self.line(format_args!("  [{index}] {}", suggestion.word)),
                None => self.line(format_args!("  {}", suggestion.word)),
            }
        }
        self.flush();
    }

    fn send_guess(&mut self, text: &str) {
        self.line(format_args!("> {text}"));
        self.flush();
    }

    fn notice(&mut self, message: &str) {
        self.line(format_args!("{message}"));
        self.flush();
    }
}

fn read_clue(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|text| text.trim_end_matches(['\r', '\n']).to_string())
}

/// Clue text kept in a file by some other program, polled for changes.
pub struct FileClueSource {
    path: PathBuf,
    interval: Duration,
}

impl FileClueSource {
    pub fn new(path: PathBuf, interval: Duration) -> Self {
        Self { path, interval }
    }
}

impl ClueSource for FileClueSource {
    fn current_clue(&self) -> Option<String> {
        read_clue(&self.path)
    }

    fn watch(&mut self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        let path = self.path.clone();
        let interval = self.interval;
        thread::spawn(move || {
            let mut last = None;
            loop {
                let clue = read_clue(&path);
                if clue != last {
                    if let Some(text) = &clue
                        && tx.send(text.clone()).is_err()
                    {
                        return;
                    }
                    last = clue;
                }
                thread::sleep(interval);
            }
        });
        rx
    }
}

pub enum HostEvent {
    Line(String),
    Clue(String),
    Bank(BankUpdate),
    InputClosed,
}

/// Reads stdin on its own thread, one event per line.
pub fn spawn_stdin_reader(tx: mpsc::Sender<HostEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(HostEvent::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(HostEvent::InputClosed);
    });
}

/// Forwards clue changes from a source into the host's event channel.
pub fn forward_clues(source: &mut impl ClueSource, tx: mpsc::Sender<HostEvent>) {
    let clues = source.watch();
    thread::spawn(move || {
        for clue in clues {
            if tx.send(HostEvent::Clue(clue)).is_err() {
                return;
            }
        }
    });
}

/// Owns the session and every collaborator. All events are handled on the
/// thread that calls `dispatch`, one at a time.
pub struct Host<S: ConfigStore, K: SuggestionSink> {
    session: Session,
    store: S,
    settings: mpsc::Receiver<Setting>,
    sink: K,
    loader: BankLoader,
    events: mpsc::Sender<HostEvent>,
}

impl<S: ConfigStore, K: SuggestionSink> Host<S, K> {
    pub fn new(mut store: S, sink: K, loader: BankLoader, events: mpsc::Sender<HostEvent>) -> Self {
        let session = Session::new(&store.get());
        let settings = store.subscribe();
        Self {
            session,
            store,
            settings,
            sink,
            loader,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Kick off the first word bank build.
    pub fn start(&mut self) {
        let request = self.session.begin_rebuild();
        self.rebuild(request);
    }

    fn rebuild(&self, request: BankRequest) {
        let tx = self.events.clone();
        self.loader.spawn(request, move |update| {
            let _ = tx.send(HostEvent::Bank(update));
        });
    }

    fn session_event(&mut self, event: Event) {
        if let Some(request) = self.session.handle(event, &mut self.sink) {
            self.rebuild(request);
        }
    }

    fn drain_settings(&mut self) {
        while let Ok(setting) = self.settings.try_recv() {
            self.session_event(Event::SettingChanged(setting));
        }
    }

    /// Handle one event. Returns `false` once the host should stop.
    pub fn dispatch(&mut self, event: HostEvent) -> bool {
        match event {
            HostEvent::Line(line) => match Command::parse(&line) {
                Ok(Command::Clue(clue)) => self.session_event(Event::ClueChanged(clue)),
                Ok(Command::Type(text)) => self.session_event(Event::InputChanged(text)),
                Ok(Command::Submit(text)) => self.session_event(Event::Submit(text)),
                Ok(Command::Pick(index)) => self.session_event(Event::Pick(index)),
                Ok(Command::Set(setting)) => {
                    if let Err(err) = self.store.set(setting) {
                        self.sink.notice(&format!("error: {err}"));
                    }
                }
                Ok(Command::Show) => self.sink.render(&self.session.suggestions()),
                Ok(Command::Help) => self.sink.notice(HELP),
                Ok(Command::Quit) => return false,
                Err(err) => self.sink.notice(&format!("error: {err}")),
            },
            HostEvent::Clue(clue) => self.session_event(Event::ClueChanged(clue)),
            HostEvent::Bank(update) => match update.result {
                Ok(bank) => {
                    if self.session.publish_bank(update.generation, bank) {
                        self.sink.render(&self.session.suggestions());
                    }
                }
                Err(err) if update.generation != self.session.bank_generation() => {
                    log::debug!("ignoring failure of superseded rebuild {}: {err}", update.generation);
                }
                Err(err) => {
                    log::warn!("word bank rebuild {} failed: {err}", update.generation);
                    self.sink.notice(&format!(
                        "could not load the word bank ({err}), keeping the previous one"
                    ));
                }
            },
            HostEvent::InputClosed => return false,
        }
        self.drain_settings();
        true
    }

    pub fn run(&mut self, events: &mpsc::Receiver<HostEvent>) -> Result<()> {
        self.start();
        loop {
            let event = events.recv()?;
            if !self.dispatch(event) {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, MemoryConfigStore};
    use crate::error::BankError;
    use crate::source::BankSources;
    use tempfile::TempDir;

    const DOC: &str = r#"{
        "1": {"3": [
            {"word": "cat", "picked": 5, "difficulty": 1},
            {"word": "car", "picked": 2, "difficulty": 1}
        ]}
    }"#;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("clue ___ ___").unwrap(),
            Command::Clue("___ ___".to_string())
        );
        assert_eq!(Command::parse("type").unwrap(), Command::Type(String::new()));
        assert_eq!(Command::parse("pick 2").unwrap(), Command::Pick(2));
        assert_eq!(
            Command::parse("sort 1").unwrap(),
            Command::Set(Setting::SortingMode(1))
        );
        assert_eq!(
            Command::parse("set indexMode off").unwrap(),
            Command::Set(Setting::IndexMode(false))
        );
        assert_eq!(
            Command::parse("custom Node.js, Rust").unwrap(),
            Command::Set(Setting::CustomWordList("Node.js, Rust".to_string()))
        );
        assert_eq!(Command::parse("quit\n").unwrap(), Command::Quit);
        assert!(Command::parse("dance").is_err());
        assert!(Command::parse("pick two").is_err());
        assert!(Command::parse("").is_err());
    }

    #[test]
    fn test_terminal_sink_output() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.render(&[
            Suggestion {
                word: "cat".to_string(),
                display_index: Some(0),
            },
            Suggestion {
                word: "car".to_string(),
                display_index: None,
            },
        ]);
        sink.render(&[]);
        sink.send_guess("cat");
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "  [0] cat\n  car\n  (no suggestions)\n> cat\n");
    }

    #[test]
    fn test_file_clue_source_reads_current_clue() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clue.txt");
        let source = FileClueSource::new(path.clone(), Duration::from_millis(10));
        assert_eq!(source.current_clue(), None);
        fs::write(&path, "c_t\n").unwrap();
        assert_eq!(source.current_clue().as_deref(), Some("c_t"));
    }

    #[test]
    fn test_file_clue_source_watch_reports_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clue.txt");
        fs::write(&path, "___").unwrap();
        let mut source = FileClueSource::new(path, Duration::from_millis(5));
        let clues = source.watch();
        assert_eq!(
            clues.recv_timeout(Duration::from_secs(5)).unwrap(),
            "___"
        );
    }

    fn host(dir: &TempDir) -> (Host<MemoryConfigStore, TerminalSink<Vec<u8>>>, mpsc::Receiver<HostEvent>) {
        let path = dir.path().join("words.json");
        fs::write(&path, DOC).unwrap();
        let mut config = Config::default();
        config.word_bank_url = path.to_string_lossy().to_string();
        config.bank_cache_dir = dir.path().join("cache").to_string_lossy().to_string();

        let loader = BankLoader::new(BankSources::from_config(&config).offline());
        let (tx, rx) = mpsc::channel();
        let host = Host::new(
            MemoryConfigStore::new(config),
            TerminalSink::new(Vec::new()),
            loader,
            tx,
        );
        (host, rx)
    }

    fn next_bank(rx: &mpsc::Receiver<HostEvent>) -> HostEvent {
        loop {
            let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            if matches!(event, HostEvent::Bank(_)) {
                return event;
            }
        }
    }

    #[test]
    fn test_host_round_trip() {
        let dir = TempDir::new().unwrap();
        let (mut host, rx) = host(&dir);
        host.start();
        assert!(host.dispatch(next_bank(&rx)));

        assert!(host.dispatch(HostEvent::Line("clue ___".to_string())));
        assert_eq!(host.session().candidates().len(), 2);

        assert!(host.dispatch(HostEvent::Line("submit 0".to_string())));
        assert!(host.session().submitted().contains("cat"));

        assert!(host.dispatch(HostEvent::Line("sort 0".to_string())));
        assert_eq!(host.session().sort_mode(), crate::engine::SortMode::Alphabetical);

        assert!(host.dispatch(HostEvent::Line("sort 9".to_string())));
        assert_eq!(host.session().sort_mode(), crate::engine::SortMode::Alphabetical);

        assert!(!host.dispatch(HostEvent::Line("quit".to_string())));
    }

    #[test]
    fn test_host_rebuild_after_custom_list_change() {
        let dir = TempDir::new().unwrap();
        let (mut host, rx) = host(&dir);
        host.start();
        host.dispatch(next_bank(&rx));
        host.dispatch(HostEvent::Line("clue ___".to_string()));

        host.dispatch(HostEvent::Line("custom cow".to_string()));
        host.dispatch(next_bank(&rx));
        let words: Vec<&str> = host
            .session()
            .candidates()
            .iter()
            .map(|e| e.word.as_str())
            .collect();
        assert_eq!(words, vec!["cow", "cat", "car"]);
    }

    fn output(host: &Host<MemoryConfigStore, TerminalSink<Vec<u8>>>) -> String {
        String::from_utf8_lossy(host.sink().get_ref()).to_string()
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_bank() {
        let dir = TempDir::new().unwrap();
        let (mut host, rx) = host(&dir);
        host.start();
        host.dispatch(next_bank(&rx));
        host.dispatch(HostEvent::Line("clue ___".to_string()));
        let before = host.session().candidates().to_vec();
        assert_eq!(before.len(), 2);

        let failed = BankUpdate {
            generation: host.session().bank_generation(),
            result: Err(BankError::Unavailable("German".to_string())),
        };
        assert!(host.dispatch(HostEvent::Bank(failed)));

        assert_eq!(host.session().candidates(), before.as_slice());
        assert_eq!(host.session().bank().len(), 2);
        assert!(output(&host).contains("could not load the word bank"));
    }

    #[test]
    fn test_superseded_failure_is_silent() {
        let dir = TempDir::new().unwrap();
        let (mut host, rx) = host(&dir);
        host.start();
        host.dispatch(next_bank(&rx));

        let stale = BankUpdate {
            generation: host.session().bank_generation() - 1,
            result: Err(BankError::NetworkDisabled),
        };
        host.dispatch(HostEvent::Bank(stale));
        assert!(!output(&host).contains("could not load"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_terminal_sink_survives_write_errors() {
        let mut sink = TerminalSink::new(ClosedPipe);
        sink.render(&[Suggestion {
            word: "cat".to_string(),
            display_index: None,
        }]);
        sink.send_guess("cat");
        sink.notice("still running");
    }
}
