use std::collections::BTreeMap;
use std::io::{self, Write};
use std::ops::Range;
use std::path::Path;

use anyhow::Result;
use crossterm::style::Stylize;
use rand::rngs::SmallRng;
use tracing::{debug, warn};

use crate::command::{Command, HELP};
use crate::config::Config;
use crate::engine::manifest::Manifest;
use crate::engine::registry::{CollectionRegistry, LoadSummary};
use crate::error::DrillError;
use crate::session::pool::{DrillPool, FULL_RANGE, Policy};
use crate::session::quiz::{Mode, Outcome, QuizSession};
use crate::session::result::SessionReport;
use crate::store::export;
use crate::store::json_store::JsonStore;
use crate::store::missed_log::MissedLog;

const SEPARATOR: &str = "=============================";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Console-facing owner of the registry, the current selection and the
/// running session.
pub struct App {
    pub config: Config,
    pub registry: CollectionRegistry,
    pub session: QuizSession,
    selection: BTreeMap<String, Range<usize>>,
    manifest: Manifest,
    missed_log: MissedLog,
    store: Option<JsonStore>,
}

impl App {
    /// Seed the registry from the manifest and start drilling the first book.
    /// An unreadable manifest is the only fatal error.
    pub fn start(
        config: Config,
        manifest: Manifest,
        rng: SmallRng,
        store: Option<JsonStore>,
    ) -> Result<Self, DrillError> {
        let mut registry = CollectionRegistry::new();
        for name in manifest.entries()? {
            if let Err(err) = registry.load(&name, false) {
                warn!("{err}");
            }
        }

        let mut selection = BTreeMap::new();
        if let Some(name) = registry.default_name() {
            selection.insert(name.to_string(), FULL_RANGE);
        }
        let pool = build_pool(&registry, &selection);
        let session = QuizSession::with_rng(pool, config.quiz_settings(), rng);
        let missed_log = MissedLog::open(&config.missed_log);

        Ok(Self {
            config,
            registry,
            session,
            selection,
            manifest,
            missed_log,
            store,
        })
    }

    pub fn selection(&self) -> impl Iterator<Item = (&str, &Range<usize>)> {
        self.selection.iter().map(|(name, range)| (name.as_str(), range))
    }

    #[cfg(test)]
    pub fn missed_log(&self) -> &MissedLog {
        &self.missed_log
    }

    /// Parse and run one console line.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<Flow> {
        match Command::parse(line) {
            Ok(command) => self.execute(command, out),
            Err(err) => {
                writeln!(out, "{err}")?;
                Ok(self.flow())
            }
        }
    }

    /// Run one command. Recoverable failures are reported to `out` and
    /// leave registry and session untouched.
    pub fn execute(&mut self, command: Command, out: &mut impl Write) -> io::Result<Flow> {
        if command == Command::Quit {
            return Ok(Flow::Quit);
        }
        if let Err(err) = self.run(command, out) {
            writeln!(out, "{err:#}")?;
        }
        Ok(self.flow())
    }

    fn flow(&self) -> Flow {
        if self.session.is_finished() {
            Flow::Quit
        } else {
            Flow::Continue
        }
    }

    fn run(&mut self, command: Command, out: &mut impl Write) -> Result<()> {
        match command {
            Command::Quit => {}
            Command::Answer(answer) => self.answer(&answer, out)?,
            Command::Load(name) => {
                let summary = self.load(&name)?;
                let verb = if summary.replaced { "reloaded" } else { "loaded" };
                writeln!(
                    out,
                    "{verb} word book: {name} ({} words, {} invalid lines)",
                    summary.word_count, summary.malformed
                )?;
            }
            Command::Select { name, range } => {
                self.select(&name, range)?;
                writeln!(
                    out,
                    "selected word book: {name} ({}), restarting...",
                    self.session.pool().len()
                )?;
                self.write_prompt(out)?;
            }
            Command::Add(name) => {
                self.add(&name)?;
                writeln!(out, "added word book: {name} ({})", self.session.pool().len())?;
                self.write_prompt(out)?;
            }
            Command::Merge => {
                let merged = self.merge()?;
                for name in &merged {
                    writeln!(out, "merged: {name}")?;
                }
                writeln!(out, "test set built ({})", self.session.pool().len())?;
                self.write_prompt(out)?;
            }
            Command::Rand => {
                self.set_policy(Policy::Random);
                writeln!(out, "policy changed to {}", Policy::Random.as_str())?;
                self.write_prompt(out)?;
            }
            Command::Order => {
                self.set_policy(Policy::Sequential);
                writeln!(out, "policy changed to {}", Policy::Sequential.as_str())?;
                self.write_prompt(out)?;
            }
            Command::Testcount(n) => {
                self.set_max_attempts(n)?;
                writeln!(out, "max words per run: {n}")?;
                self.write_prompt(out)?;
            }
            Command::Mode(mode) => {
                self.set_mode(mode);
                writeln!(out, "mode changed to {}", mode.as_str())?;
                self.write_prompt(out)?;
            }
            Command::Restart => {
                self.restart();
                writeln!(out, "test set built ({})", self.session.pool().len())?;
                self.write_prompt(out)?;
            }
            Command::Wordcount => self.print_word_count(out)?,
            Command::Print(name) => self.print_book(name, out)?,
            Command::Save(file) => {
                let path = file.unwrap_or_else(|| self.config.save_file.clone());
                let count = export::save_consolidated(&self.registry, Path::new(&path))?;
                writeln!(out, "save done, total word count:{count}")?;
            }
            Command::SaveList => {
                let pages = export::save_list(
                    &self.registry,
                    Path::new("."),
                    self.config.list_page_size,
                )?;
                writeln!(out, "save-list done, {} pages", pages.len())?;
            }
            Command::Dump(file) => {
                let base = file.unwrap_or_else(|| self.config.dump_file.clone());
                let files = export::dump(
                    &self.registry,
                    Path::new(&base),
                    self.config.dump_page_size,
                    self.config.dump_words_per_line,
                )?;
                writeln!(out, "dump done, {} files", files.len())?;
            }
            Command::Writeback => {
                let count = export::write_back(&self.registry)?;
                writeln!(out, "write back {count} word books OK")?;
            }
            Command::Report => {
                for line in self.report().summary_lines() {
                    writeln!(out, "{line}")?;
                }
            }
            Command::Help => {
                for line in HELP {
                    writeln!(out, "{line}")?;
                }
            }
        }
        Ok(())
    }

    fn answer(&mut self, answer: &str, out: &mut impl Write) -> Result<()> {
        let outcome = match self.session.submit(answer) {
            Ok(outcome) => outcome,
            Err(DrillError::SessionFinished) => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        match &outcome {
            Outcome::Correct => {
                writeln!(out, "{}", "✅".green())?;
                writeln!(out, "{SEPARATOR}")?;
            }
            Outcome::Wrong {
                expected,
                first_miss,
            } => {
                writeln!(out, "{} {}", "❌".red(), expected.foreign)?;
                if *first_miss {
                    if let Err(err) = self.missed_log.append(expected) {
                        writeln!(out, "{err:#}")?;
                    }
                }
                write!(out, "retype... ")?;
            }
            Outcome::RetryAccepted => writeln!(out, "{SEPARATOR}")?,
            Outcome::RetryMismatch { .. } => write!(out, "retype... ")?,
            Outcome::Recognized { entry, .. } => {
                writeln!(
                    out,
                    "meaning: {:<30} {}{:<3} {}{:<3}",
                    entry.native,
                    "✅".green(),
                    self.session.right(),
                    "❌".red(),
                    self.session.wrong()
                )?;
                writeln!(out, "{SEPARATOR}")?;
            }
        }

        if outcome.advances() {
            self.session.advance();
            self.write_prompt(out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// `[n] <prompt> ` for the current word, or the stop reason.
    pub fn write_prompt(&self, out: &mut impl Write) -> io::Result<()> {
        if self.session.is_finished() {
            if self.session.attempts() >= self.session.max_attempts() {
                writeln!(out, "reached the max number of words")?;
            }
            return Ok(());
        }
        if let Some(prompt) = self.session.prompt_text() {
            write!(out, "[{}] {} ", self.session.attempts() + 1, prompt.bold())?;
        }
        out.flush()
    }

    pub fn load(&mut self, name: &str) -> Result<LoadSummary, DrillError> {
        self.registry.load(name, true)
    }

    /// Drill `range` of a single book, restarting the run.
    pub fn select(&mut self, name: &str, range: Range<usize>) -> Result<(), DrillError> {
        if !self.registry.contains(name) {
            return Err(DrillError::UnknownSelection(name.to_string()));
        }
        self.flush_missed();
        self.selection.clear();
        self.selection.insert(name.to_string(), range);
        let pool = self.build_pool();
        self.session.restart(pool);
        Ok(())
    }

    /// Add a whole book to the selection, keeping the running score.
    pub fn add(&mut self, name: &str) -> Result<(), DrillError> {
        if !self.registry.contains(name) {
            return Err(DrillError::UnknownSelection(name.to_string()));
        }
        self.selection.insert(name.to_string(), FULL_RANGE);
        let pool = self.build_pool();
        self.session.replace_pool(pool);
        Ok(())
    }

    /// Reload every manifest source and drill all that loaded.
    pub fn merge(&mut self) -> Result<Vec<String>, DrillError> {
        let names = self.manifest.entries()?;
        let mut merged = Vec::new();
        for name in names {
            match self.registry.load(&name, false) {
                Ok(_) => merged.push(name),
                Err(err) => warn!("{err}"),
            }
        }
        self.flush_missed();
        self.selection = merged
            .iter()
            .map(|name| (name.clone(), FULL_RANGE))
            .collect();
        let pool = self.build_pool();
        self.session.restart(pool);
        Ok(merged)
    }

    pub fn set_policy(&mut self, policy: Policy) {
        self.session.set_policy(policy);
        self.session.advance();
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.session.set_mode(mode);
        self.session.advance();
    }

    pub fn set_max_attempts(&mut self, max_attempts: usize) -> Result<(), DrillError> {
        self.session.set_max_attempts(max_attempts)?;
        self.session.advance();
        Ok(())
    }

    /// Rebuild the pool from the current selection and start over.
    pub fn restart(&mut self) {
        self.flush_missed();
        let pool = self.build_pool();
        self.session.restart(pool);
    }

    pub fn word_count(&self) -> usize {
        self.registry.word_count()
    }

    pub fn report(&self) -> SessionReport {
        SessionReport::from_session(&self.session)
    }

    pub fn build_pool(&self) -> DrillPool {
        build_pool(&self.registry, &self.selection)
    }

    /// Total followed by one line per loaded book; selected books are starred.
    fn print_word_count(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "wordcount:{}", self.word_count())?;
        let selected: Vec<&str> = self.selection().map(|(name, _)| name).collect();
        for name in self.registry.names() {
            let marker = if selected.contains(&name) { '*' } else { ' ' };
            let size = self.registry.get(name).map_or(0, |book| book.len());
            writeln!(out, "{marker} {name}: {size}")?;
        }
        Ok(())
    }

    fn print_book(&self, name: Option<String>, out: &mut impl Write) -> Result<()> {
        let name = match name.or_else(|| self.selection.keys().next().cloned()) {
            Some(name) => name,
            None => return Ok(()),
        };
        let book = self
            .registry
            .get(&name)
            .ok_or_else(|| DrillError::UnknownSelection(name.clone()))?;
        writeln!(out, "word book: {name}")?;
        for entry in book.entries() {
            writeln!(out, "{}", entry.foreign)?;
        }
        Ok(())
    }

    fn flush_missed(&mut self) {
        if let Err(err) = self.missed_log.flush(self.session.missed()) {
            warn!("{err:#}");
        }
    }

    /// End the run: final report, missed-word flush and history entry.
    pub fn finish(&mut self, out: &mut impl Write) -> io::Result<SessionReport> {
        self.session.quit();
        let report = self.report();
        writeln!(out)?;
        for line in report.summary_lines() {
            writeln!(out, "{line}")?;
        }

        match self.missed_log.flush(self.session.missed()) {
            Ok(_) => writeln!(
                out,
                "missed words saved to {}",
                self.missed_log.path().display()
            )?,
            Err(err) => writeln!(out, "{err:#}")?,
        }

        if let Some(store) = &self.store {
            if let Err(err) = store.append_report(&report) {
                warn!("save history failed: {err:#}");
            }
        }
        Ok(report)
    }
}

fn build_pool(registry: &CollectionRegistry, selection: &BTreeMap<String, Range<usize>>) -> DrillPool {
    let mut pool = DrillPool::new();
    for (name, range) in selection {
        if let Some(book) = registry.get(name) {
            let added = pool.add_range(book, range.clone());
            debug!("build test set from {name}: +{added}");
        }
    }
    pool
}
