use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use trip_core::{update, AppState, Effect, Generation, Msg, TripPreferences};
use trip_logging::{trip_info, trip_warn};

use crate::commands::{self, Command, HELP};
use crate::effects::EffectRunner;
use crate::render::Renderer;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Mailbox entries from the stdin reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Closed,
}

/// Owns `AppState` and is the only place it changes.
pub struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    out: W,
    base_prefs: TripPreferences,
    creating: Option<Generation>,
    downloads_in_flight: usize,
    input_open: bool,
    quit: bool,
}

impl<W: Write> App<W> {
    pub fn new(runner: EffectRunner, base_prefs: TripPreferences, interactive: bool, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::new(interactive),
            out,
            base_prefs,
            creating: None,
            downloads_in_flight: 0,
            input_open: interactive,
            quit: false,
        }
    }

    pub fn with_plan_links(mut self, api_base: &str) -> Self {
        self.renderer = self.renderer.with_plan_links(api_base);
        self
    }

    /// Starts research and runs until `/quit`, or until input is closed and
    /// nothing is in flight. Returns whether the session ended without error.
    pub fn run(mut self, input: mpsc::Receiver<Input>) -> anyhow::Result<bool> {
        self.dispatch(Msg::StartRequested(self.base_prefs.clone()))?;

        loop {
            self.drain_engine()?;
            if self.quit || (!self.input_open && self.is_idle()) {
                break;
            }

            if self.input_open {
                match input.recv_timeout(POLL_INTERVAL) {
                    Ok(Input::Line(line)) => self.handle_line(&line)?,
                    Ok(Input::Closed) | Err(RecvTimeoutError::Disconnected) => {
                        self.input_open = false;
                    }
                    Err(RecvTimeoutError::Timeout) => self.dispatch(Msg::Tick)?,
                }
            } else if let Some(msg) = self.runner.wait(POLL_INTERVAL) {
                self.handle_engine(msg)?;
            }
        }

        if let Some(generation) = self
            .state
            .is_stream_live()
            .then(|| self.state.generation())
        {
            self.runner.run(vec![Effect::CloseStream { generation }]);
        }
        let view = self.state.view();
        trip_info!(
            "Exiting: complete={} error={:?}",
            view.is_complete,
            view.error
        );
        Ok(view.error.is_none())
    }

    fn drain_engine(&mut self) -> anyhow::Result<()> {
        while let Some(msg) = self.runner.poll() {
            self.handle_engine(msg)?;
        }
        Ok(())
    }

    fn handle_engine(&mut self, msg: Result<Msg, String>) -> anyhow::Result<()> {
        let msg = msg.map_err(|message| anyhow!("engine stopped: {message}"))?;
        match &msg {
            Msg::SessionCreated { generation, .. } | Msg::SessionFailed { generation, .. }
                if self.creating == Some(*generation) =>
            {
                self.creating = None;
            }
            Msg::PlanSaved { .. } | Msg::DownloadFailed { .. } => {
                self.downloads_in_flight = self.downloads_in_flight.saturating_sub(1);
            }
            _ => {}
        }
        self.dispatch(msg)?;
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> anyhow::Result<()> {
        let command = match commands::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(()),
            Err(message) => {
                self.renderer.notice(&mut self.out, &message)?;
                return Ok(());
            }
        };

        let view = self.state.view();
        match command {
            Command::Ask(question) => {
                if view.session_id.is_none() {
                    self.notice("No research session yet. Use /regenerate or /new <destination>.")?;
                } else if view.chat_pending {
                    self.notice("Still waiting for the previous answer.")?;
                } else {
                    self.dispatch(Msg::ChatSubmitted(question))?;
                }
            }
            Command::ShowPhase(phase_id) => {
                self.renderer.request_phase();
                self.dispatch(Msg::PhaseSelected(phase_id))?;
            }
            Command::Download => {
                if view.completed_count == 0 {
                    self.notice("Nothing to download yet.")?;
                } else {
                    self.dispatch(Msg::DownloadRequested)?;
                }
            }
            Command::Regenerate => {
                if self.state.last_prefs().is_none() {
                    self.notice("Nothing to regenerate yet.")?;
                } else {
                    self.dispatch(Msg::RegenerateRequested)?;
                }
            }
            Command::New(None) => {
                self.dispatch(Msg::ResetRequested)?;
                self.notice("Session cleared. Use /new <destination> or /regenerate to start again.")?;
            }
            Command::New(Some(destination)) => {
                let mut prefs = self.base_prefs.clone();
                prefs.destination = destination;
                self.dispatch(Msg::StartRequested(prefs))?;
            }
            Command::ClearChat => self.dispatch(Msg::ChatCleared)?,
            Command::Help => self.notice(HELP)?,
            Command::Quit => self.quit = true,
        }
        Ok(())
    }

    /// Single-writer step: fold one message into the state, run its effects,
    /// and render if anything visible changed.
    fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;

        for effect in &effects {
            match effect {
                Effect::CreateSession { generation, prefs } => {
                    self.creating = Some(*generation);
                    let line = format!(
                        "Starting research for {} ({} days, {}, {})...",
                        prefs.destination, prefs.days, prefs.budget, prefs.travel_style
                    );
                    self.renderer.notice(&mut self.out, &line)?;
                }
                Effect::DownloadPlan { .. } => self.downloads_in_flight += 1,
                _ => {}
            }
        }
        self.runner.run(effects);

        if self.state.consume_dirty() || self.renderer.has_pending_output() {
            let view = self.state.view();
            self.renderer.render(&view, &mut self.out)?;
        }
        Ok(())
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        self.renderer.notice(&mut self.out, text)
    }

    fn is_idle(&self) -> bool {
        let creating = self.creating == Some(self.state.generation());
        !creating
            && !self.state.is_stream_live()
            && !self.state.chat().is_pending()
            && self.downloads_in_flight == 0
    }
}

/// Forwards stdin lines to the mailbox until EOF.
pub fn spawn_stdin_reader(tx: mpsc::Sender<Input>) -> anyhow::Result<()> {
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(Input::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        trip_warn!("Could not read stdin: {}", err);
                        break;
                    }
                }
            }
            let _ = tx.send(Input::Closed);
        })
        .context("could not start stdin reader")?;
    Ok(())
}
