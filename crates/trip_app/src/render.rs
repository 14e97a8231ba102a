use std::io::{self, Write};

use trip_core::{
    phase, AppViewModel, ChatRole, DownloadStatus, Generation, PhaseId, PhaseStatus, PHASES,
};
use trip_engine::download_url;

/// Prints view snapshots as an append-only transcript, writing only what
/// changed since the previous snapshot.
#[derive(Debug, Default)]
pub struct Renderer {
    interactive: bool,
    api_base: Option<String>,
    generation: Option<Generation>,
    announced_session: bool,
    statuses: [PhaseStatus; PhaseId::ALL.len()],
    searches_shown: usize,
    chat_shown: usize,
    pending_shown: bool,
    error_shown: Option<String>,
    download_shown: Option<DownloadStatus>,
    completion_shown: bool,
    show_phase: bool,
}

impl Renderer {
    pub fn new(interactive: bool) -> Self {
        Self {
            interactive,
            ..Self::default()
        }
    }

    /// Mention the backend download link for the plan once research completes.
    pub fn with_plan_links(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Print the selected phase result on the next render.
    pub fn request_phase(&mut self) {
        self.show_phase = true;
    }

    pub fn has_pending_output(&self) -> bool {
        self.show_phase
    }

    pub fn notice(&self, out: &mut impl Write, text: &str) -> io::Result<()> {
        writeln!(out, "{text}")?;
        out.flush()
    }

    pub fn render(&mut self, view: &AppViewModel, out: &mut impl Write) -> io::Result<()> {
        if self.generation != Some(view.generation) {
            *self = Self {
                interactive: self.interactive,
                api_base: self.api_base.take(),
                generation: Some(view.generation),
                show_phase: self.show_phase,
                ..Self::default()
            };
        }

        if let (false, Some(session_id)) = (self.announced_session, &view.session_id) {
            self.announced_session = true;
            let destination = view.destination.as_deref().unwrap_or("your trip");
            writeln!(out, "Researching {destination} (session {session_id})")?;
        }

        self.render_phases(view, out, |status| status == PhaseStatus::Running)?;
        for search in view.search_log.iter().skip(self.searches_shown) {
            writeln!(out, "    search: {}", search.query)?;
        }
        self.searches_shown = view.search_log.len();
        self.render_phases(view, out, PhaseStatus::is_terminal)?;

        if view.error != self.error_shown {
            if let Some(error) = &view.error {
                writeln!(out, "Error: {error}")?;
            }
            self.error_shown = view.error.clone();
        }

        if view.is_complete && !self.completion_shown {
            self.completion_shown = true;
            writeln!(
                out,
                "Research complete: {}/{} phases, {} searches.",
                view.completed_count,
                PHASES.len(),
                view.total_searches
            )?;
            if let Some(cost) = &view.estimated_cost {
                writeln!(out, "Estimated cost: {cost}")?;
            }
            if let (Some(base), Some(session_id)) = (&self.api_base, &view.session_id) {
                if let Ok(url) = download_url(base, session_id) {
                    writeln!(out, "Full plan: {url}")?;
                }
            }
            if self.interactive {
                writeln!(out, "Ask a question about the plan, or type /help.")?;
            }
        }

        self.render_chat(view, out)?;

        if view.download != self.download_shown {
            match &view.download {
                Some(DownloadStatus::Saved(path)) => writeln!(out, "Plan saved to {path}")?,
                Some(DownloadStatus::Failed(message)) => {
                    writeln!(out, "Download failed: {message}")?
                }
                None => {}
            }
            self.download_shown = view.download.clone();
        }

        if std::mem::take(&mut self.show_phase) {
            render_active_phase(view, out)?;
        }
        out.flush()
    }

    fn render_phases(
        &mut self,
        view: &AppViewModel,
        out: &mut impl Write,
        include: impl Fn(PhaseStatus) -> bool,
    ) -> io::Result<()> {
        for row in &view.phases {
            let shown = &mut self.statuses[row.id.index()];
            if row.status == *shown || !include(row.status) {
                continue;
            }
            *shown = row.status;
            match row.status {
                PhaseStatus::Running => writeln!(out, "{} {}...", row.icon, row.title)?,
                PhaseStatus::Complete => writeln!(
                    out,
                    "{} {}: done ({} searches)",
                    row.icon, row.title, row.searches
                )?,
                PhaseStatus::Error => writeln!(out, "{} {}: failed", row.icon, row.title)?,
                PhaseStatus::Pending => {}
            }
        }
        Ok(())
    }

    fn render_chat(&mut self, view: &AppViewModel, out: &mut impl Write) -> io::Result<()> {
        if view.chat.len() < self.chat_shown {
            // Cleared.
            self.chat_shown = 0;
        }
        for message in view.chat.iter().skip(self.chat_shown) {
            if message.role == ChatRole::Assistant {
                writeln!(out, "\n{}\n", message.content.trim_end())?;
            }
        }
        self.chat_shown = view.chat.len();

        if view.chat_pending && !self.pending_shown {
            writeln!(out, "(asking...)")?;
        }
        self.pending_shown = view.chat_pending;
        Ok(())
    }
}

fn render_active_phase(view: &AppViewModel, out: &mut impl Write) -> io::Result<()> {
    let row = phase(view.active_phase);
    match &view.active_markdown {
        Some(markdown) => {
            writeln!(out, "\n--- {} {} ---\n", row.icon, row.title)?;
            writeln!(out, "{}\n", markdown.trim_end())
        }
        None => writeln!(out, "No results for {} yet.", row.title),
    }
}
