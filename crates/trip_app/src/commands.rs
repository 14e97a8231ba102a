use trip_core::{PhaseId, PHASES};

pub const HELP: &str = "Type a question to ask about your trip, or one of:
  /phase <id>          show a phase result (flights, hotels, transport, rules, itinerary)
  /download            save the full plan as markdown
  /regenerate          research the same trip again
  /new [destination]   drop this session, optionally researching somewhere else
  /clear               clear the chat
  /help                show this help
  /quit                exit";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    ShowPhase(PhaseId),
    Download,
    Regenerate,
    New(Option<String>),
    ClearChat,
    Help,
    Quit,
}

/// Parses a stdin line. `Ok(None)` for blank lines.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Ask(line.to_string())));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let command = match name.to_ascii_lowercase().as_str() {
        "phase" | "p" => {
            if arg.is_empty() {
                return Err(format!("usage: /phase <id> (one of {})", phase_ids()));
            }
            let id = arg
                .to_ascii_lowercase()
                .parse::<PhaseId>()
                .map_err(|err| format!("{err} (one of {})", phase_ids()))?;
            Command::ShowPhase(id)
        }
        "download" | "save" => Command::Download,
        "regenerate" | "again" => Command::Regenerate,
        "new" | "reset" => Command::New((!arg.is_empty()).then(|| arg.to_string())),
        "clear" => Command::ClearChat,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command /{other}; try /help")),
    };
    Ok(Some(command))
}

fn phase_ids() -> String {
    PHASES
        .iter()
        .map(|phase| phase.id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
