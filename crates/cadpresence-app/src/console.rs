//! Line commands accepted on stdin.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Switch to (or open) a document.
    Open(String),
    /// Close the active document.
    Close,
    /// Click the add-in's start command.
    Start,
    Status,
    Help,
    /// Close the host application.
    Quit,
}

pub const HELP: &str = "commands: open <name> | close | start | status | help | quit";

impl ConsoleCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "open" if rest.is_empty() => return Err("usage: open <document name>".into()),
            "open" => ConsoleCommand::Open(rest.to_string()),
            "close" => ConsoleCommand::Close,
            "start" => ConsoleCommand::Start,
            "status" => ConsoleCommand::Status,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(format!("unknown command '{other}' ({HELP})")),
        };
        Ok(Some(command))
    }
}
