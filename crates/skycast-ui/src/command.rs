//! Dashboard input commands.

/// A parsed input line. Positions are 1-based indexes into the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Refresh,
    Add(String),
    Delete(usize),
    Sync(usize),
    Forecast(usize),
    Favorite(usize),
    History(usize),
    Help,
    Quit,
}

impl Command {
    pub const HELP: &'static str = "Commands: add <city> | sync <n> | forecast <n> | fav <n> | \
history <n> | delete <n> | list | help | quit";

    /// Parse one input line. An empty line refreshes.
    ///
    /// # Errors
    /// Returns a message for unknown commands or a missing/invalid position.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let position = || {
            rest.parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("`{}` needs a city number from the list", verb))
        };

        match verb.to_lowercase().as_str() {
            "" | "list" | "ls" | "refresh" => Ok(Self::Refresh),
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "delete" | "del" | "rm" => position().map(Self::Delete),
            "sync" | "s" => position().map(Self::Sync),
            "forecast" | "f" => position().map(Self::Forecast),
            "fav" | "favorite" => position().map(Self::Favorite),
            "history" | "h" => position().map(Self::History),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("Unknown command `{}`. {}", other, Self::HELP)),
        }
    }
}
