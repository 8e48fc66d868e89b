use crate::modules::catalog;

/// A prefixed line split into its command name and raw arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Lower-cased first token; empty when only the prefix was sent.
    pub name: String,
    pub args: Vec<String>,
    /// Everything after the prefix, trimmed.
    pub raw: String,
}

impl ParsedLine {
    /// Arguments joined back with single spaces.
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}

/// Split `text` into a command line, or `None` when it lacks the prefix.
pub fn parse_line(text: &str, prefix: &str) -> Option<ParsedLine> {
    let body = text.strip_prefix(prefix)?.trim();
    let mut tokens = body.split_whitespace();
    let name = tokens.next().unwrap_or_default().to_lowercase();
    let args = tokens.map(str::to_string).collect();
    Some(ParsedLine {
        name,
        args,
        raw: body.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register,
    Profile,
    Work,
    Shop,
    Buy { item: String },
    Rules,
    Help,
    Gpt { query: String },
    YoutubeAudio { link: Option<String> },
    Emotion { name: String, gif: &'static str },
    Promote { target: Option<String> },
    Kick { target: Option<String> },
    Vote { target: Option<String> },
    SetGroupOpen { open: bool },
    Unknown { raw: String },
}

impl Command {
    pub fn from_parsed(line: &ParsedLine) -> Self {
        let first = || line.args.first().cloned();
        match line.name.as_str() {
            "iniciar" => Command::Register,
            "perfil" => Command::Profile,
            "trabajar" => Command::Work,
            "tienda" => Command::Shop,
            "comprar" => Command::Buy { item: line.rest() },
            "reglas" => Command::Rules,
            "help" => Command::Help,
            "gpt" => Command::Gpt { query: line.rest() },
            "musica_de_youtube" | "youtube_audio" => Command::YoutubeAudio { link: first() },
            "ascender" => Command::Promote { target: first() },
            "kick" => Command::Kick { target: first() },
            "votar" => Command::Vote { target: first() },
            "close" | "cerrar" => Command::SetGroupOpen { open: false },
            "open" | "abrir" => Command::SetGroupOpen { open: true },
            name => match catalog::emotion_gif(name) {
                Some(gif) => Command::Emotion {
                    name: name.to_string(),
                    gif,
                },
                None => Command::Unknown {
                    raw: line.raw.clone(),
                },
            },
        }
    }

    /// Moderator-only commands; the gate consults nothing else.
    pub fn is_privileged(&self) -> bool {
        matches!(
            self,
            Command::Promote { .. }
                | Command::Kick { .. }
                | Command::Vote { .. }
                | Command::SetGroupOpen { .. }
        )
    }

    /// Whether the sender needs an economy profile before this runs.
    pub fn requires_profile(&self) -> bool {
        matches!(
            self,
            Command::Profile
                | Command::Work
                | Command::Shop
                | Command::Buy { .. }
                | Command::Unknown { .. }
        )
    }

}

/// Parse `text` straight into a typed command.
pub fn parse_command(text: &str, prefix: &str) -> Option<Command> {
    parse_line(text, prefix).map(|line| Command::from_parsed(&line))
}
