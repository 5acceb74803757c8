//! Decoding raw input lines into session commands.

/// The decoded form of one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Advance,
    Repeat,
    Quit,
    Question(String),
}

impl Command {
    /// Decode a raw input line. Blank lines decode to nothing.
    ///
    /// Keywords are case-insensitive; anything that is not a keyword
    /// is treated as a free-form question.
    pub fn decode(line: &str) -> Option<Command> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.to_lowercase().as_str() {
            "done" | "next" => Some(Command::Advance),
            "repeat" => Some(Command::Repeat),
            "quit" | "exit" => Some(Command::Quit),
            _ => Some(Command::Question(trimmed.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_keywords_case_insensitively() {
        assert_eq!(Command::decode("done"), Some(Command::Advance));
        assert_eq!(Command::decode("NEXT"), Some(Command::Advance));
        assert_eq!(Command::decode("Repeat"), Some(Command::Repeat));
        assert_eq!(Command::decode("quit"), Some(Command::Quit));
        assert_eq!(Command::decode("exit"), Some(Command::Quit));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(Command::decode("  next \n"), Some(Command::Advance));
    }

    #[test]
    fn anything_else_is_a_question() {
        assert_eq!(
            Command::decode("what does preheat mean?"),
            Some(Command::Question("what does preheat mean?".to_string()))
        );
        // A keyword inside a sentence is still a question.
        assert_eq!(
            Command::decode("am I done yet"),
            Some(Command::Question("am I done yet".to_string()))
        );
    }

    #[test]
    fn blank_lines_decode_to_nothing() {
        assert_eq!(Command::decode(""), None);
        assert_eq!(Command::decode("   \n"), None);
    }
}
