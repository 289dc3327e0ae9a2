use lofty::{ParseOptions, ParsingMode};

/// Parser configuration shared by both pipelines
#[derive(Debug, Clone, Copy)]
pub struct ParseConfig {
    /// Read audio properties (default: true)
    pub read_properties: bool,

    /// How forgiving the tag parsers are with malformed data (default: best attempt)
    pub parsing_mode: ParsingMode,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            read_properties: true,
            parsing_mode: ParsingMode::BestAttempt,
        }
    }
}

impl ParseConfig {
    /// Configuration for callers that only need tags or pictures
    pub fn tags_only() -> Self {
        Self {
            read_properties: false,
            ..Self::default()
        }
    }

    /// Same settings with audio property decoding switched off
    pub fn without_properties(&self) -> Self {
        Self {
            read_properties: false,
            ..*self
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .read_properties(self.read_properties)
            .parsing_mode(self.parsing_mode)
    }
}
