use {crate::token::SourcePosition, thiserror::Error};

/// Lexical faults. Both are recoverable at the lexeme level: the scanner
/// reports them and keeps going, so one pass surfaces every error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Unexpected character.")]
    UnexpectedCharacter { position: SourcePosition },
    #[error("Unterminated string.")]
    UnterminatedString { position: SourcePosition },
}

impl ScanError {
    pub fn position(&self) -> &SourcePosition {
        match self {
            ScanError::UnexpectedCharacter { position } => position,
            ScanError::UnterminatedString { position } => position,
        }
    }

    pub fn line(&self) -> usize {
        self.position().line
    }

    pub fn span(&self) -> std::ops::Range<usize> {
        self.position().span.clone()
    }
}

/// Sink for lexical errors. The scanner never halts on a report and
/// ignores whatever the sink does with it.
pub trait Reporter {
    fn report(&mut self, error: ScanError);
}

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Could not read from file {0}")]
    IoError(#[from] std::io::Error),
}
