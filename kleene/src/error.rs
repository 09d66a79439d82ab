use kleene_automata::loc::Span;
use kleene_automata::regex::{RegexReportEntry, RegexReportLevel};
use kleene_automata::CompileError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorLoc {
    NoLocation,
    SingleLocation(Span),
}

pub trait CompilationError {
    fn error_type(&self) -> String;

    fn loc(&self) -> ErrorLoc;

    fn summarize(&self) -> String;

    fn description(&self) -> String;
}

impl CompilationError for CompileError {
    fn error_type(&self) -> String {
        match self {
            CompileError::Syntax(_) => "Syntax error".to_owned(),
            CompileError::StateLimitExceeded { .. } => "State limit exceeded".to_owned(),
        }
    }

    fn loc(&self) -> ErrorLoc {
        match self {
            CompileError::Syntax(err) => ErrorLoc::SingleLocation(err.span()),
            CompileError::StateLimitExceeded { .. } => ErrorLoc::NoLocation,
        }
    }

    fn summarize(&self) -> String {
        CompileError::summarize(self)
    }

    fn description(&self) -> String {
        self.to_string()
    }
}

impl CompilationError for RegexReportEntry {
    fn error_type(&self) -> String {
        match self.level {
            RegexReportLevel::Warning => "warning".to_owned(),
            RegexReportLevel::Error => "error".to_owned(),
        }
    }

    fn loc(&self) -> ErrorLoc {
        match self.level {
            // Warnings refer to the automata, not to a part of the regex
            RegexReportLevel::Warning => ErrorLoc::NoLocation,
            RegexReportLevel::Error => ErrorLoc::SingleLocation(self.span()),
        }
    }

    fn summarize(&self) -> String {
        self.description.clone()
    }

    fn description(&self) -> String {
        format!("in regex #{}", self.regex_entry)
    }
}
