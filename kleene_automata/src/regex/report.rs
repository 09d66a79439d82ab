use std::slice::Iter;

use crate::loc::Span;

/// Collects the problems found while compiling a batch of regexes,
/// every entry remembers which regex of the batch it refers to.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct RegexReport {
    reports: Vec<RegexReportEntry>,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RegexReportLevel {
    Warning, Error,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RegexReportEntry {
    pub level: RegexReportLevel,
    pub description: String,
    pub regex_entry: usize,// The index of the regex in the batch
    pub start_index: usize,
    pub end_index: usize,
}

impl RegexReport {
    pub fn new() -> Self {
        RegexReport {
            reports: vec![],
        }
    }

    pub fn add_report(&mut self, level: RegexReportLevel, description: String, regex_entry: usize, span: Span) {
        self.reports.push(RegexReportEntry {
            level,
            description,
            regex_entry,
            start_index: span.start,
            end_index: span.end,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.iter().any(|x| x.level == RegexReportLevel::Error)
    }

    pub fn iter(&self) -> Iter<RegexReportEntry> {
        self.reports.iter()
    }

    pub fn entries_for(&self, regex_entry: usize) -> impl Iterator<Item = &RegexReportEntry> {
        self.reports.iter().filter(move |x| x.regex_entry == regex_entry)
    }
}

impl RegexReportEntry {
    pub fn span(&self) -> Span {
        Span::of(self.start_index, self.end_index)
    }
}
