//! Diagnostic collection
//!
//! Every lexical, syntax and semantic error found during a pass is funnelled
//! through a single [`Diagnostics`] value. It keeps the full record list (so
//! tests and callers can inspect what went wrong), a running total, and forwards
//! each diagnostic to a [`DiagnosticSink`] as soon as it is reported.
//!
//! The library default is [`SilentSink`]; the binary installs a [`StderrSink`].

use crate::parser::lexer::SourceLocation;
use crossterm::style::Stylize;
use std::fmt;

/// Which phase detected the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Lexical => write!(f, "Lexical error"),
            Severity::Syntax => write!(f, "Syntax error"),
            Severity::Semantic => write!(f, "Semantic error"),
        }
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}: {}",
            self.severity, self.location.line, self.location.column, self.message
        )
    }
}

/// Destination for diagnostics as they are reported
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: &Diagnostic);
}

/// Discards everything; records are still kept by [`Diagnostics`]
#[derive(Debug, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn emit(&mut self, _diagnostic: &Diagnostic) {}
}

/// Writes each diagnostic to stderr, coloured by severity when enabled
#[derive(Debug)]
pub struct StderrSink {
    color: bool,
}

impl StderrSink {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl DiagnosticSink for StderrSink {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if !self.color {
            eprintln!("{}", diagnostic);
            return;
        }

        let label = diagnostic.severity.to_string();
        let label = match diagnostic.severity {
            Severity::Lexical => label.magenta().bold(),
            Severity::Syntax => label.red().bold(),
            Severity::Semantic => label.yellow().bold(),
        };
        let position = format!(
            "line {}, column {}",
            diagnostic.location.line, diagnostic.location.column
        );
        eprintln!("{} at {}: {}", label, position.dark_grey(), diagnostic.message);
    }
}

/// Accumulated diagnostics for one analysis pass
pub struct Diagnostics {
    records: Vec<Diagnostic>,
    sink: Box<dyn DiagnosticSink>,
}

impl Diagnostics {
    /// Collector that keeps records but prints nothing
    pub fn new() -> Self {
        Self::with_sink(SilentSink)
    }

    pub fn with_sink(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            records: Vec::new(),
            sink: Box::new(sink),
        }
    }

    /// Record a diagnostic and forward it to the sink
    pub fn report(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        location: SourceLocation,
    ) {
        let diagnostic = Diagnostic {
            severity,
            message: message.into(),
            location,
        };
        self.sink.emit(&diagnostic);
        self.records.push(diagnostic);
    }

    /// Total number of errors reported so far
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn count_of(&self, severity: Severity) -> usize {
        self.records
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("records", &self.records)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl DiagnosticSink for Recorder {
        fn emit(&mut self, diagnostic: &Diagnostic) {
            self.0.borrow_mut().push(diagnostic.to_string());
        }
    }

    #[test]
    fn test_report_counts_by_severity() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(Severity::Lexical, "bad char", SourceLocation::new(1, 1));
        diagnostics.report(Severity::Semantic, "undeclared", SourceLocation::new(2, 3));
        diagnostics.report(Severity::Semantic, "mismatch", SourceLocation::new(4, 1));

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.count_of(Severity::Semantic), 2);
        assert_eq!(diagnostics.count_of(Severity::Syntax), 0);
        assert_eq!(diagnostics.records()[1].message, "undeclared");
    }

    #[test]
    fn test_sink_receives_formatted_diagnostic() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let mut diagnostics = Diagnostics::with_sink(Recorder(Rc::clone(&lines)));
        diagnostics.report(Severity::Syntax, "Expected ';'", SourceLocation::new(7, 12));

        assert_eq!(
            lines.borrow().as_slice(),
            ["Syntax error at line 7, column 12: Expected ';'"]
        );
    }
}
