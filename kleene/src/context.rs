use crate::error::{CompilationError, ErrorLoc};

/// The regex being compiled, used to point at the source of an error.
#[derive(Clone, Debug)]
pub struct Context {
    pub source: String,
}

impl Context {
    pub fn new(source: &str) -> Context {
        Context {
            source: source.to_owned(),
        }
    }

    // Spans are byte offsets, the caret goes under the chars
    fn render_error_loc(&self, loc: ErrorLoc, out: &mut String) {
        let span = match loc {
            ErrorLoc::NoLocation => return,
            ErrorLoc::SingleLocation(span) => span,
        };
        let column = self.source.get(..span.start).map_or(0, |x| x.chars().count());
        let width = self.source.get(span.start..=span.end)
            .map_or(1, |x| x.chars().count().max(1));

        out.push_str(&format!("  |{}\n", self.source));
        out.push_str(&format!("  |{}{}\n", " ".repeat(column), "^".repeat(width)));
    }

    pub fn render_error(&self, error: &dyn CompilationError) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}: {}!\n", error.error_type(), error.summarize()));
        self.render_error_loc(error.loc(), &mut out);
        out.push_str(&format!(">{}\n", error.description()));
        out
    }
}

#[cfg(test)]
mod tests {
    use kleene_automata::{compile, CompileConfig};

    use crate::context::Context;

    #[test]
    fn caret_under_error() {
        let err = compile("a|(b", &CompileConfig::default()).unwrap_err();
        let text = Context::new("a|(b").render_error(&err);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Syntax error: "), "{}", text);
        assert_eq!(lines[1], "  |a|(b");
        assert_eq!(lines[2], "  |  ^");
    }

    #[test]
    fn caret_counts_chars() {
        let err = compile("ééé)", &CompileConfig::default()).unwrap_err();
        let text = Context::new("ééé)").render_error(&err);
        assert_eq!(text.lines().nth(2), Some("  |   ^"));
    }

    #[test]
    fn no_location() {
        let config = CompileConfig { max_dfa_states: Some(1), ..CompileConfig::default() };
        let err = compile("a|b", &config).unwrap_err();
        let text = Context::new("a|b").render_error(&err);
        assert_eq!(text.lines().count(), 2, "{}", text);
    }
}
