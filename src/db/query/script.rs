use tracing::debug;

use super::{ParsedScript, ScriptExecutor, DEFAULT_TERMINATOR};

const LINE_COMMENT: &str = "--";
const BLOCK_COMMENT_START: &str = "/*";
const BLOCK_COMMENT_END: &str = "*/";
const TERM_DIRECTIVE: &str = "SET TERM";

/// Line-oriented splitter state for one parse pass.
struct StatementBuilder {
    terminator: String,
    current: String,
    statements: Vec<String>,
}

impl StatementBuilder {
    fn new() -> Self {
        Self {
            terminator: DEFAULT_TERMINATOR.to_string(),
            current: String::new(),
            statements: Vec::new(),
        }
    }

    fn process_line(&mut self, line: &str) {
        let trimmed = line.trim();

        if ScriptExecutor::is_term_directive(trimmed) {
            self.flush_unterminated();
            match ScriptExecutor::parse_term_directive(trimmed) {
                Some(terminator) => {
                    debug!(from = %self.terminator, to = %terminator, "terminator changed");
                    self.terminator = terminator;
                }
                None => debug!(line = trimmed, "ignoring malformed SET TERM directive"),
            }
            return;
        }

        self.current.push_str(line);
        self.current.push('\n');

        if trimmed.ends_with(self.terminator.as_str()) {
            self.flush_terminated();
        }
    }

    /// Buffer ends with the active terminator: every terminator inside it is a boundary.
    fn flush_terminated(&mut self) {
        let buffer = std::mem::take(&mut self.current);
        let body = match buffer.rfind(self.terminator.as_str()) {
            Some(pos) => &buffer[..pos],
            None => buffer.as_str(),
        };
        for piece in body.split(self.terminator.as_str()) {
            push_trimmed(&mut self.statements, piece);
        }
    }

    /// Directive reached with an open statement: emit it as-is.
    fn flush_unterminated(&mut self) {
        let buffer = std::mem::take(&mut self.current);
        push_trimmed(&mut self.statements, &buffer);
    }

    fn finalize(mut self) -> Vec<String> {
        if !self.current.trim().is_empty() {
            // A last statement may have no terminator at all; split what is there.
            let buffer = std::mem::take(&mut self.current);
            for piece in buffer.split(self.terminator.as_str()) {
                push_trimmed(&mut self.statements, piece);
            }
        }
        self.statements
    }
}

/// `\r\n` and lone `\r` both end a line.
fn normalize_line_endings(sql: &str) -> String {
    sql.replace("\r\n", "\n").replace('\r', "\n")
}

fn push_trimmed(statements: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

impl ScriptExecutor {
    /// Parse one file's text into executable statements.
    ///
    /// Scripts that mention `SET TERM` anywhere go through the directive-aware
    /// line splitter; everything else is split on `;`. Both paths strip
    /// comments first and drop empty statements.
    pub fn parse_script(sql: &str) -> ParsedScript {
        if sql.trim().is_empty() {
            return ParsedScript::default();
        }

        let uses_directives = Self::contains_term_directive(sql);
        let stripped = Self::strip_comments(sql);
        let statements = if uses_directives {
            Self::split_with_term_directives(&stripped)
        } else {
            Self::split_simple(&stripped)
        };

        ParsedScript {
            statements,
            uses_directives,
        }
    }

    pub fn contains_term_directive(sql: &str) -> bool {
        sql.to_uppercase().contains(TERM_DIRECTIVE)
    }

    /// Remove `--` line comments, then `/* ... */` block comments.
    ///
    /// Neither pass knows about string literals. An unterminated block comment
    /// is left in place from its opening marker to the end of the text.
    pub fn strip_comments(sql: &str) -> String {
        let mut text = Self::strip_comment_pass(sql);
        loop {
            let next = Self::strip_comment_pass(&text);
            if next == text {
                return text;
            }
            text = next;
        }
    }

    fn strip_comment_pass(sql: &str) -> String {
        let without_line_comments = Self::strip_line_comments(sql);
        Self::strip_block_comments(&without_line_comments)
    }

    fn strip_line_comments(sql: &str) -> String {
        normalize_line_endings(sql)
            .lines()
            .map(|line| match line.find(LINE_COMMENT) {
                Some(pos) => &line[..pos],
                None => line,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn strip_block_comments(sql: &str) -> String {
        let mut text = sql.to_string();
        while let Some(start) = text.find(BLOCK_COMMENT_START) {
            let search_from = start + BLOCK_COMMENT_START.len();
            let Some(end) = text[search_from..].find(BLOCK_COMMENT_END) else {
                break;
            };
            let end = search_from + end + BLOCK_COMMENT_END.len();
            text.replace_range(start..end, "");
        }
        text
    }

    /// Split comment-free text on the default terminator.
    pub fn split_simple(sql: &str) -> Vec<String> {
        sql.split(DEFAULT_TERMINATOR)
            .map(str::trim)
            .filter(|statement| !statement.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Split comment-free text line by line, honoring `SET TERM` directives.
    pub fn split_with_term_directives(sql: &str) -> Vec<String> {
        let mut builder = StatementBuilder::new();
        for line in normalize_line_endings(sql).lines() {
            builder.process_line(line);
        }
        builder.finalize()
    }

    pub fn is_term_directive(trimmed_line: &str) -> bool {
        trimmed_line
            .get(..TERM_DIRECTIVE.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(TERM_DIRECTIVE))
    }

    /// New terminator named by a `SET TERM <token> [;]` line.
    ///
    /// Returns None when the line has fewer than three tokens. A token made
    /// only of `;` (as in `SET TERM ; ^`) selects `;` itself.
    pub fn parse_term_directive(trimmed_line: &str) -> Option<String> {
        let token = trimmed_line.split_whitespace().nth(2)?;
        let stripped = token.trim_end_matches(';');
        if stripped.is_empty() {
            Some(DEFAULT_TERMINATOR.to_string())
        } else {
            Some(stripped.to_string())
        }
    }
}
