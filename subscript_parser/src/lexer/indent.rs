//! Indentation tracking for INDENT/DEDENT generation.

/// Stack of open indentation levels plus bracket nesting state.
#[derive(Debug)]
pub struct IndentStack {
    levels: Vec<usize>,
    pending_dedents: usize,
    bracket_depth: usize,
    at_line_start: bool,
}

impl Default for IndentStack {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentStack {
    /// Create a stack at column zero, positioned at a line start.
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: vec![0],
            pending_dedents: 0,
            bracket_depth: 0,
            at_line_start: true,
        }
    }

    /// Whether DEDENT tokens are waiting to be emitted.
    #[inline]
    #[must_use]
    pub fn has_pending_dedents(&self) -> bool {
        self.pending_dedents > 0
    }

    /// Mark one pending DEDENT as emitted.
    pub fn consume_dedent(&mut self) {
        self.pending_dedents = self.pending_dedents.saturating_sub(1);
    }

    /// Whether the cursor sits at the start of a logical line.
    #[inline]
    #[must_use]
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Indentation is significant only outside brackets.
    #[inline]
    #[must_use]
    pub fn tracking_indent(&self) -> bool {
        self.bracket_depth == 0
    }

    /// Record that the current line has content.
    pub fn consumed_content(&mut self) {
        self.at_line_start = false;
    }

    /// Record a logical newline.
    pub fn new_line(&mut self) {
        self.at_line_start = true;
    }

    /// Enter a bracketed region.
    pub fn open_bracket(&mut self) {
        self.bracket_depth += 1;
    }

    /// Leave a bracketed region.
    pub fn close_bracket(&mut self) {
        self.bracket_depth = self.bracket_depth.saturating_sub(1);
    }

    /// Compare a new line's indentation with the current level.
    ///
    /// Returns `Some(true)` for an indent, `Some(false)` when dedents were
    /// queued, and `None` when the level is unchanged.
    pub fn process_indent(&mut self, width: usize) -> Result<Option<bool>, &'static str> {
        let current = self.current();
        if width == current {
            return Ok(None);
        }
        if width > current {
            self.levels.push(width);
            return Ok(Some(true));
        }

        while self.current() > width {
            self.levels.pop();
            self.pending_dedents += 1;
        }
        if self.current() != width {
            return Err("unindent does not match any outer indentation level");
        }
        Ok(Some(false))
    }

    /// Queue dedents for every open level. Returns how many were queued.
    pub fn close_all(&mut self) -> usize {
        let open = self.levels.len() - 1;
        self.levels.truncate(1);
        self.pending_dedents += open;
        open
    }

    fn current(&self) -> usize {
        self.levels.last().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_then_dedent() {
        let mut stack = IndentStack::new();
        assert_eq!(stack.process_indent(4), Ok(Some(true)));
        assert_eq!(stack.process_indent(4), Ok(None));
        assert_eq!(stack.process_indent(0), Ok(Some(false)));
        assert!(stack.has_pending_dedents());
        stack.consume_dedent();
        assert!(!stack.has_pending_dedents());
    }

    #[test]
    fn test_inconsistent_dedent() {
        let mut stack = IndentStack::new();
        stack.process_indent(4).unwrap();
        assert!(stack.process_indent(2).is_err());
    }

    #[test]
    fn test_close_all() {
        let mut stack = IndentStack::new();
        stack.process_indent(4).unwrap();
        stack.process_indent(8).unwrap();
        assert_eq!(stack.close_all(), 2);
    }

    #[test]
    fn test_brackets_suspend_tracking() {
        let mut stack = IndentStack::new();
        stack.open_bracket();
        assert!(!stack.tracking_indent());
        stack.close_bracket();
        assert!(stack.tracking_indent());
    }
}
