//! Module with the lexer runtime (C8): a byte-at-a-time, longest-match tokenizer driven by a
//! combined multi-mode DFA, plus [`Source`], the diagnostic-formatting wrapper around a named
//! input buffer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::generator::{CombinedDfa, GeneratorOutput};
use crate::mode::{Mode, ModeTransitions};
use crate::position::{Position, PositionProvider};
use crate::span::Span;

/// One emitted token: a kind label and the byte span it covers in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The matched rule name, or a mode's `invalid`/`incomplete` label.
    pub kind: String,
    /// The byte offsets this token covers.
    pub span: Span,
}

impl Token {
    /// The start offset, inclusive.
    pub fn pos(&self) -> usize {
        self.span.start
    }

    /// The end offset, exclusive.
    pub fn end(&self) -> usize {
        self.span.end
    }
}

/// A named, read-only source buffer with diagnostic-formatting helpers, grounded on the
/// `Source`/`diagnostic_at`/`diagnostic_at_end` helpers of the runtime this generator's lexer is
/// descended from.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    text: Vec<u8>,
    newline_positions: Vec<usize>,
}

impl Source {
    /// Wraps `text` under `name`, precomputing the newline offset table used by every line
    /// query below.
    pub fn new(name: impl Into<String>, text: impl Into<Vec<u8>>) -> Self {
        let text = text.into();
        let newline_positions = text
            .iter()
            .enumerate()
            .filter(|(_, &b)| b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self {
            name: name.into(),
            text,
            newline_positions,
        }
    }

    /// The source's name, as given to [`Source::new`].
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw byte buffer.
    pub fn text(&self) -> &[u8] {
        &self.text
    }

    /// The 0-based index of the line containing byte offset `pos`.
    pub fn line_index(&self, pos: usize) -> usize {
        match self.newline_positions.binary_search(&pos) {
            Ok(i) => i,
            Err(i) => i,
        }
    }

    /// The byte offset starting the line containing `pos`: one past the nearest preceding
    /// newline, or 0 if there is none.
    pub fn line_start(&self, pos: usize) -> usize {
        self.newline_positions
            .iter()
            .rev()
            .find(|&&n| n < pos)
            .map(|&n| n + 1)
            .unwrap_or(0)
    }

    /// The byte offset ending the line containing `pos`, including a trailing newline if
    /// present, or the buffer length if `pos`'s line is the last and unterminated.
    pub fn line_end(&self, pos: usize) -> usize {
        self.newline_positions
            .iter()
            .find(|&&n| n >= pos)
            .map(|&n| n + 1)
            .unwrap_or(self.text.len())
    }

    fn line_str(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.text[start..end]).into_owned()
    }

    /// Renders a diagnostic for the span `[pos, end)`: `name:line:col: msg` followed by the
    /// source line and a caret/tilde underline spanning `pos..end`.
    pub fn diagnostic_at(&self, pos: usize, end: usize, msg: &str) -> String {
        let line_pos = self.line_start(pos);
        let line_end = self.line_end(pos);
        let line_idx = self.line_index(pos);
        self.render_diagnostic(pos, end.max(pos), line_pos, line_end, line_idx, msg)
    }

    /// Renders a diagnostic anchored at end-of-text, for "unexpected end of input" style
    /// messages.
    pub fn diagnostic_at_end(&self, msg: &str) -> String {
        let pos = self.text.len();
        let line_pos = self.line_start(pos);
        let line_end = self.line_end(pos.saturating_sub(1).max(line_pos));
        let line_idx = self.line_index(pos);
        self.render_diagnostic(pos, pos, line_pos, line_end.max(line_pos), line_idx, msg)
    }

    fn render_diagnostic(
        &self,
        pos: usize,
        end: usize,
        line_pos: usize,
        line_end: usize,
        line_idx: usize,
        msg: &str,
    ) -> String {
        let line_str = self.line_str(line_pos, line_end.min(self.text.len()));
        let underline_end = end.min(line_end);
        let mut underline = String::new();
        for _ in line_pos..pos {
            underline.push(' ');
        }
        if pos >= underline_end {
            underline.push('^');
        } else {
            for _ in pos..underline_end {
                underline.push('~');
            }
        }
        let col = pos - line_pos + 1;
        format!(
            "{}:{}:{}: {}\n| {}\n  {}\n",
            self.name,
            line_idx + 1,
            col,
            msg,
            line_str.trim_end_matches('\n'),
            underline
        )
    }
}

impl PositionProvider for Source {
    /// Translates a byte offset into a 1-based `(line, column)` pair, the way a diagnostic
    /// formatter needs to when the caller wants structured coordinates rather than a
    /// pre-rendered string.
    fn position(&self, offset: usize) -> Position {
        let line_pos = self.line_start(offset);
        Position::new(self.line_index(offset) + 1, offset - line_pos + 1)
    }

    /// `Source` is immutable after construction; it has no cursor to move, so this is a no-op.
    fn set_offset(&mut self, _offset: usize) {}
}

/// Byte-at-a-time, longest-match lexer over a [`Source`], driven by a combined DFA and a
/// pushdown mode stack. Implements the per-token algorithm: run the DFA from the active mode's
/// start node, remembering the last match seen; on running out of transitions or input, emit
/// that last match (or `incomplete` if none was ever seen), then update the mode stack
/// (pop-wins: a matching `pop_kind` is checked before any push transition).
pub struct Lexer<'a> {
    source: &'a Source,
    dfa: &'a CombinedDfa,
    modes: &'a [Mode],
    mode_transitions: &'a ModeTransitions,
    pos: usize,
    stack: Vec<(usize, Option<String>)>,
}

impl<'a> Lexer<'a> {
    /// Builds a lexer over `source` from the artifacts produced by [`crate::generator::GeneratorBuilder::build`].
    /// The mode stack starts as `[(main, None)]`.
    pub fn new(source: &'a Source, output: &'a GeneratorOutput) -> Self {
        Self {
            source,
            dfa: &output.dfa,
            modes: &output.modes,
            mode_transitions: &output.mode_transitions,
            pos: 0,
            stack: vec![(0, None)],
        }
    }

    fn current_mode(&self) -> &Mode {
        let (idx, _) = self.stack[self.stack.len() - 1];
        &self.modes[idx]
    }

    fn mode_index(&self, name: &str) -> usize {
        self.modes
            .iter()
            .position(|m| m.name == name)
            .expect("mode transitions reference a mode registered with the generator")
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        let text = self.source.text();
        if self.pos == text.len() {
            return Ok(None);
        }
        let token_pos = self.pos;
        let (mode_idx, pop_kind) = self.stack[self.stack.len() - 1].clone();
        let mode = &self.modes[mode_idx];

        let mut node = mode.start_node;
        let mut end: Option<usize> = None;
        let mut kind = mode.incomplete_name.clone();
        let mut pos = self.pos;

        while pos < text.len() {
            match self.dfa.advance(node, text[pos]) {
                Some(next) => {
                    node = next;
                    pos += 1;
                    if let Some(name) = self.dfa.match_name(node) {
                        end = Some(pos);
                        kind = name.to_string();
                    }
                }
                None => break,
            }
        }

        let end = end.unwrap_or(pos);
        if end == token_pos {
            debug_assert!(false, "lexer made no progress at position {}", token_pos);
            return Err(Error::NoProgress(token_pos));
        }

        self.pos = end;
        if Some(&kind) == pop_kind.as_ref() {
            self.stack.pop();
        } else if let Some((to_mode, pop)) = self
            .mode_transitions
            .get(&(mode.name.clone(), kind.clone()))
        {
            let to_idx = self.mode_index(to_mode);
            self.stack.push((to_idx, Some(pop.clone())));
        }

        Ok(Some(Token {
            kind,
            span: Span::new(token_pos, end),
        }))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

impl fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer")
            .field("pos", &self.pos)
            .field("mode", &self.current_mode().name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::GeneratorBuilder;
    use crate::pattern::Pattern;

    fn word_ws_generator() -> GeneratorOutput {
        GeneratorBuilder::new()
            .mode(
                "main",
                vec![
                    (
                        "word".to_string(),
                        Pattern::Plus(Box::new(Pattern::CharClass(vec![(b'a', b'z')]))),
                    ),
                    ("ws".to_string(), Pattern::Plus(Box::new(Pattern::Char(b' ')))),
                ],
            )
            .build()
            .unwrap()
    }

    #[test]
    fn scenario_s1_word_and_whitespace() {
        let output = word_ws_generator();
        let source = Source::new("s1", b"hi you".to_vec());
        let tokens: Vec<Token> = Lexer::new(&source, &output).map(|t| t.unwrap()).collect();
        assert_eq!(
            tokens,
            vec![
                Token { kind: "word".into(), span: Span::new(0, 2) },
                Token { kind: "ws".into(), span: Span::new(2, 3) },
                Token { kind: "word".into(), span: Span::new(3, 6) },
            ]
        );
    }

    #[test]
    fn scenario_s2_invalid_byte_with_no_whitespace_rule() {
        let output = GeneratorBuilder::new()
            .mode(
                "main",
                vec![
                    (
                        "num".to_string(),
                        Pattern::Plus(Box::new(Pattern::CharClass(vec![(b'0', b'9')]))),
                    ),
                    (
                        "id".to_string(),
                        Pattern::Seq(vec![
                            Pattern::CharClass(vec![(b'a', b'z')]),
                            Pattern::Star(Box::new(Pattern::CharClass(vec![(b'a', b'z'), (b'0', b'9')]))),
                        ]),
                    ),
                ],
            )
            .build()
            .unwrap();
        let source = Source::new("s2", b"a1 2b".to_vec());
        let tokens: Vec<Token> = Lexer::new(&source, &output).map(|t| t.unwrap()).collect();
        assert_eq!(
            tokens,
            vec![
                Token { kind: "id".into(), span: Span::new(0, 2) },
                Token { kind: "invalid".into(), span: Span::new(2, 3) },
                Token { kind: "num".into(), span: Span::new(3, 4) },
                Token { kind: "id".into(), span: Span::new(4, 5) },
            ]
        );
    }

    #[test]
    fn scenario_s3_mode_push_and_pop() {
        let output = GeneratorBuilder::new()
            .mode("main", vec![("open".to_string(), Pattern::literal(b"("))])
            .mode(
                "paren",
                vec![
                    ("close".to_string(), Pattern::literal(b")")),
                    (
                        "word".to_string(),
                        Pattern::Plus(Box::new(Pattern::CharClass(vec![(b'a', b'z')]))),
                    ),
                ],
            )
            .mode_transition("main", "open", "paren", "close")
            .build()
            .unwrap();
        let source = Source::new("s3", b"(ab)c".to_vec());
        let tokens: Vec<Token> = Lexer::new(&source, &output).map(|t| t.unwrap()).collect();
        assert_eq!(
            tokens,
            vec![
                Token { kind: "open".into(), span: Span::new(0, 1) },
                Token { kind: "word".into(), span: Span::new(1, 3) },
                Token { kind: "close".into(), span: Span::new(3, 4) },
                Token { kind: "invalid".into(), span: Span::new(4, 5) },
            ]
        );
    }

    #[test]
    fn scenario_s4_literal_bias_then_longest_match() {
        let output = GeneratorBuilder::new()
            .mode(
                "main",
                vec![
                    ("kw".to_string(), Pattern::literal(b"if")),
                    (
                        "id".to_string(),
                        Pattern::Plus(Box::new(Pattern::CharClass(vec![(b'a', b'z')]))),
                    ),
                    ("ws".to_string(), Pattern::Plus(Box::new(Pattern::Char(b' ')))),
                ],
            )
            .build()
            .unwrap();
        let source = Source::new("s4", b"if ifx".to_vec());
        let tokens: Vec<Token> = Lexer::new(&source, &output).map(|t| t.unwrap()).collect();
        assert_eq!(
            tokens,
            vec![
                Token { kind: "kw".into(), span: Span::new(0, 2) },
                Token { kind: "ws".into(), span: Span::new(2, 3) },
                Token { kind: "id".into(), span: Span::new(3, 6) },
            ]
        );
    }

    #[test]
    fn lexer_totality_covers_full_input() {
        let output = word_ws_generator();
        let source = Source::new("total", b"hi you".to_vec());
        let text = source.text().to_vec();
        let mut covered = Vec::new();
        for token in Lexer::new(&source, &output) {
            let token = token.unwrap();
            covered.extend_from_slice(&text[token.pos()..token.end()]);
        }
        assert_eq!(covered, text);
    }

    #[test]
    fn diagnostic_at_renders_caret_underline() {
        let source = Source::new("f", b"let x = 1\n".to_vec());
        let rendered = source.diagnostic_at(4, 5, "unexpected token");
        assert!(rendered.starts_with("f:1:5: unexpected token\n"));
        assert!(rendered.contains("let x = 1"));
        assert!(rendered.contains('~'));
    }

    #[test]
    fn diagnostic_at_end_anchors_past_last_byte() {
        let source = Source::new("f", b"abc".to_vec());
        let rendered = source.diagnostic_at_end("unexpected end of input");
        assert!(rendered.contains("unexpected end of input"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn position_tracks_line_and_column() {
        let source = Source::new("f", b"ab\ncd".to_vec());
        assert_eq!(source.position(0), Position::new(1, 1));
        assert_eq!(source.position(2), Position::new(1, 3));
        assert_eq!(source.position(3), Position::new(2, 1));
        assert_eq!(source.position(4), Position::new(2, 2));
    }
}
