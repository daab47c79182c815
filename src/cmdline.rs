// src/cmdline.rs

//! Minimal command-line parser producing a [`PipelineSpec`].
//!
//! Grammar, in the spirit of a teaching shell:
//!
//! ```text
//! line     := stage ('|' stage)* ['&']
//! stage    := word+           (with '<' file / '>' file anywhere)
//! ```
//!
//! `<` and `>` apply to the pipeline as a whole (first and last stage) and
//! may each appear once. Words may be quoted with `'...'` (literal) or
//! `"..."` (with `\"` and `\\` escapes); outside quotes a backslash escapes
//! the next character.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{PipelineSpec, StageSpec};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated quote")]
    UnterminatedQuote,
    #[error("misplaced pipe")]
    EmptyStage,
    #[error("filename missing for {0} redirection")]
    MissingFile(char),
    #[error("only one {0} redirection is supported")]
    DuplicateRedirection(char),
    #[error("'&' must end the command line")]
    MisplacedBackground,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Pipe,
    Less,
    Greater,
    Amp,
}

/// Parse one input line. Blank lines give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<PipelineSpec>, ParseError> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut spec = PipelineSpec::default();
    let mut current: Vec<String> = Vec::new();
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        match token {
            Token::Word(word) => current.push(word),
            Token::Pipe => {
                if current.is_empty() {
                    return Err(ParseError::EmptyStage);
                }
                spec.stages.push(StageSpec::new(std::mem::take(&mut current)));
            }
            Token::Less | Token::Greater => {
                let (op, slot) = if token == Token::Less {
                    ('<', &mut spec.input)
                } else {
                    ('>', &mut spec.output)
                };
                let Some(Token::Word(file)) = iter.next() else {
                    return Err(ParseError::MissingFile(op));
                };
                if slot.is_some() {
                    return Err(ParseError::DuplicateRedirection(op));
                }
                *slot = Some(PathBuf::from(file));
            }
            Token::Amp => {
                if iter.peek().is_some() {
                    return Err(ParseError::MisplacedBackground);
                }
                spec.background = true;
            }
        }
    }

    if current.is_empty() {
        return Err(ParseError::EmptyStage);
    }
    spec.stages.push(StageSpec::new(current));
    Ok(Some(spec))
}

fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    // Distinguishes `''` (an empty word) from no word at all.
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => flush(&mut tokens, &mut word, &mut in_word),
            '|' | '<' | '>' | '&' => {
                flush(&mut tokens, &mut word, &mut in_word);
                tokens.push(match c {
                    '|' => Token::Pipe,
                    '<' => Token::Less,
                    '>' => Token::Greater,
                    _ => Token::Amp,
                });
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => word.push(ch),
                        None => return Err(ParseError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\')) => word.push(ch),
                            Some(ch) => {
                                word.push('\\');
                                word.push(ch);
                            }
                            None => return Err(ParseError::UnterminatedQuote),
                        },
                        Some(ch) => word.push(ch),
                        None => return Err(ParseError::UnterminatedQuote),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(ch) = chars.next() {
                    word.push(ch);
                }
            }
            _ => {
                in_word = true;
                word.push(c);
            }
        }
    }
    flush(&mut tokens, &mut word, &mut in_word);
    Ok(tokens)
}

fn flush(tokens: &mut Vec<Token>, word: &mut String, in_word: &mut bool) {
    if *in_word {
        tokens.push(Token::Word(std::mem::take(word)));
        *in_word = false;
    }
}
