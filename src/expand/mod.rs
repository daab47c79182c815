// src/expand/mod.rs

//! Argument expansion performed before a stage is launched.
//!
//! Each argument goes through, in order:
//! 1. brace expansion ([`braces`]),
//! 2. tilde expansion (`~` / `~/...` to the home directory),
//! 3. wildcard expansion ([`wildcard`]); a pattern matching nothing stays
//!    as the literal argument.
//!
//! Expansion never fails the caller: if anything goes wrong the original
//! argument vector is returned untouched.

pub mod braces;
pub mod wildcard;

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::ExpandSection;
use crate::fs::{FileSystem, RealFileSystem};

pub use braces::expand_braces;
pub use wildcard::{has_wildcard, match_pattern};

#[derive(Debug, Clone)]
pub struct ArgumentExpander {
    fs: Arc<dyn FileSystem>,
    options: ExpandSection,
    home: Option<String>,
}

impl ArgumentExpander {
    /// Expander over the real filesystem, with `$HOME` as home directory.
    pub fn new(options: ExpandSection) -> Self {
        let home = std::env::var("HOME").ok().filter(|h| !h.is_empty());
        Self {
            fs: Arc::new(RealFileSystem),
            options,
            home,
        }
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_home(mut self, home: Option<String>) -> Self {
        self.home = home;
        self
    }

    /// Expand every argument of `argv`, preserving argument order.
    pub fn expand(&self, argv: &[String]) -> Vec<String> {
        match self.try_expand(argv) {
            Ok(expanded) => {
                if expanded.as_slice() != argv {
                    debug!(?argv, ?expanded, "expanded arguments");
                }
                expanded
            }
            Err(err) => {
                warn!(error = %err, ?argv, "argument expansion failed; using literal arguments");
                argv.to_vec()
            }
        }
    }

    fn try_expand(&self, argv: &[String]) -> Result<Vec<String>> {
        let mut out = Vec::with_capacity(argv.len());
        for arg in argv {
            let words = if self.options.braces {
                expand_braces(arg)
            } else {
                vec![arg.clone()]
            };

            for word in words {
                let word = if self.options.tilde {
                    self.expand_tilde(word)
                } else {
                    word
                };

                if self.options.wildcards && has_wildcard(&word) {
                    let matches = match_pattern(self.fs.as_ref(), &word)?;
                    if matches.is_empty() {
                        out.push(word);
                    } else {
                        out.extend(matches);
                    }
                } else {
                    out.push(word);
                }
            }
        }
        Ok(out)
    }

    fn expand_tilde(&self, word: String) -> String {
        let Some(home) = self.home.as_deref() else {
            return word;
        };
        if word == "~" {
            return home.to_string();
        }
        match word.strip_prefix("~/") {
            Some(rest) => format!("{}/{}", home.trim_end_matches('/'), rest),
            None => word,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn expander(fs: MockFileSystem) -> ArgumentExpander {
        ArgumentExpander::new(ExpandSection::default())
            .with_filesystem(Arc::new(fs))
            .with_home(Some("/home/user".to_string()))
    }

    #[test]
    fn braces_then_wildcards_in_argument_order() {
        let fs = MockFileSystem::new();
        fs.add_file("x.rs");
        fs.add_file("y.rs");
        fs.add_file("z.toml");

        let out = expander(fs).expand(&args(&["ls", "*.{toml,rs}", "-l"]));
        assert_eq!(out, args(&["ls", "z.toml", "x.rs", "y.rs", "-l"]));
    }

    #[test]
    fn unmatched_pattern_stays_literal() {
        let out = expander(MockFileSystem::new()).expand(&args(&["cat", "*.nothing"]));
        assert_eq!(out, args(&["cat", "*.nothing"]));
    }

    #[test]
    fn tilde_uses_home() {
        let out = expander(MockFileSystem::new()).expand(&args(&["cd", "~", "~/notes", "a~b"]));
        assert_eq!(out, args(&["cd", "/home/user", "/home/user/notes", "a~b"]));
    }

    #[test]
    fn tilde_without_home_is_literal() {
        let out = expander(MockFileSystem::new())
            .with_home(None)
            .expand(&args(&["echo", "~/x"]));
        assert_eq!(out, args(&["echo", "~/x"]));
    }

    #[test]
    fn invalid_pattern_returns_original_vector() {
        let fs = MockFileSystem::new();
        fs.add_file("a.txt");
        let input = args(&["echo", "{a,b}", "*.txt", "[z-a]"]);
        assert_eq!(expander(fs).expand(&input), input);
    }

    #[test]
    fn unclosed_bracket_does_not_block_other_arguments() {
        let fs = MockFileSystem::new();
        fs.add_file("a.txt");
        let out = expander(fs).expand(&args(&["[", "-e", "*.txt", "x{1,2}", "]"]));
        assert_eq!(out, args(&["[", "-e", "a.txt", "x1", "x2", "]"]));
    }

    #[test]
    fn disabled_passes_skip_work() {
        let fs = MockFileSystem::new();
        fs.add_file("a.txt");
        let options = ExpandSection {
            braces: false,
            wildcards: false,
            tilde: false,
        };
        let out = ArgumentExpander::new(options)
            .with_filesystem(Arc::new(fs))
            .expand(&args(&["echo", "{a,b}", "*.txt", "~"]));
        assert_eq!(out, args(&["echo", "{a,b}", "*.txt", "~"]));
    }
}
