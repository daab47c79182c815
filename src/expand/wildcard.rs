// src/expand/wildcard.rs

//! Filesystem wildcard matching (`*`, `?`, `[...]`).
//!
//! Patterns are matched one path component at a time against directory
//! listings obtained through [`FileSystem`], so `src/*/mod.rs` only lists
//! `src` and then probes each child. Results are sorted lexicographically.

use std::path::Path;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::fs::FileSystem;

/// Whether `s` contains any wildcard metacharacter.
///
/// A `[` only opens a class when a `]` closes it later (a `]` right after
/// `[`, `[!` or `[^` is a class member, not the end). An unclosed `[` is an
/// ordinary character, as in `[ -e file ]`.
pub fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?']) || has_class(s)
}

fn has_class(s: &str) -> bool {
    let Some(open) = s.find('[') else {
        return false;
    };
    let body = &s[open + 1..];
    let body = body.strip_prefix(['!', '^']).unwrap_or(body);
    let body = body.strip_prefix(']').unwrap_or(body);
    body.contains(']')
}

/// Match `pattern` against the filesystem.
///
/// Returns an empty vector when nothing matches; the caller decides what a
/// miss means. Errors only on patterns that do not compile.
pub fn match_pattern(fs: &dyn FileSystem, pattern: &str) -> Result<Vec<String>> {
    let (mut candidates, rest) = match pattern.strip_prefix('/') {
        Some(rest) => (vec!["/".to_string()], rest),
        None => (vec![String::new()], pattern),
    };

    let components: Vec<&str> = rest.split('/').collect();
    let last = components.len() - 1;

    for (idx, component) in components.iter().enumerate() {
        let is_last = idx == last;

        if component.is_empty() {
            // `a//b` or trailing `/`: the candidate must be a directory.
            candidates = candidates
                .into_iter()
                .filter(|c| fs.is_dir(Path::new(dir_of(c))))
                .map(|c| if c.ends_with('/') { c } else { format!("{c}/") })
                .collect();
            continue;
        }

        if !has_wildcard(component) {
            candidates = candidates
                .into_iter()
                .map(|c| join(&c, component))
                .filter(|c| {
                    if is_last {
                        fs.exists(Path::new(c))
                    } else {
                        fs.is_dir(Path::new(c))
                    }
                })
                .collect();
            continue;
        }

        let matcher = compile(component)?;
        let allow_hidden = component.starts_with('.');
        let mut next = Vec::new();

        for candidate in &candidates {
            let dir = dir_of(candidate);
            let entries = match fs.read_dir(Path::new(dir)) {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(dir, error = %err, "skipping unreadable directory");
                    continue;
                }
            };

            for entry in entries {
                let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if name.starts_with('.') && !allow_hidden {
                    continue;
                }
                if !matcher.is_match(name) {
                    continue;
                }
                let joined = join(candidate, name);
                if is_last || fs.is_dir(Path::new(&joined)) {
                    next.push(joined);
                }
            }
        }

        candidates = next;
        if candidates.is_empty() {
            break;
        }
    }

    candidates.sort();
    Ok(candidates)
}

fn compile(component: &str) -> Result<GlobMatcher> {
    // Unclosed brackets are literal; globset would reject them.
    let escaped;
    let pattern = if component.contains('[') && !has_class(component) {
        escaped = component.replace('[', "\\[");
        escaped.as_str()
    } else {
        component
    };
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(true)
        .build()
        .with_context(|| format!("invalid wildcard pattern: {component}"))?;
    Ok(glob.compile_matcher())
}

/// Directory to list for a candidate prefix (`""` means the cwd).
fn dir_of(candidate: &str) -> &str {
    if candidate.is_empty() { "." } else { candidate }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if prefix.ends_with('/') {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn tree() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("b.txt");
        fs.add_file("a.txt");
        fs.add_file("c.rs");
        fs.add_file(".hidden.txt");
        fs.add_file("src/main.rs");
        fs.add_file("src/lib.rs");
        fs.add_file("docs/lib.rs");
        fs
    }

    #[test]
    fn star_matches_sorted() {
        let fs = tree();
        assert_eq!(match_pattern(&fs, "*.txt").unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn hidden_entries_need_explicit_dot() {
        let fs = tree();
        assert_eq!(match_pattern(&fs, ".*.txt").unwrap(), vec![".hidden.txt"]);
    }

    #[test]
    fn question_and_class() {
        let fs = tree();
        assert_eq!(match_pattern(&fs, "?.rs").unwrap(), vec!["c.rs"]);
        assert_eq!(match_pattern(&fs, "[ab].txt").unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn wildcard_in_directory_component() {
        let fs = tree();
        assert_eq!(
            match_pattern(&fs, "*/lib.rs").unwrap(),
            vec!["docs/lib.rs", "src/lib.rs"]
        );
        assert_eq!(
            match_pattern(&fs, "src/*.rs").unwrap(),
            vec!["src/lib.rs", "src/main.rs"]
        );
    }

    #[test]
    fn no_match_is_empty() {
        let fs = tree();
        assert!(match_pattern(&fs, "*.zip").unwrap().is_empty());
        assert!(match_pattern(&fs, "nope/*").unwrap().is_empty());
    }

    #[test]
    fn absolute_patterns_keep_root() {
        let fs = MockFileSystem::new();
        fs.add_file("/data/one.log");
        fs.add_file("/data/two.log");
        assert_eq!(
            match_pattern(&fs, "/data/*.log").unwrap(),
            vec!["/data/one.log", "/data/two.log"]
        );
    }

    #[test]
    fn bad_class_is_an_error() {
        let fs = tree();
        assert!(match_pattern(&fs, "[z-a]").is_err());
    }

    #[test]
    fn unclosed_bracket_is_not_a_wildcard() {
        assert!(!has_wildcard("["));
        assert!(!has_wildcard("]"));
        assert!(!has_wildcard("a[b"));
        assert!(!has_wildcard("[]"));
        assert!(!has_wildcard("[!]"));
        assert!(has_wildcard("[ab]"));
        assert!(has_wildcard("[]a]"));
        assert!(has_wildcard("[!x]y"));
        assert!(has_wildcard("x*"));
        assert!(has_wildcard("[?"));
    }

    #[test]
    fn unclosed_bracket_next_to_star_matches_literally() {
        let fs = tree();
        fs.add_file("x[1.txt");
        fs.add_file("x[2.txt");
        assert_eq!(match_pattern(&fs, "x[*").unwrap(), vec!["x[1.txt", "x[2.txt"]);
    }
}
