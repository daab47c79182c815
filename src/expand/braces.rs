// src/expand/braces.rs

//! Single-level brace expansion: `a{1,2,3}b` -> `a1b a2b a3b`.
//!
//! Only the first `{` and the first `}` after it delimit a group. Nested or
//! repeated groups are left as literal text inside the alternatives.

/// Expand the first brace group of `arg`.
///
/// Arguments without a `{` followed later by a `}` come back unchanged as a
/// single element.
pub fn expand_braces(arg: &str) -> Vec<String> {
    let Some(open) = arg.find('{') else {
        return vec![arg.to_string()];
    };
    let Some(close) = arg[open + 1..].find('}').map(|rel| open + 1 + rel) else {
        return vec![arg.to_string()];
    };

    let prefix = &arg[..open];
    let body = &arg[open + 1..close];
    let suffix = &arg[close + 1..];

    body.split(',')
        .map(|alt| format!("{prefix}{alt}{suffix}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_alternatives_in_order() {
        assert_eq!(expand_braces("a{1,2,3}b"), vec!["a1b", "a2b", "a3b"]);
        assert_eq!(expand_braces("{x,y}"), vec!["x", "y"]);
        assert_eq!(expand_braces("file.{rs,toml}"), vec!["file.rs", "file.toml"]);
    }

    #[test]
    fn unmatched_braces_pass_through() {
        assert_eq!(expand_braces("plain"), vec!["plain"]);
        assert_eq!(expand_braces("a{b"), vec!["a{b"]);
        assert_eq!(expand_braces("a}b{"), vec!["a}b{"]);
    }

    #[test]
    fn only_first_group_is_expanded() {
        assert_eq!(expand_braces("{a,b}{c,d}"), vec!["a{c,d}", "b{c,d}"]);
    }

    #[test]
    fn empty_alternatives_are_kept() {
        assert_eq!(expand_braces("x{}y"), vec!["xy"]);
        assert_eq!(expand_braces("x{,1}"), vec!["x", "x1"]);
    }
}
