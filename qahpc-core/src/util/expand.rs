//! `$VAR` / `${VAR}` expansion for directory arguments such as `$SCRATCH`.

use std::path::PathBuf;

/// Expand variables from the process environment. Unknown variables and
/// malformed references are left as written.
pub fn expand_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

pub fn expand_path(input: &str) -> PathBuf {
    PathBuf::from(expand_vars(input))
}

pub fn expand_with<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        match (name.is_empty(), lookup(name)) {
            (false, Some(val)) => out.push_str(&val),
            _ => out.push_str(&rest[pos..pos + 1 + consumed]),
        }
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}
