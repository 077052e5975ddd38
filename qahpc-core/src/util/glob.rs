//! Shell-style name matching for sample and file patterns.
//!
//! Supports `*`, `?` and bracket classes (`[abc]`, `[a-z]`, `[!x]`).
//! Matching is over the whole name; callers wrap substring patterns in `*`.

/// True if `pattern` matches all of `name`.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let s: Vec<char> = name.chars().collect();

    let (mut pi, mut si) = (0usize, 0usize);
    // position of the last `*` and the input index it was tried at
    let mut star: Option<(usize, usize)> = None;

    while si < s.len() {
        if pi < p.len() {
            match p[pi] {
                '*' => {
                    star = Some((pi, si));
                    pi += 1;
                    continue;
                }
                '?' => {
                    pi += 1;
                    si += 1;
                    continue;
                }
                '[' => {
                    if let Some((hit, len)) = match_class(&p[pi..], s[si]) {
                        if hit {
                            pi += len;
                            si += 1;
                            continue;
                        }
                    } else if s[si] == '[' {
                        // unclosed bracket is a literal
                        pi += 1;
                        si += 1;
                        continue;
                    }
                }
                c if c == s[si] => {
                    pi += 1;
                    si += 1;
                    continue;
                }
                _ => {}
            }
        }
        // mismatch: let the last star absorb one more char
        match star {
            Some((sp, ss)) => {
                pi = sp + 1;
                si = ss + 1;
                star = Some((sp, ss + 1));
            }
            None => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Prefix pattern `*p*` for a user-supplied substring filter.
pub fn substring_pattern(p: &str) -> String {
    format!("*{p}*")
}

/// Returns `(matched, consumed)` for a class starting at `p[0] == '['`,
/// or `None` when the bracket is never closed.
fn match_class(p: &[char], ch: char) -> Option<(bool, usize)> {
    let mut i = 1;
    let negate = matches!(p.get(i), Some('!') | Some('^'));
    if negate {
        i += 1;
    }
    let first = i;
    let mut hit = false;
    while i < p.len() {
        let c = p[i];
        if c == ']' && i > first {
            return Some((hit != negate, i + 1));
        }
        if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            if (c..=p[i + 2]).contains(&ch) {
                hit = true;
            }
            i += 3;
        } else {
            if c == ch {
                hit = true;
            }
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_and_stars() {
        assert!(glob_match("abc", "abc"));
        assert!(!glob_match("abc", "abcd"));
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "mc15_13TeV"));
        assert!(glob_match("*.root*", "AOD.0123._000001.pool.root.1"));
        assert!(!glob_match("*.root*", "log.tgz"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
    }

    #[test]
    fn substring_patterns() {
        let p = substring_pattern("ttbar");
        assert!(glob_match(&p, "mc15_13TeV.410000.ttbar_nonallhad"));
        assert!(glob_match(&p, "ttbar"));
        assert!(!glob_match(&p, "mc15_13TeV.361106.Zee"));
    }

    #[test]
    fn question_and_classes() {
        assert!(glob_match("f?.root", "f1.root"));
        assert!(!glob_match("f?.root", "f.root"));
        assert!(glob_match("run[0-9]", "run7"));
        assert!(!glob_match("run[0-9]", "runx"));
        assert!(glob_match("run[!0-9]", "runx"));
        assert!(glob_match("[ab]*", "beta"));
        assert!(glob_match("x[", "x["));
    }
}
