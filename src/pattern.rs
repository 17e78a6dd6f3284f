//! FatFs-style wildcard matching for `find_first` / `find_next`.
//!
//! `?` matches exactly one character, `*` matches any run of characters
//! (including none). Matching is case-insensitive for ASCII, as FAT names are.

/// Returns `true` if `name` matches `pattern`.
///
/// ```rust
/// use fatfs_handle::pattern::matches;
///
/// assert!(matches("*", "anything"));
/// assert!(matches("*.TXT", "notes.txt"));
/// assert!(!matches("?.log", "ab.log"));
/// ```
pub fn matches(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position of the last `*` and the name index it was tried against.
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c.eq_ignore_ascii_case(&name[n]) => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, from)) => {
                    p = star + 1;
                    n = from + 1;
                    backtrack = Some((star, from + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_everything() {
        assert!(matches("*", ""));
        assert!(matches("*", "a"));
        assert!(matches("*", "long name.txt"));
    }

    #[test]
    fn question_mark_matches_one() {
        assert!(matches("a?c", "abc"));
        assert!(!matches("a?c", "ac"));
        assert!(!matches("a?c", "abbc"));
    }

    #[test]
    fn star_backtracks() {
        assert!(matches("*.log", "boot.old.log"));
        assert!(matches("a*b*c", "aXXbYYc"));
        assert!(!matches("a*b*c", "aXXbYY"));
    }

    #[test]
    fn case_insensitive() {
        assert!(matches("README.*", "readme.md"));
    }

    #[test]
    fn literal_mismatch() {
        assert!(!matches("abc", "abd"));
        assert!(!matches("abc", "ab"));
        assert!(!matches("", "a"));
        assert!(matches("", ""));
    }
}
