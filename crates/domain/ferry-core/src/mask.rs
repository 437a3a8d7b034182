use std::fmt;

use crate::path_utils::FerryPath;

/// Case-insensitive glob over a file's base name.
///
/// `*` matches any run of characters and `?` exactly one; everything else is
/// literal. An empty mask, `*` and `*.*` match every name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMask {
    raw: String,
    pattern: Option<Vec<char>>,
}

fn fold(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

impl FileMask {
    pub fn new(mask: &str) -> Self {
        let mask = mask.trim();
        let pattern = match mask {
            "" | "*" | "*.*" => None,
            other => Some(fold(other)),
        };
        Self {
            raw: mask.to_string(),
            pattern,
        }
    }

    pub fn match_all() -> Self {
        Self::new("")
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches_everything(&self) -> bool {
        self.pattern.is_none()
    }

    /// Directory components of `path` are ignored.
    pub fn is_match(&self, path: &str) -> bool {
        self.is_match_name(FerryPath::file_name(path))
    }

    /// Match an entry name exactly as listed. Unlike [`is_match`](Self::is_match)
    /// no separator is interpreted, so `x\y.csv` is one name.
    pub fn is_match_name(&self, name: &str) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) => wildcard_match(pattern, &fold(name)),
        }
    }
}

impl Default for FileMask {
    fn default() -> Self {
        Self::match_all()
    }
}

impl fmt::Display for FileMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.raw.is_empty() {
            f.write_str("*")
        } else {
            f.write_str(&self.raw)
        }
    }
}

// Greedy matcher with single-star backtracking; linear in practice.
fn wildcard_match(pattern: &[char], name: &[char]) -> bool {
    let (mut pi, mut si) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut resume = 0usize;

    while si < name.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == name[si]) {
            pi += 1;
            si += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star = Some(pi);
            pi += 1;
            resume = si;
        } else if let Some(star_at) = star {
            pi = star_at + 1;
            resume += 1;
            si = resume;
        } else {
            return false;
        }
    }
    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }
    pi == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::FileMask;

    #[test]
    fn star_matches_everything() {
        let mask = FileMask::new("*");
        for name in ["a.txt", "", "no_extension", "ÄÖ.bin", ".hidden"] {
            assert!(mask.is_match(name), "{name}");
        }
        assert!(FileMask::new("").is_match("anything"));
        assert!(FileMask::new("*.*").is_match("no_extension"));
    }

    #[test]
    fn extension_mask_is_case_insensitive_suffix() {
        let mask = FileMask::new("*.txt");
        assert!(mask.is_match("notes.txt"));
        assert!(mask.is_match("NOTES.TXT"));
        assert!(mask.is_match(".txt"));
        assert!(!mask.is_match("notes.txt.bak"));
        assert!(!mask.is_match("notes.tx"));
        assert!(!mask.is_match("txt"));
    }

    #[test]
    fn question_mark_is_exactly_one_char() {
        let mask = FileMask::new("inv_??.csv");
        assert!(mask.is_match("INV_01.csv"));
        assert!(!mask.is_match("inv_1.csv"));
        assert!(!mask.is_match("inv_001.csv"));
    }

    #[test]
    fn listed_names_keep_backslashes() {
        let mask = FileMask::new("x*.csv");
        assert!(mask.is_match_name("x\\y.csv"));
        assert!(!mask.is_match("x\\y.csv"));
        assert!(mask.is_match_name("X1:30.CSV"));
    }

    #[test]
    fn directory_components_are_ignored() {
        let mask = FileMask::new("a*.csv");
        assert!(mask.is_match("/data/in/abc.csv"));
        assert!(mask.is_match("C:\\data\\a.csv"));
        assert!(!mask.is_match("/a/b.csv"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let mask = FileMask::new("report[1].(x)+");
        assert!(mask.is_match("report[1].(x)+"));
        assert!(!mask.is_match("report1.x"));
    }

    #[test]
    fn multiple_stars_backtrack() {
        let mask = FileMask::new("*_*_final.*");
        assert!(mask.is_match("a_b_c_final.doc"));
        assert!(!mask.is_match("a_final.doc"));
    }
}
