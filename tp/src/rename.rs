//! File renaming rules
//!
//! Rules are derived from `$$FILE_<pattern>` configuration keys and match a
//! file's base name with exact equality - a pattern `a.txt` does not match
//! `ba.txt`. An earlier revision of this tool matched by substring
//! containment; exact match replaced it because partial matches renamed
//! files that merely contained the pattern.

use std::path::{Path, PathBuf};

/// One renaming rule: base name `pattern` becomes `replacement`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRule {
    pub pattern: String,
    pub replacement: String,
}

/// Compute the candidate renamed path for a file.
///
/// The base name is compared against each rule in order; the first matching
/// rule wins and no further rules are tried, so at most one rename applies
/// per file. The directory component is never touched. With no match the
/// original path comes back unchanged - callers compare by value to detect
/// "no change". No filesystem access happens here.
pub fn apply_renaming(path: &Path, rules: &[RenameRule]) -> PathBuf {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return path.to_path_buf();
    };

    for rule in rules {
        if file_name == rule.pattern {
            return path.with_file_name(&rule.replacement);
        }
    }

    path.to_path_buf()
}
