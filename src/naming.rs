//! Unique naming for columns within a table and tables within a session.
//!
//! Both follow the same left-to-right rule: the first occurrence of a name
//! keeps it, and each later collision gets the smallest numeric suffix `>= 2`
//! not already taken by an earlier, finalised name.
//!
//! SQL identifiers fold ASCII case, so names are compared through
//! [`name_key`]; the returned names keep their original spelling.

use std::collections::HashSet;

use crate::error::{Error, Result};

/// The form two identifiers are compared in: `Foo` and `foo` collide.
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Returns `base`, or `base2`, `base3`, ... whichever is first absent from `taken`.
///
/// `taken` holds [`name_key`]s, not raw names.
pub fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(&name_key(base)) {
        return base.to_string();
    }
    let mut suffix = 2u64;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken.contains(&name_key(&candidate)) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Assigns a unique name to each entry of `bases`, in order.
pub fn assign_unique<I, S>(bases: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut taken = HashSet::new();
    let mut names = Vec::new();
    for base in bases {
        let name = unique_name(base.as_ref(), &taken);
        taken.insert(name_key(&name));
        names.push(name);
    }
    names
}

/// Column Namer: suffix duplicates, or reject them when renaming is disabled.
pub fn dedupe_column_names(headers: Vec<String>, auto_rename: bool) -> Result<Vec<String>> {
    if auto_rename {
        return Ok(assign_unique(&headers));
    }
    let mut seen = HashSet::with_capacity(headers.len());
    for header in &headers {
        if !seen.insert(name_key(header)) {
            return Err(Error::DuplicateColumnName(header.clone()));
        }
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn later_duplicates_receive_numeric_suffix() {
        let renamed = dedupe_column_names(names(&["a", "b", "a"]), true).unwrap();
        assert_eq!(renamed, names(&["a", "b", "a2"]));
    }

    #[test]
    fn suffixes_increase_with_each_repeat() {
        let renamed = dedupe_column_names(names(&["x", "x", "x", "y", "x"]), true).unwrap();
        assert_eq!(renamed, names(&["x", "x2", "x3", "y", "x4"]));
    }

    #[test]
    fn suffix_skips_names_already_present() {
        let renamed = dedupe_column_names(names(&["a", "a2", "a"]), true).unwrap();
        assert_eq!(renamed, names(&["a", "a2", "a3"]));

        let renamed = dedupe_column_names(names(&["a", "a", "a2"]), true).unwrap();
        assert_eq!(renamed, names(&["a", "a2", "a22"]));
    }

    #[test]
    fn disabled_renaming_rejects_duplicates() {
        let err = dedupe_column_names(names(&["id", "name", "id"]), false).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumnName(ref name) if name == "id"));
        assert!(dedupe_column_names(names(&["id", "name"]), false).is_ok());
    }

    #[test]
    fn names_differing_only_in_case_collide() {
        let renamed = dedupe_column_names(names(&["id", "ID", "Id"]), true).unwrap();
        assert_eq!(renamed, names(&["id", "ID2", "Id3"]));

        let err = dedupe_column_names(names(&["Name", "name"]), false).unwrap_err();
        assert!(matches!(err, Error::DuplicateColumnName(ref name) if name == "name"));
    }

    #[test]
    fn blank_headers_are_deduplicated_too() {
        let renamed = dedupe_column_names(names(&["", ""]), true).unwrap();
        assert_eq!(renamed, names(&["", "2"]));
    }
}
