/// The key used to compare section names.
///
/// Uppercases the string and drops every character outside `[A-Z0-9]`.
/// The function is idempotent, and must be applied to both sides of any
/// comparison.
///
/// ```
/// use section_mapping::normalize;
///
/// assert_eq!(normalize("Admin-I"), "ADMINI");
/// assert_eq!(normalize("C.R. Cell"), "CRCELL");
/// ```
pub fn normalize(s: &str) -> String {
    s.chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Same as `normalize`, missing values map to the empty key.
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}

/// A readable version of the key: uppercase, punctuation removed but words
/// kept apart by single spaces. Only meant for logs and reports.
pub fn display_key(s: &str) -> String {
    let kept: String = s
        .chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Cleans a person name as written in the attendance exports.
///
/// Parenthesized fragments such as an embedded employee code are removed
/// along with the whitespace in front of them. The result is trimmed and
/// uppercased.
pub fn clean_person_name(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                res.push_str(rest[..open].trim_end());
                rest = &rest[open + close + 1..];
            }
            // Unbalanced parenthesis: keep everything as is.
            None => break,
        }
    }
    res.push_str(rest);
    res.trim().to_uppercase()
}

/// Extracts the group from a "Division/Units" cell such as
/// `"Administration Group (HQ)"`.
pub fn group_from_division(s: &str) -> Option<String> {
    for (idx, _) in s.match_indices("Group") {
        let prefix = &s[..idx];
        if prefix.ends_with(char::is_whitespace) {
            let group = prefix.trim();
            return if group.is_empty() {
                None
            } else {
                Some(group.to_string())
            };
        }
    }
    None
}

/// Infers the group of a roster from the title of its sheet.
pub fn group_from_title(title: &str) -> String {
    let g = if title.contains("Administration") {
        "Administration"
    } else if title.contains("Accounts") {
        "Accounts"
    } else if title.contains("Fund") {
        "Fund"
    } else {
        "Unknown"
    };
    g.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_idempotent() {
        for s in [
            "",
            "Admin-I, CR Cell",
            "ADMINISTRATION-I",
            "  fund (ii) ",
            "A.D.M.I.N.I",
            "Straße 12",
            "---",
        ] {
            let n = normalize(s);
            assert_eq!(normalize(&n), n, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn normalize_ignores_case_and_punctuation() {
        assert_eq!(normalize("Admin-I"), normalize("ADMIN I"));
        assert_eq!(normalize("ADMIN I"), normalize("A.D.M.I.N.I"));
        assert_eq!(normalize("c.r. cell"), "CRCELL");
        assert_eq!(normalize("  AC-III / Pension "), "ACIIIPENSION");
    }

    #[test]
    fn normalize_missing_values() {
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some("")), "");
        assert_eq!(normalize_opt(Some("gen.")), "GEN");
        assert_eq!(normalize("-- / --"), "");
    }

    #[test]
    fn display_key_collapses_spaces() {
        assert_eq!(display_key("  Admin -  I,   CR  Cell "), "ADMIN I CR CELL");
        assert_eq!(display_key(""), "");
    }

    #[test]
    fn clean_names() {
        assert_eq!(clean_person_name("John Doe (WBKLE2241930)"), "JOHN DOE");
        assert_eq!(clean_person_name(" a (x) b (y) "), "A B");
        assert_eq!(clean_person_name("Jane (unclosed"), "JANE (UNCLOSED");
        assert_eq!(clean_person_name("plain"), "PLAIN");
    }

    #[test]
    fn groups_from_division() {
        assert_eq!(
            group_from_division("Administration Group (HQ)"),
            Some("Administration".to_string())
        );
        assert_eq!(
            group_from_division("  Fund  Group"),
            Some("Fund".to_string())
        );
        assert_eq!(group_from_division("AccountsGroup"), None);
        assert_eq!(group_from_division(" Group"), None);
        assert_eq!(group_from_division("Pension"), None);
    }

    #[test]
    fn groups_from_title() {
        assert_eq!(
            group_from_title("Staff of Administration Group as on 01.12"),
            "Administration"
        );
        assert_eq!(group_from_title("Fund Group"), "Fund");
        assert_eq!(group_from_title("Accounts and Fund"), "Accounts");
        assert_eq!(group_from_title(""), "Unknown");
    }
}
