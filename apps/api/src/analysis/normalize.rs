//! Text normalization: the two canonical forms every matching stage compares against.

/// Which canonical form to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Whitespace runs collapsed to one space, trimmed, lower-cased.
    /// Keeps multi-word phrases intact for phrase search.
    Loose,
    /// Lower-cased ASCII letters and digits only.
    /// "Node.js", "node js" and "nodejs" all become "nodejs".
    Strict,
}

pub fn normalize(text: &str, mode: NormalizeMode) -> String {
    match mode {
        NormalizeMode::Loose => normalize_loose(text),
        NormalizeMode::Strict => normalize_strict(text),
    }
}

pub fn normalize_loose(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub fn normalize_strict(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_collapses_whitespace_and_lowercases() {
        assert_eq!(
            normalize_loose("  Machine\t\tLearning \n Engineer "),
            "machine learning engineer"
        );
    }

    #[test]
    fn test_strict_collapses_formatting_variants() {
        assert_eq!(normalize_strict("Node.js"), "nodejs");
        assert_eq!(normalize_strict("node js"), "nodejs");
        assert_eq!(normalize_strict("NodeJS"), "nodejs");
        assert_eq!(normalize_strict("scikit-learn"), "scikitlearn");
    }

    #[test]
    fn test_strict_drops_non_ascii() {
        assert_eq!(normalize_strict("Résumé 2024"), "rsum2024");
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(normalize("", NormalizeMode::Loose), "");
        assert_eq!(normalize("", NormalizeMode::Strict), "");
        assert_eq!(normalize(" \n\t ", NormalizeMode::Loose), "");
        assert_eq!(normalize("--- ...", NormalizeMode::Strict), "");
    }
}
