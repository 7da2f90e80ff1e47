use unicode_normalization::UnicodeNormalization;

const COMBINING_DIACRITICS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Lowercases a header cell, strips diacritics and collapses whitespace so
/// that `"Fecha de  Actuación"` and `"fecha de actuacion"` compare equal.
pub fn normalize_header(cell: &str) -> String {
    let folded: String = cell
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_DIACRITICS.contains(c))
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fixed lookup from normalized header text to a canonical field key.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap {
    aliases: &'static [(&'static str, &'static str)],
}

impl ColumnMap {
    pub const fn new(aliases: &'static [(&'static str, &'static str)]) -> Self {
        Self { aliases }
    }

    pub fn key_for(&self, normalized: &str) -> Option<&'static str> {
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, key)| *key)
    }

    pub fn resolve(&self, header_cells: &[String]) -> ColumnResolution {
        let normalized: Vec<String> = header_cells.iter().map(|c| normalize_header(c)).collect();
        let keys = normalized.iter().map(|h| self.key_for(h)).collect();
        ColumnResolution { normalized, keys }
    }
}

/// A header row after normalization, with the canonical key (if any) of
/// every column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnResolution {
    normalized: Vec<String>,
    keys: Vec<Option<&'static str>>,
}

impl ColumnResolution {
    pub fn normalized(&self) -> &[String] {
        &self.normalized
    }

    /// First column whose normalized header satisfies `pred`.
    pub fn position(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.normalized.iter().position(|h| pred(h))
    }

    pub fn key_at(&self, index: usize) -> Option<&'static str> {
        self.keys.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.normalized.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAP: ColumnMap = ColumnMap::new(&[("actuacion", "action"), ("anotacion", "annotation")]);

    #[test]
    fn accents_and_case_are_folded() {
        assert_eq!(normalize_header("Actuación"), "actuacion");
        assert_eq!(normalize_header("actuacion"), "actuacion");
        assert_eq!(normalize_header("FECHA FINALIZA TÉRMINO"), "fecha finaliza termino");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(
            normalize_header("  Fecha \t de   Actuación "),
            "fecha de actuacion"
        );
    }

    #[test]
    fn resolve_maps_known_headers_and_skips_the_rest() {
        let cells = vec!["Anotación".to_string(), "Notas".to_string(), "Actuación".to_string()];
        let resolved = MAP.resolve(&cells);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved.key_at(0), Some("annotation"));
        assert_eq!(resolved.key_at(1), None);
        assert_eq!(resolved.key_at(2), Some("action"));
        assert_eq!(resolved.key_at(9), None);
        assert_eq!(resolved.position(|h| h == "actuacion"), Some(2));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "[a-zA-Z0-9áéíóúÁÉÍÓÚñÑüÜ \t]*") {
            let once = normalize_header(&s);
            prop_assert_eq!(normalize_header(&once), once);
        }
    }
}
