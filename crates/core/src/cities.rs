//! Place-of-issue resolution from free-text bank branch names.
//!
//! Recognition returns branch strings like `"Kadıköy Şubesi / İstanbul"`.
//! The city is conventionally the segment after the last `/`. Matching
//! against the reference city list must survive Turkish capitalization
//! quirks (dotted/dotless I) and diacritics, so both sides are folded to
//! an uppercase ASCII-ish form before comparison.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).

// ── Normalization ────────────────────────────────────────────────────

/// Fold one already-uppercased character to its plain-Latin form.
///
/// `str::to_uppercase` maps `ı` → `I` and `i` → `I` on its own; the
/// dotted capital `İ` and the diacritic letters survive and are folded
/// here.
fn fold_turkish_upper(c: char) -> char {
    match c {
        'İ' => 'I',
        'Ş' => 'S',
        'Ğ' => 'G',
        'Ü' => 'U',
        'Ö' => 'O',
        'Ç' => 'C',
        other => other,
    }
}

/// Normalize a city name for comparison: trim, uppercase, fold Turkish
/// letters to plain Latin.
pub fn normalize_city(name: &str) -> String {
    name.trim()
        .to_uppercase()
        .chars()
        .map(fold_turkish_upper)
        .collect()
}

/// Extract the city candidate from a raw branch string.
///
/// Branch strings follow the `"<branch> / <city>"` convention; only the
/// segment after the last `/` is the candidate. Strings without a `/`
/// are taken whole.
pub fn branch_city_candidate(branch_text: &str) -> &str {
    match branch_text.rfind('/') {
        Some(pos) => branch_text[pos + 1..].trim(),
        None => branch_text.trim(),
    }
}

// ── Directory ────────────────────────────────────────────────────────

/// Reference city list, normalized once at construction.
///
/// Built from the back-office city endpoint at session start. A failed
/// fetch degrades to an empty directory: every resolution returns
/// `None` and rows simply carry a blank place of issue.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    /// `(original, normalized)` pairs in reference order.
    entries: Vec<(String, String)>,
}

impl CityDirectory {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = names
            .into_iter()
            .map(|name| {
                let name = name.into();
                let normalized = normalize_city(&name);
                (name, normalized)
            })
            .collect();
        Self { entries }
    }

    /// Resolve a raw branch string to the matching reference city name.
    ///
    /// Returns the first reference entry whose normalized name equals
    /// the normalized candidate, or `None` when the input is blank or
    /// nothing matches. Never fails.
    pub fn resolve(&self, branch_text: &str) -> Option<&str> {
        let candidate = branch_city_candidate(branch_text);
        if candidate.is_empty() {
            return None;
        }
        let normalized = normalize_city(candidate);
        self.entries
            .iter()
            .find(|(_, reference)| *reference == normalized)
            .map(|(original, _)| original.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
