//! Slug derivation for human-readable names.

/// Symbols that are spelled out instead of dropped.
fn symbol_word(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("and"),
        '%' => Some("percent"),
        '$' => Some("dollar"),
        '<' => Some("less"),
        '>' => Some("greater"),
        '|' => Some("or"),
        '€' => Some("euro"),
        '₫' => Some("dong"),
        _ => None,
    }
}

/// Derive a URL-safe slug from `name`.
///
/// Letters are transliterated to ASCII (`"Thời sự"` becomes
/// `"thoi-su"`) and lowercased; a few symbols are spelled out; every
/// other run of non-alphanumerics becomes a single `-` with none at
/// either end. A name without letters or digits yields an empty string.
pub fn slugify(name: &str) -> String {
    let mut spelled = String::with_capacity(name.len());
    for ch in name.chars() {
        match symbol_word(ch) {
            Some(word) => {
                spelled.push(' ');
                spelled.push_str(word);
                spelled.push(' ');
            }
            None => spelled.push(ch),
        }
    }
    slug::slugify(spelled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(slugify("Breaking News"), "breaking-news");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Sports -- & -- Leisure!!"), "sports-and-leisure");
        assert_eq!(slugify("  Tech/AI  "), "tech-ai");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(slugify("Top 10 Phones 2025"), "top-10-phones-2025");
    }

    #[test]
    fn transliterates_diacritics() {
        assert_eq!(slugify("Thời sự"), "thoi-su");
        assert_eq!(slugify("Đời sống"), "doi-song");
        assert_eq!(slugify("Café & Bar"), "cafe-and-bar");
    }

    #[test]
    fn distinct_accented_names_do_not_collapse() {
        assert_ne!(slugify("Thời sự"), slugify("Đời sống"));
        assert_ne!(slugify("Thời sự"), slugify("Th sự"));
    }

    #[test]
    fn punctuation_only_names_are_empty() {
        assert_eq!(slugify("¿¡ ?!"), "");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(slugify("Home & Garden"), slugify("Home & Garden"));
        assert_eq!(slugify("Home & Garden"), slugify("home and garden"));
    }
}
