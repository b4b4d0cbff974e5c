/// Derive a URL-friendly slug from a product name.
///
/// Lowercases and trims the name, drops every character other than ASCII
/// letters, digits, whitespace and `-`, turns whitespace runs into a single
/// hyphen, collapses repeated hyphens, and trims hyphens from both ends.
#[must_use]
pub fn slug_from_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let kept: String = lowered
        .trim()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();

    kept.split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Returns the stored slug when it is a non-empty string, else the slug derived from `name`.
#[must_use]
pub fn slug_or_derived(stored: Option<&str>, name: &str) -> String {
    match stored {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => slug_from_name(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple_name() {
        assert_eq!(slug_from_name("Blue Dump Truck"), "blue-dump-truck");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(slug_from_name("Blue Dump Truck (Large)"), "blue-dump-truck-large");
        assert_eq!(slug_from_name("Teddy's Tea-Party Set!"), "teddys-tea-party-set");
    }

    #[test]
    fn slug_collapses_whitespace_and_hyphens() {
        assert_eq!(slug_from_name("  Race   Car -- Red  "), "race-car-red");
        assert_eq!(slug_from_name("Tab\tSeparated\nName"), "tab-separated-name");
    }

    #[test]
    fn slug_drops_non_ascii_letters() {
        // No hyphen is inserted where the accented letter used to be.
        assert_eq!(slug_from_name("Señorita Doll"), "seorita-doll");
        assert_eq!(slug_from_name("Rubik’s Cube"), "rubiks-cube");
    }

    #[test]
    fn slug_has_no_edge_hyphens() {
        assert_eq!(slug_from_name("Yo-yo !"), "yo-yo");
        assert_eq!(slug_from_name("- Kite -"), "kite");
        assert_eq!(slug_from_name("!!!"), "");
    }

    #[test]
    fn slug_is_idempotent_and_well_formed() {
        let names = [
            "Blue Dump Truck (Large)",
            "  LEGO® City — Fire Station 60320 ",
            "a--b__c  d",
            "Ψ Wooden   Puzzle -",
            "",
        ];
        for name in names {
            let once = slug_from_name(name);
            assert_eq!(slug_from_name(&once), once, "not idempotent for {name:?}");
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "unexpected character in {once:?}"
            );
            assert!(!once.contains("--"), "double hyphen in {once:?}");
            assert!(!once.starts_with('-') && !once.ends_with('-'), "edge hyphen in {once:?}");
        }
    }

    #[test]
    fn stored_slug_wins_unless_empty() {
        assert_eq!(slug_or_derived(Some("custom"), "Blue Truck"), "custom");
        assert_eq!(slug_or_derived(Some(""), "Blue Truck"), "blue-truck");
        assert_eq!(slug_or_derived(None, "Blue Truck"), "blue-truck");
    }
}
