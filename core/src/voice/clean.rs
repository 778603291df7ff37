use regex::Regex;
use std::sync::OnceLock;

// Doubled forms first so `[[x]]` and `((x))` go as a whole instead of leaving a stray closer.
const META_TAG_PATTERN: &str = r"\[\[.*?\]\]|\(\(.*?\)\)|\[.*?\]|\(.*?\)";

fn meta_tags() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(META_TAG_PATTERN).ok()).as_ref()
}

/// Remove bracketed and parenthetical meta annotations from a reply and trim
/// the result. Surrounding whitespace is kept as-is, so removing a tag between
/// two words leaves two spaces.
pub fn strip_meta_tags(text: &str) -> String {
    match meta_tags() {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_all_tag_shapes() {
        assert_eq!(
            strip_meta_tags("Hello [COGNITIVE_ENTROPY: 0.5] world ((note)) end [[tag]]"),
            "Hello  world  end"
        );
    }

    #[test]
    fn plain_prose_is_untouched() {
        assert_eq!(strip_meta_tags("  Just words.  "), "Just words.");
    }

    #[test]
    fn tags_only_become_empty() {
        assert_eq!(
            strip_meta_tags("[COGNITIVE_ENTROPY: 0.91]\n((NEURAL_MUTATION: x))\n[[DATA_INFILTRATION_TARGET: y]]"),
            ""
        );
    }

    #[test]
    fn tags_do_not_span_lines() {
        assert_eq!(strip_meta_tags("open [ bracket\nclosed ]"), "open [ bracket\nclosed ]");
    }
}
