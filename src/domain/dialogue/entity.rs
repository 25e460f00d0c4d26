use serde::Serialize;

/// One parsed line of the dialogue script.
///
/// `raw_text` is preserved unmodified for audit; `clean_text` is set exactly
/// once by the normalizer and is immutable after that. An empty clean text is
/// a valid terminal value meaning there is nothing to synthesize.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueEntity {
    pub tag: String,
    pub role_name: String,
    pub raw_text: String,
    clean_text: Option<String>,
}

impl DialogueEntity {
    pub fn new(tag: String, raw_text: String) -> Self {
        let role_name = resolve_role(&tag);
        Self {
            tag,
            role_name,
            raw_text,
            clean_text: None,
        }
    }

    pub fn clean_text(&self) -> Option<&str> {
        self.clean_text.as_deref()
    }

    /// Record the normalized text. The first write wins; later writes are
    /// ignored with a warning so a mid-pipeline bug cannot change an entity
    /// after it has been bound to voices.
    pub fn set_clean_text(&mut self, clean_text: String) {
        if self.clean_text.is_some() {
            tracing::warn!(tag = %self.tag, "clean text already set, ignoring second write");
            return;
        }
        self.clean_text = Some(clean_text);
    }

    /// True once normalization ran and produced text worth synthesizing.
    pub fn has_synthesizable_text(&self) -> bool {
        self.clean_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Extract the speaking role from an entry tag of the form
/// `<ordinal>_<role>[_<suffix>]`.
///
/// The role is every segment between the first and the last when the tag has
/// three or more underscore-delimited segments, the second segment when there
/// are exactly two, and `"Unknown"` otherwise.
pub fn resolve_role(tag: &str) -> String {
    let segments: Vec<&str> = tag.split('_').collect();
    match segments.len() {
        0 | 1 => "Unknown".to_string(),
        2 => segments[1].to_string(),
        n => segments[1..n - 1].join("_"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_role_joins_middle_segments() {
        assert_eq!(resolve_role("1_NPC_Guard_2"), "NPC_Guard");
        assert_eq!(resolve_role("12_Dani_Intro_Line_4"), "Dani_Intro_Line");
    }

    #[test]
    fn test_resolve_role_three_segments() {
        assert_eq!(resolve_role("3_Player_7"), "Player");
    }

    #[test]
    fn test_resolve_role_two_segments() {
        assert_eq!(resolve_role("5_Dani"), "Dani");
    }

    #[test]
    fn test_resolve_role_single_segment_is_unknown() {
        assert_eq!(resolve_role("justonetoken"), "Unknown");
        assert_eq!(resolve_role(""), "Unknown");
    }

    #[test]
    fn test_clean_text_set_exactly_once() {
        let mut entity = DialogueEntity::new("1_Dani_1".to_string(), "Hello!".to_string());
        assert_eq!(entity.clean_text(), None);

        entity.set_clean_text("Hello!".to_string());
        entity.set_clean_text("overwritten".to_string());
        assert_eq!(entity.clean_text(), Some("Hello!"));
    }

    #[test]
    fn test_empty_clean_text_is_not_synthesizable() {
        let mut entity = DialogueEntity::new("1_Dani_1".to_string(), "...".to_string());
        entity.set_clean_text(String::new());
        assert!(!entity.has_synthesizable_text());
        assert_eq!(entity.clean_text(), Some(""));
    }
}
