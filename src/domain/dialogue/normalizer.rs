use super::error::DialogueError;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Text-cleaning rules, loaded from a JSON file or built-in defaults.
///
/// The script-authoring tool emits markup whose vocabulary changes between
/// content revisions (emphasis tags, placeholder directives, color markup),
/// so the rules are data rather than code.
#[derive(Debug, Clone, Deserialize)]
pub struct CleaningRules {
    #[serde(default)]
    pub remove_items: Vec<String>,
    #[serde(default)]
    pub replace_items: BTreeMap<String, String>,
    #[serde(default)]
    pub regex_patterns: Vec<String>,
}

impl CleaningRules {
    pub fn from_file(path: &Path) -> Result<Self, DialogueError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DialogueError::Rules(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents).map_err(|e| DialogueError::Rules(e.to_string()))
    }
}

impl Default for CleaningRules {
    fn default() -> Self {
        let remove_items = [
            "[em1]", "[/em1]", "[em2]", "[/em2]", "[em3]", "[/em3]", "[em4]", "[/em4]", "[em5]",
            "[/em5]", "[em6]", "[/em6]", "[/r]", "[/n]", "\\r", "\\n", "[nosubtitle]", "[In ear]",
            "[var=classifierFeedback]", "<joke>", "...", "…", "*", "\"",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let replace_items = [
            ("’", "'"),
            ("–", " "),
            ("—", " "),
            ("-", " "),
            // Pronunciation fixes for names the provider reads badly
            ("TK", "Tea Kay"),
            ("C c c", "Kah, kah, kah"),
            ("WAT247", "Watt 2 4 7"),
            ("Mission HydroSci", "Mission Hydro Sci"),
            ("Mission Hydrosci", "Mission Hydro Sci"),
        ]
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        let regex_patterns = [
            r"\{\{.*?\}\}", // {{PLACEHOLDER ...}} directives
            r"\[\[.*?\]\]", // [[...]] placeholders
            r"<.*?>",       // color/emphasis markup
            r"\(.*?\)",     // stage directions, e.g. (brightly)
            r"\\[rn]",      // literal escape sequences
            r"[“”]",        // fancy quotes
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            remove_items,
            replace_items,
            regex_patterns,
        }
    }
}

/// Applies a fixed cleaning pipeline to raw dialogue text: literal
/// deletions, literal replacements, regex deletions, then whitespace
/// collapse and trim. The same rules on the same input always produce the
/// same output.
pub struct Normalizer {
    rules: CleaningRules,
    patterns: Vec<Regex>,
    whitespace: Regex,
}

impl Normalizer {
    /// Compile the rule set. Fails if any regex pattern is invalid, so a bad
    /// rules file is caught at startup rather than mid-job.
    pub fn new(rules: CleaningRules) -> Result<Self, DialogueError> {
        let patterns = rules
            .regex_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| DialogueError::InvalidRulePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let whitespace = Regex::new(r"\s+").map_err(|source| DialogueError::InvalidRulePattern {
            pattern: r"\s+".to_string(),
            source,
        })?;

        Ok(Self {
            rules,
            patterns,
            whitespace,
        })
    }

    pub fn with_defaults() -> Result<Self, DialogueError> {
        Self::new(CleaningRules::default())
    }

    /// Clean raw dialogue text for synthesis. Empty input yields empty
    /// output, never an error.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut text = raw.to_string();

        for item in &self.rules.remove_items {
            text = text.replace(item.as_str(), "");
        }

        for (from, to) in &self.rules.replace_items {
            text = text.replace(from.as_str(), to.as_str());
        }

        for pattern in &self.patterns {
            text = pattern.replace_all(&text, "").into_owned();
        }

        self.whitespace.replace_all(&text, " ").trim().to_string()
    }

    pub fn normalize_opt(&self, raw: Option<&str>) -> String {
        raw.map(|r| self.normalize(r)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalizer() -> Normalizer {
        Normalizer::with_defaults().unwrap()
    }

    #[test]
    fn test_normalize_empty_input() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize_opt(None), "");
    }

    #[test]
    fn test_normalize_removes_emphasis_tags() {
        let n = normalizer();
        assert_eq!(n.normalize("[em1]Halt![/em1] Who goes there?"), "Halt! Who goes there?");
    }

    #[test]
    fn test_normalize_removes_placeholder_directives() {
        let n = normalizer();
        assert_eq!(
            n.normalize("Look at this. {{PLACEHOLDER - MAP OPENS}} See?"),
            "Look at this. See?"
        );
        assert_eq!(n.normalize("[[PLACEHOLDER - Argument]]"), "");
    }

    #[test]
    fn test_normalize_removes_markup_and_stage_directions() {
        let n = normalizer();
        assert_eq!(
            n.normalize("<color=#35F>Great work!</color> (brightly) Keep going."),
            "Great work! Keep going."
        );
    }

    #[test]
    fn test_normalize_applies_replacements() {
        let n = normalizer();
        assert_eq!(n.normalize("It’s a well–known fact"), "It's a well known fact");
    }

    #[test]
    fn test_normalize_expands_pronunciation_fixes() {
        let n = normalizer();
        assert_eq!(
            n.normalize("TK, WAT247 is waiting on Mission HydroSci."),
            "Tea Kay, Watt 2 4 7 is waiting on Mission Hydro Sci."
        );
        assert_eq!(n.normalize("Mission Hydrosci"), "Mission Hydro Sci");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        let n = normalizer();
        assert_eq!(n.normalize("  Too    many\t\tspaces \n here  "), "Too many spaces here");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let n = normalizer();
        let inputs = [
            "[em2]Hello[/em2] {{PLACEHOLDER - CLOSE MAP}} there…",
            "It’s   just me.",
            "Plain text already.",
            "",
        ];
        for input in inputs {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_normalize_can_produce_empty_output() {
        let n = normalizer();
        assert_eq!(n.normalize("{{PLACEHOLDER - FORGE MINI GAME}}"), "");
        assert_eq!(n.normalize("..."), "");
    }

    #[test]
    fn test_rules_from_json() {
        let rules: CleaningRules = serde_json::from_str(
            r#"{
                "remove_items": ["[x]"],
                "replace_items": {"HQ": "headquarters"},
                "regex_patterns": ["\\d+"]
            }"#,
        )
        .unwrap();
        let n = Normalizer::new(rules).unwrap();
        assert_eq!(n.normalize("[x]Report to HQ at 0900"), "Report to headquarters at");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let rules = CleaningRules {
            remove_items: vec![],
            replace_items: BTreeMap::new(),
            regex_patterns: vec!["(unclosed".to_string()],
        };
        assert!(Normalizer::new(rules).is_err());
    }
}
