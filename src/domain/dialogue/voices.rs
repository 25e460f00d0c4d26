use super::entity::DialogueEntity;
use super::error::DialogueError;
use serde::Deserialize;
use std::collections::HashMap;

/// A concrete voice identity assigned to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceBinding {
    pub role: String,
    pub voice_id: String,
    pub voice_name: String,
}

/// Role name to assigned voices. Loaded once per job and never mutated.
pub type VoiceMap = HashMap<String, Vec<VoiceBinding>>;

/// One dialogue entity bound to one voice. This is the unit of dispatch.
///
/// The folder key is derived exactly once here so output grouping stays
/// stable for the lifetime of the job.
#[derive(Debug, Clone)]
pub struct VoiceBoundEntry {
    pub entity: DialogueEntity,
    pub voice_id: String,
    pub voice_name: String,
    pub folder_key: String,
}

#[derive(Debug, Default)]
pub struct BindOutcome {
    pub bound: Vec<VoiceBoundEntry>,
    /// Entities whose role has no voice binding. Kept for inspection so the
    /// mapping source can be fixed; never silently dropped.
    pub unresolved: Vec<DialogueEntity>,
}

#[derive(Debug, Deserialize)]
struct VoiceRecord {
    character: String,
    voice_id: String,
    #[serde(default)]
    voice_name: String,
}

/// Load the character-to-voice mapping from a CSV record set with `character`,
/// `voice_id` and `voice_name` columns.
///
/// The configured fan-out role (the generic player role) accumulates every
/// binding tagged with that name; any other role maps to exactly one binding,
/// with duplicates logged and the first kept.
pub fn load_bindings(input: &str, fan_out_role: &str) -> Result<VoiceMap, DialogueError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let mut bindings: VoiceMap = HashMap::new();

    for record in reader.deserialize::<VoiceRecord>() {
        let record = record?;
        if record.character.is_empty() || record.voice_id.is_empty() {
            tracing::warn!("skipping voice record with empty character or voice id");
            continue;
        }

        let binding = VoiceBinding {
            role: record.character.clone(),
            voice_id: record.voice_id,
            voice_name: record.voice_name,
        };

        if record.character == fan_out_role {
            bindings.entry(record.character).or_default().push(binding);
        } else if let Some(existing) = bindings.get(&record.character) {
            tracing::warn!(
                role = %record.character,
                kept_voice = %existing[0].voice_id,
                "duplicate voice binding for role, keeping first"
            );
        } else {
            bindings.insert(record.character, vec![binding]);
        }
    }

    tracing::info!(roles = bindings.len(), "voice mapping loaded");

    Ok(bindings)
}

/// Expand entities into voice-bound entries: one entry per binding of the
/// entity's role (N entries for the fan-out role). Entities with no binding
/// go to the unresolved side list.
pub fn bind_voices(
    entities: Vec<DialogueEntity>,
    bindings: &VoiceMap,
    fan_out_role: &str,
    shared_folder: &str,
) -> BindOutcome {
    let mut outcome = BindOutcome::default();

    for entity in entities {
        match bindings.get(&entity.role_name) {
            Some(role_bindings) => {
                for binding in role_bindings {
                    let folder_key = folder_key_for(binding, fan_out_role, shared_folder);
                    outcome.bound.push(VoiceBoundEntry {
                        entity: entity.clone(),
                        voice_id: binding.voice_id.clone(),
                        voice_name: binding.voice_name.clone(),
                        folder_key,
                    });
                }
            }
            None => {
                tracing::warn!(tag = %entity.tag, role = %entity.role_name, "no voice binding for role");
                outcome.unresolved.push(entity);
            }
        }
    }

    outcome
}

/// Fan-out roles get one folder per voice; everything else shares one folder.
fn folder_key_for(binding: &VoiceBinding, fan_out_role: &str, shared_folder: &str) -> String {
    if binding.role == fan_out_role {
        let voice = if binding.voice_name.is_empty() {
            &binding.voice_id
        } else {
            &binding.voice_name
        };
        format!(
            "{}_{}",
            fan_out_role.to_lowercase(),
            voice.to_lowercase().replace(' ', "_")
        )
    } else {
        shared_folder.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VOICES_CSV: &str = "\
character,voice_id,voice_name
NPC_Guard,v1,Gruff
Player,v2,Alex
Player,v3,Sam
Dani,v4,Dani
";

    fn entity(tag: &str, text: &str) -> DialogueEntity {
        let mut e = DialogueEntity::new(tag.to_string(), text.to_string());
        e.set_clean_text(text.to_string());
        e
    }

    #[test]
    fn test_load_bindings_accumulates_fan_out_role() {
        let bindings = load_bindings(VOICES_CSV, "Player").unwrap();
        assert_eq!(bindings["Player"].len(), 2);
        assert_eq!(bindings["NPC_Guard"].len(), 1);
        assert_eq!(bindings["Dani"].len(), 1);
    }

    #[test]
    fn test_load_bindings_duplicate_ordinary_role_keeps_first() {
        let csv = "\
character,voice_id,voice_name
Dani,v1,First
Dani,v2,Second
";
        let bindings = load_bindings(csv, "Player").unwrap();
        assert_eq!(bindings["Dani"].len(), 1);
        assert_eq!(bindings["Dani"][0].voice_id, "v1");
    }

    #[test]
    fn test_load_bindings_skips_incomplete_records() {
        let csv = "\
character,voice_id,voice_name
,v1,NoRole
Dani,,NoVoice
Dani,v4,Dani
";
        let bindings = load_bindings(csv, "Player").unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings["Dani"][0].voice_id, "v4");
    }

    #[test]
    fn test_bind_voices_fans_out_player_role() {
        let bindings = load_bindings(VOICES_CSV, "Player").unwrap();
        let outcome = bind_voices(
            vec![entity("3_Player_7", "It's just me.")],
            &bindings,
            "Player",
            "characters",
        );

        assert_eq!(outcome.bound.len(), 2);
        assert!(outcome.unresolved.is_empty());
        let voice_ids: Vec<&str> = outcome.bound.iter().map(|b| b.voice_id.as_str()).collect();
        assert_eq!(voice_ids, vec!["v2", "v3"]);
        for entry in &outcome.bound {
            assert_eq!(entry.entity.tag, "3_Player_7");
            assert_eq!(entry.entity.clean_text(), Some("It's just me."));
        }
    }

    #[test]
    fn test_bind_voices_three_bindings_three_entries() {
        let csv = "\
character,voice_id,voice_name
Player,v1,A
Player,v2,B
Player,v3,C
";
        let bindings = load_bindings(csv, "Player").unwrap();
        let outcome = bind_voices(
            vec![entity("1_Player_1", "Hello.")],
            &bindings,
            "Player",
            "characters",
        );
        assert_eq!(outcome.bound.len(), 3);
        let mut ids: Vec<&str> = outcome.bound.iter().map(|b| b.voice_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn test_bind_voices_routes_unresolved_to_side_list() {
        let bindings = load_bindings(VOICES_CSV, "Player").unwrap();
        let outcome = bind_voices(
            vec![
                entity("1_Mystery_1", "Who am I?"),
                entity("2_Dani_1", "I know you."),
            ],
            &bindings,
            "Player",
            "characters",
        );

        assert_eq!(outcome.bound.len(), 1);
        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].tag, "1_Mystery_1");
    }

    #[test]
    fn test_folder_keys_group_by_voice_for_fan_out_only() {
        let bindings = load_bindings(VOICES_CSV, "Player").unwrap();
        let outcome = bind_voices(
            vec![
                entity("1_NPC_Guard_2", "Halt, who goes there?"),
                entity("3_Player_7", "It's just me."),
            ],
            &bindings,
            "Player",
            "characters",
        );

        let folders: Vec<&str> = outcome
            .bound
            .iter()
            .map(|b| b.folder_key.as_str())
            .collect();
        assert_eq!(folders, vec!["characters", "player_alex", "player_sam"]);
    }
}
