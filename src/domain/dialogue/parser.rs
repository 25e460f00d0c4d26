use super::entity::DialogueEntity;
use super::error::DialogueError;
use crate::infrastructure::config::ScriptConfig;

/// Parse a dialogue-script CSV export into ordered entities.
///
/// The export contains several sections; only the rows between the
/// `DialogueEntries` marker and the `OutgoingLinks` marker (or end of input)
/// are dialogue. Column positions are resolved from the header row by name,
/// never by fixed index, because the authoring tool reorders columns between
/// revisions.
pub fn parse_script(input: &str, config: &ScriptConfig) -> Result<Vec<DialogueEntity>, DialogueError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(config.delimiter)
        .from_reader(input.as_bytes());

    let mut records = reader.records();

    // Seek to the dialogue section
    let mut marker_found = false;
    for record in records.by_ref() {
        let record = record?;
        if record.get(0).map(str::trim) == Some(config.section_marker.as_str()) {
            marker_found = true;
            break;
        }
    }
    if !marker_found {
        return Err(DialogueError::MissingSectionMarker(
            config.section_marker.clone(),
        ));
    }

    // The row after the marker names the columns
    let header = records
        .next()
        .ok_or(DialogueError::MissingHeaderRow)??;
    let tag_idx = find_column(&header, &config.entrytag_column)?;
    let text_idx = find_column(&header, &config.dialogue_text_column)?;

    // Some exports carry extra header rows below the column names
    for _ in 0..config.skip_header_rows {
        if let Some(record) = records.next() {
            record?;
        }
    }

    let mut entities = Vec::new();
    let mut row_number = 0usize;
    for record in records {
        let record = record?;
        row_number += 1;

        if record.get(0).map(str::trim) == Some(config.end_marker.as_str()) {
            break;
        }

        let needed = tag_idx.max(text_idx) + 1;
        if record.len() < needed {
            tracing::warn!(
                row = row_number,
                columns = record.len(),
                needed = needed,
                "skipping short row"
            );
            continue;
        }

        let tag = record[tag_idx].trim();
        let text = record[text_idx].trim();
        if tag.is_empty() || text.is_empty() {
            tracing::warn!(row = row_number, tag = tag, "skipping row with empty tag or text");
            continue;
        }

        entities.push(DialogueEntity::new(tag.to_string(), text.to_string()));
    }

    tracing::info!(entries = entities.len(), "dialogue script parsed");

    Ok(entities)
}

fn find_column(header: &csv::StringRecord, name: &str) -> Result<usize, DialogueError> {
    header
        .iter()
        .position(|field| field.trim() == name)
        .ok_or_else(|| DialogueError::MissingColumn(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ScriptConfig {
        ScriptConfig::default()
    }

    fn config_no_extra_headers() -> ScriptConfig {
        ScriptConfig {
            skip_header_rows: 0,
            ..ScriptConfig::default()
        }
    }

    #[test]
    fn test_parse_basic_script() {
        let script = "\
Title,Export
DialogueEntries,
entrytag,DialogueText
1_NPC_Guard_2,\"Halt, who goes there?\"
3_Player_7,It's just me.
OutgoingLinks,
ignored,row
";
        let entities = parse_script(script, &config_no_extra_headers()).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].tag, "1_NPC_Guard_2");
        assert_eq!(entities[0].role_name, "NPC_Guard");
        assert_eq!(entities[0].raw_text, "Halt, who goes there?");
        assert_eq!(entities[1].tag, "3_Player_7");
        assert_eq!(entities[1].role_name, "Player");
    }

    #[test]
    fn test_parse_resolves_columns_by_name_not_position() {
        let script = "\
DialogueEntries,
ID,DialogueText,entrytag
7,Hello there.,1_Dani_1
";
        let entities = parse_script(script, &config_no_extra_headers()).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].tag, "1_Dani_1");
        assert_eq!(entities[0].raw_text, "Hello there.");
    }

    #[test]
    fn test_parse_skips_extra_header_rows() {
        let script = "\
DialogueEntries,
entrytag,DialogueText
string,string
1_Dani_1,Hello there.
";
        let entities = parse_script(script, &config()).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].tag, "1_Dani_1");
    }

    #[test]
    fn test_parse_missing_section_marker_is_fatal() {
        let script = "entrytag,DialogueText\n1_Dani_1,Hello\n";
        let err = parse_script(script, &config()).unwrap_err();
        assert!(matches!(err, DialogueError::MissingSectionMarker(_)));
    }

    #[test]
    fn test_parse_missing_column_is_fatal() {
        let script = "\
DialogueEntries,
entrytag,SomeOtherColumn
1_Dani_1,Hello
";
        let err = parse_script(script, &config_no_extra_headers()).unwrap_err();
        assert!(matches!(err, DialogueError::MissingColumn(name) if name == "DialogueText"));
    }

    #[test]
    fn test_parse_skips_short_and_empty_rows() {
        let script = "\
DialogueEntries,
entrytag,DialogueText
1_Dani_1,Hello there.
shortrow
,Orphaned text
2_Dani_2,
3_Dani_3,Still here.
";
        let entities = parse_script(script, &config_no_extra_headers()).unwrap();
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].tag, "1_Dani_1");
        assert_eq!(entities[1].tag, "3_Dani_3");
    }

    #[test]
    fn test_parse_preserves_input_order() {
        let script = "\
DialogueEntries,
entrytag,DialogueText
9_Dani_1,First line.
2_Dani_2,Second line.
5_Dani_3,Third line.
";
        let entities = parse_script(script, &config_no_extra_headers()).unwrap();
        let tags: Vec<&str> = entities.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["9_Dani_1", "2_Dani_2", "5_Dani_3"]);
    }

    #[test]
    fn test_parse_stops_at_end_marker() {
        let script = "\
DialogueEntries,
entrytag,DialogueText
1_Dani_1,Before the marker.
OutgoingLinks,
2_Dani_2,After the marker.
";
        let entities = parse_script(script, &config_no_extra_headers()).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].tag, "1_Dani_1");
    }

    #[test]
    fn test_parse_without_end_marker_reads_to_eof() {
        let script = "\
DialogueEntries,
entrytag,DialogueText
1_Dani_1,One.
2_Dani_2,Two.
";
        let entities = parse_script(script, &config_no_extra_headers()).unwrap();
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_parse_trims_field_values() {
        let script = "\
DialogueEntries,
entrytag,DialogueText
  1_Dani_1  ,  Hello there.
";
        let entities = parse_script(script, &config_no_extra_headers()).unwrap();
        assert_eq!(entities[0].tag, "1_Dani_1");
        assert_eq!(entities[0].raw_text, "Hello there.");
    }
}
