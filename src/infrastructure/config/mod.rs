use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Synthesis provider
    pub synthesis_base_url: String,
    pub synthesis_model_id: String,
    pub output_format: String,
    pub max_concurrent_syntheses: usize,
    // Output
    pub output_dir: String,
    pub fan_out_role: String,
    pub shared_folder: String,
    // Script parsing
    pub script: ScriptConfig,
    // Text cleaning
    pub cleaning_rules_path: Option<String>,
}

/// Column names and markers for the dialogue-script CSV export.
/// The authoring tool renames these between revisions, so they are
/// configuration rather than constants.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptConfig {
    pub section_marker: String,
    pub end_marker: String,
    pub entrytag_column: String,
    pub dialogue_text_column: String,
    pub delimiter: u8,
    pub skip_header_rows: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            synthesis_base_url: env::var("SYNTHESIS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            synthesis_model_id: env::var("SYNTHESIS_MODEL_ID")
                .unwrap_or_else(|_| "eleven_multilingual_v2".to_string()),
            output_format: env::var("OUTPUT_FORMAT").unwrap_or_else(|_| "mp3".to_string()),
            max_concurrent_syntheses: env::var("MAX_CONCURRENT_SYNTHESES")
                .unwrap_or_else(|_| "8".to_string())
                .parse()?,
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
            fan_out_role: env::var("FAN_OUT_ROLE").unwrap_or_else(|_| "Player".to_string()),
            shared_folder: env::var("SHARED_FOLDER").unwrap_or_else(|_| "characters".to_string()),
            script: ScriptConfig::from_env()?,
            cleaning_rules_path: env::var("CLEANING_RULES_PATH").ok(),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

impl ScriptConfig {
    fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(ScriptConfig {
            section_marker: env::var("SCRIPT_SECTION_MARKER")
                .unwrap_or_else(|_| "DialogueEntries".to_string()),
            end_marker: env::var("SCRIPT_END_MARKER")
                .unwrap_or_else(|_| "OutgoingLinks".to_string()),
            entrytag_column: env::var("SCRIPT_ENTRYTAG_COLUMN")
                .unwrap_or_else(|_| "entrytag".to_string()),
            dialogue_text_column: env::var("SCRIPT_DIALOGUE_TEXT_COLUMN")
                .unwrap_or_else(|_| "DialogueText".to_string()),
            delimiter: env::var("SCRIPT_DELIMITER")
                .ok()
                .and_then(|s| s.bytes().next())
                .unwrap_or(b','),
            skip_header_rows: env::var("SCRIPT_SKIP_HEADER_ROWS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
        })
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        ScriptConfig {
            section_marker: "DialogueEntries".to_string(),
            end_marker: "OutgoingLinks".to_string(),
            entrytag_column: "entrytag".to_string(),
            dialogue_text_column: "DialogueText".to_string(),
            delimiter: b',',
            skip_header_rows: 1,
        }
    }
}
