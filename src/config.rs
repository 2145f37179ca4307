use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

use crate::form::{ValidationRules, DEFAULT_POSTAL_PATTERN};
use crate::pagination::DEFAULT_PAGE_SIZE;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "cfind";

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the configuration was read from, if a file existed.
    pub config_path: Option<PathBuf>,
    /// External contact data replacing the bundled list.
    pub data: Option<PathBuf>,
    pub page_size: usize,
    pub validation: ValidationRules,
    pub keys: Keys,
    pub ui: UiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            data: None,
            page_size: DEFAULT_PAGE_SIZE,
            validation: ValidationRules::default(),
            keys: Keys::default(),
            ui: UiFile::default().into(),
        }
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub colors: UiColors,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub header: RgbColor,
    pub error: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// =============================================================================
// Key Bindings - Context-aware with multiple bindings per action
// =============================================================================

/// All key bindings organized by context
#[derive(Debug, Clone, Default)]
pub struct Keys {
    /// Keys that work everywhere
    pub global: GlobalKeys,
    /// Keys while editing the search form
    pub form: FormKeys,
    /// Keys while the results table has focus
    pub results: ResultsKeys,
}

#[derive(Debug, Clone)]
pub struct GlobalKeys {
    pub quit: Vec<String>,
    pub help: Vec<String>,
    pub reset: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FormKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub submit: Vec<String>,
    pub focus_results: Vec<String>,
    pub region_next: Vec<String>,
    pub region_prev: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ResultsKeys {
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub page_next: Vec<String>,
    pub page_prev: Vec<String>,
    pub toggle: Vec<String>,
    pub back: Vec<String>,
    pub quit: Vec<String>,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: vec!["F10".into()],
            help: vec!["F1".into()],
            reset: vec!["F5".into()],
        }
    }
}

impl Default for FormKeys {
    fn default() -> Self {
        Self {
            next: vec!["Tab".into(), "Down".into()],
            prev: vec!["Backtab".into(), "Up".into()],
            submit: vec!["Enter".into()],
            focus_results: vec!["F2".into()],
            region_next: vec!["Right".into()],
            region_prev: vec!["Left".into()],
        }
    }
}

impl Default for ResultsKeys {
    fn default() -> Self {
        Self {
            next: vec!["j".into(), "Down".into()],
            prev: vec!["k".into(), "Up".into()],
            page_next: vec!["l".into(), "Right".into(), "PageDown".into()],
            page_prev: vec!["h".into(), "Left".into(), "PageUp".into()],
            toggle: vec!["Space".into(), "Enter".into()],
            back: vec!["Escape".into(), "F2".into(), "Tab".into()],
            quit: vec!["q".into()],
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    global: GlobalKeysFile,
    form: FormKeysFile,
    results: ResultsKeysFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct GlobalKeysFile {
    quit: KeyBinding,
    help: KeyBinding,
    reset: KeyBinding,
}

impl Default for GlobalKeysFile {
    fn default() -> Self {
        let defaults = GlobalKeys::default();
        Self {
            quit: KeyBinding::Multiple(defaults.quit),
            help: KeyBinding::Multiple(defaults.help),
            reset: KeyBinding::Multiple(defaults.reset),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FormKeysFile {
    next: KeyBinding,
    prev: KeyBinding,
    submit: KeyBinding,
    focus_results: KeyBinding,
    region_next: KeyBinding,
    region_prev: KeyBinding,
}

impl Default for FormKeysFile {
    fn default() -> Self {
        let defaults = FormKeys::default();
        Self {
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            submit: KeyBinding::Multiple(defaults.submit),
            focus_results: KeyBinding::Multiple(defaults.focus_results),
            region_next: KeyBinding::Multiple(defaults.region_next),
            region_prev: KeyBinding::Multiple(defaults.region_prev),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ResultsKeysFile {
    next: KeyBinding,
    prev: KeyBinding,
    page_next: KeyBinding,
    page_prev: KeyBinding,
    toggle: KeyBinding,
    back: KeyBinding,
    quit: KeyBinding,
}

impl Default for ResultsKeysFile {
    fn default() -> Self {
        let defaults = ResultsKeys::default();
        Self {
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            page_next: KeyBinding::Multiple(defaults.page_next),
            page_prev: KeyBinding::Multiple(defaults.page_prev),
            toggle: KeyBinding::Multiple(defaults.toggle),
            back: KeyBinding::Multiple(defaults.back),
            quit: KeyBinding::Multiple(defaults.quit),
        }
    }
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        Self {
            global: GlobalKeys {
                quit: file.global.quit.into_vec(),
                help: file.global.help.into_vec(),
                reset: file.global.reset.into_vec(),
            },
            form: FormKeys {
                next: file.form.next.into_vec(),
                prev: file.form.prev.into_vec(),
                submit: file.form.submit.into_vec(),
                focus_results: file.form.focus_results.into_vec(),
                region_next: file.form.region_next.into_vec(),
                region_prev: file.form.region_prev.into_vec(),
            },
            results: ResultsKeys {
                next: file.results.next.into_vec(),
                prev: file.results.prev.into_vec(),
                page_next: file.results.page_next.into_vec(),
                page_prev: file.results.page_prev.into_vec(),
                toggle: file.results.toggle.into_vec(),
                back: file.results.back.into_vec(),
                quit: file.results.quit.into_vec(),
            },
        }
    }
}

// =============================================================================
// Key binding validation
// =============================================================================

/// Canonical form for collision detection. Single characters keep their
/// case ('M' is Shift+m); named keys are case-insensitive.
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "esc" => "escape".to_string(),
            "shift+tab" => "backtab".to_string(),
            "page_up" => "pageup".to_string(),
            "page_down" => "pagedown".to_string(),
            _ => lower,
        }
    }
}

fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

fn validate_key_bindings(keys: &Keys) -> Result<()> {
    check_context_collisions(
        &[
            ("quit", &keys.global.quit),
            ("help", &keys.global.help),
            ("reset", &keys.global.reset),
        ],
        "global",
    )?;

    check_context_collisions(
        &[
            ("next", &keys.form.next),
            ("prev", &keys.form.prev),
            ("submit", &keys.form.submit),
            ("focus_results", &keys.form.focus_results),
            ("region_next", &keys.form.region_next),
            ("region_prev", &keys.form.region_prev),
        ],
        "form",
    )?;

    check_context_collisions(
        &[
            ("next", &keys.results.next),
            ("prev", &keys.results.prev),
            ("page_next", &keys.results.page_next),
            ("page_prev", &keys.results.page_prev),
            ("toggle", &keys.results.toggle),
            ("back", &keys.results.back),
            ("quit", &keys.results.quit),
        ],
        "results",
    )?;

    Ok(())
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data: Option<PathBuf>,
    page_size: Option<usize>,
    validation: ValidationFile,
    keys: KeysFile,
    ui: UiFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ValidationFile {
    postal_code: Option<String>,
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load configuration. An explicit `path` must exist; the default location
/// is optional and falls back to built-in defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(explicit) => {
            let explicit = expand_tilde(explicit);
            if !explicit.exists() {
                bail!("configuration file not found at {}", explicit.display());
            }
            explicit
        }
        None => {
            let default = config_path()?;
            if !default.exists() {
                tracing::debug!(path = %default.display(), "no configuration file, using defaults");
                return Ok(Config::default());
            }
            default
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    let config = parse(&raw).with_context(|| format!("invalid configuration in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        page_size = config.page_size,
        postal_code = config.validation.postal_pattern(),
        "loaded configuration"
    );

    Ok(Config {
        config_path: Some(path),
        ..config
    })
}

/// Parse configuration text. Unknown keys are reported on stderr.
pub fn parse(raw: &str) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw).context("failed to parse configuration as TOML")?;

    for warning in unknown_keys(&value) {
        eprintln!("warning: {}", warning);
    }

    let cfg_file: ConfigFile = value
        .try_into()
        .context("failed to deserialize configuration")?;

    let page_size = match cfg_file.page_size {
        Some(0) => bail!("`page_size` must be at least 1"),
        Some(size) => size,
        None => DEFAULT_PAGE_SIZE,
    };

    let postal_pattern = cfg_file
        .validation
        .postal_code
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_POSTAL_PATTERN);
    let validation = ValidationRules::new(postal_pattern)
        .with_context(|| format!("invalid validation.postal_code pattern `{}`", postal_pattern))?;

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    Ok(Config {
        config_path: None,
        data: cfg_file.data.map(|p| expand_tilde(&p)),
        page_size,
        validation,
        keys,
        ui: cfg_file.ui.into(),
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn unknown_keys(value: &toml::Value) -> Vec<String> {
    let mut warnings = Vec::new();
    let Some(table) = value.as_table() else {
        return warnings;
    };

    collect_unknown(
        table,
        "",
        &["data", "page_size", "validation", "keys", "ui"],
        &mut warnings,
    );

    if let Some(v) = table.get("validation").and_then(toml::Value::as_table) {
        collect_unknown(v, "validation.", &["postal_code"], &mut warnings);
    }

    if let Some(keys) = table.get("keys").and_then(toml::Value::as_table) {
        collect_unknown(keys, "keys.", &["global", "form", "results"], &mut warnings);
        if let Some(v) = keys.get("global").and_then(toml::Value::as_table) {
            collect_unknown(v, "keys.global.", &["quit", "help", "reset"], &mut warnings);
        }
        if let Some(v) = keys.get("form").and_then(toml::Value::as_table) {
            collect_unknown(
                v,
                "keys.form.",
                &[
                    "next",
                    "prev",
                    "submit",
                    "focus_results",
                    "region_next",
                    "region_prev",
                ],
                &mut warnings,
            );
        }
        if let Some(v) = keys.get("results").and_then(toml::Value::as_table) {
            collect_unknown(
                v,
                "keys.results.",
                &[
                    "next",
                    "prev",
                    "page_next",
                    "page_prev",
                    "toggle",
                    "back",
                    "quit",
                ],
                &mut warnings,
            );
        }
    }

    if let Some(ui) = table.get("ui").and_then(toml::Value::as_table) {
        collect_unknown(ui, "ui.", &["colors"], &mut warnings);
        if let Some(v) = ui.get("colors").and_then(toml::Value::as_table) {
            collect_unknown(
                v,
                "ui.colors.",
                &[
                    "border",
                    "selection_bg",
                    "selection_fg",
                    "header",
                    "error",
                    "status_fg",
                    "status_bg",
                ],
                &mut warnings,
            );
        }
    }

    warnings
}

fn collect_unknown(
    table: &toml::map::Map<String, toml::Value>,
    prefix: &str,
    known: &[&str],
    warnings: &mut Vec<String>,
) {
    let known: HashSet<&str> = known.iter().copied().collect();
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            warnings.push(format!("unknown configuration key `{}{}`", prefix, key));
        }
    }
}

// =============================================================================
// UI config types
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    header: RgbColor,
    error: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            border: RgbColor::new(99, 102, 241),
            selection_bg: RgbColor::new(99, 102, 241),
            selection_fg: RgbColor::new(255, 255, 255),
            header: RgbColor::new(59, 130, 246),
            error: RgbColor::new(239, 68, 68),
            status_fg: RgbColor::new(99, 102, 241),
            status_bg: RgbColor::new(0, 0, 0),
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let c = file.colors;
        Self {
            colors: UiColors {
                border: c.border,
                selection_bg: c.selection_bg,
                selection_fg: c.selection_fg,
                header: c.header,
                error: c.error,
                status_fg: c.status_fg,
                status_bg: c.status_bg,
            },
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.data.is_none());
        assert_eq!(config.keys.results.quit, vec!["q".to_string()]);
        assert_eq!(config.validation.postal_pattern(), DEFAULT_POSTAL_PATTERN);
    }

    #[test]
    fn test_page_size_and_postal_pattern() {
        let config = parse(
            r#"
page_size = 10

[validation]
postal_code = '^\d{5}$'
"#,
        )
        .unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.validation.postal_pattern(), r"^\d{5}$");
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(parse("page_size = 0").is_err());
    }

    #[test]
    fn test_invalid_postal_pattern_rejected() {
        let err = parse("[validation]\npostal_code = '('").unwrap_err();
        assert!(format!("{:#}", err).contains("postal_code"));
    }

    #[test]
    fn test_key_binding_single_or_list() {
        let config = parse(
            r#"
[keys.results]
quit = "x"
toggle = ["Space", "t"]
"#,
        )
        .unwrap();
        assert_eq!(config.keys.results.quit, vec!["x".to_string()]);
        assert_eq!(
            config.keys.results.toggle,
            vec!["Space".to_string(), "t".to_string()]
        );
        // Untouched actions keep their defaults.
        assert_eq!(config.keys.results.next, ResultsKeys::default().next);
    }

    #[test]
    fn test_key_binding_collision() {
        let err = parse(
            r#"
[keys.results]
quit = "j"
"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("collision"));
    }

    #[test]
    fn test_collision_ignores_named_key_case() {
        let keys = Keys {
            form: FormKeys {
                submit: vec!["ENTER".into()],
                focus_results: vec!["enter".into()],
                ..FormKeys::default()
            },
            ..Keys::default()
        };
        assert!(validate_key_bindings(&keys).is_err());
    }

    #[test]
    fn test_single_char_bindings_are_case_sensitive() {
        assert_ne!(normalize_binding("m"), normalize_binding("M"));
        assert_eq!(normalize_binding("Esc"), normalize_binding("Escape"));
    }

    #[test]
    fn test_default_bindings_are_collision_free() {
        assert!(validate_key_bindings(&Keys::default()).is_ok());
    }

    #[test]
    fn test_unknown_keys_reported() {
        let value: toml::Value = toml::from_str(
            r#"
contacts_file = "~/people.json"
[keys.results]
export = "x"
[ui.colors]
border = [1, 2, 3]
glow = [1, 2, 3]
"#,
        )
        .unwrap();
        let warnings = unknown_keys(&value);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().any(|w| w.contains("`contacts_file`")));
        assert!(warnings.iter().any(|w| w.contains("`keys.results.export`")));
        assert!(warnings.iter().any(|w| w.contains("`ui.colors.glow`")));
    }

    #[test]
    fn test_rgb_color_forms() {
        let config = parse(
            r#"
[ui.colors]
border = [1, 2, 3]
error = { r = 4, g = 5, b = 6 }
"#,
        )
        .unwrap();
        assert_eq!(config.ui.colors.border, RgbColor::new(1, 2, 3));
        assert_eq!(config.ui.colors.error, RgbColor::new(4, 5, 6));
    }

    #[test]
    fn test_load_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load(Some(&missing)).is_err());

        let present = dir.path().join("config.toml");
        fs::write(&present, "page_size = 3\n").unwrap();
        let config = load(Some(&present)).unwrap();
        assert_eq!(config.page_size, 3);
        assert_eq!(config.config_path.as_deref(), Some(present.as_path()));
    }

    #[test]
    fn test_data_path_tilde_expanded() {
        let config = parse("data = \"~/contacts.json\"").unwrap();
        let data = config.data.unwrap();
        if home::home_dir().is_some() {
            assert!(!data.starts_with("~"));
        }
        assert!(data.ends_with("contacts.json"));
    }
}
