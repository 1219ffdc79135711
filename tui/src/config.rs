use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rickdex_core::catalog::CatalogConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file holding the favorites
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("rickdex.db"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Keymap {
    pub quit: String,
    pub help: String,
    pub toggle_favorite: String,
    pub load_more: String,
    pub search: String,
    pub open: String,
    pub back: String,
    pub next_tab: String,
    pub clear_all: String,
    pub open_image: String,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            quit: "q".to_string(),
            help: "h".to_string(),
            toggle_favorite: "f".to_string(),
            load_more: "m".to_string(),
            search: "/".to_string(),
            open: "enter".to_string(),
            back: "backspace".to_string(),
            next_tab: "tab".to_string(),
            clear_all: "ctrl-d".to_string(),
            open_image: "i".to_string(),
        }
    }
}

impl Keymap {
    /// Parse every binding, naming the offending entry on failure
    pub fn bindings(&self) -> Result<KeyBindings> {
        let parse = |name: &str, value: &str| -> Result<KeyBinding> {
            value
                .parse()
                .with_context(|| format!("Invalid binding for keymap.{}", name))
        };

        Ok(KeyBindings {
            quit: parse("quit", &self.quit)?,
            help: parse("help", &self.help)?,
            toggle_favorite: parse("toggle_favorite", &self.toggle_favorite)?,
            load_more: parse("load_more", &self.load_more)?,
            search: parse("search", &self.search)?,
            open: parse("open", &self.open)?,
            back: parse("back", &self.back)?,
            next_tab: parse("next_tab", &self.next_tab)?,
            clear_all: parse("clear_all", &self.clear_all)?,
            open_image: parse("open_image", &self.open_image)?,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: CatalogConfig,
    pub storage: StorageConfig,
    pub ui: UiConfig,
    pub keymap: Keymap,
}

/// Load the config file, writing the defaults first if it does not exist.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        let toml = toml::to_string(&config).context("Failed to serialize default config")?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
        }
        fs::write(path, toml)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        tracing::info!("Wrote default config to {}", path.display());
        return Ok(config);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        // Terminals report Shift alongside uppercase characters
        let mut held = key.modifiers;
        let mut wanted = self.modifiers;
        if let KeyCode::Char(_) = key.code {
            held.remove(KeyModifiers::SHIFT);
            wanted.remove(KeyModifiers::SHIFT);
        }
        held == wanted
    }
}

impl FromStr for KeyBinding {
    type Err = anyhow::Error;

    /// Parses bindings like `q`, `enter`, `ctrl-f` or `alt-shift-up`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("empty key binding");
        }
        // A lone "-" is the minus key, not a separator
        if s == "-" {
            return Ok(Self::new(KeyCode::Char('-'), KeyModifiers::NONE));
        }

        let mut parts: Vec<&str> = s.split('-').collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(|| anyhow!("missing key in '{}'", s))?;

        let mut modifiers = KeyModifiers::NONE;
        for part in parts {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                other => bail!("unknown modifier '{}' in '{}'", other, s),
            }
        }

        let mut chars = key.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => KeyCode::Char(c),
            _ => match key.to_ascii_lowercase().as_str() {
                "enter" | "return" => KeyCode::Enter,
                "esc" | "escape" => KeyCode::Esc,
                "tab" => KeyCode::Tab,
                "backtab" => KeyCode::BackTab,
                "backspace" => KeyCode::Backspace,
                "delete" | "del" => KeyCode::Delete,
                "insert" => KeyCode::Insert,
                "space" => KeyCode::Char(' '),
                "up" => KeyCode::Up,
                "down" => KeyCode::Down,
                "left" => KeyCode::Left,
                "right" => KeyCode::Right,
                "home" => KeyCode::Home,
                "end" => KeyCode::End,
                "pageup" => KeyCode::PageUp,
                "pagedown" => KeyCode::PageDown,
                other => bail!("unknown key '{}'", other),
            },
        };

        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            write!(f, "Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            write!(f, "Shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) if self.modifiers.is_empty() => write!(f, "{}", c),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::Enter => write!(f, "Enter"),
            KeyCode::Esc => write!(f, "Esc"),
            KeyCode::Tab => write!(f, "Tab"),
            KeyCode::BackTab => write!(f, "Shift+Tab"),
            KeyCode::Backspace => write!(f, "Backspace"),
            KeyCode::Delete => write!(f, "Delete"),
            KeyCode::Insert => write!(f, "Insert"),
            KeyCode::Up => write!(f, "↑"),
            KeyCode::Down => write!(f, "↓"),
            KeyCode::Left => write!(f, "←"),
            KeyCode::Right => write!(f, "→"),
            KeyCode::Home => write!(f, "Home"),
            KeyCode::End => write!(f, "End"),
            KeyCode::PageUp => write!(f, "PageUp"),
            KeyCode::PageDown => write!(f, "PageDown"),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Parsed form of [`Keymap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBindings {
    pub quit: KeyBinding,
    pub help: KeyBinding,
    pub toggle_favorite: KeyBinding,
    pub load_more: KeyBinding,
    pub search: KeyBinding,
    pub open: KeyBinding,
    pub back: KeyBinding,
    pub next_tab: KeyBinding,
    pub clear_all: KeyBinding,
    pub open_image: KeyBinding,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_parse_bindings() {
        let ctrl_f: KeyBinding = "ctrl-f".parse().unwrap();
        assert_eq!(ctrl_f, KeyBinding::new(KeyCode::Char('f'), KeyModifiers::CONTROL));
        assert!(ctrl_f.matches(&key(KeyCode::Char('f'), KeyModifiers::CONTROL)));
        assert!(!ctrl_f.matches(&key(KeyCode::Char('f'), KeyModifiers::NONE)));

        let enter: KeyBinding = "Enter".parse().unwrap();
        assert_eq!(enter.code, KeyCode::Enter);
        assert_eq!("-".parse::<KeyBinding>().unwrap().code, KeyCode::Char('-'));

        assert!("hyper-x".parse::<KeyBinding>().is_err());
        assert!("ctrl-".parse::<KeyBinding>().is_err());
        assert!("nosuchkey".parse::<KeyBinding>().is_err());
    }

    #[test]
    fn test_uppercase_char_ignores_shift() {
        let binding: KeyBinding = "Q".parse().unwrap();
        assert!(binding.matches(&key(KeyCode::Char('Q'), KeyModifiers::SHIFT)));
        assert!(!binding.matches(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_binding_display() {
        assert_eq!("ctrl-d".parse::<KeyBinding>().unwrap().to_string(), "Ctrl+D");
        assert_eq!("/".parse::<KeyBinding>().unwrap().to_string(), "/");
        assert_eq!("backspace".parse::<KeyBinding>().unwrap().to_string(), "Backspace");
    }

    #[test]
    fn test_default_keymap_parses() {
        let bindings = Keymap::default().bindings().unwrap();
        assert_eq!(bindings.quit.code, KeyCode::Char('q'));
        assert_eq!(bindings.clear_all.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_bad_binding_names_entry() {
        let keymap = Keymap {
            search: "super-/".to_string(),
            ..Keymap::default()
        };
        let err = keymap.bindings().unwrap_err();
        assert!(err.to_string().contains("keymap.search"));
    }

    #[test]
    fn test_load_config_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api]\ntimeout_secs = 5\n\n[keymap]\nquit = \"ctrl-q\"\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.base_url, "https://rickandmortyapi.com/api");
        assert_eq!(config.keymap.quit, "ctrl-q");
        assert_eq!(config.keymap.help, "h");
        assert_eq!(config.ui.tick_rate_ms, 250);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ui\ntick_rate_ms = ").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
