//! Dialog configuration
//!
//! `DialogConfig` is built once from the command line (see `cli.rs`) and is
//! immutable for the rest of the process. The user settings file provides
//! defaults for a handful of presentation knobs.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::geometry::GeometryRequest;
use crate::response::ResultCode;

/// Dialog kind requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Image, text and buttons only
    #[default]
    Message,
    Calendar,
    Color,
    Entry,
    File,
    Font,
    Form,
    Html,
    Icons,
    List,
    Notebook,
    Paned,
    Picture,
    Progress,
    Scale,
    TextInfo,
    DragAndDrop,
    About,
    Version,
    Notification,
    Print,
}

impl Mode {
    /// Modes whose default button bar is a single Close button
    pub fn uses_close_button(self) -> bool {
        matches!(self, Mode::Progress | Mode::DragAndDrop | Mode::Picture)
    }

    /// Container modes that embed plug children
    pub fn is_container(self) -> bool {
        matches!(self, Mode::Notebook | Mode::Paned)
    }

    /// Modes that cannot work without an X11 display
    pub fn requires_x11(self) -> bool {
        matches!(self, Mode::Notebook | Mode::Paned | Mode::Notification)
    }
}

/// One entry of the button bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    pub label: String,
    /// Shell command launched detached instead of ending the dialog
    pub command: Option<String>,
    pub response: ResultCode,
}

fn stock_label(label: &str) -> &str {
    match label {
        "gtk-ok" => "OK",
        "gtk-cancel" => "Cancel",
        "gtk-close" => "Close",
        "gtk-yes" => "Yes",
        "gtk-no" => "No",
        "gtk-apply" => "Apply",
        "gtk-quit" => "Quit",
        other => other,
    }
}

impl ButtonSpec {
    pub fn new(label: impl Into<String>, response: ResultCode) -> Self {
        Self {
            label: label.into(),
            command: None,
            response,
        }
    }

    /// Parse `LABEL[:ID]` or `LABEL:COMMAND`.
    ///
    /// A button without an explicit id gets its position in the bar.
    pub fn parse(spec: &str, index: usize) -> Self {
        static NUMERIC: OnceLock<Regex> = OnceLock::new();
        let numeric = NUMERIC.get_or_init(|| Regex::new(r"^\s*-?\d+\s*$").expect("static id pattern"));

        let (label, rest) = match spec.split_once(':') {
            Some((label, rest)) if !label.is_empty() => (label, Some(rest)),
            _ => (spec, None),
        };
        // mnemonic underscores and the icon/tooltip suffixes are presentation only
        let label = label.split('!').next().unwrap_or(label);
        let label = stock_label(label).replace('_', "");

        match rest {
            Some(id) if numeric.is_match(id) => Self {
                label,
                command: None,
                response: ResultCode(id.trim().parse().unwrap_or(index as i32)),
            },
            Some(cmd) if !cmd.trim().is_empty() => Self {
                label,
                command: Some(cmd.to_string()),
                response: ResultCode(index as i32),
            },
            _ => Self {
                label,
                command: None,
                response: ResultCode(index as i32),
            },
        }
    }
}

/// Where the timeout indicator is packed relative to the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorPlacement {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    None,
}

impl IndicatorPlacement {
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Button bar arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonLayout {
    Spread,
    Edge,
    Start,
    #[default]
    End,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Fill,
}

/// Compositor stacking class for layer-shell style placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Layer {
    Background,
    Bottom,
    Top,
    Overlay,
}

/// Screen edge or corner a layered window is anchored to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
    Topleft,
    Topright,
    Bottomleft,
    Bottomright,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PictureSize {
    #[default]
    Fit,
    Orig,
}

/// Where `--print-xid` writes the native window handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XidTarget {
    Stderr,
    File(PathBuf),
}

/// How long plug/socket peers poll the slot table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Poll until the peer shows up, however long that takes
    #[default]
    Unbounded,
    Bounded(Duration),
}

/// User settings file (`~/.config/dialogbox/settings.toml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show the remaining seconds on the timeout indicator
    pub show_remain: bool,
    /// Highest tab number a container can hold
    pub max_tab: usize,
    /// Put OK before Cancel in the default button bar
    pub alt_button_order: bool,
    pub buttons_layout: ButtonLayout,
    /// Bound for plug/socket polling, unbounded when unset
    pub plug_wait_ms: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_remain: false,
            max_tab: 100,
            alt_button_order: false,
            buttons_layout: ButtonLayout::End,
            plug_wait_ms: None,
        }
    }
}

impl Settings {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("dialogbox/settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Load settings from file, falling back to defaults
    pub fn load() -> Self {
        let path = Self::path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("Ignoring settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Label, image and shared formatting options
#[derive(Debug, Clone, Default)]
pub struct CommonOptions {
    pub title: Option<String>,
    pub text: Option<String>,
    pub image: Option<PathBuf>,
    pub image_on_top: bool,
    pub window_icon: Option<PathBuf>,
    pub expander: Option<String>,
    pub no_markup: bool,
    pub selectable_labels: bool,
    pub text_align: TextAlign,
    pub separator: String,
    pub item_separator: String,
    /// Trailing positional values (list rows, form values, icon items)
    pub extra: Vec<String>,
}

/// Top-level window behaviour
#[derive(Debug, Clone, Default)]
pub struct WindowOptions {
    /// Border width, 2 when unset
    pub borders: Option<u32>,
    pub geometry: GeometryRequest,
    pub mouse: bool,
    pub sticky: bool,
    pub on_top: bool,
    pub undecorated: bool,
    pub skip_taskbar: bool,
    pub no_focus: bool,
    pub fixed: bool,
    pub splash: bool,
    pub layer: Option<Layer>,
    pub edge: Option<Edge>,
    pub print_xid: Option<XidTarget>,
}

#[derive(Debug, Clone, Default)]
pub struct ButtonOptions {
    pub buttons: Vec<ButtonSpec>,
    pub no_buttons: bool,
    pub layout: ButtonLayout,
    pub alt_order: bool,
}

/// Everything that feeds the termination arbiter and the emission gate
#[derive(Debug, Clone)]
pub struct TerminationOptions {
    /// Seconds before the dialog ends with `TIMEOUT`, 0 disables
    pub timeout: u32,
    pub indicator: IndicatorPlacement,
    pub show_remaining: bool,
    pub default_response: ResultCode,
    pub escape_ok: bool,
    pub no_escape: bool,
    pub close_on_unfocus: bool,
    pub always_print: bool,
    /// Signal sent to the parent process on exit
    pub kill_parent: Option<i32>,
}

impl Default for TerminationOptions {
    fn default() -> Self {
        Self {
            timeout: 0,
            indicator: IndicatorPlacement::None,
            show_remaining: false,
            default_response: ResultCode::OK,
            escape_ok: false,
            no_escape: false,
            close_on_unfocus: false,
            always_print: false,
            kill_parent: None,
        }
    }
}

/// Plug/socket embedding
#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    /// Slot table key this process plugs into
    pub plug: Option<i32>,
    /// 1-based slot index of this plug
    pub tabnum: usize,
    /// Slot table key a container allocates
    pub key: Option<i32>,
    pub tabs: Vec<String>,
    pub orientation: Orientation,
    pub max_tab: usize,
    pub wait: WaitPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct EntryOptions {
    pub label: Option<String>,
    pub text: String,
    pub hide_text: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CalendarOptions {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub date_format: String,
}

#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub filename: Option<PathBuf>,
    pub multiple: bool,
    pub directory: bool,
    pub save: bool,
    pub confirm_overwrite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ScaleOptions {
    pub value: i64,
    pub min: i64,
    pub max: i64,
    pub step: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ProgressOptions {
    pub percentage: u32,
    pub pulsate: bool,
    pub auto_close: bool,
    pub auto_kill: bool,
}

/// Mode specific options, only the group matching `mode` is consulted
#[derive(Debug, Clone, Default)]
pub struct ModeOptions {
    pub entry: EntryOptions,
    pub calendar: CalendarOptions,
    pub color: Option<String>,
    pub file: FileOptions,
    pub font: Option<String>,
    pub fields: Vec<String>,
    pub columns: Vec<String>,
    pub checklist: bool,
    pub scale: ScaleOptions,
    pub progress: ProgressOptions,
    pub editable: bool,
    pub uri: Option<PathBuf>,
    pub picture_size: PictureSize,
    pub tooltip: bool,
    pub command: Option<String>,
}

/// Fully parsed dialog configuration
#[derive(Debug, Clone, Default)]
pub struct DialogConfig {
    pub mode: Mode,
    pub common: CommonOptions,
    pub window: WindowOptions,
    pub buttons: ButtonOptions,
    pub termination: TerminationOptions,
    pub embed: EmbedOptions,
    pub options: ModeOptions,
    pub debug: bool,
}

impl DialogConfig {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            common: CommonOptions {
                separator: "|".to_string(),
                item_separator: "!".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn title(&self) -> &str {
        self.common.title.as_deref().unwrap_or("dialogbox")
    }

    pub fn has_custom_buttons(&self) -> bool {
        !self.buttons.buttons.is_empty()
    }

    pub fn is_plug(&self) -> bool {
        self.embed.plug.is_some()
    }

    pub fn borders(&self) -> u32 {
        self.window.borders.unwrap_or(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_button_with_id() {
        let b = ButtonSpec::parse("Retry:4", 0);
        assert_eq!(b.label, "Retry");
        assert_eq!(b.response, ResultCode(4));
        assert!(b.command.is_none());
    }

    #[test]
    fn test_parse_button_with_command() {
        let b = ButtonSpec::parse("Open log:xdg-open /tmp/log", 2);
        assert_eq!(b.label, "Open log");
        assert_eq!(b.command.as_deref(), Some("xdg-open /tmp/log"));
    }

    #[test]
    fn test_parse_button_stock_and_default_id() {
        let b = ButtonSpec::parse("gtk-cancel", 3);
        assert_eq!(b.label, "Cancel");
        assert_eq!(b.response, ResultCode(3));

        let b = ButtonSpec::parse("_Save!document-save!Save it:-2", 0);
        assert_eq!(b.label, "Save");
        assert_eq!(b.response, ResultCode(-2));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.max_tab, 100);
        assert!(!settings.show_remain);
        assert!(settings.plug_wait_ms.is_none());
    }

    #[test]
    fn test_settings_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "show_remain = true\nbuttons_layout = \"center\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert!(settings.show_remain);
        assert_eq!(settings.buttons_layout, ButtonLayout::Center);
        assert_eq!(settings.max_tab, 100);
    }

    #[test]
    fn test_mode_classes() {
        assert!(Mode::Progress.uses_close_button());
        assert!(!Mode::Entry.uses_close_button());
        assert!(Mode::Paned.is_container());
        assert!(Mode::Notification.requires_x11());
    }
}
