//! Command line interface
//!
//! # Usage
//!
//! Ask for a line of text:
//! ```bash
//! name=$(dialogbox --entry --title "Project" --text "Project name:")
//! ```
//!
//! Custom buttons, the exit status is the button id:
//! ```bash
//! dialogbox --text "Apply 15 changes?" --button=Apply:0 --button=Review:2 --button=gtk-cancel:1
//! ```
//!
//! A notebook assembled from two plugs:
//! ```bash
//! dialogbox --plug=4321 --tabnum=1 --form --field=Name &
//! dialogbox --plug=4321 --tabnum=2 --text-info --filename=README &
//! dialogbox --notebook --key=4321 --tab=General --tab=Readme
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;

use crate::config::{
    ButtonLayout, ButtonSpec, DialogConfig, Edge, IndicatorPlacement, Layer, Mode, Orientation, PictureSize, Settings,
    TextAlign, WaitPolicy, XidTarget,
};
use crate::error::{DialogError, Result};
use crate::geometry::Offset;
use crate::response::ResultCode;
use crate::text;

/// Environment variable holding extra options, prepended to the command line
pub const OPTIONS_ENV: &str = "DIALOGBOX_OPTIONS";

/// Mode flags; the last one given wins
const MODE_FLAGS: [&str; 20] = [
    "calendar",
    "color",
    "entry",
    "file",
    "font",
    "form",
    "html",
    "icons",
    "list",
    "notebook",
    "paned",
    "picture",
    "progress",
    "scale",
    "text_info",
    "dnd",
    "about",
    "version",
    "notification",
    "print",
];

#[derive(Parser, Debug, Default)]
#[command(name = "dialogbox")]
#[command(about = "Display dialog boxes from shell scripts")]
#[command(disable_version_flag = true, args_override_self = true)]
pub struct Args {
    // Modes
    /// Calendar dialog
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub calendar: bool,
    /// Color picker
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub color: bool,
    /// Text entry
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub entry: bool,
    /// File chooser
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub file: bool,
    /// Font chooser
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub font: bool,
    /// Form with several fields
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub form: bool,
    /// Markdown document viewer
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub html: bool,
    /// Grid of launchers
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub icons: bool,
    /// List of rows
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub list: bool,
    /// Tabbed container for plug dialogs
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub notebook: bool,
    /// Two-pane container for plug dialogs
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub paned: bool,
    /// Image viewer
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub picture: bool,
    /// Progress bar fed from stdin
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub progress: bool,
    /// Slider
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub scale: bool,
    /// Text viewer/editor
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub text_info: bool,
    /// Drop target
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub dnd: bool,
    /// About this program
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub about: bool,
    /// Print the version and exit
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub version: bool,
    /// Small clickable notification window
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub notification: bool,
    /// Send a file to the printer
    #[arg(long, overrides_with_all = MODE_FLAGS)]
    pub print: bool,

    // Label, image and text
    #[arg(long)]
    pub title: Option<String>,
    /// Dialog text, simple markup allowed
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub image: Option<PathBuf>,
    #[arg(long)]
    pub image_on_top: bool,
    #[arg(long)]
    pub window_icon: Option<PathBuf>,
    /// Hide the widget in a collapsed section with this caption
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "")]
    pub expander: Option<String>,
    #[arg(long)]
    pub no_markup: bool,
    #[arg(long)]
    pub selectable_labels: bool,
    #[arg(long, value_enum)]
    pub text_align: Option<TextAlign>,
    /// Separator between output fields
    #[arg(long, default_value = "|")]
    pub separator: String,
    /// Separator between items of one value
    #[arg(long, default_value = "!")]
    pub item_separator: String,
    /// Read the extra data from FILE, one value per line
    #[arg(long)]
    pub rest: Option<PathBuf>,

    // Window
    #[arg(long)]
    pub borders: Option<u32>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// Negative values count from the right screen edge
    #[arg(long, allow_negative_numbers = true)]
    pub posx: Option<i32>,
    /// Negative values count from the bottom screen edge
    #[arg(long, allow_negative_numbers = true)]
    pub posy: Option<i32>,
    /// X11 style geometry, WxH+X+Y
    #[arg(long)]
    pub geometry: Option<String>,
    #[arg(long)]
    pub center: bool,
    #[arg(long)]
    pub mouse: bool,
    #[arg(long)]
    pub sticky: bool,
    #[arg(long)]
    pub on_top: bool,
    #[arg(long)]
    pub undecorated: bool,
    #[arg(long)]
    pub skip_taskbar: bool,
    #[arg(long)]
    pub no_focus: bool,
    #[arg(long)]
    pub fixed: bool,
    #[arg(long)]
    pub maximized: bool,
    #[arg(long)]
    pub fullscreen: bool,
    /// Undecorated, centered, without taskbar entry
    #[arg(long)]
    pub splash: bool,
    #[arg(long, value_enum)]
    pub layer: Option<Layer>,
    #[arg(long, value_enum)]
    pub edge: Option<Edge>,
    /// Write the window id to FILE, or to stderr
    #[arg(long, num_args = 0..=1, require_equals = true)]
    pub print_xid: Option<Option<PathBuf>>,

    // Buttons
    /// LABEL[:ID] or LABEL:COMMAND, may be repeated
    #[arg(long = "button")]
    pub buttons: Vec<String>,
    #[arg(long)]
    pub no_buttons: bool,
    #[arg(long, value_enum)]
    pub buttons_layout: Option<ButtonLayout>,

    // Termination
    /// Seconds before the dialog ends by itself
    #[arg(long, default_value_t = 0)]
    pub timeout: u32,
    #[arg(long, value_enum)]
    pub timeout_indicator: Option<IndicatorPlacement>,
    /// Show the remaining seconds on the indicator
    #[arg(long)]
    pub show_remain: bool,
    /// Code used by Ctrl+Enter, activation and SIGUSR1
    #[arg(long, allow_negative_numbers = true)]
    pub response: Option<i32>,
    #[arg(long)]
    pub escape_ok: bool,
    #[arg(long)]
    pub no_escape: bool,
    #[arg(long)]
    pub close_on_unfocus: bool,
    /// Print the result for every button
    #[arg(long)]
    pub always_print_result: bool,
    /// Send SIG (default 15) to the parent process on exit
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "15")]
    pub kill_parent: Option<i32>,

    // Plug/socket
    /// Run as plug of the container with this key
    #[arg(long, allow_negative_numbers = true)]
    pub plug: Option<i32>,
    /// Slot of this plug, starting at 1
    #[arg(long, default_value_t = 0)]
    pub tabnum: usize,
    /// Key of the slot table a container creates
    #[arg(long, allow_negative_numbers = true)]
    pub key: Option<i32>,
    /// Notebook tab caption, may be repeated
    #[arg(long = "tab")]
    pub tabs: Vec<String>,
    #[arg(long, value_enum)]
    pub orient: Option<Orientation>,
    /// Give up waiting for plug peers after MS milliseconds
    #[arg(long, value_name = "MS")]
    pub plug_timeout: Option<u64>,

    // Mode options
    #[arg(long)]
    pub entry_label: Option<String>,
    #[arg(long)]
    pub entry_text: Option<String>,
    #[arg(long)]
    pub hide_text: bool,
    #[arg(long)]
    pub day: Option<u32>,
    #[arg(long)]
    pub month: Option<u32>,
    #[arg(long)]
    pub year: Option<i32>,
    /// strftime format of the calendar result
    #[arg(long, default_value = "%x")]
    pub date_format: String,
    #[arg(long)]
    pub filename: Option<PathBuf>,
    #[arg(long)]
    pub multiple: bool,
    #[arg(long)]
    pub directory: bool,
    #[arg(long)]
    pub save: bool,
    #[arg(long)]
    pub confirm_overwrite: bool,
    #[arg(long)]
    pub init_color: Option<String>,
    #[arg(long)]
    pub fontname: Option<String>,
    /// LABEL[:TYPE], may be repeated
    #[arg(long = "field")]
    pub fields: Vec<String>,
    /// Column title, may be repeated
    #[arg(long = "column")]
    pub columns: Vec<String>,
    #[arg(long)]
    pub checklist: bool,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub value: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub min_value: i64,
    #[arg(long, default_value_t = 100, allow_negative_numbers = true)]
    pub max_value: i64,
    #[arg(long, default_value_t = 1)]
    pub step: i64,
    #[arg(long, default_value_t = 0)]
    pub percentage: u32,
    #[arg(long)]
    pub pulsate: bool,
    #[arg(long)]
    pub auto_close: bool,
    /// Send SIGHUP to the parent when progress is cancelled
    #[arg(long)]
    pub auto_kill: bool,
    #[arg(long)]
    pub editable: bool,
    #[arg(long)]
    pub uri: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub size: Option<PictureSize>,
    /// Show the dialog text as a tooltip (drag and drop)
    #[arg(long)]
    pub tooltip: bool,
    /// Command run for every dropped item
    #[arg(long)]
    pub command: Option<String>,

    // Diagnostics
    /// Log at debug level
    #[arg(long)]
    pub debug: bool,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Extra data: list rows, form values, icon items
    pub extra: Vec<String>,
}

impl Args {
    pub fn mode(&self) -> Mode {
        let flags = [
            (self.calendar, Mode::Calendar),
            (self.color, Mode::Color),
            (self.entry, Mode::Entry),
            (self.file, Mode::File),
            (self.font, Mode::Font),
            (self.form, Mode::Form),
            (self.html, Mode::Html),
            (self.icons, Mode::Icons),
            (self.list, Mode::List),
            (self.notebook, Mode::Notebook),
            (self.paned, Mode::Paned),
            (self.picture, Mode::Picture),
            (self.progress, Mode::Progress),
            (self.scale, Mode::Scale),
            (self.text_info, Mode::TextInfo),
            (self.dnd, Mode::DragAndDrop),
            (self.about, Mode::About),
            (self.version, Mode::Version),
            (self.notification, Mode::Notification),
            (self.print, Mode::Print),
        ];
        flags
            .into_iter()
            .find_map(|(set, mode)| set.then_some(mode))
            .unwrap_or_default()
    }

    /// Log filter requested on the command line
    pub fn log_filter(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }

    /// Replace the extra data with the lines of `--rest`
    pub fn load_rest(&mut self) -> Result<()> {
        if let Some(path) = &self.rest {
            self.extra = read_rest(path)?;
        }
        Ok(())
    }

    pub fn into_config(self, settings: &Settings) -> Result<DialogConfig> {
        let mode = self.mode();
        let mut config = DialogConfig::new(mode);
        config.debug = self.debug;

        let common = &mut config.common;
        common.title = self.title;
        common.text = self.text;
        common.image = self.image;
        common.image_on_top = self.image_on_top;
        common.window_icon = self.window_icon;
        common.expander = self.expander;
        common.no_markup = self.no_markup;
        common.selectable_labels = self.selectable_labels;
        common.text_align = self.text_align.unwrap_or_default();
        common.separator = text::unescape(&self.separator);
        common.item_separator = text::unescape(&self.item_separator);
        common.extra = self.extra;

        let win = &mut config.window;
        win.borders = self.borders;
        win.mouse = self.mouse;
        win.sticky = self.sticky;
        win.on_top = self.on_top;
        win.undecorated = self.undecorated;
        win.skip_taskbar = self.skip_taskbar;
        win.no_focus = self.no_focus;
        win.fixed = self.fixed;
        win.splash = self.splash;
        win.layer = self.layer;
        win.edge = self.edge;
        win.print_xid = self.print_xid.map(|file| match file {
            Some(path) => XidTarget::File(path),
            None => XidTarget::Stderr,
        });
        let geo = &mut win.geometry;
        geo.width = self.width.map(|w| w as f32);
        geo.height = self.height.map(|h| h as f32);
        geo.x = self.posx.map(Offset::from_signed);
        geo.y = self.posy.map(Offset::from_signed);
        geo.center = self.center;
        geo.maximized = self.maximized;
        geo.fullscreen = self.fullscreen;
        if let Some(spec) = &self.geometry {
            geo.apply_geometry_string(spec)?;
        }

        let buttons = &mut config.buttons;
        buttons.buttons = self
            .buttons
            .iter()
            .enumerate()
            .map(|(i, spec)| ButtonSpec::parse(spec, i))
            .collect();
        buttons.no_buttons = self.no_buttons;
        buttons.layout = self.buttons_layout.unwrap_or(settings.buttons_layout);
        buttons.alt_order = settings.alt_button_order;

        let term = &mut config.termination;
        term.timeout = self.timeout;
        term.indicator = self.timeout_indicator.unwrap_or(if self.timeout > 0 {
            IndicatorPlacement::Bottom
        } else {
            IndicatorPlacement::None
        });
        term.show_remaining = self.show_remain || settings.show_remain;
        term.default_response = self.response.map(ResultCode).unwrap_or(ResultCode::OK);
        term.escape_ok = self.escape_ok;
        term.no_escape = self.no_escape;
        term.close_on_unfocus = self.close_on_unfocus;
        term.always_print = self.always_print_result;
        term.kill_parent = self.kill_parent;

        let embed = &mut config.embed;
        embed.plug = self.plug;
        embed.tabnum = self.tabnum;
        embed.key = self.key;
        embed.tabs = self.tabs;
        embed.orientation = self.orient.unwrap_or_default();
        embed.max_tab = settings.max_tab;
        embed.wait = match self.plug_timeout.or(settings.plug_wait_ms) {
            Some(ms) => WaitPolicy::Bounded(Duration::from_millis(ms)),
            None => WaitPolicy::Unbounded,
        };

        let opts = &mut config.options;
        opts.entry.label = self.entry_label;
        opts.entry.text = self.entry_text.unwrap_or_default();
        opts.entry.hide_text = self.hide_text;
        opts.calendar.day = self.day;
        opts.calendar.month = self.month;
        opts.calendar.year = self.year;
        opts.calendar.date_format = self.date_format;
        opts.color = self.init_color;
        opts.file.filename = self.filename;
        opts.file.multiple = self.multiple;
        opts.file.directory = self.directory;
        opts.file.save = self.save;
        opts.file.confirm_overwrite = self.confirm_overwrite;
        opts.font = self.fontname;
        opts.fields = self.fields;
        opts.columns = self.columns;
        opts.checklist = self.checklist;
        opts.scale.value = self.value;
        opts.scale.min = self.min_value;
        opts.scale.max = self.max_value;
        opts.scale.step = self.step;
        opts.progress.percentage = self.percentage;
        opts.progress.pulsate = self.pulsate;
        opts.progress.auto_close = self.auto_close;
        opts.progress.auto_kill = self.auto_kill;
        opts.editable = self.editable;
        opts.uri = self.uri;
        opts.picture_size = self.size.unwrap_or_default();
        opts.tooltip = self.tooltip;
        opts.command = self.command;

        Ok(config)
    }
}

/// Lines of a `--rest` file, unescaped
pub fn read_rest(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(text::unescape).collect())
}

/// Put the tokens of the extra options string right after the program name.
///
/// A malformed string is reported back and the command line is used alone.
pub fn merge_env_options(argv: Vec<OsString>, extra: Option<&str>) -> (Vec<OsString>, Option<DialogError>) {
    let Some(extra) = extra.filter(|e| !e.trim().is_empty()) else {
        return (argv, None);
    };
    match text::split_args(extra) {
        Ok(tokens) => {
            let mut merged = Vec::with_capacity(argv.len() + tokens.len());
            let mut rest = argv.into_iter();
            merged.extend(rest.next());
            merged.extend(tokens.into_iter().map(OsString::from));
            merged.extend(rest);
            (merged, None)
        }
        Err(message) => (argv, Some(DialogError::ExtraOptions(message))),
    }
}

/// Parse the command line with the extra options in front of it.
///
/// When clap rejects the merged line but accepts the command line alone, the
/// extra options are dropped and the reason comes back as the second value.
pub fn parse_args(
    argv: Vec<OsString>,
    extra: Option<&str>,
) -> (std::result::Result<Args, clap::Error>, Option<DialogError>) {
    let (merged, env_error) = merge_env_options(argv.clone(), extra);
    if env_error.is_some() || merged.len() == argv.len() {
        return (Args::try_parse_from(argv), env_error);
    }
    match Args::try_parse_from(merged) {
        Ok(args) => (Ok(args), None),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => (Err(e), None),
        Err(e) => match Args::try_parse_from(argv) {
            Ok(args) => (Ok(args), Some(DialogError::ExtraOptions(clap_message(&e)))),
            // the command line is at fault on its own
            Err(e) => (Err(e), None),
        },
    }
}

/// A rejected command line, as reported to the user
pub fn usage_error(e: &clap::Error) -> DialogError {
    DialogError::CommandLine(clap_message(e))
}

fn clap_message(e: &clap::Error) -> String {
    let text = e.to_string();
    let first = text.lines().next().unwrap_or_default();
    first.trim_start_matches("error: ").to_string()
}
