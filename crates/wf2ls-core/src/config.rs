//! Conversion configuration.
//!
//! Options are layered: built-in defaults, then JSON configuration files, then
//! command-line values. Every keyed update goes through [`AppConfig::set`], which
//! rejects unknown keys, wrongly typed values and values outside an option's
//! allowed set before anything is stored.

use crate::error::{Error, Result};
use crate::formats::{DateFormat, TimeFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

option_enum! {
    /// When to mark blocks with children as collapsed
    pub enum CollapseMode {
        /// Only blocks at indent level 0
        Top => "top",
        /// Never
        None => "none",
        /// Every block with children
        All => "all",
        /// Blocks above `collapseDepth`
        Shallow => "shallow",
    }
}

option_enum! {
    /// How mirrored (virtual-root) nodes point back at their original
    pub enum MirrorStyle {
        Embed => "embed",
        Reference => "reference",
    }
}

option_enum! {
    /// Rendering of Workflowy color and highlight spans
    pub enum ColorMarkupMode {
        /// Approximate with Logseq highlight syntax and color tags
        Default => "default",
        /// Pass the span through for a styling plugin
        Plugin => "plugin",
    }
}

impl Default for CollapseMode {
    fn default() -> Self {
        CollapseMode::Top
    }
}

impl Default for MirrorStyle {
    fn default() -> Self {
        MirrorStyle::Embed
    }
}

impl Default for ColorMarkupMode {
    fn default() -> Self {
        ColorMarkupMode::Default
    }
}

impl CollapseMode {
    /// Whether a block with children at `level` gets `collapsed:: true`
    pub fn collapses(self, level: usize, depth: usize) -> bool {
        match self {
            CollapseMode::Top => level == 0,
            CollapseMode::None => false,
            CollapseMode::All => true,
            CollapseMode::Shallow => level < depth,
        }
    }
}

/// Switches for the non-default rich-text rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkupRules {
    pub strikethrough: bool,
    pub bare_links: bool,
    pub internal_block_refs: bool,
    pub internal_links: bool,
    pub colors: bool,
    pub dates: bool,
    pub mentions: bool,
}

impl Default for MarkupRules {
    fn default() -> Self {
        Self {
            strikethrough: true,
            bare_links: true,
            internal_block_refs: true,
            internal_links: true,
            colors: true,
            dates: true,
            mentions: true,
        }
    }
}

impl MarkupRules {
    /// Every rule disabled; elements fall back to their plain rendering
    pub fn none() -> Self {
        Self {
            strikethrough: false,
            bare_links: false,
            internal_block_refs: false,
            internal_links: false,
            colors: false,
            dates: false,
            mentions: false,
        }
    }

    fn update(&mut self, value: &Value) -> Result<()> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::invalid_option_type("markupRules", "object"))?;
        let mut updated = *self;
        for (rule, enabled) in map {
            let key = format!("markupRules.{}", rule);
            let enabled = enabled
                .as_bool()
                .ok_or_else(|| Error::invalid_option_type(&key, "boolean"))?;
            let slot = match rule.as_str() {
                "strikethrough" => &mut updated.strikethrough,
                "bareLinks" => &mut updated.bare_links,
                "internalBlockRefs" => &mut updated.internal_block_refs,
                "internalLinks" => &mut updated.internal_links,
                "colors" => &mut updated.colors,
                "dates" => &mut updated.dates,
                "mentions" => &mut updated.mentions,
                _ => return Err(Error::unknown_option(key)),
            };
            *slot = enabled;
        }
        *self = updated;
        Ok(())
    }
}

/// Everything that shapes a conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub collapse_mode: CollapseMode,
    pub collapse_depth: usize,
    pub compress_bookmarks: bool,
    pub conf_file_location: PathBuf,
    pub date_format: DateFormat,
    pub default_page: String,
    pub dest_dir: PathBuf,
    pub include_creation_metadata: bool,
    pub include_modified_metadata: bool,
    pub indent_spaces: usize,
    pub mirror_style: MirrorStyle,
    pub new_page_tag: String,
    pub source_file: PathBuf,
    pub text_color_markup_mode: ColorMarkupMode,
    pub time_format: TimeFormat,
    pub markup_rules: MarkupRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            collapse_mode: CollapseMode::default(),
            collapse_depth: 3,
            compress_bookmarks: false,
            conf_file_location: PathBuf::from("./config.json"),
            date_format: DateFormat::default(),
            default_page: "Workflowy Imports".to_string(),
            dest_dir: PathBuf::from("./output"),
            include_creation_metadata: false,
            include_modified_metadata: false,
            indent_spaces: 2,
            mirror_style: MirrorStyle::default(),
            new_page_tag: "#LS-Page".to_string(),
            source_file: PathBuf::new(),
            text_color_markup_mode: ColorMarkupMode::default(),
            time_format: TimeFormat::default(),
            markup_rules: MarkupRules::default(),
        }
    }
}

/// Largest accepted `indentSpaces`
const MAX_INDENT_SPACES: usize = 16;

impl AppConfig {
    /// Create a configuration with every option at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a validated configuration from defaults
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// Set one option from its JSON representation.
    ///
    /// Keys use the camelCase names of the configuration file.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        match key {
            "collapseMode" => self.collapse_mode = expect_option(key, value)?,
            "collapseDepth" => self.collapse_depth = expect_count(key, value)?,
            "compressBookmarks" => self.compress_bookmarks = expect_bool(key, value)?,
            "confFileLocation" => self.conf_file_location = expect_str(key, value)?.into(),
            "dateFormat" => self.date_format = expect_option(key, value)?,
            "defaultPage" => self.default_page = expect_str(key, value)?.to_string(),
            "destDir" => self.dest_dir = expect_str(key, value)?.into(),
            "includeCreationMetadata" => {
                self.include_creation_metadata = expect_bool(key, value)?
            }
            "includeModifiedMetadata" => {
                self.include_modified_metadata = expect_bool(key, value)?
            }
            "indentSpaces" => self.indent_spaces = expect_count(key, value)?,
            "mirrorStyle" => self.mirror_style = expect_option(key, value)?,
            "newPageTag" => self.new_page_tag = expect_str(key, value)?.to_string(),
            "sourceFile" => self.source_file = expect_str(key, value)?.into(),
            "textColorMarkupMode" | "highlightStyle" => {
                self.text_color_markup_mode = expect_option(key, value)?
            }
            "timeFormat" => self.time_format = expect_option(key, value)?,
            "markupRules" => self.markup_rules.update(value)?,
            _ => return Err(Error::unknown_option(key)),
        }
        Ok(())
    }

    /// Layer a JSON configuration file over the current values.
    ///
    /// `confFileLocation` is never taken from a file and unknown keys are skipped
    /// with a warning; any other invalid entry aborts the update.
    pub fn update_from_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }
        let raw = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&raw)?;
        let entries = value.as_object().ok_or_else(|| {
            Error::config_error(format!(
                "{} must contain a JSON object",
                path.display()
            ))
        })?;

        for (key, value) in entries {
            if key == "confFileLocation" {
                continue;
            }
            match self.set(key, value) {
                Err(Error::UnknownOption { key }) => {
                    log::warn!("Ignoring unknown option '{}' in {}", key, path.display());
                }
                other => other?,
            }
        }
        log::debug!("Loaded configuration from {}", path.display());
        Ok(())
    }

    /// Apply command-line values, which win over every file
    pub fn apply_cli(
        &mut self,
        source: Option<PathBuf>,
        dest: Option<PathBuf>,
        config: Option<PathBuf>,
    ) {
        if let Some(source) = source {
            self.source_file = source;
        }
        if let Some(dest) = dest {
            self.dest_dir = dest;
        }
        if let Some(config) = config {
            self.conf_file_location = config;
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        if self.default_page.trim().is_empty() {
            return Err(Error::config_error("defaultPage cannot be empty"));
        }
        if self.new_page_tag.trim().is_empty() {
            return Err(Error::config_error("newPageTag cannot be empty"));
        }
        if self.indent_spaces == 0 || self.indent_spaces > MAX_INDENT_SPACES {
            return Err(Error::config_error(format!(
                "indentSpaces must be between 1 and {}",
                MAX_INDENT_SPACES
            )));
        }
        Ok(())
    }

    /// The source file, failing when none was given by any layer
    pub fn require_source(&self) -> Result<&Path> {
        if self.source_file.as_os_str().is_empty() {
            return Err(Error::config_error(
                "No source file given (use -s or set sourceFile in the configuration file)",
            ));
        }
        Ok(&self.source_file)
    }
}

fn expect_bool(key: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::invalid_option_type(key, "boolean"))
}

fn expect_str<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::invalid_option_type(key, "string"))
}

fn expect_count(key: &str, value: &Value) -> Result<usize> {
    let n = value
        .as_u64()
        .ok_or_else(|| Error::invalid_option_type(key, "non-negative integer"))?;
    usize::try_from(n).map_err(|_| Error::invalid_option_value(key, n.to_string()))
}

fn expect_option<T>(key: &str, value: &Value) -> Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    let raw = expect_str(key, value)?;
    raw.parse()
        .map_err(|_| Error::invalid_option_value(key, raw))
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collapse_mode(mut self, mode: CollapseMode) -> Self {
        self.config.collapse_mode = mode;
        self
    }

    pub fn collapse_depth(mut self, depth: usize) -> Self {
        self.config.collapse_depth = depth;
        self
    }

    pub fn compress_bookmarks(mut self, compress: bool) -> Self {
        self.config.compress_bookmarks = compress;
        self
    }

    pub fn date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    pub fn time_format(mut self, format: TimeFormat) -> Self {
        self.config.time_format = format;
        self
    }

    pub fn default_page(mut self, name: impl Into<String>) -> Self {
        self.config.default_page = name.into();
        self
    }

    pub fn dest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.dest_dir = dir.into();
        self
    }

    pub fn source_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.config.source_file = file.into();
        self
    }

    pub fn indent_spaces(mut self, spaces: usize) -> Self {
        self.config.indent_spaces = spaces;
        self
    }

    pub fn mirror_style(mut self, style: MirrorStyle) -> Self {
        self.config.mirror_style = style;
        self
    }

    pub fn new_page_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.new_page_tag = tag.into();
        self
    }

    pub fn color_markup(mut self, mode: ColorMarkupMode) -> Self {
        self.config.text_color_markup_mode = mode;
        self
    }

    pub fn include_metadata(mut self, creation: bool, modified: bool) -> Self {
        self.config.include_creation_metadata = creation;
        self.config.include_modified_metadata = modified;
        self
    }

    pub fn markup_rules(mut self, rules: MarkupRules) -> Self {
        self.config.markup_rules = rules;
        self
    }

    /// Build and validate
    pub fn build(self) -> Result<AppConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
