//! Supported document formats.

use std::fmt;

use camino::Utf8Path;

/// Serialization formats understood by the codec layer.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    /// JSON documents.
    Json,
    /// YAML documents (`.yaml` or `.yml`).
    Yaml,
    /// TOML documents.
    Toml,
    /// INI documents with optional `[section]` headers.
    Ini,
    /// Flat `KEY=value` documents with dotted keys.
    Env,
}

impl Format {
    /// Resolve a format name or extension, ignoring case and a leading dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata::codec::Format;
    ///
    /// assert_eq!(Format::from_hint("YML"), Some(Format::Yaml));
    /// assert_eq!(Format::from_hint(".toml"), Some(Format::Toml));
    /// assert_eq!(Format::from_hint("xml"), None);
    /// ```
    #[must_use]
    pub fn from_hint(hint: &str) -> Option<Self> {
        let trimmed = hint.trim().trim_start_matches('.');
        match trimmed.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "ini" => Some(Self::Ini),
            "env" => Some(Self::Env),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    ///
    /// A bare `.env` file name is treated as [`Format::Env`].
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        if path.file_name() == Some(".env") {
            return Some(Self::Env);
        }
        path.extension().and_then(Self::from_hint)
    }

    /// Canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Ini => "ini",
            Self::Env => "env",
        }
    }

    /// Whether the format can express nested, typed documents.
    ///
    /// Schemas must be written in a structured format.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json | Self::Yaml | Self::Toml)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
