//! Display commands and their validation at the request boundary.

use crate::{palette, Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// Keys understood by the display firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKey {
    /// Text to display.
    Text,
    /// Foreground color.
    Foreground,
    /// Background color.
    Background,
    /// Text size (1-5).
    Size,
}

impl CommandKey {
    /// All keys, in wire order.
    pub const ALL: [CommandKey; 4] = [
        CommandKey::Text,
        CommandKey::Foreground,
        CommandKey::Background,
        CommandKey::Size,
    ];

    /// Returns the key as it appears on the wire and in requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKey::Text => "txt",
            CommandKey::Foreground => "fg",
            CommandKey::Background => "bg",
            CommandKey::Size => "size",
        }
    }

    /// Returns true for keys holding a color.
    pub fn is_color(&self) -> bool {
        matches!(self, CommandKey::Foreground | CommandKey::Background)
    }
}

impl FromStr for CommandKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CommandKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| Error::UnknownKey(s.to_string()))
    }
}

impl std::fmt::Display for CommandKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar JSON value carried by a command field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    /// Returns the text if this is a string value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    fn from_json(key: CommandKey, value: Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(Scalar::Bool(b))),
            Value::Number(n) => Ok(Some(Scalar::Number(n))),
            Value::String(s) => Ok(Some(Scalar::Text(s))),
            Value::Array(_) | Value::Object(_) => Err(Error::InvalidValue(key.to_string())),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

/// A display update. Omitted fields keep their previous value on the device.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txt: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fg: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Scalar>,
}

impl DisplayCommand {
    /// Creates an empty command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a command from query-string pairs.
    ///
    /// Unrecognized keys are ignored and the first occurrence of a repeated
    /// key wins. Fails with [`Error::NoParameters`] if no recognized key is
    /// present.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut command = Self::new();
        for (key, value) in pairs {
            let Ok(key) = key.as_ref().parse::<CommandKey>() else {
                continue;
            };
            if command.get(key).is_none() {
                command.set(key, Some(Scalar::from(value.as_ref())));
            }
        }

        if command.is_empty() {
            return Err(Error::NoParameters);
        }
        Ok(command)
    }

    /// Builds a command from a JSON request body.
    ///
    /// The body must be a JSON object with at least one non-null recognized
    /// key. Unknown keys and non-scalar values are rejected.
    pub fn from_json_slice(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|_| Error::InvalidBody)?;
        let Value::Object(map) = value else {
            return Err(Error::InvalidBody);
        };

        let mut command = Self::new();
        for (key, value) in map {
            let key: CommandKey = key.parse()?;
            command.set(key, Scalar::from_json(key, value)?);
        }

        if command.is_empty() {
            return Err(Error::InvalidBody);
        }
        Ok(command)
    }

    /// Returns the value of a field.
    pub fn get(&self, key: CommandKey) -> Option<&Scalar> {
        match key {
            CommandKey::Text => self.txt.as_ref(),
            CommandKey::Foreground => self.fg.as_ref(),
            CommandKey::Background => self.bg.as_ref(),
            CommandKey::Size => self.size.as_ref(),
        }
    }

    /// Sets or clears a field.
    pub fn set(&mut self, key: CommandKey, value: Option<Scalar>) {
        let slot = match key {
            CommandKey::Text => &mut self.txt,
            CommandKey::Foreground => &mut self.fg,
            CommandKey::Background => &mut self.bg,
            CommandKey::Size => &mut self.size,
        };
        *slot = value;
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        CommandKey::ALL.iter().all(|k| self.get(*k).is_none())
    }

    /// Returns a copy with palette color names replaced by their RGB565 codes.
    ///
    /// Only non-empty text values of `fg` and `bg` are touched. Values that
    /// are not palette names pass through unchanged.
    pub fn normalized(&self) -> Self {
        let mut command = self.clone();
        for key in CommandKey::ALL.into_iter().filter(CommandKey::is_color) {
            let resolved = match command.get(key).and_then(Scalar::as_text) {
                Some(value) if !value.is_empty() => palette::resolve(value),
                _ => continue,
            };
            command.set(key, Some(Scalar::Text(resolved)));
        }
        command
    }
}
