use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::debug;

/// Horizontal alignment of a printed line
///
/// Decoding is lenient: tokens match case-insensitively and anything
/// unrecognised prints left-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub const ALL: [Alignment; 3] = [Alignment::Left, Alignment::Center, Alignment::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "Left",
            Alignment::Center => "Center",
            Alignment::Right => "Right",
        }
    }

    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        Alignment::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(token))
            .unwrap_or_else(|| {
                debug!("Unknown alignment '{}', using Left", token);
                Alignment::Left
            })
    }

    /// Argument of the ESC a (select justification) command
    pub fn escpos_code(&self) -> u8 {
        match self {
            Alignment::Left => 0x00,
            Alignment::Center => 0x01,
            Alignment::Right => 0x02,
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Alignment::from_token(&token))
    }
}
