//! Catalog of selectable game options.
//!
//! Class levels, operations, game modes, and round counts are fixed
//! enumerations. Per-mode facts (title, description, whether it can be
//! played, whether it needs multiple-choice options) live in the
//! [`GAME_MODES`] table rather than in conditionals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Round counts offered on the configuration screen.
pub const ROUND_CHOICES: [u32; 3] = [5, 10, 15];

/// Lower-cases and unifies separators so `Balloon-Pop`, `balloon pop` and
/// `balloon_pop` all parse the same.
fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase().replace(['-', ' '], "_")
}

/// Implements case-insensitive serde on top of `FromStr` and `as_key`.
macro_rules! serde_via_str {
    ($ty:ty, $expected:literal) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(|_| {
                    serde::de::Error::custom(format!(
                        concat!("invalid value '{}': expected one of ", $expected),
                        s
                    ))
                })
            }
        }

        impl Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_key())
            }
        }
    };
}

// ============================================================================
// ClassLevel
// ============================================================================

/// Primary school class level, P1 (simplest) through P6 (most advanced).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClassLevel {
    /// Primary 1.
    #[default]
    P1,
    /// Primary 2.
    P2,
    /// Primary 3.
    P3,
    /// Primary 4.
    P4,
    /// Primary 5.
    P5,
    /// Primary 6.
    P6,
}

impl ClassLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 6] = [Self::P1, Self::P2, Self::P3, Self::P4, Self::P5, Self::P6];

    /// Numeric level, 1 through 6.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
            Self::P4 => 4,
            Self::P5 => 5,
            Self::P6 => 6,
        }
    }

    /// Display title, e.g. "Primary 3".
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::P1 => "Primary 1",
            Self::P2 => "Primary 2",
            Self::P3 => "Primary 3",
            Self::P4 => "Primary 4",
            Self::P5 => "Primary 5",
            Self::P6 => "Primary 6",
        }
    }

    /// Stable lower-case key.
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::P1 => "p1",
            Self::P2 => "p2",
            Self::P3 => "p3",
            Self::P4 => "p4",
            Self::P5 => "p5",
            Self::P6 => "p6",
        }
    }
}

impl fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for ClassLevel {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize_key(s);
        let rest = key
            .strip_prefix("primary")
            .or_else(|| key.strip_prefix('p'))
            .unwrap_or(key.as_str());
        let digits = rest.strip_prefix('_').unwrap_or(rest);
        Self::ALL
            .into_iter()
            .find(|level| digits == level.number().to_string())
            .ok_or_else(|| {
                GameError::config_validation(
                    format!("unknown class level '{s}'"),
                    "Use one of p1, p2, p3, p4, p5, p6",
                )
            })
    }
}

serde_via_str!(ClassLevel, "p1..p6");

// ============================================================================
// Operation
// ============================================================================

/// Arithmetic operation the problems practise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Addition (+).
    #[default]
    Addition,
    /// Subtraction (-).
    Subtraction,
    /// Multiplication (×).
    Multiplication,
    /// Division (÷).
    Division,
    /// A mix of all four.
    Mixed,
}

impl Operation {
    /// All operations in menu order.
    pub const ALL: [Self; 5] = [
        Self::Addition,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
        Self::Mixed,
    ];

    /// Display title, e.g. "Division (÷)".
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Addition => "Addition (+)",
            Self::Subtraction => "Subtraction (-)",
            Self::Multiplication => "Multiplication (×)",
            Self::Division => "Division (÷)",
            Self::Mixed => "Mixed",
        }
    }

    /// Wording used inside generation prompts.
    #[must_use]
    pub const fn prompt_name(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Mixed => "mixed operations (addition, subtraction, multiplication and division)",
        }
    }

    /// Stable lower-case key.
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Mixed => "mixed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for Operation {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_key(s).as_str() {
            "addition" | "add" | "+" => Ok(Self::Addition),
            // A bare "-" normalizes to "_".
            "subtraction" | "subtract" | "sub" | "_" => Ok(Self::Subtraction),
            "multiplication" | "multiply" | "mul" | "x" | "*" | "×" => Ok(Self::Multiplication),
            "division" | "divide" | "div" | "/" | "÷" => Ok(Self::Division),
            "mixed" | "mix" => Ok(Self::Mixed),
            _ => Err(GameError::config_validation(
                format!("unknown operation '{s}'"),
                "Use one of addition, subtraction, multiplication, division, mixed",
            )),
        }
    }
}

serde_via_str!(
    Operation,
    "'addition', 'subtraction', 'multiplication', 'division', 'mixed'"
);

// ============================================================================
// GameMode
// ============================================================================

/// Mini-game that presents the problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Free-entry answers.
    #[default]
    TreasureHunt,
    /// Multiple-choice balloons.
    BalloonPop,
    /// Placeholder, not yet playable.
    MathRace,
    /// Placeholder, not yet playable.
    MathNinja,
}

/// Static facts about one game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeInfo {
    /// The mode this row describes.
    pub mode: GameMode,
    /// Display title.
    pub title: &'static str,
    /// One-line description for the selection screen.
    pub description: &'static str,
    /// Whether the mode can be selected.
    pub enabled: bool,
    /// Whether each problem needs four multiple-choice options.
    pub needs_options: bool,
}

/// One row per [`GameMode`], in declaration order.
pub static GAME_MODES: [ModeInfo; 4] = [
    ModeInfo {
        mode: GameMode::TreasureHunt,
        title: "Treasure Hunt",
        description: "Solve problems to find the treasure.",
        enabled: true,
        needs_options: false,
    },
    ModeInfo {
        mode: GameMode::BalloonPop,
        title: "Balloon Pop",
        description: "Pop the balloon with the correct answer.",
        enabled: true,
        needs_options: true,
    },
    ModeInfo {
        mode: GameMode::MathRace,
        title: "Math Race",
        description: "Answer quickly to win the race. (Coming Soon!)",
        enabled: false,
        needs_options: false,
    },
    ModeInfo {
        mode: GameMode::MathNinja,
        title: "Math Ninja",
        description: "Slice the correct number answers. (Coming Soon!)",
        enabled: false,
        needs_options: false,
    },
];

impl GameMode {
    /// All modes in menu order.
    pub const ALL: [Self; 4] = [
        Self::TreasureHunt,
        Self::BalloonPop,
        Self::MathRace,
        Self::MathNinja,
    ];

    /// Returns this mode's row in [`GAME_MODES`].
    #[must_use]
    pub fn info(self) -> &'static ModeInfo {
        &GAME_MODES[self as usize]
    }

    /// Whether the mode can be played.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self.info().enabled
    }

    /// Whether problems for this mode carry multiple-choice options.
    #[must_use]
    pub fn needs_options(self) -> bool {
        self.info().needs_options
    }

    /// Stable snake_case key.
    #[must_use]
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::TreasureHunt => "treasure_hunt",
            Self::BalloonPop => "balloon_pop",
            Self::MathRace => "math_race",
            Self::MathNinja => "math_ninja",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.info().title)
    }
}

impl FromStr for GameMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize_key(s);
        Self::ALL
            .into_iter()
            .find(|mode| key == mode.as_key() || key == mode.as_key().replace('_', ""))
            .ok_or_else(|| {
                GameError::config_validation(
                    format!("unknown game mode '{s}'"),
                    "Use one of treasure_hunt, balloon_pop",
                )
            })
    }
}

serde_via_str!(
    GameMode,
    "'treasure_hunt', 'balloon_pop', 'math_race', 'math_ninja'"
);

// ============================================================================
// GameConfig
// ============================================================================

/// Everything chosen on the configuration screen.
///
/// Immutable once a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Class level the problems target.
    pub level: ClassLevel,
    /// Operation the problems practise.
    pub operation: Operation,
    /// Mini-game presenting the problems.
    pub game_mode: GameMode,
    /// Number of rounds (problems) in the session.
    pub rounds: u32,
    /// Reserved; never read.
    #[serde(default)]
    pub time_challenge: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(
            ClassLevel::default(),
            Operation::default(),
            GameMode::default(),
            ROUND_CHOICES[0],
        )
    }
}

impl GameConfig {
    /// Creates a configuration with `time_challenge` off.
    #[must_use]
    pub const fn new(level: ClassLevel, operation: Operation, game_mode: GameMode, rounds: u32) -> Self {
        Self {
            level,
            operation,
            game_mode,
            rounds,
            time_challenge: false,
        }
    }

    /// Validates that a session can be generated for this configuration.
    ///
    /// # Errors
    ///
    /// Returns `GameError::ConfigValidationError` when `rounds` is zero and
    /// `GameError::ModeUnavailable` for placeholder modes.
    pub fn validate(&self) -> Result<()> {
        if self.rounds == 0 {
            return Err(GameError::config_validation(
                "rounds must be greater than 0",
                "Pick 5, 10 or 15 rounds",
            ));
        }
        if !self.game_mode.is_enabled() {
            return Err(GameError::ModeUnavailable {
                mode: self.game_mode,
            });
        }
        Ok(())
    }

    /// Whether the generator must request multiple-choice options.
    #[must_use]
    pub fn needs_options(&self) -> bool {
        self.game_mode.needs_options()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_table_matches_declaration_order() {
        for mode in GameMode::ALL {
            assert_eq!(mode.info().mode, mode);
        }
    }

    #[test]
    fn test_only_two_modes_enabled() {
        let enabled: Vec<_> = GAME_MODES.iter().filter(|m| m.enabled).map(|m| m.mode).collect();
        assert_eq!(enabled, vec![GameMode::TreasureHunt, GameMode::BalloonPop]);
        assert!(GameMode::BalloonPop.needs_options());
        assert!(!GameMode::TreasureHunt.needs_options());
    }

    #[test]
    fn test_class_level_parsing() {
        assert_eq!("p3".parse::<ClassLevel>().unwrap(), ClassLevel::P3);
        assert_eq!("P6".parse::<ClassLevel>().unwrap(), ClassLevel::P6);
        assert_eq!("2".parse::<ClassLevel>().unwrap(), ClassLevel::P2);
        assert_eq!("Primary 4".parse::<ClassLevel>().unwrap(), ClassLevel::P4);
        assert!("p7".parse::<ClassLevel>().is_err());
        assert!("".parse::<ClassLevel>().is_err());
    }

    #[test]
    fn test_class_level_prefix_is_taken_once() {
        assert_eq!("primary_5".parse::<ClassLevel>().unwrap(), ClassLevel::P5);
        assert!("ppp3".parse::<ClassLevel>().is_err());
        assert!("primaryp3".parse::<ClassLevel>().is_err());
        assert!("primary__3".parse::<ClassLevel>().is_err());
    }

    #[test]
    fn test_operation_parsing() {
        assert_eq!("Addition".parse::<Operation>().unwrap(), Operation::Addition);
        assert_eq!("x".parse::<Operation>().unwrap(), Operation::Multiplication);
        assert_eq!("÷".parse::<Operation>().unwrap(), Operation::Division);
        assert_eq!("MIXED".parse::<Operation>().unwrap(), Operation::Mixed);
        assert!("modulo".parse::<Operation>().is_err());
    }

    #[test]
    fn test_game_mode_parsing() {
        assert_eq!("balloon-pop".parse::<GameMode>().unwrap(), GameMode::BalloonPop);
        assert_eq!("Treasure Hunt".parse::<GameMode>().unwrap(), GameMode::TreasureHunt);
        assert_eq!("treasurehunt".parse::<GameMode>().unwrap(), GameMode::TreasureHunt);
        assert_eq!("math_ninja".parse::<GameMode>().unwrap(), GameMode::MathNinja);
        assert!("tag".parse::<GameMode>().is_err());
    }

    #[test]
    fn test_serialization_uses_keys() {
        assert_eq!(serde_json::to_string(&ClassLevel::P2).unwrap(), "\"p2\"");
        assert_eq!(
            serde_json::to_string(&GameMode::BalloonPop).unwrap(),
            "\"balloon_pop\""
        );
        let mode: GameMode = serde_json::from_str("\"Balloon_Pop\"").unwrap();
        assert_eq!(mode, GameMode::BalloonPop);
    }

    #[test]
    fn test_invalid_enum_deserialization_names_choices() {
        let err = serde_json::from_str::<Operation>("\"modulo\"").unwrap_err();
        assert!(err.to_string().contains("modulo"));
        assert!(err.to_string().contains("'mixed'"));
    }

    #[test]
    fn test_game_config_serialization() {
        let config = GameConfig::new(ClassLevel::P2, Operation::Addition, GameMode::TreasureHunt, 5);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""level":"p2""#));
        assert!(json.contains(r#""gameMode":"treasure_hunt""#));
        assert!(json.contains(r#""timeChallenge":false"#));

        let parsed: GameConfig =
            serde_json::from_str(r#"{"level":"P5","operation":"division","gameMode":"balloon_pop","rounds":10}"#)
                .unwrap();
        assert_eq!(parsed.level, ClassLevel::P5);
        assert!(!parsed.time_challenge);
        assert!(parsed.needs_options());
    }

    #[test]
    fn test_game_config_validate() {
        assert!(GameConfig::default().validate().is_ok());

        let zero = GameConfig {
            rounds: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            zero.validate(),
            Err(GameError::ConfigValidationError { .. })
        ));

        let race = GameConfig {
            game_mode: GameMode::MathRace,
            ..GameConfig::default()
        };
        assert!(matches!(
            race.validate(),
            Err(GameError::ModeUnavailable {
                mode: GameMode::MathRace
            })
        ));
    }
}
