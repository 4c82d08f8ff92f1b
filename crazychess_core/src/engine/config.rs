use crate::engine::search::INFINITY;
use crate::logic::board::PieceType;
use crate::logic::eval_constants::{
    VAL_BISHOP, VAL_KING, VAL_KNIGHT, VAL_PAWN, VAL_QUEEN, VAL_ROOK,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SEARCH_DEPTH: u8 = 3;
pub const MAX_SEARCH_DEPTH: u8 = 6;
/// Largest magnitude a piece value may take. 32 pieces of this value plus
/// their square bonuses stay well below the search sentinel.
pub const MAX_PIECE_VALUE: i32 = INFINITY / 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid engine config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("search depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: u8, max: u8 },
    #[error("{name} is {value}, outside -{max}..={max}")]
    PieceValueOutOfRange { name: &'static str, value: i32, max: i32 },
    #[error("{name} scale factor is not a finite number")]
    NonFiniteScale { name: &'static str },
}

/// Where a captured piece may be placed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropRegion {
    /// Any empty square.
    #[default]
    Anywhere,
    /// Only the 16 central squares c3..f6.
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_pawn: i32,
    pub val_knight: i32,
    pub val_bishop: i32,
    pub val_rook: i32,
    pub val_queen: i32,
    pub val_king: i32,

    // Search Parameters
    pub search_depth: u8, // Plies searched below each root candidate
    pub drop_region: DropRegion,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_pawn: VAL_PAWN,
            val_knight: VAL_KNIGHT,
            val_bishop: VAL_BISHOP,
            val_rook: VAL_ROOK,
            val_queen: VAL_QUEEN,
            val_king: VAL_KING,

            search_depth: DEFAULT_SEARCH_DEPTH,
            drop_region: DropRegion::Anywhere,
        }
    }
}

#[derive(Deserialize)]
struct EngineConfigJson {
    val_pawn: Option<f32>,
    val_knight: Option<f32>,
    val_bishop: Option<f32>,
    val_rook: Option<f32>,
    val_queen: Option<f32>,
    val_king: Option<f32>,

    search_depth: Option<u8>,
    drop_region: Option<DropRegion>,
}

impl EngineConfig {
    /// Loads a tuning file. Piece values are scale factors applied to the
    /// defaults; depth and drop region are absolute.
    ///
    /// # Errors
    /// Malformed JSON, a non-finite scale factor, or a result `validate` rejects.
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        let config = Self {
            val_pawn: apply_scale("val_pawn", default.val_pawn, json_config.val_pawn)?,
            val_knight: apply_scale("val_knight", default.val_knight, json_config.val_knight)?,
            val_bishop: apply_scale("val_bishop", default.val_bishop, json_config.val_bishop)?,
            val_rook: apply_scale("val_rook", default.val_rook, json_config.val_rook)?,
            val_queen: apply_scale("val_queen", default.val_queen, json_config.val_queen)?,
            val_king: apply_scale("val_king", default.val_king, json_config.val_king)?,

            search_depth: json_config.search_depth.unwrap_or(default.search_depth),
            drop_region: json_config.drop_region.unwrap_or(default.drop_region),
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Depth above [`MAX_SEARCH_DEPTH`] or a piece value beyond [`MAX_PIECE_VALUE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_depth > MAX_SEARCH_DEPTH {
            return Err(ConfigError::DepthTooLarge {
                depth: self.search_depth,
                max: MAX_SEARCH_DEPTH,
            });
        }
        let values = [
            ("val_pawn", self.val_pawn),
            ("val_knight", self.val_knight),
            ("val_bishop", self.val_bishop),
            ("val_rook", self.val_rook),
            ("val_queen", self.val_queen),
            ("val_king", self.val_king),
        ];
        for (name, value) in values {
            if value.unsigned_abs() > MAX_PIECE_VALUE.unsigned_abs() {
                return Err(ConfigError::PieceValueOutOfRange {
                    name,
                    value,
                    max: MAX_PIECE_VALUE,
                });
            }
        }
        Ok(())
    }

    pub const fn piece_value(&self, pt: PieceType) -> i32 {
        match pt {
            PieceType::Pawn => self.val_pawn,
            PieceType::Knight => self.val_knight,
            PieceType::Bishop => self.val_bishop,
            PieceType::Rook => self.val_rook,
            PieceType::Queen => self.val_queen,
            PieceType::King => self.val_king,
        }
    }
}

/// Casts saturate, so an oversized product is caught by `validate`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(
    name: &'static str,
    default_val: i32,
    scale: Option<f32>,
) -> Result<i32, ConfigError> {
    scale.map_or(Ok(default_val), |s| {
        if s.is_finite() {
            Ok((default_val as f32 * s) as i32)
        } else {
            Err(ConfigError::NonFiniteScale { name })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let json = "{}";
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.search_depth, 3);
        assert_eq!(config.drop_region, DropRegion::Anywhere);
    }

    #[test]
    fn test_load_config_scaled() {
        let json = r#"{
            "val_pawn": 1.5,
            "val_queen": 0.5
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.val_pawn, 150);
        assert_eq!(config.val_queen, 450);
        // Others should be default
        assert_eq!(config.val_rook, VAL_ROOK);
    }

    #[test]
    fn test_load_config_search_settings() {
        let json = r#"{
            "search_depth": 2,
            "drop_region": "center"
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.search_depth, 2);
        assert_eq!(config.drop_region, DropRegion::Center);
    }

    #[test]
    fn test_load_config_invalid_json() {
        let json = "{ invalid json }";
        let result = EngineConfig::load_from_json(json);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_config_rejects_deep_search() {
        let json = r#"{ "search_depth": 40 }"#;
        let result = EngineConfig::load_from_json(json);
        assert!(matches!(
            result,
            Err(ConfigError::DepthTooLarge { depth: 40, max: MAX_SEARCH_DEPTH })
        ));
    }

    #[test]
    fn test_load_config_edge_cases() {
        let json = r#"{
            "val_pawn": 0.0,
            "val_rook": -1.0
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();

        assert_eq!(config.val_pawn, 0);
        assert_eq!(config.val_rook, -VAL_ROOK);
    }

    #[test]
    fn test_load_config_rejects_huge_piece_value() {
        let json = r#"{ "val_queen": 3000000.0 }"#;
        let result = EngineConfig::load_from_json(json);
        assert!(matches!(
            result,
            Err(ConfigError::PieceValueOutOfRange { name: "val_queen", max: MAX_PIECE_VALUE, .. })
        ));
    }

    #[test]
    fn test_load_config_rejects_overflowing_scale() {
        // 1e39 does not fit an f32 and arrives as infinity.
        let json = r#"{ "val_pawn": 1e39 }"#;
        let result = EngineConfig::load_from_json(json);
        assert!(matches!(
            result,
            Err(ConfigError::NonFiniteScale { name: "val_pawn" })
        ));
    }

    #[test]
    fn test_apply_scale_rejects_non_finite() {
        assert!(matches!(
            apply_scale("val_rook", VAL_ROOK, Some(f32::NAN)),
            Err(ConfigError::NonFiniteScale { name: "val_rook" })
        ));
        assert!(matches!(
            apply_scale("val_rook", VAL_ROOK, Some(f32::NEG_INFINITY)),
            Err(ConfigError::NonFiniteScale { .. })
        ));
        assert_eq!(apply_scale("val_rook", VAL_ROOK, None).unwrap(), VAL_ROOK);
    }

    #[test]
    fn test_validate_piece_value_bounds() {
        let extreme = EngineConfig {
            val_king: i32::MIN,
            ..EngineConfig::default()
        };
        assert!(matches!(
            extreme.validate(),
            Err(ConfigError::PieceValueOutOfRange {
                name: "val_king",
                value: i32::MIN,
                ..
            })
        ));

        let at_limit = EngineConfig {
            val_pawn: MAX_PIECE_VALUE,
            val_queen: -MAX_PIECE_VALUE,
            val_king: MAX_PIECE_VALUE,
            ..EngineConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_deserialize_absolute_config() {
        let json = r#"{
            "val_pawn": 123,
            "val_king": 9999
        }"#;

        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.val_pawn, 123);
        assert_eq!(config.val_king, 9999);
        assert_eq!(config.val_rook, VAL_ROOK);
        assert_eq!(config.search_depth, DEFAULT_SEARCH_DEPTH);
    }

    #[test]
    fn test_piece_value_lookup() {
        let config = EngineConfig::default();
        assert_eq!(config.piece_value(PieceType::Knight), VAL_KNIGHT);
        assert_eq!(config.piece_value(PieceType::King), VAL_KING);
    }
}
