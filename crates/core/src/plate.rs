//! Plate vocabulary and output naming.
//!
//! Everything downstream agrees on these names. A job produces, per
//! card side and layer, a set of finish plates whose filenames are
//! derived here and nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown side: {0}")]
pub struct UnknownSide(pub String);

/// Card side. Designs are double sided; a missing side falls back to a
/// default declaration rather than failing the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = UnknownSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" => Ok(Side::Front),
            "back" => Ok(Side::Back),
            other => Err(UnknownSide(other.to_string())),
        }
    }
}

/// Finish channel a plate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    Albedo,
    Uv,
    Foil,
    Emboss,
    DiecutMask,
    DiecutSvg,
}

impl Finish {
    pub fn as_str(&self) -> &'static str {
        match self {
            Finish::Albedo => "albedo",
            Finish::Uv => "uv",
            Finish::Foil => "foil",
            Finish::Emboss => "emboss",
            Finish::DiecutMask => "diecut_mask",
            Finish::DiecutSvg => "diecut_svg",
        }
    }

    /// File extension for this channel. Everything rasterises to PNG
    /// except the vector die line.
    pub fn extension(&self) -> &'static str {
        match self {
            Finish::DiecutSvg => "svg",
            _ => "png",
        }
    }

    /// Parses a declared finish token. Die aliases collapse onto the
    /// raster die mask.
    pub fn parse_token(token: &str) -> Option<Finish> {
        match token.to_lowercase().as_str() {
            "albedo" => Some(Finish::Albedo),
            "uv" | "spot_uv" => Some(Finish::Uv),
            "foil" => Some(Finish::Foil),
            "emboss" => Some(Finish::Emboss),
            "die" | "diecut" | "die_cut" | "diecut_mask" => Some(Finish::DiecutMask),
            "diecut_svg" => Some(Finish::DiecutSvg),
            _ => None,
        }
    }

    pub fn all() -> &'static [Finish] {
        &[
            Finish::Albedo,
            Finish::Uv,
            Finish::Foil,
            Finish::Emboss,
            Finish::DiecutMask,
            Finish::DiecutSvg,
        ]
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filename stem for a plate, without extension.
pub fn output_stem(side: Side, layer_index: u32, finish: Finish) -> String {
    format!("{}_layer_{}_{}", side, layer_index, finish)
}

/// Full plate filename, e.g. `front_layer_0_diecut_mask.png`.
pub fn output_filename(side: Side, layer_index: u32, finish: Finish) -> String {
    format!(
        "{}.{}",
        output_stem(side, layer_index, finish),
        finish.extension()
    )
}

/// One side's declaration, as read from the compositor scratch file or
/// synthesised when the scratch is silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideSpec {
    pub side: Side,
    pub index: u32,
    #[serde(default)]
    pub finishes: Vec<String>,
    #[serde(default)]
    pub die: bool,
}

impl SideSpec {
    /// Finish channels this side declares, in stable order. The die
    /// flag implies both the raster mask and the vector line.
    pub fn declared_finishes(&self) -> Vec<Finish> {
        let mut out: Vec<Finish> = Vec::new();
        for token in &self.finishes {
            if let Some(finish) = Finish::parse_token(token) {
                if !out.contains(&finish) {
                    out.push(finish);
                }
            }
        }
        if self.die {
            for finish in [Finish::DiecutMask, Finish::DiecutSvg] {
                if !out.contains(&finish) {
                    out.push(finish);
                }
            }
        }
        out
    }
}

/// Fallback declaration when the compositor did not report sides: one
/// front and one back at layer 0, no declared finishes.
pub fn default_sides() -> Vec<SideSpec> {
    vec![
        SideSpec {
            side: Side::Front,
            index: 0,
            finishes: Vec::new(),
            die: false,
        },
        SideSpec {
            side: Side::Back,
            index: 0,
            finishes: Vec::new(),
            die: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_output_filename_format() {
        assert_eq!(
            output_filename(Side::Front, 0, Finish::Albedo),
            "front_layer_0_albedo.png"
        );
        assert_eq!(
            output_filename(Side::Back, 2, Finish::DiecutMask),
            "back_layer_2_diecut_mask.png"
        );
    }

    #[test]
    fn test_diecut_svg_uses_svg_extension() {
        assert_eq!(
            output_filename(Side::Front, 0, Finish::DiecutSvg),
            "front_layer_0_diecut_svg.svg"
        );
    }

    #[test]
    fn test_no_filename_collisions() {
        let mut seen = HashSet::new();
        for side in [Side::Front, Side::Back] {
            for index in 0..3 {
                for finish in Finish::all() {
                    assert!(seen.insert(output_filename(side, index, *finish)));
                }
            }
        }
    }

    #[test]
    fn test_die_token_aliases_normalize() {
        for token in ["die", "DieCut", "die_cut", "diecut_mask"] {
            assert_eq!(Finish::parse_token(token), Some(Finish::DiecutMask));
        }
        assert_eq!(Finish::parse_token("diecut_svg"), Some(Finish::DiecutSvg));
        assert_eq!(Finish::parse_token("glitter"), None);
    }

    #[test]
    fn test_side_round_trip() {
        assert_eq!("front".parse::<Side>().unwrap(), Side::Front);
        assert_eq!("BACK".parse::<Side>().unwrap(), Side::Back);
        assert!("middle".parse::<Side>().is_err());
    }

    #[test]
    fn test_declared_finishes_with_die_flag() {
        let spec = SideSpec {
            side: Side::Front,
            index: 0,
            finishes: vec!["uv".into(), "foil".into(), "uv".into()],
            die: true,
        };
        assert_eq!(
            spec.declared_finishes(),
            vec![
                Finish::Uv,
                Finish::Foil,
                Finish::DiecutMask,
                Finish::DiecutSvg
            ]
        );
    }

    #[test]
    fn test_default_sides_cover_both_faces() {
        let sides = default_sides();
        assert_eq!(sides.len(), 2);
        assert_eq!(sides[0].side, Side::Front);
        assert_eq!(sides[1].side, Side::Back);
    }
}
