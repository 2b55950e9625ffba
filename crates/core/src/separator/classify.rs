use crate::plate::Finish;
use serde::{Deserialize, Serialize};

/// Maps spot ink names to finish channels by case-insensitive substring
/// match. Process inks (Cyan, Magenta, Yellow, Black) are handled
/// separately and never reach this table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenTable {
    pub foil: Vec<String>,
    pub uv: Vec<String>,
    pub emboss: Vec<String>,
    pub die: Vec<String>,
}

impl Default for TokenTable {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            foil: list(&["foil", "metal", "metallic"]),
            uv: list(&["uv", "spot_uv", "varnish", "gloss"]),
            emboss: list(&["emboss", "deboss", "height"]),
            die: list(&["die", "diecut", "die_cut"]),
        }
    }
}

impl TokenTable {
    /// Classifies a spot ink name. Die tokens win over the rest so that
    /// names like "die_uv" cannot be swallowed by the UV channel.
    pub fn classify(&self, ink_name: &str) -> Option<Finish> {
        let lowered = ink_name.to_lowercase();
        let hit = |tokens: &[String]| tokens.iter().any(|t| lowered.contains(t.as_str()));
        if hit(&self.die) {
            Some(Finish::DiecutMask)
        } else if hit(&self.foil) {
            Some(Finish::Foil)
        } else if hit(&self.emboss) {
            Some(Finish::Emboss)
        } else if hit(&self.uv) {
            Some(Finish::Uv)
        } else {
            None
        }
    }
}
