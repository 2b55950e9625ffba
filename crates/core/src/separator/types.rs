use crate::plate::Finish;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Two or more spot inks landed in the same finish channel and were
/// merged, last one in lexicographic filename order winning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRecord {
    pub finish: Finish,
    pub inks: Vec<String>,
}

/// Result of separating one side's PDF.
#[derive(Debug, Clone, Default)]
pub struct SeparationSet {
    /// Every ink name Ghostscript emitted a plate for, process inks
    /// included, in lexicographic order.
    pub plates_detected: Vec<String>,

    /// Final plate files written to the results directory, one per
    /// finish channel.
    pub converted: BTreeMap<Finish, PathBuf>,

    /// Channels that received more than one spot ink.
    pub merges: Vec<MergeRecord>,

    /// Spot inks dropped because their plates carried no ink.
    pub empty: Vec<String>,

    /// Spot inks no token matched.
    pub unclassified: Vec<String>,
}

impl SeparationSet {
    pub fn output_path(&self, finish: Finish) -> Option<&PathBuf> {
        self.converted.get(&finish)
    }
}
