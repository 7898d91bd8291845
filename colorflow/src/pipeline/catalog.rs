//! The stage catalog: the canonical, total order of pipeline stages.
//!
//! The index build is a linear chain, not a graph. Stages cannot be
//! reordered or executed out of sequence; a run may only truncate the
//! chain from the front by resuming at a later stage.

use crate::errors::UnknownStageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of the index-building pipeline.
///
/// Each variant is backed by a subcommand of the external tool. The
/// declared order of [`StageCatalog::default`] is the only valid
/// execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Invert the unitig-to-color mapping.
    Invert,
    /// Sort the color lists and deduplicate them.
    SortUnique,
    /// Permute unitigs to match the color ordering.
    PermuteUnitigs,
    /// Assemble the final index.
    Build,
}

impl Stage {
    /// The stage identifier used on the orchestrator command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::SortUnique => "sort_unique",
            Self::PermuteUnitigs => "permute_unitigs",
            Self::Build => "build",
        }
    }

    /// The subcommand spelling understood by the external tool.
    #[must_use]
    pub fn subcommand(self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::SortUnique => "sort-unique",
            Self::PermuteUnitigs => "permute-unitigs",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = UnknownStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invert" => Ok(Self::Invert),
            "sort_unique" => Ok(Self::SortUnique),
            "permute_unitigs" => Ok(Self::PermuteUnitigs),
            "build" => Ok(Self::Build),
            other => Err(UnknownStageError::new(other)),
        }
    }
}

/// The ordered sequence of stages a run may execute.
///
/// The default catalog is the full four-stage chain. A custom catalog is
/// only useful in tests or for future stages; order is always total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCatalog {
    order: Vec<Stage>,
}

impl StageCatalog {
    /// Creates a catalog with an explicit stage order.
    #[must_use]
    pub fn new(order: Vec<Stage>) -> Self {
        Self { order }
    }

    /// The stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.order
    }

    /// Number of stages in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the catalog holds no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Position of a stage in the execution order.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStageError`] if the stage is not in this catalog.
    pub fn index_of(&self, stage: Stage) -> Result<usize, UnknownStageError> {
        self.order
            .iter()
            .position(|&s| s == stage)
            .ok_or_else(|| UnknownStageError::new(stage.name()))
    }

    /// Position of a stage given by name.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStageError`] if the name does not parse or the
    /// stage is not in this catalog.
    pub fn position(&self, name: &str) -> Result<usize, UnknownStageError> {
        self.index_of(name.parse()?)
    }

    /// The ordered suffix of stages starting at `stage`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownStageError`] if the stage is not in this catalog.
    pub fn suffix_from(&self, stage: Stage) -> Result<&[Stage], UnknownStageError> {
        let start = self.index_of(stage)?;
        Ok(&self.order[start..])
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::new(vec![
            Stage::Invert,
            Stage::SortUnique,
            Stage::PermuteUnitigs,
            Stage::Build,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let catalog = StageCatalog::default();
        assert_eq!(
            catalog.stages(),
            &[
                Stage::Invert,
                Stage::SortUnique,
                Stage::PermuteUnitigs,
                Stage::Build
            ]
        );
        assert_eq!(catalog.len(), 4);
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_index_of_every_stage() {
        let catalog = StageCatalog::default();
        assert_eq!(catalog.index_of(Stage::Invert), Ok(0));
        assert_eq!(catalog.index_of(Stage::SortUnique), Ok(1));
        assert_eq!(catalog.index_of(Stage::PermuteUnitigs), Ok(2));
        assert_eq!(catalog.index_of(Stage::Build), Ok(3));
    }

    #[test]
    fn test_position_rejects_unknown_name() {
        let catalog = StageCatalog::default();
        let err = catalog.position("sort-unique").unwrap_err();
        assert_eq!(err.name, "sort-unique");
    }

    #[test]
    fn test_index_of_rejects_stage_outside_catalog() {
        let catalog = StageCatalog::new(vec![Stage::Invert, Stage::Build]);
        assert!(catalog.index_of(Stage::SortUnique).is_err());
    }

    #[test]
    fn test_suffix_from() {
        let catalog = StageCatalog::default();
        let suffix = catalog.suffix_from(Stage::PermuteUnitigs).unwrap();
        assert_eq!(suffix, &[Stage::PermuteUnitigs, Stage::Build]);
    }

    #[test]
    fn test_stage_round_trips_through_name() {
        for stage in StageCatalog::default().stages() {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), *stage);
        }
    }

    #[test]
    fn test_subcommand_spelling_is_hyphenated() {
        assert_eq!(Stage::SortUnique.subcommand(), "sort-unique");
        assert_eq!(Stage::PermuteUnitigs.subcommand(), "permute-unitigs");
        assert_eq!(Stage::Invert.subcommand(), "invert");
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Stage::PermuteUnitigs).unwrap();
        assert_eq!(json, "\"permute_unitigs\"");
    }
}
