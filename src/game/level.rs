//! Level tables - the starting bubbles and shot budget of each level.
//!
//! A level is a table of palette indices, one row per board row, with `-1`
//! marking an empty slot. Level packs are stored as JSON:
//!
//! ```json
//! { "levels": [ { "name": "Level 1", "shots": 30, "rows": [[0, 0, 1, -1], [2, 2]] } ] }
//! ```

use bevy::log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use super::{
    bubble::BubbleColor,
    error::LoadError,
    hex::{HexCoord, HexLayout},
};

/// Table value for an empty slot.
pub const EMPTY_SLOT: i8 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Projectiles the player may fire.
    pub shots: u32,
    /// Palette indices per row, `-1` for empty.
    pub rows: Vec<Vec<i8>>,
}

impl Level {
    /// Iterate over the bubbles this level places, row-major.
    ///
    /// Entries that are not valid palette indices are skipped; run
    /// [`Level::validate`] to reject them instead.
    pub fn bubbles(&self) -> impl Iterator<Item = (HexCoord, BubbleColor)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, &index)| {
                let color = u8::try_from(index).ok().and_then(BubbleColor::from_index)?;
                Some((HexCoord::new(row as i32, col as i32), color))
            })
        })
    }

    /// Check that the table fits the board and only uses known colors.
    pub fn validate(&self, layout: &HexLayout) -> Result<(), LoadError> {
        if self.shots == 0 {
            return Err(LoadError::invalid_level(&self.name, "shot budget is zero"));
        }
        if self.rows.len() > layout.rows as usize {
            return Err(LoadError::invalid_level(
                &self.name,
                format!("{} rows but the board has {}", self.rows.len(), layout.rows),
            ));
        }
        for (row, cells) in self.rows.iter().enumerate() {
            let width = layout.columns_in_row(row as i32) as usize;
            if cells.len() > width {
                return Err(LoadError::invalid_level(
                    &self.name,
                    format!("row {} has {} slots but only {} fit", row, cells.len(), width),
                ));
            }
            if let Some(&bad) = cells.iter().find(|&&index| {
                index != EMPTY_SLOT && (index < 0 || index as usize >= BubbleColor::ALL.len())
            }) {
                return Err(LoadError::invalid_level(
                    &self.name,
                    format!("row {} uses unknown color index {}", row, bad),
                ));
            }
        }
        Ok(())
    }

    /// Fill the top `filled_rows` rows with random colors.
    pub fn random(
        name: impl Into<String>,
        filled_rows: i32,
        shots: u32,
        layout: &HexLayout,
        rng: &mut impl Rng,
    ) -> Self {
        let rows = (0..filled_rows.min(layout.rows))
            .map(|row| {
                (0..layout.columns_in_row(row))
                    .map(|_| BubbleColor::random(rng).index() as i8)
                    .collect::<Vec<i8>>()
            })
            .collect();
        Self {
            name: name.into(),
            shots,
            rows,
        }
    }

    /// The built-in first level: five rows in horizontal color bands.
    pub fn reference() -> Self {
        let band = |len: usize, a: i8, b: i8| -> Vec<i8> {
            (0..len).map(|i| if (i / 3) % 2 == 0 { a } else { b }).collect()
        };
        Self {
            name: "Reference".to_string(),
            shots: 40,
            rows: vec![
                band(12, 0, 1),
                band(11, 0, 1),
                band(12, 2, 3),
                band(11, 4, 5),
                band(12, 4, 5),
            ],
        }
    }
}

/// An ordered list of levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelPack {
    pub levels: Vec<Level>,
}

impl LevelPack {
    /// Parse and validate a pack.
    pub fn from_json_str(json: &str, path: &Path, layout: &HexLayout) -> Result<Self, LoadError> {
        let pack: LevelPack = serde_json::from_str(json).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        for level in &pack.levels {
            level.validate(layout)?;
        }
        Ok(pack)
    }

    /// Read, parse and validate a pack file.
    pub fn load(path: &Path, layout: &HexLayout) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pack = Self::from_json_str(&contents, path, layout)?;
        info!("Loaded {} levels from {:?}", pack.levels.len(), path);
        Ok(pack)
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
