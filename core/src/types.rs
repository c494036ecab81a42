use alloc::string::String;
use core::fmt;
use core::str::FromStr;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::GameError;

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional extent `(width, height)`.
pub type Coord2 = (Coord, Coord);

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Identity of a cell, derived from its `(x, y)` position.
///
/// Rendered and parsed as `"x,y"`, which is also the form used in encoded
/// action logs and serialized leaderboard items.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId {
    pub x: Coord,
    pub y: Coord,
}

impl CellId {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// Row-major position of this cell on a board `width` cells wide.
    pub const fn order(self, width: Coord) -> usize {
        self.y as usize * width as usize + self.x as usize
    }

    pub const fn is_within(self, (width, height): Coord2) -> bool {
        self.x < width && self.y < height
    }
}

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

/// Boards are stored as `height × width` arrays so that the standard layout
/// iterates in row-major order.
impl ToNdIndex for CellId {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.y.into(), self.x.into()]
    }
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.1.into(), self.0.into()]
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for CellId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s.split_once(',').ok_or(GameError::InvalidCell)?;
        let x = x.trim().parse().map_err(|_| GameError::InvalidCell)?;
        let y = y.trim().parse().map_err(|_| GameError::InvalidCell)?;
        Ok(Self { x, y })
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CellIdVisitor;

        impl Visitor<'_> for CellIdVisitor {
            type Value = CellId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a cell id of the form \"x,y\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CellId, E> {
                v.parse()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<CellId, E> {
                self.visit_str(&v)
            }
        }

        deserializer.deserialize_str(CellIdVisitor)
    }
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

/// Applies `delta` to `id`, returning a value only when it remains in bounds.
fn apply_delta(id: CellId, delta: (i8, i8), bounds: Coord2) -> Option<CellId> {
    let (dx, dy) = delta;
    let (max_x, max_y) = bounds;

    let next_x = id.x.checked_add_signed(dx)?;
    if next_x >= max_x {
        return None;
    }

    let next_y = id.y.checked_add_signed(dy)?;
    if next_y >= max_y {
        return None;
    }

    Some(CellId::new(next_x, next_y))
}

/// Iterates the up to 8 neighbours of a cell, clipped at every board edge.
#[derive(Debug)]
pub struct NeighborIter {
    center: CellId,
    bounds: Coord2,
    index: u8,
}

impl NeighborIter {
    pub fn new(center: CellId, bounds: Coord2) -> Self {
        Self {
            center,
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item = apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if next_item.is_some() {
                return next_item;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn corner_has_three_neighbors() {
        let neighbors: Vec<_> = NeighborIter::new(CellId::new(0, 0), (8, 8)).collect();
        assert_eq!(
            neighbors,
            [CellId::new(1, 0), CellId::new(1, 1), CellId::new(0, 1)]
        );
    }

    #[test]
    fn far_corner_is_clipped_too() {
        let neighbors: Vec<_> = NeighborIter::new(CellId::new(7, 7), (8, 8)).collect();
        assert_eq!(neighbors.len(), 3);
        assert!(neighbors.iter().all(|id| id.is_within((8, 8))));
    }

    #[test]
    fn cell_id_parses_display_form() {
        let id = CellId::new(12, 3);
        assert_eq!(alloc::format!("{id}"), "12,3");
        assert_eq!("12,3".parse::<CellId>(), Ok(id));
        assert_eq!("12;3".parse::<CellId>(), Err(GameError::InvalidCell));
        assert_eq!("300,1".parse::<CellId>(), Err(GameError::InvalidCell));
    }
}
