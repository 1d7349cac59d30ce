//! Level tile map: a fixed-size grid of `i32` tile ids.
//!
//! Container layout (big-endian):
//! `[width: i32][height: i32][width * height tile ids: i32]`.
//! Ids are stored column by column: the outer loop runs over x, the inner
//! one over y. `[2, 2, 1, 2, 3, 4]` therefore gives columns `[1, 2]` and
//! `[3, 4]`, and `get(0, 1) == 2`.

use std::{
    fs::File,
    io::{self, BufReader, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use corelib::{ResourceError, ResourceResult};

/// Upper bound on the up-front allocation; larger maps grow as tiles arrive
/// so a lying header cannot reserve gigabytes.
const MAX_PREALLOC_TILES: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    cells: Vec<i32>,
}

impl TileMap {
    /// Build a map from ids in storage order (x-major).
    pub fn new(width: usize, height: usize, cells: Vec<i32>) -> ResourceResult<Self> {
        let expected = width
            .checked_mul(height)
            .ok_or_else(|| ResourceError::corrupt("tile map", "dimensions overflow"))?;
        if cells.len() != expected {
            return Err(ResourceError::corrupt(
                "tile map",
                format!(
                    "{}x{} map needs {} tiles, got {}",
                    width,
                    height,
                    expected,
                    cells.len()
                ),
            ));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a map from nested columns, `columns[x][y]`.
    pub fn from_columns(columns: &[Vec<i32>]) -> ResourceResult<Self> {
        let height = columns.first().map_or(0, Vec::len);
        if columns.iter().any(|c| c.len() != height) {
            return Err(ResourceError::corrupt("tile map", "ragged columns"));
        }
        Self::new(columns.len(), height, columns.concat())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<i32> {
        if x < self.width && y < self.height {
            Some(self.cells[x * self.height + y])
        } else {
            None
        }
    }

    /// Ids in storage order.
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// One slice per x, each `height` long.
    pub fn columns(&self) -> impl Iterator<Item = &[i32]> {
        let h = self.height;
        (0..self.width).map(move |x| &self.cells[x * h..(x + 1) * h])
    }

    pub fn to_nested(&self) -> Vec<Vec<i32>> {
        self.columns().map(<[i32]>::to_vec).collect()
    }

    /// Serialize in the container layout; inverse of [`parse_tile_map`].
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let width = i32::try_from(self.width)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "width exceeds i32"))?;
        let height = i32::try_from(self.height)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "height exceeds i32"))?;
        writer.write_i32::<BigEndian>(width)?;
        writer.write_i32::<BigEndian>(height)?;
        for &id in &self.cells {
            writer.write_i32::<BigEndian>(id)?;
        }
        writer.flush()
    }
}

/// Load a tile map from a file path.
pub fn load_tile_map_from_path(path: impl AsRef<Path>) -> Result<TileMap> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open tile map: {}", path.display()))?;
    parse_tile_map(BufReader::new(file))
        .with_context(|| format!("Failed to parse tile map: {}", path.display()))
}

/// Parse the container from any reader. Nothing is returned unless every
/// tile was read.
pub fn parse_tile_map<R: Read>(mut reader: R) -> ResourceResult<TileMap> {
    let width = read_dimension(&mut reader, "width")?;
    let height = read_dimension(&mut reader, "height")?;
    let count = width
        .checked_mul(height)
        .ok_or_else(|| ResourceError::corrupt("tile map", "dimensions overflow"))?;

    let mut cells = Vec::with_capacity(count.min(MAX_PREALLOC_TILES));
    for i in 0..count {
        let id = reader.read_i32::<BigEndian>().map_err(|e| {
            ResourceError::corrupt("tile map", format!("tile {} of {}: {}", i, count, e))
        })?;
        cells.push(id);
    }

    let mut rest = [0u8; 1];
    if matches!(reader.read(&mut rest), Ok(n) if n > 0) {
        log::warn!("Ignoring trailing bytes after {}x{} tile map", width, height);
    }

    TileMap::new(width, height, cells)
}

fn read_dimension<R: Read>(reader: &mut R, what: &str) -> ResourceResult<usize> {
    let raw = reader
        .read_i32::<BigEndian>()
        .map_err(|e| ResourceError::corrupt("tile map", format!("missing {}: {}", what, e)))?;
    usize::try_from(raw)
        .map_err(|_| ResourceError::corrupt("tile map", format!("negative {}: {}", what, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn parse_two_by_two() {
        let map = parse_tile_map(stream(&[2, 2, 1, 2, 3, 4]).as_slice()).expect("parse map");
        assert_eq!(map.width(), 2);
        assert_eq!(map.height(), 2);
        assert_eq!(map.to_nested(), vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(map.get(0, 1), Some(2));
        assert_eq!(map.get(1, 0), Some(3));
        assert_eq!(map.get(2, 0), None);
    }

    #[test]
    fn non_square_shape_is_width_columns_of_height() {
        let map = parse_tile_map(stream(&[3, 2, 1, 2, 3, 4, 5, 6]).as_slice()).expect("parse map");
        let columns: Vec<&[i32]> = map.columns().collect();
        assert_eq!(columns, vec![&[1, 2][..], &[3, 4][..], &[5, 6][..]]);
        assert_eq!(map.get(2, 1), Some(6));
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let err = parse_tile_map(stream(&[2, 2, 1, 2, 3]).as_slice()).unwrap_err();
        assert!(matches!(err, ResourceError::Corrupt { .. }));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(parse_tile_map(&[0u8, 0, 0][..]).is_err());
        assert!(parse_tile_map(stream(&[4]).as_slice()).is_err());
    }

    #[test]
    fn negative_dimensions_are_rejected() {
        assert!(parse_tile_map(stream(&[-1, 2]).as_slice()).is_err());
        assert!(parse_tile_map(stream(&[2, -5, 0, 0]).as_slice()).is_err());
    }

    #[test]
    fn huge_header_with_short_body_fails_without_allocating_it() {
        let err = parse_tile_map(stream(&[i32::MAX, i32::MAX, 7]).as_slice()).unwrap_err();
        assert!(matches!(err, ResourceError::Corrupt { .. }));
    }

    #[test]
    fn empty_map_is_valid() {
        let map = parse_tile_map(stream(&[0, 5]).as_slice()).expect("parse map");
        assert_eq!(map.width(), 0);
        assert!(map.cells().is_empty());
        assert_eq!(map.columns().count(), 0);

        let map = parse_tile_map(stream(&[3, 0]).as_slice()).expect("parse map");
        assert_eq!(map.to_nested(), vec![Vec::<i32>::new(); 3]);
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let map = parse_tile_map(stream(&[1, 1, 9, 42]).as_slice()).expect("parse map");
        assert_eq!(map.cells(), &[9]);
    }

    #[test]
    fn written_map_parses_back() {
        let map = TileMap::from_columns(&[vec![0, -1, 7], vec![12, 3, i32::MIN]]).unwrap();
        let mut bytes = Vec::new();
        map.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 4 * (2 + 6));
        assert_eq!(parse_tile_map(bytes.as_slice()).unwrap(), map);
    }

    #[test]
    fn new_checks_cell_count() {
        assert!(TileMap::new(2, 3, vec![0; 5]).is_err());
        assert!(TileMap::from_columns(&[vec![1, 2], vec![3]]).is_err());
    }

    #[test]
    fn load_from_missing_path_reports_context() {
        let err = load_tile_map_from_path("definitely/not/here/level.map").unwrap_err();
        assert!(err.to_string().contains("Failed to open tile map"));
    }
}
