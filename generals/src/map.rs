use std::fmt;

use crate::ProtocolError;

pub const TILE_EMPTY: i32 = -1;
pub const TILE_MOUNTAIN: i32 = -2;
pub const TILE_FOG: i32 = -3;
/// Cities and mountains show up as obstacles in the fog of war.
pub const TILE_FOG_OBSTACLE: i32 = -4;

/// What is known about a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Owned by the player with this index.
    Owned(usize),
    Empty,
    Mountain,
    Fog,
    FogObstacle,
}

impl Terrain {
    /// Parses the server's terrain value, returning `None` for unknown values.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            TILE_EMPTY => Some(Terrain::Empty),
            TILE_MOUNTAIN => Some(Terrain::Mountain),
            TILE_FOG => Some(Terrain::Fog),
            TILE_FOG_OBSTACLE => Some(Terrain::FogObstacle),
            code => usize::try_from(code).ok().map(Terrain::Owned),
        }
    }

    /// The server's terrain value for this tile.
    pub fn code(self) -> i32 {
        match self {
            Terrain::Owned(player) => player as i32,
            Terrain::Empty => TILE_EMPTY,
            Terrain::Mountain => TILE_MOUNTAIN,
            Terrain::Fog => TILE_FOG,
            Terrain::FogObstacle => TILE_FOG_OBSTACLE,
        }
    }

    pub fn owner(self) -> Option<usize> {
        match self {
            Terrain::Owned(player) => Some(player),
            _ => None,
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The map buffer split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedMap {
    pub width: usize,
    pub height: usize,
    /// Army count of every tile, row-major. Cities have "neutral" armies.
    pub armies: Vec<u32>,
    /// Terrain of every tile, row-major.
    pub terrain: Vec<Terrain>,
}

/// Splits a patched map buffer into dimensions, armies and terrain.
///
/// The buffer is laid out as `[width, height, armies..., terrain...]`, where
/// both the armies and the terrain have `width * height` entries. Index 0 of
/// either is the top-left corner of the map.
pub fn decode_map(buffer: &[i32]) -> Result<DecodedMap, ProtocolError> {
    let (raw_width, raw_height) = match buffer {
        [width, height, ..] => (*width, *height),
        _ => return Err(ProtocolError::MissingDimensions { len: buffer.len() }),
    };
    let invalid_dimensions = ProtocolError::InvalidDimensions {
        width: raw_width,
        height: raw_height,
    };
    let (Ok(width), Ok(height)) = (usize::try_from(raw_width), usize::try_from(raw_height)) else {
        return Err(invalid_dimensions);
    };
    // A map without columns can't have rows, and vice versa
    if (width == 0) != (height == 0) {
        return Err(invalid_dimensions);
    }
    let size = width.checked_mul(height).ok_or(invalid_dimensions.clone())?;
    let expected = size
        .checked_mul(2)
        .and_then(|n| n.checked_add(2))
        .ok_or(invalid_dimensions)?;
    if buffer.len() != expected {
        return Err(ProtocolError::BufferLengthMismatch {
            width,
            height,
            expected,
            actual: buffer.len(),
        });
    }

    let armies = buffer[2..2 + size]
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            u32::try_from(value).map_err(|_| ProtocolError::InvalidArmy { index, value })
        })
        .collect::<Result<Vec<u32>, ProtocolError>>()?;
    let terrain = buffer[2 + size..]
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            Terrain::from_code(value).ok_or(ProtocolError::InvalidTerrain { index, value })
        })
        .collect::<Result<Vec<Terrain>, ProtocolError>>()?;

    Ok(DecodedMap {
        width,
        height,
        armies,
        terrain,
    })
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::MapInput;

    quickcheck! {
        fn decode_splits_buffer(input: MapInput) -> bool {
            decode_map(&input.to_buffer()) == Ok(input.to_decoded())
        }

        fn decode_rejects_wrong_length(input: MapInput, extra: u8) -> bool {
            let mut buffer = input.to_buffer();
            buffer.extend(std::iter::repeat(0).take(extra as usize % 5 + 1));
            let too_long = matches!(decode_map(&buffer), Err(ProtocolError::BufferLengthMismatch { .. }));
            buffer.truncate(input.to_buffer().len() - 1);
            let too_short = matches!(decode_map(&buffer), Err(ProtocolError::BufferLengthMismatch { .. }));
            too_long && too_short
        }
    }

    #[test]
    fn terrain_codes() {
        for code in -4..5 {
            assert_eq!(Terrain::from_code(code).unwrap().code(), code);
        }
        assert_eq!(Terrain::from_code(-5), None);
        assert_eq!(Terrain::from_code(2), Some(Terrain::Owned(2)));
        assert_eq!(Terrain::from_code(-4), Some(Terrain::FogObstacle));
    }

    #[test]
    fn terrain_owner() {
        assert_eq!(Terrain::Owned(3).owner(), Some(3));
        assert_eq!(Terrain::Fog.owner(), None);
        assert_eq!(Terrain::Empty.owner(), None);
    }

    #[test]
    fn decode_small_map() {
        let decoded = decode_map(&[2, 1, 5, 0, 1, -2]).unwrap();
        assert_eq!(
            decoded,
            DecodedMap {
                width: 2,
                height: 1,
                armies: vec![5, 0],
                terrain: vec![Terrain::Owned(1), Terrain::Mountain],
            }
        );
    }

    #[test]
    fn decode_empty_map() {
        let decoded = decode_map(&[0, 0]).unwrap();
        assert_eq!(decoded.width, 0);
        assert!(decoded.armies.is_empty());
        assert!(decoded.terrain.is_empty());
    }

    #[test]
    fn decode_errors() {
        assert_eq!(
            decode_map(&[3]),
            Err(ProtocolError::MissingDimensions { len: 1 })
        );
        assert_eq!(
            decode_map(&[-1, 2]),
            Err(ProtocolError::InvalidDimensions {
                width: -1,
                height: 2
            })
        );
        assert_eq!(
            decode_map(&[0, 5]),
            Err(ProtocolError::InvalidDimensions {
                width: 0,
                height: 5
            })
        );
        assert_eq!(
            decode_map(&[3, 0]),
            Err(ProtocolError::InvalidDimensions {
                width: 3,
                height: 0
            })
        );
        assert_eq!(
            decode_map(&[2, 2, 0, 0, 0, 0, -1, -1, -1]),
            Err(ProtocolError::BufferLengthMismatch {
                width: 2,
                height: 2,
                expected: 10,
                actual: 9
            })
        );
        assert_eq!(
            decode_map(&[1, 1, -3, 0]),
            Err(ProtocolError::InvalidArmy {
                index: 0,
                value: -3
            })
        );
        assert_eq!(
            decode_map(&[2, 1, 0, 0, -1, -7]),
            Err(ProtocolError::InvalidTerrain {
                index: 1,
                value: -7
            })
        );
    }
}
