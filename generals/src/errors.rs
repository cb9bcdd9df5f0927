/// The error type for [`patch()`](crate::patch), i.e. for applying a single diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchError {
    NegativeRunLength {
        position: usize,
        value: i32,
    },
    MatchOutOfRange {
        position: usize,
        end: usize,
        previous_len: usize,
    },
    LiteralOutOfRange {
        position: usize,
        end: usize,
        diff_len: usize,
    },
}

impl std::error::Error for PatchError {}

impl std::fmt::Display for PatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchError::NegativeRunLength { position, value } =>
                write!(f, "Diff has a negative run length {} at position {}", value, position),
            PatchError::MatchOutOfRange { position, end, previous_len } =>
                write!(f, "Matching run at position {} reaches element {}, but the previous sequence only has {} elements", position, end, previous_len),
            PatchError::LiteralOutOfRange { position, end, diff_len } =>
                write!(f, "Mismatching run at position {} reaches element {}, but the diff only has {} elements", position, end, diff_len),
        }
    }
}

/// The error type for one `game_update`.
///
/// Any of these means the server sent something this client cannot make
/// sense of, and the reconstructed state can no longer be trusted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    CitiesDiff(PatchError),
    MapDiff(PatchError),
    MissingDimensions {
        len: usize,
    },
    InvalidDimensions {
        width: i32,
        height: i32,
    },
    BufferLengthMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
    InvalidArmy {
        index: usize,
        value: i32,
    },
    InvalidTerrain {
        index: usize,
        value: i32,
    },
    CityOutOfBounds {
        city: i32,
        size: usize,
    },
    GeneralOutOfBounds {
        player: usize,
        tile: i32,
        size: usize,
    },
    InvalidGeneral {
        player: usize,
        tile: i32,
    },
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::CitiesDiff(err) | ProtocolError::MapDiff(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::CitiesDiff(_) => write!(f, "Could not patch the cities diff"),
            ProtocolError::MapDiff(_) => write!(f, "Could not patch the map diff"),
            ProtocolError::MissingDimensions { len } => write!(
                f,
                "Map buffer of length {} is too short to contain the dimensions",
                len
            ),
            ProtocolError::InvalidDimensions { width, height } => {
                write!(f, "Invalid map dimensions {}x{}", width, height)
            }
            ProtocolError::BufferLengthMismatch {
                width,
                height,
                expected,
                actual,
            } => write!(
                f,
                "Map buffer for a {}x{} map should have {} elements, but has {}",
                width, height, expected, actual
            ),
            ProtocolError::InvalidArmy { index, value } => {
                write!(f, "Tile {} has a negative army count {}", index, value)
            }
            ProtocolError::InvalidTerrain { index, value } => {
                write!(f, "Tile {} has an unknown terrain value {}", index, value)
            }
            ProtocolError::CityOutOfBounds { city, size } => write!(
                f,
                "City at tile {} is outside of the map with {} tiles",
                city, size
            ),
            ProtocolError::GeneralOutOfBounds { player, tile, size } => write!(
                f,
                "General of player {} at tile {} is outside of the map with {} tiles",
                player, tile, size
            ),
            ProtocolError::InvalidGeneral { player, tile } => write!(
                f,
                "General of player {} has an invalid tile {}",
                player, tile
            ),
        }
    }
}
