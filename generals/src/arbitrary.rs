use quickcheck::Arbitrary;

use crate::{DecodedMap, GameUpdate, Terrain};

/// Encodes `next` as a diff against `previous`, the way the server does.
pub fn encode_diff(previous: &[i32], next: &[i32]) -> Vec<i32> {
    let same = |k: usize| k < previous.len() && previous[k] == next[k];
    let mut diff = Vec::new();
    let mut k = 0;
    while k < next.len() {
        let start = k;
        while k < next.len() && same(k) {
            k += 1;
        }
        diff.push((k - start) as i32);
        let start = k;
        while k < next.len() && !same(k) {
            k += 1;
        }
        diff.push((k - start) as i32);
        diff.extend_from_slice(&next[start..k]);
    }
    diff
}

/// An update that sends the map and cities in full, as in the first update of a game.
pub fn full_update(map: &[i32], cities: &[i32]) -> GameUpdate {
    GameUpdate {
        cities_diff: encode_diff(&[], cities),
        map_diff: encode_diff(&[], map),
        generals: vec![],
    }
}

#[derive(Clone, Debug)]
pub struct MapInput {
    pub width: usize,
    pub height: usize,
    pub armies: Vec<u32>,
    pub terrain: Vec<Terrain>,
    /// Distinct tiles, all on the map.
    pub cities: Vec<i32>,
}

impl MapInput {
    pub fn to_buffer(&self) -> Vec<i32> {
        let mut buffer = vec![self.width as i32, self.height as i32];
        buffer.extend(self.armies.iter().map(|&army| army as i32));
        buffer.extend(self.terrain.iter().map(|terrain| terrain.code()));
        buffer
    }

    pub fn to_decoded(&self) -> DecodedMap {
        DecodedMap {
            width: self.width,
            height: self.height,
            armies: self.armies.clone(),
            terrain: self.terrain.clone(),
        }
    }
}

impl Arbitrary for Terrain {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&[
            Terrain::Owned(0),
            Terrain::Owned(0),
            Terrain::Owned(1),
            Terrain::Owned(7),
            Terrain::Empty,
            Terrain::Mountain,
            Terrain::Fog,
            Terrain::FogObstacle,
        ])
        .unwrap()
    }
}

impl Arbitrary for MapInput {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let width = usize::arbitrary(g) % 6 + 1;
        let height = usize::arbitrary(g) % 6 + 1;
        let size = width * height;
        let armies = (0..size).map(|_| u32::arbitrary(g) % 200).collect();
        let terrain = (0..size).map(|_| Terrain::arbitrary(g)).collect();
        let cities = (0..size as i32)
            .filter(|_| u8::arbitrary(g) % 5 == 0)
            .collect();
        MapInput {
            width,
            height,
            armies,
            terrain,
            cities,
        }
    }
}
