//! Club table

use serde::{Deserialize, Serialize};

/// Static stats for a club
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClubSpec {
    /// Max carry in tiles
    pub distance: i32,
    /// Landing spread radius (0 = single tile)
    pub accuracy: i32,
    /// Bounces after landing
    pub roll: i32,
    /// 1 (flat) to 5 (high)
    pub loft: u8,
    /// Flight arc height scale
    pub arc_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Club {
    Driver,
    ThreeWood,
    FiveIron,
    SevenIron,
    NineIron,
    PitchingWedge,
    SandWedge,
}

impl Club {
    /// Longest to shortest
    pub const ALL: [Club; 7] = [
        Club::Driver,
        Club::ThreeWood,
        Club::FiveIron,
        Club::SevenIron,
        Club::NineIron,
        Club::PitchingWedge,
        Club::SandWedge,
    ];

    pub fn spec(&self) -> ClubSpec {
        let (distance, accuracy, roll, loft, arc_height) = match self {
            Club::Driver => (22, 2, 3, 1, 3.0),
            Club::ThreeWood => (18, 2, 2, 2, 3.5),
            Club::FiveIron => (14, 1, 2, 3, 4.0),
            Club::SevenIron => (11, 1, 1, 3, 4.5),
            Club::NineIron => (8, 1, 1, 4, 5.0),
            Club::PitchingWedge => (6, 0, 1, 4, 5.5),
            Club::SandWedge => (4, 0, 0, 5, 6.0),
        };
        ClubSpec {
            distance,
            accuracy,
            roll,
            loft,
            arc_height,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Club::Driver => "Driver",
            Club::ThreeWood => "3-Wood",
            Club::FiveIron => "5-Iron",
            Club::SevenIron => "7-Iron",
            Club::NineIron => "9-Iron",
            Club::PitchingWedge => "Pitching Wedge",
            Club::SandWedge => "Sand Wedge",
        }
    }

    /// Shortest club whose carry reaches `tiles`, or the driver
    pub fn for_distance(tiles: i32) -> Club {
        Club::ALL
            .iter()
            .rev()
            .copied()
            .find(|c| c.spec().distance >= tiles)
            .unwrap_or(Club::Driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_ordered() {
        let specs: Vec<ClubSpec> = Club::ALL.iter().map(|c| c.spec()).collect();
        for pair in specs.windows(2) {
            assert!(pair[0].distance > pair[1].distance);
            assert!(pair[0].loft <= pair[1].loft);
            assert!(pair[0].arc_height < pair[1].arc_height);
        }
        assert_eq!(Club::Driver.spec().distance, 22);
        assert_eq!(Club::SandWedge.spec().roll, 0);
    }

    #[test]
    fn test_for_distance() {
        assert_eq!(Club::for_distance(3), Club::SandWedge);
        assert_eq!(Club::for_distance(9), Club::SevenIron);
        assert_eq!(Club::for_distance(22), Club::Driver);
        assert_eq!(Club::for_distance(40), Club::Driver);
    }
}
