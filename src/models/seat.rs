use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum_macros::{Display, EnumString};

/// A (row, column) coordinate inside a screen. Rows and columns count from zero.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct Seat {
    pub row: i32,
    pub column: i32,
}

impl Seat {
    pub fn new(row: i32, column: i32) -> Self {
        Seat { row, column }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

// Render a seat list for error messages, e.g. "(0, 1), (0, 2)"
pub fn format_seats(seats: &[Seat]) -> String {
    seats
        .iter()
        .map(|seat| seat.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Seat layout of a screen: `rows` rows of `row_width` seats each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeatGeometry {
    pub rows: i32,
    pub row_width: i32,
}

impl SeatGeometry {
    pub fn new(rows: i32, row_width: i32) -> Self {
        SeatGeometry { rows, row_width }
    }

    pub fn contains(&self, seat: &Seat) -> bool {
        (0..self.rows).contains(&seat.row) && (0..self.row_width).contains(&seat.column)
    }

    pub fn capacity(&self) -> usize {
        (self.rows.max(0) as usize) * (self.row_width.max(0) as usize)
    }

    /// Every seat of the screen in row-major order.
    pub fn seats(&self) -> impl Iterator<Item = Seat> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.row_width).map(move |column| Seat::new(row, column)))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Free,
    Held,
    Booked,
}

/// Point-in-time view of every seat of one showing.
#[derive(Debug, Clone)]
pub struct SeatMap {
    showing_id: i32,
    geometry: SeatGeometry,
    states: BTreeMap<Seat, SeatState>,
}

impl SeatMap {
    /// Overlay `claims` onto the full seat universe of `geometry`; unclaimed seats are free.
    /// Claims outside the geometry are ignored.
    pub fn build<I>(showing_id: i32, geometry: SeatGeometry, claims: I) -> Self
    where
        I: IntoIterator<Item = (Seat, SeatState)>,
    {
        let mut states: BTreeMap<Seat, SeatState> =
            geometry.seats().map(|seat| (seat, SeatState::Free)).collect();

        for (seat, state) in claims {
            if let Some(slot) = states.get_mut(&seat) {
                *slot = state;
            }
        }

        SeatMap {
            showing_id,
            geometry,
            states,
        }
    }

    pub fn showing_id(&self) -> i32 {
        self.showing_id
    }

    pub fn geometry(&self) -> SeatGeometry {
        self.geometry
    }

    pub fn state(&self, seat: &Seat) -> Option<SeatState> {
        self.states.get(seat).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Seat, &SeatState)> {
        self.states.iter()
    }

    pub fn count(&self, state: SeatState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    /// Requested seats that the snapshot shows as held or booked.
    pub fn taken(&self, seats: &[Seat]) -> Vec<Seat> {
        seats
            .iter()
            .filter(|seat| matches!(self.state(seat), Some(SeatState::Held | SeatState::Booked)))
            .copied()
            .collect()
    }

    /// States laid out row by row, as the seat picker draws them.
    pub fn rows(&self) -> Vec<Vec<SeatState>> {
        (0..self.geometry.rows)
            .map(|row| {
                (0..self.geometry.row_width)
                    .map(|column| self.state(&Seat::new(row, column)).unwrap_or(SeatState::Free))
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SeatMapResponse {
    pub showing_id: i32,
    pub rows: i32,
    pub row_width: i32,
    pub seats: Vec<Vec<SeatState>>,
    pub free: usize,
    pub held: usize,
    pub booked: usize,
}

impl From<&SeatMap> for SeatMapResponse {
    fn from(map: &SeatMap) -> Self {
        SeatMapResponse {
            showing_id: map.showing_id,
            rows: map.geometry.rows,
            row_width: map.geometry.row_width,
            seats: map.rows(),
            free: map.count(SeatState::Free),
            held: map.count(SeatState::Held),
            booked: map.count(SeatState::Booked),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_every_seat_has_exactly_one_state() {
        let geometry = SeatGeometry::new(3, 4);
        let map = SeatMap::build(
            1,
            geometry,
            vec![
                (Seat::new(0, 0), SeatState::Held),
                (Seat::new(2, 3), SeatState::Booked),
                (Seat::new(7, 7), SeatState::Booked),
            ],
        );

        assert_eq!(map.iter().count(), geometry.capacity());
        assert_eq!(map.count(SeatState::Free), 10);
        assert_eq!(map.count(SeatState::Held), 1);
        assert_eq!(map.count(SeatState::Booked), 1);
        assert_eq!(map.state(&Seat::new(7, 7)), None);
    }

    #[test]
    fn test_geometry_bounds() {
        let geometry = SeatGeometry::new(5, 5);
        assert!(geometry.contains(&Seat::new(0, 0)));
        assert!(geometry.contains(&Seat::new(4, 4)));
        assert!(!geometry.contains(&Seat::new(5, 0)));
        assert!(!geometry.contains(&Seat::new(0, -1)));
    }

    #[test]
    fn test_taken_and_rows() {
        let map = SeatMap::build(
            9,
            SeatGeometry::new(2, 2),
            vec![(Seat::new(1, 0), SeatState::Booked)],
        );

        assert_eq!(map.taken(&[Seat::new(0, 0), Seat::new(1, 0)]), vec![Seat::new(1, 0)]);
        assert_eq!(
            map.rows(),
            vec![
                vec![SeatState::Free, SeatState::Free],
                vec![SeatState::Booked, SeatState::Free],
            ]
        );

        let response = SeatMapResponse::from(&map);
        assert_eq!(response.free, 3);
        assert_eq!(response.booked, 1);
    }

    #[test]
    fn test_seat_state_strings() {
        assert_eq!(SeatState::Booked.to_string(), "BOOKED");
        assert_eq!(SeatState::from_str("HELD").unwrap(), SeatState::Held);
    }
}
