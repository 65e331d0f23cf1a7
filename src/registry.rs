//! Track and train registry.
//!
//! A plain data holder for the station's tracks and trains plus the
//! occupancy primitives the dispatcher composes. The primitives themselves
//! never fail and do no validation; precondition checking (unknown ids,
//! state conflicts, the no-free-track emergency) is the dispatcher's job.
//!
//! Occupancy is bidirectional: a [`Busy`](TrackState::Busy) track names its
//! occupying train, and that train names the track back. [`occupy`] and
//! [`free`] are the only mutation points, which is what keeps the linkage
//! consistent.
//!
//! [`occupy`]: Registry::occupy
//! [`free`]: Registry::free

/// Operational state of a single track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TrackState {
    /// Available for assignment.
    #[default]
    Free,
    /// Occupied by a train.
    Busy,
    /// A train has been cleared to arrive.
    ///
    /// Not produced by any current transition, but kept in the type: the
    /// snapshot format reserves a code for it and the board must be able to
    /// display it.
    Arriving,
    /// Out of service; assignment is refused.
    Inoperative,
}

impl TrackState {
    /// Numeric code used by the snapshot format.
    pub const fn code(self) -> i32 {
        match self {
            TrackState::Free => 0,
            TrackState::Busy => 1,
            TrackState::Arriving => 2,
            TrackState::Inoperative => 3,
        }
    }

    /// Decode a snapshot state code. Unknown codes load as `Free`.
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => TrackState::Busy,
            2 => TrackState::Arriving,
            3 => TrackState::Inoperative,
            _ => TrackState::Free,
        }
    }
}

/// One station track.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Track {
    /// Track identifier, unique within the station.
    pub id: u32,
    /// Current operational state.
    pub state: TrackState,
    /// Occupying train while `state` is [`TrackState::Busy`].
    pub occupant: Option<u32>,
}

impl Track {
    /// A free track with no occupant.
    pub fn free(id: u32) -> Self {
        Self {
            id,
            state: TrackState::Free,
            occupant: None,
        }
    }
}

/// One train known to the station.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Train {
    /// Train identifier, unique within the station.
    pub id: u32,
    /// Track this train currently occupies, if any.
    pub assigned: Option<u32>,
}

impl Train {
    /// An unassigned train.
    pub fn unassigned(id: u32) -> Self {
        Self { id, assigned: None }
    }
}

/// All tracks and trains of one station, owned by the control loop.
///
/// Lookup is a linear scan; station track counts are small enough that an
/// index would buy nothing.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    tracks: Vec<Track>,
    trains: Vec<Train>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already-linked tracks and trains, as loaded
    /// from a snapshot.
    pub fn from_parts(tracks: Vec<Track>, trains: Vec<Train>) -> Self {
        Self { tracks, trains }
    }

    /// Add a track.
    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Add a train.
    pub fn add_train(&mut self, train: Train) {
        self.trains.push(train);
    }

    /// Find a track by id.
    pub fn find_track(&self, id: u32) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Find a train by id.
    pub fn find_train(&self, id: u32) -> Option<&Train> {
        self.trains.iter().find(|t| t.id == id)
    }

    /// True if any track is currently [`TrackState::Free`].
    pub fn has_free_track(&self) -> bool {
        self.tracks.iter().any(|t| t.state == TrackState::Free)
    }

    /// All tracks, in configuration order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// All trains, in configuration order.
    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    /// Mark a track busy and link the train to it, both directions.
    ///
    /// No-op when either id is unknown.
    pub fn occupy(&mut self, track_id: u32, train_id: u32) {
        if let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) {
            track.state = TrackState::Busy;
            track.occupant = Some(train_id);
        }
        if let Some(train) = self.trains.iter_mut().find(|t| t.id == train_id) {
            train.assigned = Some(track_id);
        }
    }

    /// Release a track to `Free` and clear its occupant's assignment.
    ///
    /// No-op on the train side when the track had no occupant; no-op
    /// entirely when the id is unknown.
    pub fn free(&mut self, track_id: u32) {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) else {
            return;
        };
        let occupant = track.occupant.take();
        track.state = TrackState::Free;

        if let Some(train_id) = occupant {
            if let Some(train) = self.trains.iter_mut().find(|t| t.id == train_id) {
                train.assigned = None;
            }
        }
    }

    /// Mark a track out of service, clearing any occupant first.
    pub fn set_inoperative(&mut self, track_id: u32) {
        self.free(track_id);
        if let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) {
            track.state = TrackState::Inoperative;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_registry() -> Registry {
        let mut reg = Registry::new();
        reg.add_track(Track::free(1));
        reg.add_track(Track::free(2));
        reg.add_train(Train::unassigned(10));
        reg.add_train(Train::unassigned(20));
        reg
    }

    #[test]
    fn lookup_by_id() {
        let reg = sample_registry();
        assert_eq!(reg.find_track(2).unwrap().id, 2);
        assert_eq!(reg.find_train(10).unwrap().id, 10);
        assert!(reg.find_track(99).is_none());
        assert!(reg.find_train(99).is_none());
    }

    #[test]
    fn occupy_links_both_directions() {
        let mut reg = sample_registry();
        reg.occupy(1, 10);

        let track = reg.find_track(1).unwrap();
        assert_eq!(track.state, TrackState::Busy);
        assert_eq!(track.occupant, Some(10));
        assert_eq!(reg.find_train(10).unwrap().assigned, Some(1));
    }

    #[test]
    fn free_clears_both_directions() {
        let mut reg = sample_registry();
        reg.occupy(1, 10);
        reg.free(1);

        let track = reg.find_track(1).unwrap();
        assert_eq!(track.state, TrackState::Free);
        assert_eq!(track.occupant, None);
        assert_eq!(reg.find_train(10).unwrap().assigned, None);
    }

    #[test]
    fn free_without_occupant_is_harmless() {
        let mut reg = sample_registry();
        reg.free(2);
        assert_eq!(reg.find_track(2).unwrap().state, TrackState::Free);
    }

    #[test]
    fn set_inoperative_unlinks_occupant() {
        let mut reg = sample_registry();
        reg.occupy(2, 20);
        reg.set_inoperative(2);

        let track = reg.find_track(2).unwrap();
        assert_eq!(track.state, TrackState::Inoperative);
        assert_eq!(track.occupant, None);
        assert_eq!(reg.find_train(20).unwrap().assigned, None);
    }

    #[test]
    fn has_free_track_reflects_states() {
        let mut reg = sample_registry();
        assert!(reg.has_free_track());
        reg.occupy(1, 10);
        assert!(reg.has_free_track());
        reg.set_inoperative(2);
        assert!(!reg.has_free_track());
    }

    #[test]
    fn empty_registry_has_no_free_track() {
        assert!(!Registry::new().has_free_track());
    }

    #[test]
    fn state_codes_round_trip() {
        for state in [
            TrackState::Free,
            TrackState::Busy,
            TrackState::Arriving,
            TrackState::Inoperative,
        ] {
            assert_eq!(TrackState::from_code(state.code()), state);
        }
        // Unknown codes degrade to Free.
        assert_eq!(TrackState::from_code(42), TrackState::Free);
        assert_eq!(TrackState::from_code(-1), TrackState::Free);
    }
}
