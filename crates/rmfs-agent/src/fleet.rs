//! The fleet store: all stations and mates of one run.

use rmfs_core::{FleetError, FleetResult, MateId, StationId};

use crate::mate::MateState;
use crate::station::StationState;

/// Owning store of every agent, indexed by typed ID.
///
/// IDs are assigned densely at construction (`StationId(i)` is
/// `stations[i]`), so lookups are direct indexing with a bounds check.
#[derive(Debug, Default)]
pub struct Fleet {
    pub stations: Vec<StationState>,
    pub mates: Vec<MateState>,
}

impl Fleet {
    pub fn new(stations: Vec<StationState>, mates: Vec<MateState>) -> Self {
        debug_assert!(
            stations.iter().enumerate().all(|(i, s)| s.id.index() == i),
            "station IDs must be dense and in order"
        );
        debug_assert!(
            mates.iter().enumerate().all(|(i, m)| m.id.index() == i),
            "mate IDs must be dense and in order"
        );
        Self { stations, mates }
    }

    pub fn station(&self, id: StationId) -> FleetResult<&StationState> {
        self.stations
            .get(id.index())
            .ok_or(FleetError::StationNotFound(id))
    }

    pub fn station_mut(&mut self, id: StationId) -> FleetResult<&mut StationState> {
        self.stations
            .get_mut(id.index())
            .ok_or(FleetError::StationNotFound(id))
    }

    pub fn mate(&self, id: MateId) -> FleetResult<&MateState> {
        self.mates.get(id.index()).ok_or(FleetError::MateNotFound(id))
    }

    pub fn mate_mut(&mut self, id: MateId) -> FleetResult<&mut MateState> {
        self.mates
            .get_mut(id.index())
            .ok_or(FleetError::MateNotFound(id))
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn mate_count(&self) -> usize {
        self.mates.len()
    }
}
