//! Pallet stand registry.

use rmfs_core::WaypointId;

/// Which side of the flow a stand serves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StandKind {
    /// Empty pallets/bins enter the system here.
    Input,
    /// Finished orders leave the system here.
    Output,
}

/// The input and output pallet stands of the instance.
///
/// Stands are ordinary waypoints; this registry only records which waypoints
/// play the role.  Congestion counters for stand selection live in the
/// resource ledger, not here.
#[derive(Clone, Debug, Default)]
pub struct PalletStands {
    pub inputs: Vec<WaypointId>,
    pub outputs: Vec<WaypointId>,
}

impl PalletStands {
    pub fn new(inputs: Vec<WaypointId>, outputs: Vec<WaypointId>) -> Self {
        Self { inputs, outputs }
    }

    /// Candidate stands of the given kind.
    pub fn of_kind(&self, kind: StandKind) -> &[WaypointId] {
        match kind {
            StandKind::Input => &self.inputs,
            StandKind::Output => &self.outputs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() || self.outputs.is_empty()
    }
}
