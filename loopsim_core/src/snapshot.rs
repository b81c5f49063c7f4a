//! The snapshot store: one last-value-wins slot per producer channel.
//!
//! Producers call [`SnapshotStore::set`] from whatever task their transport
//! delivers on; the run loop reads with [`SnapshotStore::snapshot`]. Each
//! slot is replaced atomically as a whole. There is deliberately no
//! coordination *between* slots, so one snapshot may combine a vehicle state
//! from tick 40 with obstacles from tick 37.
//!
//! Every slot also counts its writes. The counts do not change what a read
//! returns; they let the logger record which update of each channel
//! contributed to a tick ([`Provenance`]).

use crate::messages::{
    DynamicVehicleParams, Obstacles, PathLocal, StaticVehicleParams, Trajectory, VehicleState,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};

/// Identifies one producer channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    PathLocal,
    Obstacles,
    TrajectoryCandidate,
    TrajectorySelected,
    VehicleState,
    StaticVehicleParams,
    DynamicVehicleParams,
}

impl Channel {
    /// All channels, in store order.
    pub const ALL: [Channel; 7] = [
        Channel::PathLocal,
        Channel::Obstacles,
        Channel::TrajectoryCandidate,
        Channel::TrajectorySelected,
        Channel::VehicleState,
        Channel::StaticVehicleParams,
        Channel::DynamicVehicleParams,
    ];
    
    /// Topic name used on the producer side.
    pub fn topic(&self) -> &'static str {
        match self {
            Channel::PathLocal => "pathlocal",
            Channel::Obstacles => "obstacles",
            Channel::TrajectoryCandidate => "trajhat",
            Channel::TrajectorySelected => "trajstar",
            Channel::VehicleState => "state",
            Channel::StaticVehicleParams => "static_vehicle_params",
            Channel::DynamicVehicleParams => "dynamic_vehicle_params",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.topic())
    }
}

/// A whole-value update for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "value", rename_all = "snake_case")]
pub enum ChannelUpdate {
    PathLocal(PathLocal),
    Obstacles(Obstacles),
    TrajectoryCandidate(Trajectory),
    TrajectorySelected(Trajectory),
    VehicleState(VehicleState),
    StaticVehicleParams(StaticVehicleParams),
    DynamicVehicleParams(DynamicVehicleParams),
}

impl ChannelUpdate {
    /// The channel this update targets.
    pub fn channel(&self) -> Channel {
        match self {
            ChannelUpdate::PathLocal(_) => Channel::PathLocal,
            ChannelUpdate::Obstacles(_) => Channel::Obstacles,
            ChannelUpdate::TrajectoryCandidate(_) => Channel::TrajectoryCandidate,
            ChannelUpdate::TrajectorySelected(_) => Channel::TrajectorySelected,
            ChannelUpdate::VehicleState(_) => Channel::VehicleState,
            ChannelUpdate::StaticVehicleParams(_) => Channel::StaticVehicleParams,
            ChannelUpdate::DynamicVehicleParams(_) => Channel::DynamicVehicleParams,
        }
    }
}

/// A slot value together with its write count.
#[derive(Debug)]
struct Stamped<T> {
    value: Arc<T>,
    /// Number of writes so far (0 = still the default)
    seq: u64,
}

impl<T> Clone for Stamped<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            seq: self.seq,
        }
    }
}

/// Single-channel slot. Readers clone an `Arc`, writers swap it.
#[derive(Debug)]
struct Slot<T> {
    inner: RwLock<Stamped<T>>,
}

impl<T: Default> Slot<T> {
    fn new() -> Self {
        Self {
            inner: RwLock::new(Stamped {
                value: Arc::new(T::default()),
                seq: 0,
            }),
        }
    }
}

impl<T> Slot<T> {
    fn replace(&self, value: T) -> u64 {
        let value = Arc::new(value);
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.value = value;
        guard.seq += 1;
        guard.seq
    }
    
    fn read(&self) -> Stamped<T> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Per-channel write counts observed by one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub path_local: u64,
    pub obstacles: u64,
    pub trajectory_candidate: u64,
    pub trajectory_selected: u64,
    pub vehicle_state: u64,
    pub static_params: u64,
    pub dynamic_params: u64,
}

impl Provenance {
    /// Channels that have never been written.
    pub fn never_written(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.get(*c) == 0)
            .collect()
    }
    
    /// Write count for one channel.
    pub fn get(&self, channel: Channel) -> u64 {
        match channel {
            Channel::PathLocal => self.path_local,
            Channel::Obstacles => self.obstacles,
            Channel::TrajectoryCandidate => self.trajectory_candidate,
            Channel::TrajectorySelected => self.trajectory_selected,
            Channel::VehicleState => self.vehicle_state,
            Channel::StaticVehicleParams => self.static_params,
            Channel::DynamicVehicleParams => self.dynamic_params,
        }
    }
}

/// The current values of all seven channels, read within one tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub path_local: Arc<PathLocal>,
    pub obstacles: Arc<Obstacles>,
    pub candidate: Arc<Trajectory>,
    pub selected: Arc<Trajectory>,
    pub state: Arc<VehicleState>,
    pub static_params: Arc<StaticVehicleParams>,
    pub dynamic_params: Arc<DynamicVehicleParams>,
    pub provenance: Provenance,
}

/// Latest value per channel.
///
/// Owned by the run controller; producers hold it behind an `Arc` and only
/// ever call [`set`](Self::set).
#[derive(Debug)]
pub struct SnapshotStore {
    path_local: Slot<PathLocal>,
    obstacles: Slot<Obstacles>,
    candidate: Slot<Trajectory>,
    selected: Slot<Trajectory>,
    state: Slot<VehicleState>,
    static_params: Slot<StaticVehicleParams>,
    dynamic_params: Slot<DynamicVehicleParams>,
}

impl SnapshotStore {
    /// Creates a store with every channel at its zero-valued default.
    pub fn new() -> Self {
        Self {
            path_local: Slot::new(),
            obstacles: Slot::new(),
            candidate: Slot::new(),
            selected: Slot::new(),
            state: Slot::new(),
            static_params: Slot::new(),
            dynamic_params: Slot::new(),
        }
    }
    
    /// Creates an Arc-wrapped store for sharing with producers.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
    
    /// Overwrites one channel unconditionally. Returns the channel's new
    /// write count.
    pub fn set(&self, update: ChannelUpdate) -> u64 {
        match update {
            ChannelUpdate::PathLocal(v) => self.path_local.replace(v),
            ChannelUpdate::Obstacles(v) => self.obstacles.replace(v),
            ChannelUpdate::TrajectoryCandidate(v) => self.candidate.replace(v),
            ChannelUpdate::TrajectorySelected(v) => self.selected.replace(v),
            ChannelUpdate::VehicleState(v) => self.state.replace(v),
            ChannelUpdate::StaticVehicleParams(v) => self.static_params.replace(v),
            ChannelUpdate::DynamicVehicleParams(v) => self.dynamic_params.replace(v),
        }
    }
    
    pub fn path_local(&self) -> Arc<PathLocal> {
        self.path_local.read().value
    }
    
    pub fn obstacles(&self) -> Arc<Obstacles> {
        self.obstacles.read().value
    }
    
    pub fn trajectory_candidate(&self) -> Arc<Trajectory> {
        self.candidate.read().value
    }
    
    pub fn trajectory_selected(&self) -> Arc<Trajectory> {
        self.selected.read().value
    }
    
    pub fn vehicle_state(&self) -> Arc<VehicleState> {
        self.state.read().value
    }
    
    pub fn static_params(&self) -> Arc<StaticVehicleParams> {
        self.static_params.read().value
    }
    
    pub fn dynamic_params(&self) -> Arc<DynamicVehicleParams> {
        self.dynamic_params.read().value
    }
    
    /// Reads every channel. Each slot is read atomically; the set as a
    /// whole is not.
    pub fn snapshot(&self) -> Snapshot {
        let path_local = self.path_local.read();
        let obstacles = self.obstacles.read();
        let candidate = self.candidate.read();
        let selected = self.selected.read();
        let state = self.state.read();
        let static_params = self.static_params.read();
        let dynamic_params = self.dynamic_params.read();
        
        let provenance = Provenance {
            path_local: path_local.seq,
            obstacles: obstacles.seq,
            trajectory_candidate: candidate.seq,
            trajectory_selected: selected.seq,
            vehicle_state: state.seq,
            static_params: static_params.seq,
            dynamic_params: dynamic_params.seq,
        };
        
        Snapshot {
            path_local: path_local.value,
            obstacles: obstacles.value,
            candidate: candidate.value,
            selected: selected.value,
            state: state.value,
            static_params: static_params.value,
            dynamic_params: dynamic_params.value,
            provenance,
        }
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
