//! Producer-side plumbing: one subscription task per channel.
//!
//! Each channel gets its own bounded queue and its own task that drains the
//! queue into the [`SnapshotStore`]. Channels never wait on each other and
//! the run loop never waits on any of them; a producer that never sends
//! simply leaves its slot at the default.

use loopsim_core::{
    Channel, ChannelUpdate, DynamicVehicleParams, Obstacles, PathLocal, SnapshotStore,
    StaticVehicleParams, Trajectory, VehicleState,
};
use loopsim_env::LoopContext;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

/// Queue depth per channel. Only the newest value matters, so this just
/// absorbs short bursts.
pub const CHANNEL_QUEUE_DEPTH: usize = 10;

/// Sending ends handed to the producers, one per channel.
#[derive(Debug, Clone)]
pub struct ProducerPorts {
    pub path_local: mpsc::Sender<PathLocal>,
    pub obstacles: mpsc::Sender<Obstacles>,
    pub trajectory_candidate: mpsc::Sender<Trajectory>,
    pub trajectory_selected: mpsc::Sender<Trajectory>,
    pub vehicle_state: mpsc::Sender<VehicleState>,
    pub static_params: mpsc::Sender<StaticVehicleParams>,
    pub dynamic_params: mpsc::Sender<DynamicVehicleParams>,
}

impl ProducerPorts {
    /// Routes an untyped update to its channel's queue.
    ///
    /// Returns `false` if that channel's subscription has shut down.
    pub async fn publish(&self, update: ChannelUpdate) -> bool {
        match update {
            ChannelUpdate::PathLocal(v) => self.path_local.send(v).await.is_ok(),
            ChannelUpdate::Obstacles(v) => self.obstacles.send(v).await.is_ok(),
            ChannelUpdate::TrajectoryCandidate(v) => self.trajectory_candidate.send(v).await.is_ok(),
            ChannelUpdate::TrajectorySelected(v) => self.trajectory_selected.send(v).await.is_ok(),
            ChannelUpdate::VehicleState(v) => self.vehicle_state.send(v).await.is_ok(),
            ChannelUpdate::StaticVehicleParams(v) => self.static_params.send(v).await.is_ok(),
            ChannelUpdate::DynamicVehicleParams(v) => self.dynamic_params.send(v).await.is_ok(),
        }
    }
}

fn subscribe<Ctx, T>(
    ctx: &Ctx,
    store: &Arc<SnapshotStore>,
    channel: Channel,
    wrap: fn(T) -> ChannelUpdate,
) -> mpsc::Sender<T>
where
    Ctx: LoopContext,
    T: Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<T>(CHANNEL_QUEUE_DEPTH);
    let store = Arc::clone(store);
    
    ctx.spawn(channel.topic(), async move {
        while let Some(value) = rx.recv().await {
            let seq = store.set(wrap(value));
            trace!(%channel, seq, "slot updated");
        }
        debug!(%channel, "producer channel closed");
    });
    
    tx
}

/// Subscribes all seven producer channels to the store.
pub fn subscribe_all<Ctx: LoopContext>(ctx: &Ctx, store: &Arc<SnapshotStore>) -> ProducerPorts {
    ProducerPorts {
        path_local: subscribe(ctx, store, Channel::PathLocal, ChannelUpdate::PathLocal),
        obstacles: subscribe(ctx, store, Channel::Obstacles, ChannelUpdate::Obstacles),
        trajectory_candidate: subscribe(ctx, store, Channel::TrajectoryCandidate, ChannelUpdate::TrajectoryCandidate),
        trajectory_selected: subscribe(ctx, store, Channel::TrajectorySelected, ChannelUpdate::TrajectorySelected),
        vehicle_state: subscribe(ctx, store, Channel::VehicleState, ChannelUpdate::VehicleState),
        static_params: subscribe(ctx, store, Channel::StaticVehicleParams, ChannelUpdate::StaticVehicleParams),
        dynamic_params: subscribe(ctx, store, Channel::DynamicVehicleParams, ChannelUpdate::DynamicVehicleParams),
    }
}

/// Forwards newline-delimited JSON updates to the producer ports.
///
/// Each line is one `{"channel": ..., "value": ...}` object. Malformed lines
/// are logged and skipped. Returns the number of updates forwarded once the
/// reader is exhausted.
pub async fn forward_json_lines<R>(reader: R, ports: ProducerPorts) -> usize
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("update stream read failed: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        
        match serde_json::from_str::<ChannelUpdate>(&line) {
            Ok(update) => {
                if !ports.publish(update).await {
                    break;
                }
                forwarded += 1;
            }
            Err(e) => warn!("skipping malformed update: {}", e),
        }
    }
    
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::VirtualContext;
    
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }
    
    #[tokio::test]
    async fn test_updates_reach_store() {
        let ctx = VirtualContext::new();
        let store = SnapshotStore::shared();
        let ports = subscribe_all(&ctx, &store);
        
        ports.vehicle_state.send(VehicleState { vx: 12.0, ..Default::default() }).await.unwrap();
        ports.dynamic_params.send(DynamicVehicleParams {
            friction_coefficient: 0.9,
            front_axle_load: 4000.0,
        }).await.unwrap();
        settle().await;
        
        let snap = store.snapshot();
        assert_eq!(snap.state.vx, 12.0);
        assert_eq!(snap.provenance.dynamic_params, 1);
        assert_eq!(snap.provenance.obstacles, 0);
    }
    
    #[tokio::test]
    async fn test_json_lines_forwarding() {
        let ctx = VirtualContext::new();
        let store = SnapshotStore::shared();
        let ports = subscribe_all(&ctx, &store);
        
        let input = concat!(
            r#"{"channel":"static_vehicle_params","value":{"length_front_offset":1.2,"length_rear_offset":1.5,"width":1.8}}"#, "\n",
            "garbage\n",
            "\n",
            r#"{"channel":"obstacles","value":{"s":[5.0],"d":[0.0],"radius":[1.0],"radius_margin":[1.5]}}"#, "\n",
        );
        
        let forwarded = forward_json_lines(input.as_bytes(), ports).await;
        settle().await;
        
        assert_eq!(forwarded, 2);
        assert_eq!(store.static_params().width, 1.8);
        assert_eq!(store.obstacles().len(), 1);
    }
}
