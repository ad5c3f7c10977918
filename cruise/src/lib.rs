use bevy_app::prelude::*;
use bevy_ecs::prelude::*;

mod arena;
mod clock;
pub mod driver;
mod error;
mod kinematics;
mod lane;
mod spawner;
mod vtype;

pub use arena::*;
pub use clock::*;
pub use error::*;
pub use kinematics::*;
pub use lane::*;
pub use spawner::*;
pub use vtype::*;

use crate::driver::{
    apply_acc, detect_collisions, move_and_despawn_vehicles, update_occupancy, Collisions,
    LaneOccupancy, VehicleClasses,
};

/// Runs ACC-controlled vehicles on a [`Lane`].
///
/// The host inserts the `Lane`, a populated [`VehicleClasses`] and a
/// `bevy_time::Time` resource (usually through `TimePlugin`).
pub struct CruisePlugin;

impl Plugin for CruisePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SimulationClock>()
            .init_resource::<LaneOccupancy>()
            .init_resource::<Collisions>()
            .init_resource::<Lane>()
            .init_resource::<VehicleClasses>();

        app.add_systems(
            Update,
            (
                advance_clock,
                spawn_vehicles,
                update_occupancy,
                detect_collisions,
                apply_acc,
                move_and_despawn_vehicles,
            )
                .chain(),
        );
    }
}
