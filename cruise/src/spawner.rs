use bevy_ecs::prelude::*;
use bevy_log::{debug, warn};

use crate::{
    driver::{LaneOccupancy, Vehicle, VehicleClass, VehicleClasses},
    Id, SimulationClock,
};

/// Spawns vehicles of one class at the start of the lane at a regular interval
#[derive(Component)]
pub struct VehicleSpawner {
    pub class: Id<VehicleClass>,
    /// Vehicles spawned per second
    pub rate: f64,
    /// Time until next spawn
    pub timer: f64,
    /// Speed of spawned vehicles
    pub vehicle_speed: f64,
    /// Spread of the per-vehicle speed factor around 1.0
    pub speed_deviation: f64,
    /// Vehicles left to spawn; `None` spawns forever
    pub remaining: Option<u32>,
}

impl VehicleSpawner {
    pub fn new(class: Id<VehicleClass>, rate: f64) -> Self {
        Self {
            class,
            rate,
            timer: 0.0,
            vehicle_speed: 10.0,
            speed_deviation: 0.0,
            remaining: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.vehicle_speed = speed;
        self
    }

    pub fn with_speed_deviation(mut self, deviation: f64) -> Self {
        self.speed_deviation = deviation;
        self
    }

    pub fn with_limit(mut self, count: u32) -> Self {
        self.remaining = Some(count);
        self
    }
}

fn speed_factor(deviation: f64) -> f64 {
    let random = rand::random::<f64>() * 2.0 - 1.0;
    (1.0 + deviation * random).max(0.1)
}

pub fn spawn_vehicles(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    classes: Res<VehicleClasses>,
    occupancy: Res<LaneOccupancy>,
    mut spawners: Query<&mut VehicleSpawner>,
) {
    for mut spawner in &mut spawners {
        spawner.timer -= clock.step_length;
        if spawner.timer > 0.0 || spawner.remaining == Some(0) {
            continue;
        }

        let Some(class) = classes.get(spawner.class) else {
            warn!("spawner has unknown class {}", spawner.class);
            continue;
        };

        // Wait until the last vehicle has cleared the entry by its min gap
        let entry_clear = occupancy
            .vehicles
            .first()
            .map_or(true, |occ| occ.back() >= class.vtype.min_gap);
        if !entry_clear {
            continue;
        }

        spawner.timer = 1.0 / spawner.rate;
        if let Some(remaining) = spawner.remaining.as_mut() {
            *remaining -= 1;
        }

        let vehicle = Vehicle::new(spawner.class, 0.0, spawner.vehicle_speed)
            .with_speed_factor(speed_factor(spawner.speed_deviation));
        let entity = commands
            .spawn((vehicle, class.model.create_vehicle_state()))
            .id();
        debug!("spawned {entity} of class '{}'", class.vtype.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_factor_stays_within_deviation() {
        assert_eq!(speed_factor(0.0), 1.0);
        for _ in 0..1000 {
            let factor = speed_factor(0.1);
            assert!((0.9..=1.1).contains(&factor), "{factor}");
        }
    }
}
