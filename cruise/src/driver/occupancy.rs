use bevy_ecs::prelude::*;
use bevy_log::warn;

use crate::{
    driver::{Vehicle, VehicleClasses},
    SimTime, SimulationClock,
};

pub struct Occupant {
    pub vehicle: Entity,
    /// Front bumper position (m).
    pub position: f64,
    pub speed: f64,
    pub length: f64,
    pub decel: f64,
    /// Back gap (m) below which this vehicle counts as having collided with its leader.
    pub collision_gap: f64,
}

impl Occupant {
    pub fn back(&self) -> f64 {
        self.position - self.length
    }
}

/// Vehicles on the lane, ordered from the back of the lane to the front.
#[derive(Resource, Default)]
pub struct LaneOccupancy {
    pub vehicles: Vec<Occupant>,
}

impl LaneOccupancy {
    /// Returns the vehicle directly ahead of `entity` and the bumper-to-bumper
    /// distance to it, if it is within `range`.
    pub fn find_leader(&self, entity: Entity, range: f64) -> Option<(&Occupant, f64)> {
        let index = self.vehicles.iter().position(|occ| occ.vehicle == entity)?;
        let ego = &self.vehicles[index];
        let leader = self.vehicles.get(index + 1)?;

        let distance = leader.back() - ego.position;
        (distance <= range).then_some((leader, distance))
    }
}

pub fn update_occupancy(
    mut occupancy: ResMut<LaneOccupancy>,
    classes: Res<VehicleClasses>,
    vehicles: Query<(Entity, &Vehicle)>,
) {
    occupancy.vehicles.clear();

    for (entity, vehicle) in &vehicles {
        let Some(class) = classes.get(vehicle.class) else {
            warn!("vehicle {entity} has unknown class {}", vehicle.class);
            continue;
        };

        occupancy.vehicles.push(Occupant {
            vehicle: entity,
            position: vehicle.position,
            speed: vehicle.speed,
            length: class.vtype.length,
            decel: class.vtype.decel,
            collision_gap: class.vtype.min_gap * class.model.config().collision_min_gap_factor,
        });
    }

    occupancy
        .vehicles
        .sort_by(|a, b| a.position.total_cmp(&b.position).then(a.vehicle.cmp(&b.vehicle)));
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub follower: Entity,
    pub leader: Entity,
    pub gap: f64,
    pub time: SimTime,
}

#[derive(Resource, Default)]
pub struct Collisions {
    pub events: Vec<Collision>,
}

/// Records every follower that has come closer to its leader than its
/// collision gap allows.
pub fn detect_collisions(
    clock: Res<SimulationClock>,
    occupancy: Res<LaneOccupancy>,
    mut collisions: ResMut<Collisions>,
) {
    for pair in occupancy.vehicles.windows(2) {
        let (follower, leader) = (&pair[0], &pair[1]);
        let gap = leader.back() - follower.position;

        if gap < follower.collision_gap {
            warn!(
                "collision t={} follower={} leader={} gap={:.2}",
                clock.now.0, follower.vehicle, leader.vehicle, gap
            );
            collisions.events.push(Collision {
                follower: follower.vehicle,
                leader: leader.vehicle,
                gap,
                time: clock.now,
            });
        }
    }
}
