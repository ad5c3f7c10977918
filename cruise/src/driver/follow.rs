//! Drives every vehicle on the lane with its class's ACC model.
//!
//! Units:
//! - Distance: meters (m)
//! - Speed: meters per second (m/s)
//! - Time: seconds (s)

use bevy_ecs::prelude::*;
use bevy_log::{debug_span, warn};

use crate::{
    driver::{
        desired_free_flow_speed, ControlState, LaneOccupancy, StepInput, Vehicle, VehicleClasses,
    },
    EulerKinematics, Kinematics, Lane, SimulationClock,
};

pub fn apply_acc(
    clock: Res<SimulationClock>,
    lane: Res<Lane>,
    classes: Res<VehicleClasses>,
    occupancy: Res<LaneOccupancy>,
    mut vehicles: Query<(Entity, &mut Vehicle, &mut ControlState)>,
) {
    for (entity, mut vehicle, mut state) in &mut vehicles {
        let Some(class) = classes.get(vehicle.class) else {
            warn!("vehicle {entity} has unknown class {}", vehicle.class);
            continue;
        };
        let _span = debug_span!("acc", vehicle = %entity).entered();

        let model = &class.model;
        let kinematics = EulerKinematics::new(&class.vtype, clock.step_length);
        let min_gap = class.vtype.min_gap;

        let input = StepInput {
            speed: vehicle.speed,
            leader_speed: 0.0,
            gap: f64::INFINITY,
            leader_max_decel: 0.0,
            desired_speed: desired_free_flow_speed(
                lane.speed_limit * vehicle.speed_factor,
                class.vtype.max_speed,
            ),
            min_gap,
            action_step_length: clock.step_length,
            now: clock.now,
        };

        let mut speed = match occupancy.find_leader(entity, model.interaction_range()) {
            Some((leader, distance)) => {
                let input = StepInput {
                    leader_speed: leader.speed,
                    gap: distance - min_gap,
                    leader_max_decel: leader.decel,
                    ..input
                };
                model.follow_speed(&mut state, &input, &kinematics)
            }
            None => model.free_speed(&input, &kinematics),
        };

        if lane.stop_at_end {
            let gap = lane.distance_to_end(vehicle.position);
            speed = speed.min(model.stop_speed(
                vehicle.speed,
                gap,
                clock.step_length,
                &kinematics,
            ));
        }

        vehicle.speed = speed.min(kinematics.max_next_speed(vehicle.speed));
    }
}
