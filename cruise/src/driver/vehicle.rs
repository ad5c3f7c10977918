use bevy_ecs::prelude::*;

use crate::{driver::AccModel, Arena, Id, Lane, SimulationClock, VehicleType, VehicleTypes};

/// A vehicle class: kinematic limits plus the ACC model shared by its vehicles.
#[derive(Debug, Clone)]
pub struct VehicleClass {
    pub vtype: VehicleType,
    pub model: AccModel,
}

#[derive(Resource, Default)]
pub struct VehicleClasses {
    classes: Arena<VehicleClass>,
}

impl VehicleClasses {
    pub fn from_types(types: &VehicleTypes) -> Self {
        let mut classes = Self::default();
        for vtype in types.iter() {
            classes.insert(vtype.clone());
        }
        classes
    }

    pub fn insert(&mut self, vtype: VehicleType) -> Id<VehicleClass> {
        let model = AccModel::new(&vtype);
        self.classes.alloc(VehicleClass { vtype, model })
    }

    /// Registers a variant of `base` with its own parameters.
    pub fn derive(
        &mut self,
        base: Id<VehicleClass>,
        vtype: VehicleType,
    ) -> Option<Id<VehicleClass>> {
        let model = self.classes.get(base)?.model.duplicate(&vtype);
        Some(self.classes.alloc(VehicleClass { vtype, model }))
    }

    pub fn get(&self, id: Id<VehicleClass>) -> Option<&VehicleClass> {
        self.classes.get(id)
    }

    pub fn find(&self, vtype_id: &str) -> Option<Id<VehicleClass>> {
        self.classes
            .find(|class| class.vtype.id == vtype_id)
            .map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[derive(Component, Debug, Clone)]
pub struct Vehicle {
    pub class: Id<VehicleClass>,
    /// Front bumper position along the lane (m).
    pub position: f64,
    pub speed: f64,
    /// Individual multiplier on the lane speed limit.
    pub speed_factor: f64,
}

impl Vehicle {
    pub fn new(class: Id<VehicleClass>, position: f64, speed: f64) -> Self {
        Self {
            class,
            position,
            speed,
            speed_factor: 1.0,
        }
    }

    pub fn with_speed_factor(mut self, speed_factor: f64) -> Self {
        self.speed_factor = speed_factor;
        self
    }
}

pub fn move_and_despawn_vehicles(
    mut commands: Commands,
    clock: Res<SimulationClock>,
    lane: Res<Lane>,
    mut vehicles: Query<(Entity, &mut Vehicle)>,
) {
    for (entity, mut vehicle) in &mut vehicles {
        vehicle.position += vehicle.speed * clock.step_length;

        if !lane.stop_at_end && vehicle.position > lane.length {
            commands.entity(entity).despawn();
        }
    }
}
