use std::time::Duration;

use bevy_app::App;
use bevy_ecs::prelude::*;
use bevy_time::Time;
use cruise::{
    driver::{Collisions, ControlMode, ControlState, Vehicle, VehicleClass, VehicleClasses},
    CruisePlugin, Id, Lane, VehicleSpawner, VehicleTypes,
};

const STEP: Duration = Duration::from_millis(100);

fn app(lane: Lane) -> (App, Id<VehicleClass>) {
    let types = VehicleTypes::from_toml_str(include_str!("../data/vehicle_types.toml")).unwrap();
    let classes = VehicleClasses::from_types(&types);
    let car = classes.find("acc_car").unwrap();

    let mut app = App::new();
    app.insert_resource(Time::<()>::default())
        .insert_resource(lane)
        .insert_resource(classes)
        .add_plugins(CruisePlugin);
    (app, car)
}

fn run(app: &mut App, seconds: u32) {
    for _ in 0..seconds * 10 {
        app.world_mut().resource_mut::<Time>().advance_by(STEP);
        app.update();
    }
}

fn spawn(app: &mut App, vehicle: Vehicle) -> Entity {
    app.world_mut()
        .spawn((vehicle, ControlState::default()))
        .id()
}

fn vehicle(app: &App, entity: Entity) -> &Vehicle {
    app.world().get::<Vehicle>(entity).unwrap()
}

fn mode(app: &App, entity: Entity) -> ControlMode {
    app.world().get::<ControlState>(entity).unwrap().mode
}

#[test]
fn lone_vehicle_settles_at_speed_limit() {
    let (mut app, car) = app(Lane::new(10_000.0, 22.2));
    let ego = spawn(&mut app, Vehicle::new(car, 0.0, 10.0));

    let mut previous = 10.0;
    for _ in 0..60 {
        run(&mut app, 1);
        let speed = vehicle(&app, ego).speed;
        assert!(speed >= previous);
        assert!(speed <= 22.2 + 1e-9);
        previous = speed;
    }

    assert!((vehicle(&app, ego).speed - 22.2).abs() < 0.01);
    assert_eq!(mode(&app, ego), ControlMode::SpeedControl);
}

#[test]
fn slow_speed_factor_cruises_below_limit() {
    let (mut app, car) = app(Lane::new(10_000.0, 22.2));
    let ego = spawn(&mut app, Vehicle::new(car, 0.0, 5.0).with_speed_factor(0.5));

    run(&mut app, 60);

    assert!((vehicle(&app, ego).speed - 11.1).abs() < 0.01);
    assert_eq!(mode(&app, ego), ControlMode::SpeedControl);
}

#[test]
fn follower_locks_onto_slow_leader() {
    let (mut app, car) = app(Lane::new(5_000.0, 22.2));
    let leader = spawn(
        &mut app,
        Vehicle::new(car, 150.0, 10.0).with_speed_factor(10.0 / 22.2),
    );
    let follower = spawn(&mut app, Vehicle::new(car, 0.0, 20.0));

    run(&mut app, 120);

    let (lead, follow) = (vehicle(&app, leader), vehicle(&app, follower));
    let distance = lead.position - 5.0 - follow.position;
    assert!(distance > 2.5, "distance {distance}");
    assert!(distance < 100.0, "distance {distance}");
    assert!((follow.speed - lead.speed).abs() < 0.5);
    assert_eq!(mode(&app, follower), ControlMode::GapControl);
    assert_eq!(mode(&app, leader), ControlMode::SpeedControl);
    assert!(app.world().resource::<Collisions>().events.is_empty());
}

#[test]
fn vehicle_stops_before_lane_end() {
    let (mut app, car) = app(Lane::new(200.0, 22.2).with_stop_at_end());
    let ego = spawn(&mut app, Vehicle::new(car, 0.0, 15.0));

    for _ in 0..60 {
        run(&mut app, 1);
        assert!(vehicle(&app, ego).position <= 200.0);
    }
    assert!(vehicle(&app, ego).speed < 0.1);
}

#[test]
fn spawner_fills_lane_without_collisions() {
    let (mut app, car) = app(Lane::new(5_000.0, 22.2));
    app.world_mut().spawn(
        VehicleSpawner::new(car, 0.5)
            .with_speed(15.0)
            .with_speed_deviation(0.1)
            .with_limit(5),
    );

    run(&mut app, 15);

    let mut vehicles = app.world_mut().query::<(&Vehicle, &ControlState)>();
    assert_eq!(vehicles.iter(app.world()).count(), 5);
    assert!(app.world().resource::<Collisions>().events.is_empty());
}

#[test]
fn vehicles_leave_at_lane_end() {
    let (mut app, car) = app(Lane::new(100.0, 22.2));
    spawn(&mut app, Vehicle::new(car, 90.0, 20.0));

    run(&mut app, 2);

    let mut vehicles = app.world_mut().query::<&Vehicle>();
    assert_eq!(vehicles.iter(app.world()).count(), 0);
}
