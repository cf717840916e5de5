//! Vehicle actions: start, stop, speed changes, horn, turbo and cargo

use garage_types::{ActionError, Vehicle, VehicleAction, VehicleKind};
use serde::Serialize;

const CAR_ACCEL: f64 = 10.0;
const CAR_BRAKE: f64 = 10.0;
const CAR_TOP_SPEED: f64 = 180.0;

const SPORTS_ACCEL: f64 = 15.0;
const SPORTS_TURBO_ACCEL: f64 = 40.0;
const SPORTS_BRAKE: f64 = 20.0;
const SPORTS_TOP_SPEED: f64 = 250.0;

const TRUCK_ACCEL: f64 = 8.0;
const TRUCK_BRAKE: f64 = 5.0;
const TRUCK_TOP_SPEED: f64 = 120.0;

/// Result of an accepted action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub message: String,
    /// Whether the vehicle state changed and needs persisting
    pub changed: bool,
}

impl ActionOutcome {
    fn changed(message: String) -> Self {
        Self {
            message,
            changed: true,
        }
    }

    fn unchanged(message: String) -> Self {
        Self {
            message,
            changed: false,
        }
    }
}

/// Apply an action to a vehicle.
///
/// The capability check runs first; on any error the vehicle is left untouched.
pub fn apply_action(vehicle: &mut Vehicle, action: VehicleAction) -> Result<ActionOutcome, ActionError> {
    if !vehicle.supports(&action) {
        return Err(unsupported(action));
    }

    let model = vehicle.model.clone();
    match action {
        VehicleAction::Start => {
            if vehicle.running {
                return Ok(ActionOutcome::unchanged(format!("{} is already running", model)));
            }
            vehicle.running = true;
            Ok(ActionOutcome::changed(format!("{} started", model)))
        }
        VehicleAction::Stop => {
            if !vehicle.running {
                return Ok(ActionOutcome::unchanged(format!("{} is already off", model)));
            }
            if vehicle.speed > 0.0 {
                return Err(ActionError::StillMoving(vehicle.speed));
            }
            vehicle.running = false;
            if let VehicleKind::SportsCar { turbo_engaged } = &mut vehicle.kind {
                *turbo_engaged = false;
            }
            Ok(ActionOutcome::changed(format!("{} turned off", model)))
        }
        VehicleAction::Accelerate => {
            if !vehicle.running {
                return Err(ActionError::NotRunning("accelerate"));
            }
            let (step, top) = acceleration(&vehicle.kind);
            let new_speed = (vehicle.speed + step).min(top);
            if new_speed == vehicle.speed {
                return Ok(ActionOutcome::unchanged(format!(
                    "{} is at top speed ({:.0} km/h)",
                    model, top
                )));
            }
            vehicle.speed = new_speed;
            Ok(ActionOutcome::changed(format!(
                "{} accelerated to {:.0} km/h",
                model, new_speed
            )))
        }
        VehicleAction::Brake => {
            if vehicle.speed <= 0.0 {
                return Ok(ActionOutcome::unchanged(format!("{} is already stopped", model)));
            }
            vehicle.speed = (vehicle.speed - braking(&vehicle.kind)).max(0.0);
            Ok(ActionOutcome::changed(format!(
                "{} slowed to {:.0} km/h",
                model, vehicle.speed
            )))
        }
        VehicleAction::Honk => {
            let sound = match vehicle.kind {
                VehicleKind::Car => "Beep beep!",
                VehicleKind::SportsCar { .. } => "Vrooom! Beep!",
                VehicleKind::Truck { .. } => "HOOOOONK!",
            };
            Ok(ActionOutcome::unchanged(format!("{}: {}", model, sound)))
        }
        VehicleAction::ToggleTurbo => {
            let running = vehicle.running;
            let VehicleKind::SportsCar { turbo_engaged } = &mut vehicle.kind else {
                return Err(unsupported(action));
            };
            if *turbo_engaged {
                *turbo_engaged = false;
                return Ok(ActionOutcome::changed(format!("{} turbo off", model)));
            }
            if !running {
                return Err(ActionError::NotRunning("engage the turbo"));
            }
            *turbo_engaged = true;
            Ok(ActionOutcome::changed(format!("{} turbo engaged", model)))
        }
        VehicleAction::LoadCargo(amount) => {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(ActionError::InvalidAmount(amount));
            }
            let VehicleKind::Truck {
                cargo_capacity,
                cargo_load,
            } = &mut vehicle.kind
            else {
                return Err(unsupported(action));
            };
            if *cargo_load + amount > *cargo_capacity {
                return Err(ActionError::OverCapacity {
                    load: *cargo_load,
                    amount,
                    capacity: *cargo_capacity,
                });
            }
            *cargo_load += amount;
            Ok(ActionOutcome::changed(format!(
                "{} loaded {} kg ({} / {} kg)",
                model, amount, cargo_load, cargo_capacity
            )))
        }
        VehicleAction::UnloadCargo(amount) => {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(ActionError::InvalidAmount(amount));
            }
            let VehicleKind::Truck {
                cargo_capacity,
                cargo_load,
            } = &mut vehicle.kind
            else {
                return Err(unsupported(action));
            };
            if amount > *cargo_load {
                return Err(ActionError::NotEnoughCargo {
                    load: *cargo_load,
                    amount,
                });
            }
            *cargo_load -= amount;
            Ok(ActionOutcome::changed(format!(
                "{} unloaded {} kg ({} / {} kg)",
                model, amount, cargo_load, cargo_capacity
            )))
        }
    }
}

fn unsupported(action: VehicleAction) -> ActionError {
    let required = match action {
        VehicleAction::ToggleTurbo => "sports cars",
        _ => "trucks",
    };
    ActionError::Unsupported {
        action: action.name(),
        required,
    }
}

/// Speed step and top speed for a kind. Trucks lose up to half their step at full load.
fn acceleration(kind: &VehicleKind) -> (f64, f64) {
    match *kind {
        VehicleKind::Car => (CAR_ACCEL, CAR_TOP_SPEED),
        VehicleKind::SportsCar { turbo_engaged } => {
            let step = if turbo_engaged {
                SPORTS_TURBO_ACCEL
            } else {
                SPORTS_ACCEL
            };
            (step, SPORTS_TOP_SPEED)
        }
        VehicleKind::Truck {
            cargo_capacity,
            cargo_load,
        } => {
            let ratio = if cargo_capacity > 0.0 {
                (cargo_load / cargo_capacity).clamp(0.0, 1.0)
            } else {
                0.0
            };
            (TRUCK_ACCEL * (1.0 - 0.5 * ratio), TRUCK_TOP_SPEED)
        }
    }
}

fn braking(kind: &VehicleKind) -> f64 {
    match kind {
        VehicleKind::Car => CAR_BRAKE,
        VehicleKind::SportsCar { .. } => SPORTS_BRAKE,
        VehicleKind::Truck { .. } => TRUCK_BRAKE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(kind: VehicleKind) -> Vehicle {
        let mut v = Vehicle::new("v1", "Test", kind);
        v.running = true;
        v
    }

    #[test]
    fn test_turbo_only_for_sports_cars() {
        let mut car = running(VehicleKind::Car);
        let err = apply_action(&mut car, VehicleAction::ToggleTurbo).unwrap_err();
        assert!(matches!(err, ActionError::Unsupported { .. }));

        let mut truck = running(VehicleKind::truck(100.0));
        assert!(apply_action(&mut truck, VehicleAction::ToggleTurbo).is_err());
    }

    #[test]
    fn test_cargo_only_for_trucks() {
        let mut car = running(VehicleKind::sports_car());
        let err = apply_action(&mut car, VehicleAction::LoadCargo(10.0)).unwrap_err();
        assert_eq!(
            err,
            ActionError::Unsupported {
                action: "load",
                required: "trucks"
            }
        );
    }

    #[test]
    fn test_accelerate_requires_running() {
        let mut v = Vehicle::new("v1", "Fusca", VehicleKind::Car);
        assert_eq!(
            apply_action(&mut v, VehicleAction::Accelerate),
            Err(ActionError::NotRunning("accelerate"))
        );
        assert_eq!(v.speed, 0.0);
    }

    #[test]
    fn test_accelerate_and_brake() {
        let mut v = running(VehicleKind::Car);
        apply_action(&mut v, VehicleAction::Accelerate).unwrap();
        apply_action(&mut v, VehicleAction::Accelerate).unwrap();
        assert_eq!(v.speed, 20.0);

        apply_action(&mut v, VehicleAction::Brake).unwrap();
        apply_action(&mut v, VehicleAction::Brake).unwrap();
        apply_action(&mut v, VehicleAction::Brake).unwrap();
        assert_eq!(v.speed, 0.0);
    }

    #[test]
    fn test_top_speed_is_capped() {
        let mut v = running(VehicleKind::Car);
        v.speed = 175.0;
        apply_action(&mut v, VehicleAction::Accelerate).unwrap();
        assert_eq!(v.speed, CAR_TOP_SPEED);
        let outcome = apply_action(&mut v, VehicleAction::Accelerate).unwrap();
        assert!(!outcome.changed);
    }

    #[test]
    fn test_turbo_boosts_acceleration() {
        let mut v = running(VehicleKind::sports_car());
        apply_action(&mut v, VehicleAction::ToggleTurbo).unwrap();
        apply_action(&mut v, VehicleAction::Accelerate).unwrap();
        assert_eq!(v.speed, SPORTS_TURBO_ACCEL);
    }

    #[test]
    fn test_turbo_needs_engine_but_can_always_be_turned_off() {
        let mut v = Vehicle::new("s1", "Maverick", VehicleKind::sports_car());
        assert!(apply_action(&mut v, VehicleAction::ToggleTurbo).is_err());

        v.kind = VehicleKind::SportsCar { turbo_engaged: true };
        apply_action(&mut v, VehicleAction::ToggleTurbo).unwrap();
        assert_eq!(v.kind, VehicleKind::SportsCar { turbo_engaged: false });
    }

    #[test]
    fn test_stop_requires_zero_speed() {
        let mut v = running(VehicleKind::sports_car());
        apply_action(&mut v, VehicleAction::ToggleTurbo).unwrap();
        v.speed = 30.0;
        assert_eq!(
            apply_action(&mut v, VehicleAction::Stop),
            Err(ActionError::StillMoving(30.0))
        );
        v.speed = 0.0;
        apply_action(&mut v, VehicleAction::Stop).unwrap();
        assert!(!v.running);
        assert_eq!(v.kind, VehicleKind::SportsCar { turbo_engaged: false });
    }

    #[test]
    fn test_load_cargo_respects_capacity() {
        let mut v = running(VehicleKind::truck(1000.0));
        apply_action(&mut v, VehicleAction::LoadCargo(600.0)).unwrap();
        let err = apply_action(&mut v, VehicleAction::LoadCargo(500.0)).unwrap_err();
        assert!(matches!(err, ActionError::OverCapacity { .. }));
        assert_eq!(v.kind, VehicleKind::Truck { cargo_capacity: 1000.0, cargo_load: 600.0 });

        assert_eq!(
            apply_action(&mut v, VehicleAction::LoadCargo(0.0)),
            Err(ActionError::InvalidAmount(0.0))
        );
        apply_action(&mut v, VehicleAction::LoadCargo(400.0)).unwrap();
        assert_eq!(v.kind, VehicleKind::Truck { cargo_capacity: 1000.0, cargo_load: 1000.0 });
    }

    #[test]
    fn test_unload_cargo() {
        let mut v = running(VehicleKind::Truck { cargo_capacity: 1000.0, cargo_load: 300.0 });
        assert!(apply_action(&mut v, VehicleAction::UnloadCargo(400.0)).is_err());
        apply_action(&mut v, VehicleAction::UnloadCargo(300.0)).unwrap();
        assert_eq!(v.kind, VehicleKind::Truck { cargo_capacity: 1000.0, cargo_load: 0.0 });
    }

    #[test]
    fn test_loaded_truck_accelerates_slower() {
        let mut empty = running(VehicleKind::truck(1000.0));
        let mut full = running(VehicleKind::Truck { cargo_capacity: 1000.0, cargo_load: 1000.0 });
        apply_action(&mut empty, VehicleAction::Accelerate).unwrap();
        apply_action(&mut full, VehicleAction::Accelerate).unwrap();
        assert_eq!(empty.speed, 8.0);
        assert_eq!(full.speed, 4.0);
    }

    #[test]
    fn test_honk_changes_nothing() {
        let mut v = Vehicle::new("c", "Scania", VehicleKind::truck(10.0));
        let before = v.clone();
        let outcome = apply_action(&mut v, VehicleAction::Honk).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.message.contains("HOOOOONK"));
        assert_eq!(v, before);
    }
}
