//! JSON engine scenarios against the simulation driver.

use std::sync::Arc;

use gpio_bridge::adapters::sim::SimDriver;
use gpio_bridge::app::service::AppService;
use gpio_bridge::config::SystemConfig;
use gpio_bridge::pins;
use gpio_bridge::rpc::engine::RpcEngine;
use serde_json::{Value, json};

fn engine() -> RpcEngine<SimDriver> {
    let app = AppService::new(SimDriver::new(), &SystemConfig::default());
    RpcEngine::new(Arc::new(app))
}

fn call(engine: &RpcEngine<SimDriver>, req: Value) -> Value {
    let line = engine.dispatch_line(7, &req.to_string()).to_line();
    serde_json::from_str(&line).unwrap()
}

#[test]
fn cold_status_reports_every_pin_off() {
    let e = engine();
    let v = call(&e, json!({"op": "gpio_status"}));

    assert_eq!(v["success"], json!(true));
    let pins_obj = v["pins"].as_object().unwrap();
    assert_eq!(pins_obj.len(), pins::PIN_COUNT);
    assert!(pins_obj.values().all(|level| *level == json!(false)));
    assert_eq!(v["pwm"], json!({}));
    assert_eq!(v["modes"], json!({}));
}

#[test]
fn set_then_status_round_trip() {
    let e = engine();
    call(&e, json!({"op": "gpio_set", "gpio": 17, "state": true}));
    let v = call(&e, json!({"op": "gpio_status"}));
    assert_eq!(v["pins"]["17"], json!(true));
    assert_eq!(v["modes"]["17"], json!("output"));
}

#[test]
fn negative_duty_clamps_to_zero() {
    let e = engine();
    let v = call(&e, json!({"op": "gpio_pwm", "gpio": 12, "dutyCycle": -20}));
    assert_eq!(v["dutyCycle"], json!(0.0));

    let v = call(&e, json!({"op": "gpio_status"}));
    assert_eq!(v["pwm"]["12"], json!(0.0));
    assert_eq!(v["pins"]["12"], json!(false));
}

#[test]
fn pwm_to_input_via_mode_op() {
    let e = engine();
    call(&e, json!({"op": "gpio_pwm", "gpio": 18, "dutyCycle": 80}));
    let v = call(&e, json!({"op": "gpio_mode", "gpio": 18, "mode": "input"}));
    assert_eq!(v, json!({"success": true, "gpio": 18, "mode": "input"}));

    let v = call(&e, json!({"op": "gpio_status"}));
    assert_eq!(v["pwm"], json!({}));
    assert_eq!(v["modes"]["18"], json!("input"));
    assert_eq!(e.app().with_controller(|ctl| ctl.driver().active_generators()), 0);
}

#[test]
fn invalid_pin_reply() {
    let e = engine();
    assert_eq!(
        call(&e, json!({"op": "gpio_set", "gpio": 5, "state": true})),
        json!({"success": false, "error": "Invalid GPIO pin: 5", "kind": "invalid_pin"})
    );
    assert_eq!(
        call(&e, json!({"op": "gpio_pwm", "gpio": -3, "dutyCycle": 10}))["kind"],
        json!("invalid_pin")
    );
}

#[test]
fn wrong_field_types_are_invalid_parameter() {
    let e = engine();
    let v = call(&e, json!({"op": "gpio_set", "gpio": "17", "state": true}));
    assert_eq!(v["kind"], json!("invalid_parameter"));
    let v = call(&e, json!({"op": "gpio_pwm", "gpio": 18, "dutyCycle": "fast"}));
    assert_eq!(v["kind"], json!("invalid_parameter"));
}

#[test]
fn drive_then_stop_then_status() {
    let e = engine();
    call(&e, json!({"op": "motor_drive", "left": 50, "right": 50}));
    call(&e, json!({"op": "motor_stop"}));

    let v = call(&e, json!({"op": "motor_status"}));
    assert_eq!(v["success"], json!(true));
    assert_eq!(v["left"]["speed"], json!(0.0));
    assert_eq!(v["right"]["speed"], json!(0.0));

    let v = call(&e, json!({"op": "gpio_status"}));
    for pin in ["17", "27", "22", "23"] {
        assert_eq!(v["pins"][pin], json!(false), "GPIO {pin}");
    }
}
