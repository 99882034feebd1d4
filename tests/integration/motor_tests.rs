//! Integration tests for differential drive over the L298N wiring.

use gpio_bridge::app::commands::AppCommand;
use gpio_bridge::app::controller::PinMode;
use gpio_bridge::app::responses::AppResponse;
use gpio_bridge::error::{DriverError, Error};
use gpio_bridge::pins::{
    MOTOR_LEFT_BACKWARD, MOTOR_LEFT_ENABLE, MOTOR_LEFT_FORWARD, MOTOR_RIGHT_BACKWARD,
    MOTOR_RIGHT_ENABLE, MOTOR_RIGHT_FORWARD,
};

use crate::mock_hw::{DriverCall, Op, make_app, with_mock};

#[test]
fn spin_in_place_sets_directions_and_duties() {
    let app = make_app();
    let resp = app
        .handle_command(AppCommand::Drive {
            left: 70,
            right: -70,
        })
        .unwrap();
    assert_eq!(
        resp,
        AppResponse::Drive {
            left: 70,
            right: -70
        }
    );

    with_mock(&app, |hw| {
        assert_eq!(hw.last_level(MOTOR_LEFT_FORWARD), Some(true));
        assert_eq!(hw.last_level(MOTOR_LEFT_BACKWARD), Some(false));
        assert_eq!(hw.last_duty(MOTOR_LEFT_ENABLE), Some(70.0));
        assert_eq!(hw.last_level(MOTOR_RIGHT_FORWARD), Some(false));
        assert_eq!(hw.last_level(MOTOR_RIGHT_BACKWARD), Some(true));
        assert_eq!(hw.last_duty(MOTOR_RIGHT_ENABLE), Some(70.0));
    });
}

#[test]
fn emergency_stop_after_drive() {
    let app = make_app();
    app.handle_command(AppCommand::Drive {
        left: 50,
        right: 50,
    })
    .unwrap();
    assert_eq!(
        app.handle_command(AppCommand::StopMotors).unwrap(),
        AppResponse::Stopped
    );

    with_mock(&app, |hw| {
        for pin in [
            MOTOR_LEFT_FORWARD,
            MOTOR_LEFT_BACKWARD,
            MOTOR_RIGHT_FORWARD,
            MOTOR_RIGHT_BACKWARD,
        ] {
            assert_eq!(hw.last_level(pin), Some(false), "GPIO {pin}");
        }
        assert_eq!(hw.last_duty(MOTOR_LEFT_ENABLE), Some(0.0));
        assert_eq!(hw.last_duty(MOTOR_RIGHT_ENABLE), Some(0.0));
        // Generators are reused, not restarted.
        assert_eq!(
            hw.count(|c| matches!(c, DriverCall::PwmStart { .. })),
            2
        );
    });
}

#[test]
fn emergency_stop_from_cold_board() {
    let app = make_app();
    app.handle_command(AppCommand::StopMotors).unwrap();

    app.with_controller(|ctl| {
        assert_eq!(ctl.mode(MOTOR_LEFT_ENABLE), PinMode::Pwm);
        assert_eq!(ctl.mode(MOTOR_RIGHT_ENABLE), PinMode::Pwm);
        assert_eq!(ctl.mode(MOTOR_RIGHT_BACKWARD), PinMode::Output);
    });
    with_mock(&app, |hw| {
        assert_eq!(hw.last_duty(MOTOR_LEFT_ENABLE), Some(0.0));
        assert_eq!(hw.last_duty(MOTOR_RIGHT_ENABLE), Some(0.0));
    });
}

#[test]
fn emergency_stop_attempts_every_pin_despite_a_fault() {
    let app = make_app();
    with_mock(&app, |hw| hw.fail_on(Op::Write, MOTOR_LEFT_FORWARD));

    let res = app.handle_command(AppCommand::StopMotors);
    assert_eq!(
        res,
        Err(Error::HardwareFault(DriverError::Io(MOTOR_LEFT_FORWARD)))
    );

    with_mock(&app, |hw| {
        assert_eq!(hw.last_level(MOTOR_LEFT_BACKWARD), Some(false));
        assert_eq!(hw.last_duty(MOTOR_LEFT_ENABLE), Some(0.0));
        assert_eq!(hw.last_duty(MOTOR_RIGHT_ENABLE), Some(0.0));
    });
}

#[test]
fn drive_fault_on_left_leaves_right_untouched() {
    let app = make_app();
    with_mock(&app, |hw| hw.fail_on(Op::PwmStart, MOTOR_LEFT_ENABLE));

    assert!(matches!(
        app.handle_command(AppCommand::Drive {
            left: 30,
            right: 30
        }),
        Err(Error::HardwareFault(_))
    ));
    with_mock(&app, |hw| {
        assert_eq!(hw.last_level(MOTOR_RIGHT_FORWARD), None);
        assert_eq!(hw.last_duty(MOTOR_RIGHT_ENABLE), None);
    });
}

#[test]
fn motor_status_follows_enable_duty() {
    let app = make_app();
    app.handle_command(AppCommand::Drive {
        left: -250,
        right: 15,
    })
    .unwrap();

    let Ok(AppResponse::Motors(status)) = app.handle_command(AppCommand::MotorStatus) else {
        panic!("expected motor status");
    };
    assert_eq!(status.left.enable_pin, MOTOR_LEFT_ENABLE);
    assert_eq!(status.left.speed, 100.0);
    assert_eq!(status.right.speed, 15.0);
}
