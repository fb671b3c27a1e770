//! Servo calibration tool
//!
//! Moves single servos by channel to find their pulse limits. Takes the same
//! arguments as the daemon (`-c <path>`, `--mock`).

use gismo::actuators::servo::{set_servo_angle, PulseRange};
use gismo::calibration::{CalibrationSession, ToolCommand, TOP_PROMPT};
use gismo::config::CliArgs;
use gismo::core::hal::PwmController;
use gismo::devices::create_device;
use gismo::{Error, Result};
use std::io::{self, BufRead, Write};

fn prompt(text: &str) -> Result<Option<String>> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn calibrate(pwm: &mut dyn PwmController, channel: u8, range: PulseRange) -> Result<PulseRange> {
    println!(
        "Calibrating servo on channel {}. Make sure the servo is not physically obstructed.",
        channel
    );
    println!("Enter 'u' to increase pulse width, 'd' to decrease, 's' to set current as a limit, 'q' to quit.");

    let mut session = CalibrationSession::new(channel, range);
    loop {
        pwm.set_duty_cycle(channel, session.duty(pwm.frequency()))?;

        let Some(line) = prompt(session.prompt())? else {
            break;
        };
        let reply = session.handle(&line);
        for text in &reply.lines {
            println!("{}", text);
        }
        if reply.finished {
            break;
        }
    }
    Ok(session.range())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = CliArgs::parse(std::env::args().skip(1)).load_config()?;
    let mut driver = create_device(&config)?;
    let mut hardware = driver.initialize()?;
    let pwm = hardware.pwm.as_mut();
    pwm.set_frequency(config.pca.frequency)?;

    println!("Servo Calibration Program");
    println!("Make sure your servos are connected to the PCA9685 board.");

    let mut range = PulseRange::new(config.servo.min_pulse_us, config.servo.max_pulse_us);
    while let Some(line) = prompt(TOP_PROMPT)? {
        match ToolCommand::parse(&line) {
            Ok(ToolCommand::Calibrate(channel)) => {
                range = calibrate(pwm, channel, range)?;
            }
            Ok(ToolCommand::Set { channel, angle }) => {
                match set_servo_angle(pwm, &range, channel, angle) {
                    Ok(()) => println!(
                        "Servo channel {} angle set to {} degrees (pulse width: {:.0})",
                        channel,
                        angle,
                        range.angle_to_pulse_us(angle)
                    ),
                    Err(Error::InvalidParameter(_)) => {
                        println!("Servo angle out of range (0-180)")
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(ToolCommand::Quit) => {
                println!("Exiting program.");
                break;
            }
            Err(Error::InvalidParameter(msg)) => println!("{}", msg),
            Err(e) => return Err(e),
        }
    }

    pwm.deinit()?;
    hardware.gpio.cleanup();
    Ok(())
}
