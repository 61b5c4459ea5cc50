//! Pump motor driver (logic-level MOSFET, one per channel).
//!
//! Variable-speed control through any [`SetDutyCycle`] PWM output.  On
//! the board each pump sits on its own LEDC channel ([`LedcPwm`]); tests
//! and the simulation can pass any other implementation.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: [`LedcPwm`] writes the LEDC duty register via hw_init.
//! On host/test: [`LedcPwm`] records the last duty in memory only.

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

/// Full-scale duty of the 8-bit LEDC timers.
pub const PWM_MAX_DUTY: u16 = (1 << pins::PWM_RESOLUTION_BITS) - 1;

/// Convert a 0-100 % duty to the 8-bit PWM scale, truncating.
pub const fn percent_to_pwm(duty: u8) -> u16 {
    let duty = if duty > 100 { 100 } else { duty };
    duty as u16 * PWM_MAX_DUTY / 100
}

// ── LEDC output ───────────────────────────────────────────────

/// One LEDC channel as an `embedded-hal` PWM output.
#[derive(Debug)]
pub struct LedcPwm {
    channel: u32,
    last_duty: u16,
}

impl LedcPwm {
    pub fn new(channel: u32) -> Self {
        Self { channel, last_duty: 0 }
    }

    /// Last raw duty written (0-255).
    pub fn last_duty(&self) -> u16 {
        self.last_duty
    }
}

impl ErrorType for LedcPwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for LedcPwm {
    fn max_duty_cycle(&self) -> u16 {
        PWM_MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let duty = duty.min(PWM_MAX_DUTY);
        hw_init::ledc_set(self.channel, duty as u8);
        self.last_duty = duty;
        Ok(())
    }
}

// ── Driver ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpState {
    Stopped,
    Running { duty: u8 },
}

pub struct PumpDriver<P: SetDutyCycle> {
    pwm: P,
    state: PumpState,
}

impl<P: SetDutyCycle> PumpDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, state: PumpState::Stopped }
    }

    /// Drive the pump at `duty` percent; 0 stops it.
    pub fn set(&mut self, duty: u8) -> Result<(), ActuatorError> {
        let duty = duty.min(100);
        if duty == 0 {
            return self.stop();
        }
        self.write(percent_to_pwm(duty))?;
        self.state = PumpState::Running { duty };
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.state = PumpState::Stopped;
        self.write(0)
    }

    fn write(&mut self, pwm_duty: u16) -> Result<(), ActuatorError> {
        // Rescale in case the output is not 8-bit.
        let max = self.pwm.max_duty_cycle();
        let scaled = (pwm_duty as u32 * max as u32 / PWM_MAX_DUTY as u32) as u16;
        self.pwm
            .set_duty_cycle(scaled)
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }

    pub fn state(&self) -> PumpState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, PumpState::Stopped)
    }

    pub fn current_duty(&self) -> u8 {
        match self.state {
            PumpState::Running { duty } => duty,
            PumpState::Stopped => 0,
        }
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
