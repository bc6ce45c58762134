//! Three-channel PWM RGB LED.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use thiserror::Error;

use crate::actuator::RgbOutput;
use crate::color::Color;

/// Failure while driving the LED.
#[derive(Debug, Error)]
pub enum LedError<PWM, PIN> {
    /// A PWM channel rejected its duty cycle.
    #[error("PWM channel error: {0:?}")]
    Pwm(PWM),
    /// The power stabilizer enable pin could not be driven.
    #[error("LED enable pin error: {0:?}")]
    Enable(PIN),
}

/// An RGB LED on three PWM channels, with an optional power stabilizer.
///
/// Each channel's duty cycle is `component / 255` of the PWM period.
///
/// ## Type Parameters
///
/// - `PWM`: one [`SetDutyCycle`] channel per color
/// - `EN`: the [`OutputPin`] that enables the LED supply, if the board has one
#[derive(Debug)]
pub struct PwmRgbLed<PWM, EN>
where
    PWM: SetDutyCycle,
    EN: OutputPin,
{
    /// Red channel.
    pub red: PWM,
    /// Green channel.
    pub green: PWM,
    /// Blue channel.
    pub blue: PWM,
    /// Power stabilizer enable pin.
    pub enable: Option<EN>,
}

impl<PWM, EN> PwmRgbLed<PWM, EN>
where
    PWM: SetDutyCycle,
    EN: OutputPin,
{
    /// Wraps the three channels. The LED is not touched until the first color.
    pub fn new(red: PWM, green: PWM, blue: PWM, enable: Option<EN>) -> Self {
        Self {
            red,
            green,
            blue,
            enable,
        }
    }

    /// Switches the LED supply on. Does nothing without an enable pin.
    pub fn enable_power_stabilizer(&mut self) -> Result<(), LedError<PWM::Error, EN::Error>> {
        match self.enable {
            Some(ref mut pin) => pin.set_high().map_err(LedError::Enable),
            None => Ok(()),
        }
    }

    /// Switches the LED supply off. Does nothing without an enable pin.
    pub fn disable_power_stabilizer(&mut self) -> Result<(), LedError<PWM::Error, EN::Error>> {
        match self.enable {
            Some(ref mut pin) => pin.set_low().map_err(LedError::Enable),
            None => Ok(()),
        }
    }
}

impl<PWM, EN> RgbOutput for PwmRgbLed<PWM, EN>
where
    PWM: SetDutyCycle,
    EN: OutputPin,
{
    type Error = LedError<PWM::Error, EN::Error>;

    fn actuate(&mut self, color: Color) -> Result<(), Self::Error> {
        self.red
            .set_duty_cycle_fraction(u16::from(color.r), 255)
            .map_err(LedError::Pwm)?;
        self.green
            .set_duty_cycle_fraction(u16::from(color.g), 255)
            .map_err(LedError::Pwm)?;
        self.blue
            .set_duty_cycle_fraction(u16::from(color.b), 255)
            .map_err(LedError::Pwm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[derive(Debug, Default)]
    struct FakePwm {
        duty: u16,
    }

    impl ErrorType for FakePwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakePwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty = duty;
            Ok(())
        }
    }

    #[test]
    fn test_duty_cycle_is_proportional() {
        let mut led: PwmRgbLed<FakePwm, PinMock> =
            PwmRgbLed::new(FakePwm::default(), FakePwm::default(), FakePwm::default(), None);
        led.actuate(Color::new(255, 51, 0)).unwrap();
        assert_eq!(led.red.duty, 1000);
        assert_eq!(led.green.duty, 200);
        assert_eq!(led.blue.duty, 0);
    }

    #[test]
    fn test_power_stabilizer_toggles_pin() {
        let en = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
        ]);
        let mut led = PwmRgbLed::new(
            FakePwm::default(),
            FakePwm::default(),
            FakePwm::default(),
            Some(en),
        );
        led.enable_power_stabilizer().unwrap();
        led.disable_power_stabilizer().unwrap();
        let _ = led.enable.as_mut().map(|en| en.done());
    }

    #[test]
    fn test_missing_enable_pin_is_a_no_op() {
        let mut led: PwmRgbLed<FakePwm, PinMock> =
            PwmRgbLed::new(FakePwm::default(), FakePwm::default(), FakePwm::default(), None);
        assert!(led.enable_power_stabilizer().is_ok());
        assert!(led.disable_power_stabilizer().is_ok());
    }
}
