//! Boot-time peripheral bring-up for the sensor ADC, the three operator
//! buttons and the pump PWM outputs.
//!
//! Raw ESP-IDF sys calls; `main()` runs this once before the control loop.
//! The host build keeps the same surface with no-op bodies.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::config::NUM_CHANNELS;
#[cfg(target_os = "espidf")]
use crate::error::HwInitError;
use crate::error::Result;
use crate::pins;

/// Map an ESP-IDF return code onto `err` unless it is `ESP_OK`.
#[cfg(target_os = "espidf")]
fn esp_check(rc: esp_err_t, err: fn(i32) -> HwInitError) -> Result<()> {
    if rc == ESP_OK as i32 { Ok(()) } else { Err(err(rc).into()) }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<()> {
    // SAFETY: boot path, nothing else touches these peripherals yet.
    unsafe {
        init_adc()?;
        init_button_inputs()?;
        init_ledc()?;
    }
    info!("hw_init: sensors, buttons and pumps ready");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<()> {
    log::info!("hw_init(sim): no peripherals to configure");
    Ok(())
}

// ── Sensor ADC ────────────────────────────────────────────────

pub const ADC1_CH_LIGHT: u32 = pins::LIGHT_ADC_CHANNEL;
pub const ADC1_CH_SOIL: [u32; NUM_CHANNELS] = pins::SOIL_ADC_CHANNEL;

/// Reduce a 12-bit ADC1 reading to the 10-bit calibration domain.
pub const fn to_10bit(raw12: u16) -> u16 {
    let raw12 = if raw12 > 4095 { 4095 } else { raw12 };
    raw12 >> 2
}

#[cfg(target_os = "espidf")]
static mut SENSOR_ADC: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// Oneshot unit handle written by `init_adc`.
///
/// SAFETY: read only from the main loop, after boot init has returned.
#[cfg(target_os = "espidf")]
unsafe fn sensor_adc() -> adc_oneshot_unit_handle_t {
    unsafe { SENSOR_ADC }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<()> {
    let unit = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: the only write to SENSOR_ADC.
    esp_check(
        unsafe { adc_oneshot_new_unit(&unit, &raw mut SENSOR_ADC) },
        HwInitError::Adc,
    )?;

    // Full-scale 12 dB so a 3.3 V divider fits the 12-bit range.
    let input = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    for channel in core::iter::once(ADC1_CH_LIGHT).chain(ADC1_CH_SOIL) {
        esp_check(
            unsafe { adc_oneshot_config_channel(sensor_adc(), channel, &input) },
            HwInitError::Adc,
        )?;
    }

    info!("hw_init: light on ADC1 CH{}, soil on ADC1 CH{:?}", ADC1_CH_LIGHT, ADC1_CH_SOIL);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: see sensor_adc().
    match unsafe { adc_oneshot_read(sensor_adc(), channel, &mut raw) } {
        rc if rc == ESP_OK as i32 => raw.max(0) as u16,
        _ => 0,
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

/// Read one ADC1 channel scaled to 0-1023.
pub fn adc1_read_10bit(channel: u32) -> u16 {
    to_10bit(adc1_read(channel))
}

// ── Button inputs ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const BUTTON_GPIOS: [i32; 3] = [
    pins::BUTTON_ADVANCE_GPIO,
    pins::BUTTON_INCREMENT_GPIO,
    pins::BUTTON_DECREMENT_GPIO,
];

#[cfg(target_os = "espidf")]
unsafe fn init_button_inputs() -> Result<()> {
    // Buttons pull to ground; a press is the falling edge.
    let mask = BUTTON_GPIOS.iter().fold(0u64, |m, &pin| m | (1u64 << pin));
    let buttons = gpio_config_t {
        pin_bit_mask: mask,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    esp_check(unsafe { gpio_config(&buttons) }, HwInitError::Buttons)?;

    info!("hw_init: buttons on GPIO {:?}", BUTTON_GPIOS);
    Ok(())
}

// ── Pump PWM ─────────────────────────────────────────────────

/// LEDC channel driving each pump.
pub const LEDC_CH_PUMP: [u32; NUM_CHANNELS] = [0, 1, 2];

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<()> {
    // One shared timer drives every pump output.
    let pump_timer = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz: pins::PUMP_PWM_FREQ_HZ,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    esp_check(unsafe { ledc_timer_config(&pump_timer) }, HwInitError::Pwm)?;

    for (&channel, &gpio_num) in LEDC_CH_PUMP.iter().zip(&pins::PUMP_PWM_GPIO) {
        // Outputs come up at zero duty so no pump twitches during boot.
        let output = ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel,
            timer_sel: ledc_timer_t_LEDC_TIMER_0,
            gpio_num,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        esp_check(unsafe { ledc_channel_config(&output) }, HwInitError::Pwm)?;
    }

    info!("hw_init: pumps on LEDC CH{:?} at {} Hz", LEDC_CH_PUMP, pins::PUMP_PWM_FREQ_HZ);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u32, duty: u8) {
    // SAFETY: channel configured by init_ledc(); main loop is the only writer.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel, u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, channel);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set(_channel: u32, _duty: u8) {}

// ── Button interrupts ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::adapters::wake::notify_from_isr;
#[cfg(target_os = "espidf")]
use crate::app::commands::OperatorEvent;

#[cfg(target_os = "espidf")]
fn isr_now_ms() -> u32 {
    // SAFETY: plain counter read, allowed from ISR context.
    (unsafe { esp_timer_get_time() } / 1_000) as u32
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn advance_isr(_arg: *mut core::ffi::c_void) {
    notify_from_isr(OperatorEvent::Advance, isr_now_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn increment_isr(_arg: *mut core::ffi::c_void) {
    notify_from_isr(OperatorEvent::Increment, isr_now_ms());
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn decrement_isr(_arg: *mut core::ffi::c_void) {
    notify_from_isr(OperatorEvent::Decrement, isr_now_ms());
}

/// Hook each button's falling edge to its operator event.
/// Runs after `init_peripherals()`.
#[cfg(target_os = "espidf")]
pub fn init_isr_service() -> Result<()> {
    type Isr = unsafe extern "C" fn(*mut core::ffi::c_void);
    let handlers: [(i32, Isr); 3] = [
        (pins::BUTTON_ADVANCE_GPIO, advance_isr),
        (pins::BUTTON_INCREMENT_GPIO, increment_isr),
        (pins::BUTTON_DECREMENT_GPIO, decrement_isr),
    ];

    // ESP_ERR_INVALID_STATE: another component already installed the service.
    // SAFETY: handlers only push into the lock-free operator channel.
    let rc = unsafe { gpio_install_isr_service(0) };
    if rc != ESP_ERR_INVALID_STATE as i32 {
        esp_check(rc, HwInitError::IsrService)?;
    }

    for (gpio, handler) in handlers {
        // SAFETY: pin configured as input by init_button_inputs().
        unsafe {
            esp_check(
                gpio_isr_handler_add(gpio, Some(handler), core::ptr::null_mut()),
                HwInitError::IsrService,
            )?;
            gpio_intr_enable(gpio);
        }
    }

    info!("hw_init: button interrupts armed");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_isr_service() -> Result<()> {
    log::info!("hw_init(sim): buttons are injected with push_operator_event");
    Ok(())
}
