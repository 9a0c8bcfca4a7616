use esp_idf_svc::hal::adc::attenuation::DB_11;
use esp_idf_svc::hal::adc::oneshot::config::{AdcChannelConfig, Calibration};
use esp_idf_svc::hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_svc::hal::adc::ADC1;
use esp_idf_svc::hal::gpio::Gpio36;
use esp_idf_svc::sys::EspError;

use letterbox_core::AnalogSource;

/// Battery sense pin (ADC1 channel 0), read as calibrated millivolts.
pub struct AdcBattery<'d> {
    channel: AdcChannelDriver<'d, Gpio36, AdcDriver<'d, ADC1>>,
}

impl<'d> AdcBattery<'d> {
    pub fn new(adc: ADC1, pin: Gpio36) -> Result<Self, EspError> {
        let driver = AdcDriver::new(adc)?;
        // 11 dB covers the ~0-3.1 V range the divider feeds in.
        let config = AdcChannelConfig {
            attenuation: DB_11,
            calibration: Calibration::Line,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(driver, pin, &config)?;
        Ok(Self { channel })
    }
}

impl AnalogSource for AdcBattery<'_> {
    fn read_millivolts(&mut self) -> u32 {
        match self.channel.read() {
            Ok(millivolts) => u32::from(millivolts),
            Err(err) => {
                log::warn!("Battery ADC read failed: {}", err);
                0
            }
        }
    }
}
