use core::convert::TryInto;
use core::fmt;
use std::net::Ipv4Addr;

use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::sys::EspError;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

#[derive(Debug)]
pub enum WifiError {
    /// SSID or password does not fit the driver's fixed-size fields
    Credentials(&'static str),
    ModemUnavailable,
    Driver(EspError),
    /// Association failed on every attempt
    Connect { attempts: u32, last: EspError },
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WifiError::Credentials(reason) => write!(f, "wifi credentials rejected: {}", reason),
            WifiError::ModemUnavailable => write!(f, "Wi-Fi modem unavailable"),
            WifiError::Driver(err) => write!(f, "wifi driver failed: {}", err),
            WifiError::Connect { attempts, last } => {
                write!(f, "wifi connect failed after {} attempts: {}", attempts, last)
            }
        }
    }
}

impl std::error::Error for WifiError {}

impl From<EspError> for WifiError {
    fn from(err: EspError) -> Self {
        WifiError::Driver(err)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StationSettings {
    pub ssid: &'static str,
    pub password: &'static str,
    pub attempts: u32,
    pub retry_delay_ms: u32,
}

/// Station-mode Wi-Fi, created only when a cycle has something to send.
pub struct WifiManager {
    modem: Option<Modem>,
    sys_loop: EspSystemEventLoop,
    nvs: Option<EspDefaultNvsPartition>,
    wifi: Option<BlockingWifi<EspWifi<'static>>>,
    network_active: bool,
}

impl WifiManager {
    pub fn new(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Self {
        Self {
            modem: Some(modem),
            sys_loop,
            nvs,
            wifi: None,
            network_active: false,
        }
    }

    pub fn is_network_active(&self) -> bool {
        self.network_active
    }

    fn ensure_wifi(&mut self) -> Result<&mut BlockingWifi<EspWifi<'static>>, WifiError> {
        if self.wifi.is_none() {
            let Some(modem) = self.modem.take() else {
                return Err(WifiError::ModemUnavailable);
            };
            let esp_wifi = EspWifi::new(modem, self.sys_loop.clone(), self.nvs.take())?;
            let blocking = BlockingWifi::wrap(esp_wifi, self.sys_loop.clone())?;
            self.wifi = Some(blocking);
        }
        self.wifi.as_mut().ok_or(WifiError::ModemUnavailable)
    }

    /// Associate with the configured network and wait for an address.
    pub fn connect_station(&mut self, settings: &StationSettings) -> Result<Ipv4Addr, WifiError> {
        let ssid = settings
            .ssid
            .try_into()
            .map_err(|_| WifiError::Credentials("SSID too long (max 32)"))?;
        let (auth_method, password) = if settings.password.is_empty() {
            (AuthMethod::None, Default::default())
        } else {
            (
                AuthMethod::WPA2Personal,
                settings
                    .password
                    .try_into()
                    .map_err(|_| WifiError::Credentials("password too long (max 64)"))?,
            )
        };

        let wifi = self.ensure_wifi()?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            bssid: None,
            auth_method,
            password,
            channel: None,
            ..Default::default()
        }))?;
        wifi.start()?;

        log::info!("Connecting to Wi-Fi SSID {}", settings.ssid);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match wifi.connect() {
                Ok(()) => break,
                Err(err) if attempt >= settings.attempts => {
                    return Err(WifiError::Connect {
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    log::warn!("Wi-Fi attempt {} failed: {}", attempt, err);
                    FreeRtos::delay_ms(settings.retry_delay_ms);
                }
            }
        }
        wifi.wait_netif_up()?;

        let ip = wifi.wifi().sta_netif().get_ip_info()?.ip;
        log::info!("WiFi connected. IP address: {}", ip);
        self.network_active = true;
        Ok(ip)
    }

    pub fn stop(&mut self) {
        if let Some(wifi) = self.wifi.as_mut() {
            let _ = wifi.disconnect();
            let _ = wifi.stop();
        }
        self.network_active = false;
    }
}
