//! Telegram Bot API transport.
//!
//! Brings the network up on first use, then posts `sendMessage` over TLS
//! verified against the ESP-IDF certificate bundle.

use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::http::Headers;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use esp_idf_svc::sntp::EspSntp;
use serde::{Deserialize, Serialize};

use letterbox_core::Notifier;

use crate::time_sync;
use crate::wifi_manager::{StationSettings, WifiError, WifiManager};

const API_BASE: &str = "https://api.telegram.org";

/// Replies are a few hundred bytes; anything larger is not worth reading.
const MAX_REPLY_BYTES: usize = 4 * 1024;

#[derive(Debug)]
pub enum TelegramError {
    Network(WifiError),
    Http(String),
    Io(String),
    Encode(String),
    /// The API answered but refused the message
    Rejected { status: u16, description: String },
}

impl core::fmt::Display for TelegramError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TelegramError::Network(err) => write!(f, "network unavailable: {}", err),
            TelegramError::Http(msg) => write!(f, "http: {}", msg),
            TelegramError::Io(msg) => write!(f, "io: {}", msg),
            TelegramError::Encode(msg) => write!(f, "encode: {}", msg),
            TelegramError::Rejected {
                status,
                description,
            } => write!(f, "rejected (HTTP {}): {}", status, description),
        }
    }
}

impl std::error::Error for TelegramError {}

#[derive(Debug, Clone, Copy)]
pub struct BotSettings {
    pub token: &'static str,
    pub chat_id: &'static str,
    pub station: StationSettings,
    pub time_sync_budget_ms: u32,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    wifi: WifiManager,
    sntp: Option<EspSntp<'static>>,
    settings: BotSettings,
}

impl TelegramNotifier {
    pub fn new(wifi: WifiManager, settings: BotSettings) -> Self {
        Self {
            wifi,
            sntp: None,
            settings,
        }
    }

    fn bring_up(&mut self) -> Result<(), TelegramError> {
        if !self.wifi.is_network_active() {
            self.wifi
                .connect_station(&self.settings.station)
                .map_err(TelegramError::Network)?;
        }
        if self.sntp.is_none() {
            let sntp = time_sync::sync_clock(self.settings.time_sync_budget_ms)
                .map_err(|e| TelegramError::Network(WifiError::Driver(e)))?;
            self.sntp = Some(sntp);
        }
        Ok(())
    }

    fn post(&mut self, text: &str) -> Result<(), TelegramError> {
        let body = serde_json::to_vec(&SendMessage {
            chat_id: self.settings.chat_id,
            text,
        })
        .map_err(|e| TelegramError::Encode(format!("{:?}", e)))?;

        let config = HttpConfiguration {
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn =
            EspHttpConnection::new(&config).map_err(|e| TelegramError::Http(format!("{:?}", e)))?;
        let mut client = HttpClient::wrap(conn);

        let url = format!("{}/bot{}/sendMessage", API_BASE, self.settings.token);
        let content_length = body.len().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("content-length", content_length.as_str()),
        ];

        let mut request = client
            .post(&url, &headers)
            .map_err(|e| TelegramError::Http(format!("{:?}", e)))?;
        request
            .write_all(&body)
            .map_err(|e| TelegramError::Io(format!("{:?}", e)))?;
        request
            .flush()
            .map_err(|e| TelegramError::Io(format!("{:?}", e)))?;

        let mut response = request
            .submit()
            .map_err(|e| TelegramError::Http(format!("{:?}", e)))?;
        let status = response.status();

        let content_length = response.content_len().unwrap_or(0) as usize;
        let mut reply = Vec::with_capacity(content_length.clamp(256, MAX_REPLY_BYTES));
        let mut buf = [0u8; 512];
        loop {
            let read = response
                .read(&mut buf)
                .map_err(|e| TelegramError::Io(format!("{:?}", e)))?;
            if read == 0 || reply.len() + read > MAX_REPLY_BYTES {
                break;
            }
            reply.extend_from_slice(&buf[..read]);
        }

        match serde_json::from_slice::<ApiReply>(&reply) {
            Ok(ApiReply { ok: true, .. }) if status == 200 => Ok(()),
            Ok(ApiReply { description, .. }) => Err(TelegramError::Rejected {
                status,
                description: description.unwrap_or_default(),
            }),
            Err(_) => Err(TelegramError::Rejected {
                status,
                description: String::from_utf8_lossy(&reply).into_owned(),
            }),
        }
    }

    /// Drop the network before sleeping.
    pub fn shutdown(&mut self) {
        self.sntp = None;
        self.wifi.stop();
    }
}

impl Notifier for TelegramNotifier {
    type Error = TelegramError;

    fn send(&mut self, text: &str) -> Result<(), TelegramError> {
        self.bring_up()?;
        self.post(text)?;
        log::info!("Message sent!");
        Ok(())
    }
}
