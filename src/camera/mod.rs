//! HTTP client for the camera's WiFi photo API.
//!
//! Endpoints, relative to the base URL (`http://192.168.0.1` on the device's
//! own access point):
//! - `GET  /v1/props`            status, battery level
//! - `GET  /v1/photos`           directory/file tree
//! - `GET  /v1/photos/<d>/<f>`   raw image bytes
//! - `POST /v1/device/finish`    end of session

pub mod error;
pub mod types;

pub use error::CameraError;
pub use types::{DeviceStatus, PhotoDir, RemoteEntry};

use std::time::Duration;

use reqwest::{Client, Response};
use serde_json::json;

use self::types::PhotoListResponse;

const STATUS_PATH: &str = "/v1/props";
const PHOTOS_PATH: &str = "/v1/photos";
const FINISH_PATH: &str = "/v1/device/finish";

/// Photos are not listed or fetched below this charge level.
pub const MIN_BATTERY_PERCENT: u32 = 15;

/// Connectivity checks must fail fast while the WiFi link is still down;
/// list and fetch requests are left unbounded.
const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct CameraClient {
    http: Client,
    base_url: String,
}

fn is_success_code(code: i64) -> bool {
    (200..300).contains(&code)
}

impl CameraClient {
    pub fn new(base_url: &str) -> Result<Self, CameraError> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn photo_url(&self, entry: &RemoteEntry) -> String {
        format!("{}{}/{}/{}", self.base_url, PHOTOS_PATH, entry.dir, entry.file)
    }

    async fn checked_get(&self, url: &str) -> Result<Response, CameraError> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(CameraError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// Lightweight reachability check: any HTTP success counts, the body is
    /// not inspected.
    pub async fn ping(&self) -> Result<(), CameraError> {
        let url = self.endpoint(STATUS_PATH);
        let response = self.http.get(&url).timeout(PING_TIMEOUT).send().await?;
        if !response.status().is_success() {
            return Err(CameraError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(())
    }

    /// Fetch and validate the device status.
    pub async fn status(&self) -> Result<DeviceStatus, CameraError> {
        let status: DeviceStatus = self
            .checked_get(&self.endpoint(STATUS_PATH))
            .await?
            .json()
            .await?;
        if !is_success_code(status.err_code) {
            return Err(CameraError::Api {
                code: status.err_code,
                message: status.err_msg,
            });
        }
        Ok(status)
    }

    /// Fetch the photo tree in the camera's own order.
    pub async fn list_photos(&self) -> Result<Vec<PhotoDir>, CameraError> {
        let list: PhotoListResponse = self
            .checked_get(&self.endpoint(PHOTOS_PATH))
            .await?
            .json()
            .await?;
        if !is_success_code(list.err_code) {
            return Err(CameraError::Api {
                code: list.err_code,
                message: list.err_msg,
            });
        }
        Ok(list.dirs)
    }

    /// Start downloading one photo; the caller streams the body.
    pub async fn get_photo(&self, entry: &RemoteEntry) -> Result<Response, CameraError> {
        self.checked_get(&self.photo_url(entry)).await
    }

    /// Tell the camera the session is over (it shuts its WiFi down).
    pub async fn finish(&self) -> Result<(), CameraError> {
        let url = self.endpoint(FINISH_PATH);
        let response = self.http.post(&url).json(&json!({})).send().await?;
        if !response.status().is_success() {
            return Err(CameraError::HttpStatus {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(())
    }
}

/// Refuse to start a transfer on a nearly flat battery. A status without a
/// battery field is allowed through.
pub fn check_battery(status: &DeviceStatus) -> Result<(), CameraError> {
    match status.battery {
        Some(level) if level < MIN_BATTERY_PERCENT => Err(CameraError::LowBattery {
            level,
            min: MIN_BATTERY_PERCENT,
        }),
        Some(level) => {
            tracing::info!("Camera battery at {}%", level);
            Ok(())
        }
        None => {
            tracing::warn!("Camera did not report a battery level");
            Ok(())
        }
    }
}
