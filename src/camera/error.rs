use thiserror::Error;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera API error: {message} (code: {code})")]
    Api { code: i64, message: String },

    #[error("HTTP error {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Battery at {level}%, at least {min}% is required")]
    LowBattery { level: u32, min: u32 },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
