use std::fmt;

use serde::Deserialize;

/// One photo on the camera: the DCIM directory it lives in plus its file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteEntry {
    pub dir: String,
    pub file: String,
}

impl RemoteEntry {
    pub fn new(dir: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
        }
    }

    /// Flattened `"dir/file"` identifier, also the local relative path.
    pub fn id(&self) -> String {
        format!("{}/{}", self.dir, self.file)
    }

    /// Compare against a flattened identifier without allocating.
    pub fn matches_id(&self, id: &str) -> bool {
        id.split_once('/')
            .is_some_and(|(dir, file)| dir == self.dir && file == self.file)
    }
}

impl fmt::Display for RemoteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dir, self.file)
    }
}

/// Body of the status (`/v1/props`) endpoint. The camera sends many more
/// properties; only the ones the sync needs are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceStatus {
    #[serde(rename = "errCode")]
    pub err_code: i64,
    #[serde(rename = "errMsg", default)]
    pub err_msg: String,
    #[serde(default)]
    pub battery: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoDir {
    pub name: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Body of the photo-list (`/v1/photos`) endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoListResponse {
    #[serde(rename = "errCode")]
    pub err_code: i64,
    #[serde(rename = "errMsg", default)]
    pub err_msg: String,
    #[serde(default)]
    pub dirs: Vec<PhotoDir>,
}
