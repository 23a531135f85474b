use serde::Deserialize;
use std::fs;

use crate::error::StartupError;

// Fixed option lists the form hard-codes; everything categorical comes from
// the reference dataset instead.
pub const RAM_GB: [u32; 9] = [2, 4, 6, 8, 12, 16, 24, 32, 64];
pub const HDD_GB: [u32; 6] = [0, 128, 256, 512, 1024, 2048];
pub const SSD_GB: [u32; 6] = [0, 8, 128, 256, 512, 1024];
pub const RESOLUTIONS: [&str; 9] = [
    "1920x1080",
    "1366x768",
    "1600x900",
    "3840x2160",
    "3200x1800",
    "2880x1800",
    "2560x1600",
    "2560x1440",
    "2304x1440",
];

/// One historical record. Only the categorical columns matter here; the
/// dataset is used solely to enumerate form options, never at predict time.
#[derive(Debug, Deserialize)]
pub struct LaptopRecord {
    pub brand: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub cpu_brand: String,
    pub gpu_brand: String,
    pub os: String,
}

pub struct ReferenceDataset {
    records: Vec<LaptopRecord>,
}

impl ReferenceDataset {
    pub fn load(path: &str) -> Result<Self, StartupError> {
        let text = fs::read_to_string(path).map_err(|source| StartupError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, StartupError> {
        let records: Vec<LaptopRecord> =
            serde_json::from_str(text).map_err(|source| StartupError::BadDataset { source })?;
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Unique values in first-seen order, like the original column enumeration.

    pub fn brands(&self) -> Vec<&str> {
        unique(self.records.iter().map(|r| r.brand.as_str()))
    }

    pub fn type_names(&self) -> Vec<&str> {
        unique(self.records.iter().map(|r| r.type_name.as_str()))
    }

    pub fn cpu_brands(&self) -> Vec<&str> {
        unique(self.records.iter().map(|r| r.cpu_brand.as_str()))
    }

    pub fn gpu_brands(&self) -> Vec<&str> {
        unique(self.records.iter().map(|r| r.gpu_brand.as_str()))
    }

    pub fn oses(&self) -> Vec<&str> {
        unique(self.records.iter().map(|r| r.os.as_str()))
    }
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
