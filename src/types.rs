use serde::Deserialize;

use crate::error::PredictError;

// ---------- Request types ----------

/// Yes/No selector value. The form only ever sends these two strings;
/// anything else is rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Toggle {
    Yes,
    No,
}

impl Toggle {
    pub fn as_flag(self) -> u8 {
        match self {
            Toggle::Yes => 1,
            Toggle::No => 0,
        }
    }
}

/// Raw fields exactly as the form posts them, one request per button press.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub brand: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub ram_gb: u32,
    pub weight_kg: f64,
    pub touchscreen: Toggle,
    pub ips_display: Toggle,
    pub resolution: String,
    pub screen_size_in: f64,
    pub cpu_brand: String,
    pub hdd_gb: u32,
    pub ssd_gb: u32,
    pub gpu_brand: String,
    pub os: String,
}

// ---------- Feature derivation ----------

/// Split a "WxH" resolution string into pixel counts. Both sides must be
/// positive integers.
pub fn parse_resolution(s: &str) -> Result<(u32, u32), PredictError> {
    let bad = || PredictError::BadResolution(s.to_string());
    let mut parts = s.split('x');
    let (w, h) = match (parts.next(), parts.next(), parts.next()) {
        (Some(w), Some(h), None) => (w, h),
        _ => return Err(bad()),
    };
    let w: u32 = w.trim().parse().map_err(|_| bad())?;
    let h: u32 = h.trim().parse().map_err(|_| bad())?;
    if w == 0 || h == 0 {
        return Err(bad());
    }
    Ok((w, h))
}

/// Pixels per inch over the screen diagonal. The form bounds screen size
/// to [10, 20] inches; the derivation itself does not guard zero.
pub fn pixel_density(width_px: u32, height_px: u32, screen_size_in: f64) -> f64 {
    let w = width_px as f64;
    let h = height_px as f64;
    (w * w + h * h).sqrt() / screen_size_in
}

/// One positional value handed to the pipeline. Built only at the call
/// boundary; everywhere else the row stays a named struct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Text(&'a str),
    Num(f64),
}

/// The derived feature row the pipeline was fit on. Field order here and
/// in `cells` must match the training-time column order; the pipeline does
/// no schema validation, so a mismatch produces a wrong price, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub brand: String,
    pub type_name: String,
    pub ram_gb: u32,
    pub weight_kg: f64,
    pub touchscreen: u8,
    pub ips_display: u8,
    pub ppi: f64,
    pub cpu_brand: String,
    pub hdd_gb: u32,
    pub ssd_gb: u32,
    pub gpu_brand: String,
    pub os: String,
}

impl FeatureRow {
    /// Derive the model-facing row from raw request fields. No side effects.
    pub fn derive(req: &PredictionRequest) -> Result<Self, PredictError> {
        let (width_px, height_px) = parse_resolution(&req.resolution)?;
        let ppi = pixel_density(width_px, height_px, req.screen_size_in);

        Ok(Self {
            brand: req.brand.clone(),
            type_name: req.type_name.clone(),
            ram_gb: req.ram_gb,
            weight_kg: req.weight_kg,
            touchscreen: req.touchscreen.as_flag(),
            ips_display: req.ips_display.as_flag(),
            ppi,
            cpu_brand: req.cpu_brand.clone(),
            hdd_gb: req.hdd_gb,
            ssd_gb: req.ssd_gb,
            gpu_brand: req.gpu_brand.clone(),
            os: req.os.clone(),
        })
    }

    /// Positional form, in the training-time column order. Order is
    /// load-bearing.
    pub fn cells(&self) -> [Cell<'_>; 12] {
        [
            Cell::Text(&self.brand),
            Cell::Text(&self.type_name),
            Cell::Num(self.ram_gb as f64),
            Cell::Num(self.weight_kg),
            Cell::Num(self.touchscreen as f64),
            Cell::Num(self.ips_display as f64),
            Cell::Num(self.ppi),
            Cell::Text(&self.cpu_brand),
            Cell::Num(self.hdd_gb as f64),
            Cell::Num(self.ssd_gb as f64),
            Cell::Text(&self.gpu_brand),
            Cell::Text(&self.os),
        ]
    }
}
