use serde::{Deserialize, Serialize};

use crate::error::{GeffError, Result};

pub const NAME_TIME: &str = "t";
pub const NAME_SPACE_X: &str = "x";
pub const NAME_SPACE_Y: &str = "y";
pub const NAME_SPACE_Z: &str = "z";

pub const UNIT_SECONDS: &str = "seconds";
pub const UNIT_MICROMETERS: &str = "micrometers";
pub const UNIT_PIXELS: &str = "pixels";
pub const UNIT_MILLIMETERS: &str = "millimeters";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Time,
    Space,
}

/// One spatial or temporal dimension of the recorded data, with an optional
/// region of interest expressed as `[min, max]` bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AxisKind,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Axis {
    pub fn time(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AxisKind::Time,
            unit: unit.into(),
            min: None,
            max: None,
        }
    }

    pub fn space(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AxisKind::Space,
            unit: unit.into(),
            min: None,
            max: None,
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Result<Self> {
        if min > max {
            return Err(GeffError::InvalidAxis(format!(
                "min {min} is greater than max {max} on axis {:?}",
                self.name
            )));
        }
        self.min = Some(min);
        self.max = Some(max);
        Ok(self)
    }

    pub fn has_bounds(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    pub fn range(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some(max - min),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let expected_kind = match self.name.as_str() {
            NAME_TIME => AxisKind::Time,
            NAME_SPACE_X | NAME_SPACE_Y | NAME_SPACE_Z => AxisKind::Space,
            other => {
                return Err(GeffError::InvalidAxis(format!(
                    "unknown axis name {other:?}, expected one of \"t\", \"x\", \"y\", \"z\""
                )))
            }
        };
        if self.kind != expected_kind {
            return Err(GeffError::InvalidAxis(format!(
                "axis {:?} must have type {expected_kind:?}",
                self.name
            )));
        }
        if self.unit.is_empty() {
            return Err(GeffError::InvalidAxis(format!(
                "axis {:?} has an empty unit",
                self.name
            )));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(GeffError::InvalidAxis(format!(
                    "min {min} is greater than max {max} on axis {:?}",
                    self.name
                )));
            }
        }
        Ok(())
    }
}
