use serde_json::Value;
use tracing::debug;

use crate::axis::Axis;
use crate::error::{GeffError, Result};
use crate::store::{normalize_path, BlockStore};
use crate::version;

/// Top-level key of the GEFF entry in the group attribute document
/// (schema 0.2 and newer).
pub const GEFF_ATTRIBUTE: &str = "geff";

const VERSION_KEY: &str = "geff_version";
const DIRECTED_KEY: &str = "directed";
const AXES_KEY: &str = "axes";

/// Group-level metadata: schema version, directedness, and the ordered
/// axis list.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub geff_version: String,
    pub directed: bool,
    pub axes: Option<Vec<Axis>>,
}

impl Metadata {
    pub fn new(geff_version: impl Into<String>, directed: bool) -> Self {
        Self {
            geff_version: geff_version.into(),
            directed,
            axes: None,
        }
    }

    pub fn with_axes(mut self, axes: Vec<Axis>) -> Self {
        self.axes = Some(axes);
        self
    }

    pub fn validate(&self) -> Result<()> {
        version::check_supported(&self.geff_version)?;
        if let Some(axes) = &self.axes {
            for axis in axes {
                axis.validate()?;
            }
        }
        Ok(())
    }
}

/// Reads and validates the metadata document of a group. The version gate
/// runs before any other field is touched, so an unsupported group is
/// rejected without opening datasets.
pub fn read_metadata<S: BlockStore + ?Sized>(store: &S, group: &str) -> Result<Metadata> {
    let path = normalize_path(group);
    let document = match store.get_attribute(&path, GEFF_ATTRIBUTE)? {
        Some(Value::Object(document)) => document,
        Some(_) | None => {
            debug!(group = %path, "no geff entry in group attributes");
            return Err(GeffError::MissingVersion);
        }
    };

    let geff_version = document
        .get(VERSION_KEY)
        .and_then(Value::as_str)
        .ok_or(GeffError::MissingVersion)?
        .to_string();
    version::check_supported(&geff_version)?;

    let directed = document
        .get(DIRECTED_KEY)
        .and_then(Value::as_bool)
        .ok_or(GeffError::MissingAttribute(DIRECTED_KEY))?;

    let axes = match document.get(AXES_KEY) {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            serde_json::from_value::<Vec<Axis>>(value.clone())
                .map_err(|err| GeffError::InvalidAxis(err.to_string()))?,
        ),
    };

    let metadata = Metadata {
        geff_version,
        directed,
        axes,
    };
    metadata.validate()?;
    debug!(group = %path, version = %metadata.geff_version, "metadata read");
    Ok(metadata)
}

/// Validates and writes the metadata document. The axis list keeps its
/// order; key order within each axis object is the JSON writer's concern.
pub fn write_metadata<S: BlockStore + ?Sized>(
    store: &mut S,
    group: &str,
    metadata: &Metadata,
) -> Result<()> {
    metadata.validate()?;

    let mut document = serde_json::Map::new();
    document.insert(VERSION_KEY.to_string(), Value::from(metadata.geff_version.clone()));
    document.insert(DIRECTED_KEY.to_string(), Value::from(metadata.directed));
    if let Some(axes) = metadata.axes.as_deref().filter(|axes| !axes.is_empty()) {
        let axes = serde_json::to_value(axes)
            .map_err(|err| GeffError::InvalidArgument(err.to_string()))?;
        document.insert(AXES_KEY.to_string(), axes);
    }

    let path = normalize_path(group);
    store.set_attribute(&path, GEFF_ATTRIBUTE, Value::Object(document))?;
    debug!(group = %path, version = %metadata.geff_version, "metadata written");
    Ok(())
}
