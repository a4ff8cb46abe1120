//! The description-loader seam.
//!
//! Parsing a robot description (URDF, MJCF, ...) into a kinematic tree is
//! out of scope for this core; it sits behind [`DescriptionLoader`], and
//! the orchestrator offers `from_description` constructors over any loader.

use std::path::Path;

use rbd_types::{DynamicsError, FloatingBaseType, Result};

use crate::model::KinematicsModel;

/// Builds a kinematic model from a robot-description document.
pub trait DescriptionLoader {
    /// The model type this loader produces.
    type Model: KinematicsModel;

    /// Parse an in-memory description document.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error on a malformed document.
    fn load_str(&self, text: &str, floating_base: FloatingBaseType) -> Result<Self::Model>;

    /// Read and parse a description file.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error if the file cannot be read or the
    /// document is malformed.
    fn load_path(&self, path: &Path, floating_base: FloatingBaseType) -> Result<Self::Model> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            DynamicsError::configuration(format!("cannot read '{}': {e}", path.display()))
        })?;
        self.load_str(&text, floating_base)
    }
}
