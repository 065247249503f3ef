use std::path::{Path, PathBuf};

use crate::shared::error::DepthVizError;

/// Turns the intermediate container into the final deliverable.
///
/// On success the intermediate is gone and the returned path exists. On
/// failure the intermediate is left where it was.
pub trait VideoFinisher: Send {
    fn finish(&self, intermediate: &Path, output: &Path) -> Result<PathBuf, DepthVizError>;
}
