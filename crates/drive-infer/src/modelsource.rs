use std::path::PathBuf;

/// Where a model artifact is loaded from.
#[derive(Debug, Clone)]
pub enum ModelSource {
    File(PathBuf),
    Memory(Vec<u8>),
}

impl From<PathBuf> for ModelSource {
    fn from(path: PathBuf) -> Self {
        ModelSource::File(path)
    }
}

impl From<&std::path::Path> for ModelSource {
    fn from(path: &std::path::Path) -> Self {
        ModelSource::File(path.to_path_buf())
    }
}
