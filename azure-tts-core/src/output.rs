use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::error::Result;

/// Where synthesized audio goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputSink {
    #[default]
    Stdout,
    File(PathBuf),
}

impl OutputSink {
    pub fn from_path(path: Option<PathBuf>) -> Self {
        path.map(Self::File).unwrap_or_default()
    }

    /// Write `bytes` in one go. `stdout` is only touched for
    /// [`OutputSink::Stdout`]; a file is created (or truncated) here, so it
    /// only exists once there is audio to put in it.
    pub fn write(&self, bytes: &[u8], stdout: &mut dyn Write) -> Result<()> {
        match self {
            Self::Stdout => {
                stdout.write_all(bytes)?;
                stdout.flush()?;
                debug!("Wrote {} bytes to stdout", bytes.len());
            }
            Self::File(path) => {
                let mut file = File::create(path)?;
                file.write_all(bytes)?;
                file.flush()?;
                debug!("Wrote {} bytes to {path:?}", bytes.len());
            }
        }
        Ok(())
    }
}
