//! Output sinks for rendered records
//!
//! Exactly one sink is active per pipeline:
//! - Discard - drops every record
//! - Stream - stdout, stderr, a file, or any writer supplied by the host
//! - Remote - POSTs each record to an HTTP collector

pub mod remote;

use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub use remote::RemoteSink;

/// Delivery failure; never fatal to the host
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("stream write failed: {0}")]
    Io(#[from] io::Error),
    #[error("network delivery failed: {0}")]
    Network(String),
}

pub type DeliveryResult = Result<(), DeliveryError>;

/// Which stream a Stream sink writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

/// Sink selection made once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Discard,
    Stream(StreamTarget),
    Remote { url: String, timeout: Duration },
}

enum SinkKind {
    Discard,
    Stdout,
    Stderr,
    Writer(Mutex<Box<dyn Write + Send>>),
    Remote(RemoteSink),
}

/// The active output sink
pub struct Sink {
    kind: SinkKind,
}

impl Sink {
    /// Open the configured sink
    ///
    /// A file that cannot be opened degrades to Discard rather than
    /// falling back onto stdout.
    pub fn open(config: &SinkConfig) -> Self {
        let kind = match config {
            SinkConfig::Discard => SinkKind::Discard,
            SinkConfig::Stream(StreamTarget::Stdout) => SinkKind::Stdout,
            SinkConfig::Stream(StreamTarget::Stderr) => SinkKind::Stderr,
            SinkConfig::Stream(StreamTarget::File(path)) => match File::create(path) {
                Ok(file) => {
                    log::info!("Writing records to {}", path.display());
                    SinkKind::Writer(Mutex::new(Box::new(LineWriter::new(file))))
                }
                Err(e) => {
                    log::warn!("Could not open output file {}: {}; records will be discarded", path.display(), e);
                    SinkKind::Discard
                }
            },
            SinkConfig::Remote { url, timeout } => SinkKind::Remote(RemoteSink::new(url, *timeout)),
        };

        Self { kind }
    }

    /// Stream sink bound to a caller-supplied writer
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            kind: SinkKind::Writer(Mutex::new(Box::new(writer))),
        }
    }

    pub fn discard() -> Self {
        Self { kind: SinkKind::Discard }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            SinkKind::Discard => "discard",
            SinkKind::Stdout => "stdout",
            SinkKind::Stderr => "stderr",
            SinkKind::Writer(_) => "stream",
            SinkKind::Remote(_) => "remote",
        }
    }

    pub fn is_discard(&self) -> bool {
        matches!(self.kind, SinkKind::Discard)
    }

    /// Deliver one rendered record
    pub fn deliver(&self, text: &str) -> DeliveryResult {
        match &self.kind {
            SinkKind::Discard => Ok(()),
            SinkKind::Stdout => write_line(&mut io::stdout().lock(), text),
            SinkKind::Stderr => write_line(&mut io::stderr().lock(), text),
            SinkKind::Writer(writer) => write_line(&mut *writer.lock(), text),
            SinkKind::Remote(remote) => remote.post(text),
        }
    }
}

fn write_line<W: Write + ?Sized>(out: &mut W, text: &str) -> DeliveryResult {
    writeln!(out, "{}", text)?;
    out.flush()?;
    Ok(())
}
