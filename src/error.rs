use std::fmt;

#[derive(Debug)]
pub enum RemixError {
    Decode(DecodeError),
    Encode(EncodeError),
    Config(ConfigError),
    Process(ProcessError),
}

/// Raised when bytes handed to a decode source are not a container it
/// understands. Callers treat the source as opaque/unplayable.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    TooShort { len: usize },
    NotRiff,
    NotWave,
    MissingChunk { id: &'static str },
    UnsupportedFormat { format_tag: u16 },
    UnsupportedBitDepth { bits: u16 },
    InvalidChannelCount { channels: u16 },
    UnsupportedSampleRate { sample_rate: u32 },
    BlockAlignMismatch { expected: u16, found: u16 },
    TruncatedData { declared: usize, available: usize },
    Backend { message: String },
}

/// A buffer that a canonical 16-bit WAV header cannot describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    TooManyChannels { channels: usize },
    UnsupportedSampleRate { sample_rate: u32 },
    HeaderOverflow { field: &'static str, value: u64 },
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    /// The cancel token was raised between two processing blocks.
    Cancelled { samples_done: usize },
}

impl fmt::Display for RemixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemixError::Decode(e) => write!(f, "Decode error: {e}"),
            RemixError::Encode(e) => write!(f, "Encode error: {e}"),
            RemixError::Config(e) => write!(f, "Config error: {e}"),
            RemixError::Process(e) => write!(f, "Process error: {e}"),
        }
    }
}

impl std::error::Error for RemixError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort { len } => {
                write!(f, "Container too short: {len} bytes, need at least 12")
            }
            DecodeError::NotRiff => write!(f, "Missing RIFF signature"),
            DecodeError::NotWave => write!(f, "RIFF form type is not WAVE"),
            DecodeError::MissingChunk { id } => write!(f, "Missing '{id}' chunk"),
            DecodeError::UnsupportedFormat { format_tag } => {
                write!(f, "Unsupported format tag {format_tag}, expected 1 (PCM)")
            }
            DecodeError::UnsupportedBitDepth { bits } => {
                write!(f, "Unsupported bit depth {bits}, expected 16")
            }
            DecodeError::InvalidChannelCount { channels } => {
                write!(f, "Invalid channel count {channels}")
            }
            DecodeError::UnsupportedSampleRate { sample_rate } => {
                write!(f, "Unsupported sample rate {sample_rate} Hz")
            }
            DecodeError::BlockAlignMismatch { expected, found } => {
                write!(f, "Block align {found} does not match expected {expected}")
            }
            DecodeError::TruncatedData { declared, available } => {
                write!(f, "Data chunk declares {declared} bytes but only {available} remain")
            }
            DecodeError::Backend { message } => write!(f, "Decoder backend failed: {message}"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::TooManyChannels { channels } => {
                write!(f, "Cannot encode {channels} channels, 16-bit WAV allows at most 32767")
            }
            EncodeError::UnsupportedSampleRate { sample_rate } => {
                write!(f, "Cannot encode sample rate {sample_rate} Hz")
            }
            EncodeError::HeaderOverflow { field, value } => {
                write!(f, "WAV {field} of {value} does not fit in 32 bits")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Invalid render config JSON: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Cancelled { samples_done } => {
                write!(f, "Processing cancelled after {samples_done} samples")
            }
        }
    }
}

impl std::error::Error for ProcessError {}

impl From<DecodeError> for RemixError {
    fn from(e: DecodeError) -> Self {
        RemixError::Decode(e)
    }
}

impl From<EncodeError> for RemixError {
    fn from(e: EncodeError) -> Self {
        RemixError::Encode(e)
    }
}

impl From<ConfigError> for RemixError {
    fn from(e: ConfigError) -> Self {
        RemixError::Config(e)
    }
}

impl From<ProcessError> for RemixError {
    fn from(e: ProcessError) -> Self {
        RemixError::Process(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}
