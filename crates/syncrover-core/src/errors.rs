use thiserror::Error;

/// Failure taxonomy for a SyncRover session. None of these are retried
/// automatically — every one is terminal until the user rejoins or
/// navigates away.
#[derive(Error, Debug)]
pub enum RoverError {
    #[error("Room provisioning failed: {reason}")]
    Provisioning { reason: String },

    #[error("Credential issuance failed: {reason}")]
    Auth { reason: String },

    #[error("Transport failed: {reason}")]
    Transport { reason: String },

    #[error("Malformed broadcast payload: {reason}")]
    MalformedPayload { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Channel closed")]
    Closed,

    #[error("Send failed: {reason}")]
    SendFailed { reason: String },
}
