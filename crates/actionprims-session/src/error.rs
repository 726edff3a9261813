/// Errors that can occur while wiring a session to its environment.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Lifecycle reactions spawn tasks and need a running tokio runtime.
    #[error("no tokio runtime available to drive lifecycle reactions")]
    NoRuntime,

    /// The session was already torn down.
    #[error("session has been torn down")]
    TornDown,
}

pub type Result<T> = std::result::Result<T, SessionError>;
