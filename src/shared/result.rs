/// Crate-wide result type; typed failures are `GraphError`s carried inside
/// `anyhow::Error` and can be recovered with `downcast_ref`.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
