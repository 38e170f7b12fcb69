/// Adapters layer - Infrastructure implementations
///
/// Concrete implementations of the outbound ports: the HTTP graph store
/// client, stderr progress reporting, file I/O and output formatters.
pub mod outbound;
