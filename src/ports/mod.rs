/// Ports module defining interfaces for hexagonal architecture
///
/// Inbound ports describe what drivers (the CLI) can ask of the
/// application; outbound ports describe what the application needs from
/// infrastructure.
pub mod inbound;
pub mod outbound;
