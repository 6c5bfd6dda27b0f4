use thiserror::Error;

/// The one typed, non-panicking error this crate surfaces.
///
/// Every other documented failure mode (bounds violation, use-after-destroy,
/// registering past the mask's bit width) is a fatal assertion at the public
/// boundary -- see the crate-level docs. `EcsError` exists for the internal
/// registration routine the public API runs through on the way there, so the
/// capacity check itself stays a normal, testable `Result` path.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EcsError {
    /// Registering another component kind would require a bit beyond the
    /// mask's width.
    #[error("component pool capacity exhausted: cannot register more than {max} component kinds")]
    PoolCapacityExhausted {
        /// The mask width in bits (number of distinct component kinds this
        /// World can ever register).
        max: u32,
    },
}
