//! Telemetry source capability consumed by the governing loop.

use crate::raw::RawVehicleSample;

/// A connection to something that publishes [`RawVehicleSample`]s.
///
/// Implementations never block: `try_connect` makes one attempt and `poll`
/// returns whatever snapshot is currently available.
pub trait TelemetrySource {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Attempts to connect. Returns `true` when connected, including when
    /// already connected.
    fn try_connect(&mut self) -> bool;

    fn is_connected(&self) -> bool;

    /// Reads the current player-vehicle sample, if any.
    ///
    /// `None` means "no data this tick". A source that hits an unrecoverable
    /// read error disconnects itself before returning `None`.
    fn poll(&mut self) -> Option<RawVehicleSample>;

    /// Drops the connection. Idempotent.
    fn disconnect(&mut self);
}

impl<T: TelemetrySource + ?Sized> TelemetrySource for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn try_connect(&mut self) -> bool {
        (**self).try_connect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn poll(&mut self) -> Option<RawVehicleSample> {
        (**self).poll()
    }

    fn disconnect(&mut self) {
        (**self).disconnect();
    }
}
