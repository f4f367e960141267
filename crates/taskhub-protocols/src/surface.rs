//! Host-registered visual surface.

/// A view the coordinator registers once with the host.
pub trait UiSurface: Send + Sync {
    fn id(&self) -> &str;

    /// Bring the surface to the foreground.
    fn reveal(&self);

    /// Release the surface; called once at teardown.
    fn dispose(&self);

    /// Keep view state while hidden so returning does not re-initialize.
    fn retains_state_when_hidden(&self) -> bool {
        true
    }
}
