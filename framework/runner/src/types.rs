/// Recommended error type for your scenario `main` function and any test hooks that you write.
/// This type is compatible with the [crate::definition::HookResult] type so you can use `?` to
/// propagate errors.
///
/// Failures that come from the throttle checks themselves carry a
/// [purge_tunnel_core::prelude::TunnelError] which can be recovered with `downcast_ref`.
pub type PurgeTunnelResult<T> = anyhow::Result<T>;
