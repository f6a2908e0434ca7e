use depot_core::lifecycle::AssetService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the service shares its ports and task tracker.
#[derive(Clone)]
pub struct AppState {
    /// Upload, publish and search coordinator.
    pub assets: AssetService,
}
