use std::future::Future;

/// Location permission levels the platform distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionScope {
    CoarseLocation,
    FineLocation,
}

/// Every scope needed before location updates may start.
pub const LOCATION_SCOPES: [PermissionScope; 2] =
    [PermissionScope::CoarseLocation, PermissionScope::FineLocation];

/// User-visible outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    PermissionGranted,
    PermissionDenied,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::PermissionGranted => "Permission Granted",
            Notice::PermissionDenied => "Permission Denied",
        }
    }
}

/// Platform permission checks and prompts.
pub trait PermissionGate: Send {
    fn has_permission(&self, scope: PermissionScope) -> bool;

    /// Ask the user for `scope`. Resolves to whether it was granted.
    fn request_permission(&mut self, scope: PermissionScope) -> impl Future<Output = bool> + Send;
}
