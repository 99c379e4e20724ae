use serde::{Deserialize, Serialize};

// MARK: - RoomId

/// Opaque room identifier minted by the provisioning service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// MARK: - PeerId

/// Opaque peer identifier assigned by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// MARK: - SessionRole

/// Role resolved from the join request. Fixed for the session's lifetime —
/// never renegotiated after mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    /// Owns keyboard input, runs the simulation loop, publishes state.
    Host,
    /// Receives broadcast state, renders it, never simulates.
    Viewer,
}

impl std::fmt::Display for SessionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => write!(f, "HOST"),
            Self::Viewer => write!(f, "VIEWER"),
        }
    }
}

// MARK: - Viewport

/// Pixel dimensions of the drivable viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const HD: Self = Self { width: 1280, height: 720 };
    pub const FHD: Self = Self { width: 1920, height: 1080 };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Margin in percentage-of-viewport units along the horizontal axis,
    /// keeping a circle of `radius_px` fully on-screen.
    pub fn margin_x_pct(&self, radius_px: f64) -> f64 {
        radius_px / self.width as f64 * 100.0
    }

    /// Margin in percentage units along the vertical axis.
    pub fn margin_y_pct(&self, radius_px: f64) -> f64 {
        radius_px / self.height as f64 * 100.0
    }
}

impl std::fmt::Display for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}
