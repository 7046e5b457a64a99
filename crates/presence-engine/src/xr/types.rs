use glam::{Quat, Vec3};

/// Runtime timestamp in nanoseconds.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct XrTime(pub i64);

impl XrTime {
    #[inline]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    #[inline]
    pub const fn as_nanos(self) -> i64 {
        self.0
    }
}

/// Runtime duration in nanoseconds.
///
/// `INFINITE` mirrors the runtime's "wait forever" sentinel.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct XrDuration(pub i64);

impl XrDuration {
    pub const INFINITE: XrDuration = XrDuration(i64::MAX);

    #[inline]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    #[inline]
    pub fn is_infinite(self) -> bool {
        self == Self::INFINITE
    }
}

/// Controller hand selector for per-hand action queries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Session lifecycle states reported by the runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SessionState {
    Idle,
    Ready,
    Synchronized,
    Visible,
    Focused,
    Stopping,
    LossPending,
    Exiting,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Ready => "ready",
            Self::Synchronized => "synchronized",
            Self::Visible => "visible",
            Self::Focused => "focused",
            Self::Stopping => "stopping",
            Self::LossPending => "loss-pending",
            Self::Exiting => "exiting",
        }
    }
}

/// Events drained from the runtime event queue.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeEvent {
    SessionStateChanged(SessionState),
    InstanceLossPending,
    /// Any event the session does not act on (interaction profile changes,
    /// reference space changes, ...). Carries a short description for logs.
    Other(String),
}

/// View configuration requested when the session begins.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ViewConfiguration {
    PrimaryStereo,
}

/// Result of a successful `wait_frame`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameState {
    pub predicted_display_time: XrTime,
    pub predicted_display_period: XrDuration,
    pub should_render: bool,
}

/// Rigid transform in the reference space: meters + unit quaternion.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramePose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl FramePose {
    pub const IDENTITY: FramePose = FramePose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    #[inline]
    pub const fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }
}

impl Default for FramePose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Validity flags attached to a located space.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LocationFlags {
    pub position_valid: bool,
    pub orientation_valid: bool,
    pub position_tracked: bool,
    pub orientation_tracked: bool,
}

impl LocationFlags {
    pub const TRACKED: LocationFlags = LocationFlags {
        position_valid: true,
        orientation_valid: true,
        position_tracked: true,
        orientation_tracked: true,
    };
}

/// Output of `locate_aim`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpaceLocation {
    pub flags: LocationFlags,
    pub pose: FramePose,
}

// ── swapchains ────────────────────────────────────────────────────────────

/// Opaque runtime swapchain handle. `NULL` means "no swapchain".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SwapchainHandle(pub u64);

impl SwapchainHandle {
    pub const NULL: SwapchainHandle = SwapchainHandle(0);

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Graphics image owned by a swapchain. `NULL` means "no image".
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ImageHandle(pub u64);

impl ImageHandle {
    pub const NULL: ImageHandle = ImageHandle(0);

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Render-target binding object reused across frames. `NULL` is the default
/// (window) framebuffer.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct FramebufferHandle(pub u32);

impl FramebufferHandle {
    pub const NULL: FramebufferHandle = FramebufferHandle(0);

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Swapchain image usage bits.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SwapchainUsage(u32);

impl SwapchainUsage {
    pub const COLOR_ATTACHMENT: SwapchainUsage = SwapchainUsage(0x1);
    pub const DEPTH_STENCIL_ATTACHMENT: SwapchainUsage = SwapchainUsage(0x2);
    pub const TRANSFER_SRC: SwapchainUsage = SwapchainUsage(0x8);
    pub const SAMPLED: SwapchainUsage = SwapchainUsage(0x20);

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: SwapchainUsage) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for SwapchainUsage {
    type Output = SwapchainUsage;
    #[inline]
    fn bitor(self, rhs: SwapchainUsage) -> SwapchainUsage {
        SwapchainUsage(self.0 | rhs.0)
    }
}

/// Pixel formats the session asks swapchains for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SwapchainFormat {
    /// 8-bit RGBA with sRGB transfer.
    Srgb8Alpha8,
    /// 8-bit RGBA, linear.
    Rgba8,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwapchainCreateInfo {
    pub usage: SwapchainUsage,
    pub format: SwapchainFormat,
    pub sample_count: u32,
    pub width: u32,
    pub height: u32,
    pub face_count: u32,
    pub array_size: u32,
    pub mip_count: u32,
}

impl SwapchainCreateInfo {
    /// Single-sample, single-layer color image sequence.
    pub fn color(format: SwapchainFormat, width: u32, height: u32) -> Self {
        Self {
            usage: SwapchainUsage::SAMPLED | SwapchainUsage::COLOR_ATTACHMENT,
            format,
            sample_count: 1,
            width,
            height,
            face_count: 1,
            array_size: 1,
            mip_count: 1,
        }
    }
}

// ── composition ───────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EnvironmentBlendMode {
    Opaque,
    Additive,
    AlphaBlend,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EyeVisibility {
    Both,
    Left,
    Right,
}

/// Integer pixel rectangle inside a swapchain image.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ImageRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ImageRect {
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: width as i32,
            height: height as i32,
        }
    }
}

/// A flat textured quad composited in the reference space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CompositionLayerQuad {
    pub swapchain: SwapchainHandle,
    pub image_rect: ImageRect,
    pub image_array_index: u32,
    pub eye_visibility: EyeVisibility,
    /// Blend with the texture's source alpha instead of treating it as opaque.
    pub blend_source_alpha: bool,
    pub pose: FramePose,
    /// Quad extent in meters.
    pub size: (f32, f32),
}
