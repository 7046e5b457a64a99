use core::fmt;

use thiserror::Error;

/// Runtime result codes surfaced by failing calls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum XrResult {
    ValidationFailure,
    RuntimeFailure,
    HandleInvalid,
    InstanceLost,
    SessionLost,
    SessionRunning,
    SessionNotRunning,
    SessionNotReady,
    SessionNotStopping,
    CallOrderInvalid,
    TimeInvalid,
    SwapchainFormatUnsupported,
    SwapchainRectInvalid,
    LayerLimitExceeded,
    ActionSetsAlreadyAttached,
    ActionSetNotAttached,
    SizeInsufficient,
    PathUnsupported,
    EnvironmentBlendModeUnsupported,
    TimeoutExpired,
}

impl XrResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationFailure => "XR_ERROR_VALIDATION_FAILURE",
            Self::RuntimeFailure => "XR_ERROR_RUNTIME_FAILURE",
            Self::HandleInvalid => "XR_ERROR_HANDLE_INVALID",
            Self::InstanceLost => "XR_ERROR_INSTANCE_LOST",
            Self::SessionLost => "XR_ERROR_SESSION_LOST",
            Self::SessionRunning => "XR_ERROR_SESSION_RUNNING",
            Self::SessionNotRunning => "XR_ERROR_SESSION_NOT_RUNNING",
            Self::SessionNotReady => "XR_ERROR_SESSION_NOT_READY",
            Self::SessionNotStopping => "XR_ERROR_SESSION_NOT_STOPPING",
            Self::CallOrderInvalid => "XR_ERROR_CALL_ORDER_INVALID",
            Self::TimeInvalid => "XR_ERROR_TIME_INVALID",
            Self::SwapchainFormatUnsupported => "XR_ERROR_SWAPCHAIN_FORMAT_UNSUPPORTED",
            Self::SwapchainRectInvalid => "XR_ERROR_SWAPCHAIN_RECT_INVALID",
            Self::LayerLimitExceeded => "XR_ERROR_LAYER_LIMIT_EXCEEDED",
            Self::ActionSetsAlreadyAttached => "XR_ERROR_ACTIONSETS_ALREADY_ATTACHED",
            Self::ActionSetNotAttached => "XR_ERROR_ACTIONSET_NOT_ATTACHED",
            Self::SizeInsufficient => "XR_ERROR_SIZE_INSUFFICIENT",
            Self::PathUnsupported => "XR_ERROR_PATH_UNSUPPORTED",
            Self::EnvironmentBlendModeUnsupported => "XR_ERROR_ENVIRONMENT_BLEND_MODE_UNSUPPORTED",
            Self::TimeoutExpired => "XR_TIMEOUT_EXPIRED",
        }
    }
}

impl fmt::Display for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the session core and the runtime boundary.
///
/// Only `ResourceCreation` is fatal to the session; every other variant is a
/// failed runtime call that callers log and step past.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XrError {
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),

    #[error("{call} failed: {result}")]
    RuntimeCall { call: &'static str, result: XrResult },

    #[error("{call} called out of order: {reason}")]
    CallOrder { call: &'static str, reason: String },

    #[error("action sets already attached")]
    AlreadyAttached,

    #[error("session is not running")]
    SessionNotRunning,
}

impl XrError {
    #[inline]
    pub fn runtime(call: &'static str, result: XrResult) -> Self {
        Self::RuntimeCall { call, result }
    }

    #[inline]
    pub fn call_order(call: &'static str, reason: impl Into<String>) -> Self {
        Self::CallOrder {
            call,
            reason: reason.into(),
        }
    }

    /// True when the session cannot continue past this error.
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ResourceCreation(_))
    }

    /// Result code equivalent, for logging alongside the runtime's own codes.
    pub fn result_code(&self) -> Option<XrResult> {
        match self {
            Self::ResourceCreation(_) => None,
            Self::RuntimeCall { result, .. } => Some(*result),
            Self::CallOrder { .. } => Some(XrResult::CallOrderInvalid),
            Self::AlreadyAttached => Some(XrResult::ActionSetsAlreadyAttached),
            Self::SessionNotRunning => Some(XrResult::SessionNotRunning),
        }
    }
}
