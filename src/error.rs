use crate::context::BootstrapState;
use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Instance error: {0}")]
    Instance(#[from] InstanceError),
    #[error("Physical device error: {0}")]
    PhysicalDevice(#[from] PhysicalDeviceError),
    #[error("Ash loading error: {0}")]
    AshLoading(#[from] ash::LoadingError),
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),
    #[error("Window handle error: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),
    #[error("Bootstrap expected state {expected:?}, found {found:?}")]
    InvalidState {
        expected: BootstrapState,
        found: BootstrapState,
    },
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum InstanceError {
    #[error("Validation layers requested, but not available: {0:?}")]
    ValidationLayersUnavailable(Vec<String>),
    #[error("Failed to create instance: {0}")]
    FailedCreateInstance(vk::Result),
    #[error("Debug utils entry point {0} could not be resolved")]
    DebugUtilsUnavailable(String),
    #[error("Failed to set up debug messenger: {0}")]
    FailedCreateDebugMessenger(vk::Result),
    #[error("Application or engine name contains an interior nul byte")]
    InvalidAppName,
}

#[derive(Debug, PartialOrd, PartialEq, Eq, Ord, Error)]
pub enum PhysicalDeviceError {
    #[error("Failed to enumerate physical devices")]
    FailedToEnumeratePhysicalDevices,
    #[error("Failed to find GPUs with Vulkan support")]
    NoPhysicalDevicesFound,
    #[error("Failed to find a suitable GPU")]
    NoSuitableDevice,
}

pub type Result<T> = std::result::Result<T, Error>;
