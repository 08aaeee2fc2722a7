mod config;
mod context;
mod debug_messenger;
mod device;
mod error;
mod instance;
mod loader;
#[cfg(test)]
mod mock;
mod system_info;
mod version;

pub use config::BootstrapConfig;
pub use context::{AppContext, BootstrapState};
pub use debug_messenger::{
    CREATE_DEBUG_UTILS_MESSENGER_NAME, DESTROY_DEBUG_UTILS_MESSENGER_NAME, DebugMessenger,
    DebugUtilsFns, messenger_create_info, vulkan_debug_callback,
};
pub use device::{PhysicalDevice, PhysicalDeviceSelector, QueueFamilyIndices, find_queue_families};
pub use error::*;
pub use instance::InstanceBuilder;
pub use loader::{AshInstance, AshLoader, InstanceFns, Loader};
pub use system_info::{
    DEBUG_UTILS_EXT_NAME, DisplayWindow, SystemInfo, VALIDATION_LAYER_NAME, WindowSystem,
    required_extensions,
};
pub use version::Version;
