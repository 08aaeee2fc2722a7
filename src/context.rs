//! The application context and the bootstrap sequence that fills it.
//!
//! [`AppContext::init_vulkan`] walks `Uninitialized → Started →
//! InstanceCreated → DiagnosticsInstalled → DeviceSelected` and stops at the
//! first error. The context never returns to `Uninitialized`, so a failed
//! bootstrap is not run again.
//! [`AppContext::destroy`] undoes whatever was completed, in reverse, and
//! is safe to call on a context in any state.

use crate::debug_messenger::{DebugMessenger, messenger_create_info};
use crate::device::{PhysicalDevice, PhysicalDeviceSelector};
use crate::instance::InstanceBuilder;
use crate::loader::{InstanceFns, Loader};
use crate::system_info::{SystemInfo, WindowSystem, required_extensions};
use crate::{BootstrapConfig, Error, InstanceError};
use ash::vk;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootstrapState {
    Uninitialized,
    /// `init_vulkan` was entered but no step has completed yet.
    Started,
    InstanceCreated,
    DiagnosticsInstalled,
    DeviceSelected,
    Running,
    TornDown,
}

#[derive(Debug)]
pub struct AppContext<I: InstanceFns> {
    config: BootstrapConfig,
    state: BootstrapState,
    instance: Option<I>,
    debug_messenger: Option<DebugMessenger>,
    physical_device: Option<PhysicalDevice>,
}

impl<I: InstanceFns> AppContext<I> {
    pub fn new(config: BootstrapConfig) -> Self {
        Self {
            config,
            state: BootstrapState::Uninitialized,
            instance: None,
            debug_messenger: None,
            physical_device: None,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    pub fn instance(&self) -> Option<&I> {
        self.instance.as_ref()
    }

    pub fn debug_messenger(&self) -> Option<vk::DebugUtilsMessengerEXT> {
        self.debug_messenger.as_ref().map(DebugMessenger::handle)
    }

    pub fn physical_device(&self) -> Option<&PhysicalDevice> {
        self.physical_device.as_ref()
    }

    fn expect_state(&self, expected: BootstrapState) -> crate::Result<()> {
        if self.state != expected {
            return Err(Error::InvalidState {
                expected,
                found: self.state,
            });
        }
        Ok(())
    }

    fn missing_instance(&self) -> Error {
        Error::InvalidState {
            expected: BootstrapState::InstanceCreated,
            found: self.state,
        }
    }

    #[tracing::instrument(skip_all, fields(validation = self.config.enable_validation))]
    pub fn init_vulkan<L>(&mut self, loader: &L, window: &dyn WindowSystem) -> crate::Result<()>
    where
        L: Loader<Instance = I>,
    {
        self.expect_state(BootstrapState::Uninitialized)?;
        self.state = BootstrapState::Started;

        let requested_layers = self.config.requested_layers().to_vec();
        if self.config.enable_validation {
            let system_info = SystemInfo::get_system_info(loader)?;
            if !system_info.layers_supported(&requested_layers) {
                return Err(InstanceError::ValidationLayersUnavailable(
                    system_info.missing_layers(&requested_layers),
                )
                .into());
            }
        }

        self.create_instance(loader, window, &requested_layers)?;
        self.setup_debug_messenger()?;
        self.pick_physical_device()?;

        Ok(())
    }

    fn create_instance<L>(
        &mut self,
        loader: &L,
        window: &dyn WindowSystem,
        requested_layers: &[&'static std::ffi::CStr],
    ) -> crate::Result<()>
    where
        L: Loader<Instance = I>,
    {
        let extensions = required_extensions(window, self.config.enable_validation)?;

        let instance = InstanceBuilder::new()
            .app_name(self.config.app_name.as_str())
            .app_version(self.config.app_version)
            .engine_name(self.config.engine_name.as_str())
            .engine_version(self.config.engine_version)
            .api_version(self.config.api_version)
            .enable_extensions(&extensions)
            .enable_layers(requested_layers)
            .enable_validation(self.config.enable_validation)
            .debug_messenger_severity(self.config.debug_message_severity)
            .debug_messenger_type(self.config.debug_message_type)
            .build(loader)?;

        self.instance = Some(instance);
        self.state = BootstrapState::InstanceCreated;
        Ok(())
    }

    fn setup_debug_messenger(&mut self) -> crate::Result<()> {
        if !self.config.enable_validation {
            return Ok(());
        }
        let Some(instance) = self.instance.as_ref() else {
            return Err(self.missing_instance());
        };

        let create_info = messenger_create_info(
            self.config.debug_message_severity,
            self.config.debug_message_type,
        );
        self.debug_messenger = Some(DebugMessenger::install(instance, &create_info)?);
        self.state = BootstrapState::DiagnosticsInstalled;
        Ok(())
    }

    fn pick_physical_device(&mut self) -> crate::Result<()> {
        let Some(instance) = self.instance.as_ref() else {
            return Err(self.missing_instance());
        };

        self.physical_device = Some(PhysicalDeviceSelector::new(instance).select()?);
        self.state = BootstrapState::DeviceSelected;
        Ok(())
    }

    /// `DeviceSelected → Running`, entered once the main loop starts.
    pub fn mark_running(&mut self) -> crate::Result<()> {
        self.expect_state(BootstrapState::DeviceSelected)?;
        self.state = BootstrapState::Running;
        Ok(())
    }

    /// Releases the messenger, then the instance. The physical device is
    /// borrowed from the instance and has nothing to release. Never fails;
    /// calling it again is a no-op.
    pub fn destroy(&mut self) {
        if self.state == BootstrapState::TornDown {
            return;
        }
        tracing::debug!(from = ?self.state, "Tearing down application context");

        self.physical_device = None;

        if let Some(instance) = self.instance.take() {
            if let Some(messenger) = self.debug_messenger.take() {
                messenger.uninstall(&instance);
            }
            // SAFETY: the messenger, the only object created from this
            // instance, is gone and the instance is not used again.
            unsafe { instance.destroy_instance() };
        }

        self.state = BootstrapState::TornDown;
    }
}
