//! The seam between the bootstrap sequence and the Vulkan runtime.
//!
//! [`Loader`] covers the global (pre-instance) entry points and
//! [`InstanceFns`] covers the handful of instance-level calls the bootstrap
//! makes. [`AshLoader`] and [`AshInstance`] forward them to `ash`.

use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CStr;
use std::fmt::{Debug, Formatter};

pub trait Loader {
    type Instance: InstanceFns;

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>>;

    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>>;

    /// # Safety
    /// Every pointer reachable from `create_info` (names, application info,
    /// the `p_next` chain) must be valid for the duration of the call.
    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo<'_>,
    ) -> VkResult<Self::Instance>;
}

pub trait InstanceFns {
    fn handle(&self) -> vk::Instance;

    /// Looks up an instance-level entry point by name. `None` when the
    /// runtime does not export it.
    fn proc_addr(&self, name: &CStr) -> vk::PFN_vkVoidFunction;

    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>>;

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties>;

    fn device_name(&self, physical_device: vk::PhysicalDevice) -> String;

    /// # Safety
    /// All objects created from this instance must already be destroyed and
    /// the instance must not be used afterwards.
    unsafe fn destroy_instance(&self);
}

pub struct AshLoader {
    entry: ash::Entry,
}

impl Debug for AshLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AshLoader").finish_non_exhaustive()
    }
}

impl AshLoader {
    /// # Safety
    /// Loads the Vulkan shared library through `libloading`, which runs
    /// arbitrary initialisation code from that library.
    pub unsafe fn load() -> crate::Result<Self> {
        tracing::trace!("Loading entry...");
        let entry = unsafe { ash::Entry::load() }?;
        tracing::trace!("Entry loaded.");
        Ok(Self { entry })
    }
}

impl Loader for AshLoader {
    type Instance = AshInstance;

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>> {
        // SAFETY: the entry is loaded; this call has no other preconditions.
        unsafe { self.entry.enumerate_instance_layer_properties() }
    }

    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>> {
        // SAFETY: passing None queries the global extensions and dereferences
        // no layer name.
        unsafe { self.entry.enumerate_instance_extension_properties(None) }
    }

    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo<'_>,
    ) -> VkResult<AshInstance> {
        let instance = unsafe { self.entry.create_instance(create_info, None) }?;
        Ok(AshInstance {
            entry: self.entry.clone(),
            instance,
        })
    }
}

pub struct AshInstance {
    entry: ash::Entry,
    instance: ash::Instance,
}

impl Debug for AshInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AshInstance")
            .field("handle", &self.instance.handle())
            .finish_non_exhaustive()
    }
}

impl AsRef<ash::Instance> for AshInstance {
    fn as_ref(&self) -> &ash::Instance {
        &self.instance
    }
}

impl InstanceFns for AshInstance {
    fn handle(&self) -> vk::Instance {
        self.instance.handle()
    }

    fn proc_addr(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        // SAFETY: the instance handle is live and name is nul terminated.
        unsafe {
            self.entry
                .get_instance_proc_addr(self.instance.handle(), name.as_ptr())
        }
    }

    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        // SAFETY: the instance handle is live.
        unsafe { self.instance.enumerate_physical_devices() }
    }

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        // SAFETY: physical_device was enumerated from this instance.
        unsafe {
            self.instance
                .get_physical_device_queue_family_properties(physical_device)
        }
    }

    fn device_name(&self, physical_device: vk::PhysicalDevice) -> String {
        // SAFETY: physical_device was enumerated from this instance.
        let properties = unsafe { self.instance.get_physical_device_properties(physical_device) };
        properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    unsafe fn destroy_instance(&self) {
        tracing::debug!("Destroying instance {:?}", self.instance.handle());
        unsafe { self.instance.destroy_instance(None) };
    }
}
