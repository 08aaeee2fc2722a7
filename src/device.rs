use crate::loader::InstanceFns;
use ash::vk;

/// Queue family index per capability the application needs.
///
/// Indices refer to the order in which the host reports the device's queue
/// families, which is stable for a given device.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn is_complete(&self) -> bool {
        self.graphics.is_some()
    }

    pub fn query(instance: &impl InstanceFns, physical_device: vk::PhysicalDevice) -> Self {
        find_queue_families(&instance.queue_family_properties(physical_device))
    }
}

/// Single pass over `queue_families`; the first graphics-capable family wins.
pub fn find_queue_families(queue_families: &[vk::QueueFamilyProperties]) -> QueueFamilyIndices {
    let mut indices = QueueFamilyIndices::default();

    for (index, family) in (0u32..).zip(queue_families) {
        if indices.graphics.is_none() && family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            indices.graphics = Some(index);
        }

        if indices.is_complete() {
            break;
        }
    }

    indices
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDevice {
    pub name: String,
    pub physical_device: vk::PhysicalDevice,
    pub queue_families: QueueFamilyIndices,
}

impl AsRef<vk::PhysicalDevice> for PhysicalDevice {
    fn as_ref(&self) -> &vk::PhysicalDevice {
        &self.physical_device
    }
}

/// First-fit selection: devices are tried in the order the host reports
/// them and the first one with a complete [`QueueFamilyIndices`] is taken.
pub struct PhysicalDeviceSelector<'a, I: InstanceFns> {
    instance: &'a I,
}

impl<'a, I: InstanceFns> PhysicalDeviceSelector<'a, I> {
    pub fn new(instance: &'a I) -> Self {
        Self { instance }
    }

    fn suitable_queue_families(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Option<QueueFamilyIndices> {
        let indices = QueueFamilyIndices::query(self.instance, physical_device);
        indices.is_complete().then_some(indices)
    }

    #[tracing::instrument(skip_all)]
    pub fn select(self) -> crate::Result<PhysicalDevice> {
        let physical_devices = self
            .instance
            .enumerate_physical_devices()
            .map_err(|_| crate::PhysicalDeviceError::FailedToEnumeratePhysicalDevices)?;

        if physical_devices.is_empty() {
            return Err(crate::PhysicalDeviceError::NoPhysicalDevicesFound.into());
        }

        tracing::debug!(count = physical_devices.len(), "Enumerated physical devices");

        for physical_device in physical_devices {
            let name = self.instance.device_name(physical_device);

            match self.suitable_queue_families(physical_device) {
                Some(queue_families) => {
                    tracing::info!(?queue_families, "Selected physical device {name}");
                    return Ok(PhysicalDevice {
                        name,
                        physical_device,
                        queue_families,
                    });
                }
                None => tracing::debug!("Physical device {name} has no graphics queue, skipping"),
            }
        }

        Err(crate::PhysicalDeviceError::NoSuitableDevice.into())
    }
}
