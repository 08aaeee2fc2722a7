//! In-memory stand-ins for the Vulkan runtime used by the unit tests.

use crate::debug_messenger::{CREATE_DEBUG_UTILS_MESSENGER_NAME, DESTROY_DEBUG_UTILS_MESSENGER_NAME};
use crate::loader::{InstanceFns, Loader};
use crate::system_info::WindowSystem;
use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};
use std::ffi::{CStr, c_char};
use std::mem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    InstanceCreated,
    MessengerCreated,
    MessengerDestroyed,
    InstanceDestroyed,
}

thread_local! {
    static EVENTS: RefCell<Vec<Event>> = const { RefCell::new(Vec::new()) };
}

fn record(event: Event) {
    EVENTS.with(|events| events.borrow_mut().push(event));
}

pub fn events() -> Vec<Event> {
    EVENTS.with(|events| events.borrow().clone())
}

pub fn reset() {
    EVENTS.with(|events| events.borrow_mut().clear());
    fake_debug_utils::reset();
}

pub fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
    vk::QueueFamilyProperties {
        queue_flags: flags,
        queue_count: 1,
        ..Default::default()
    }
}

fn copy_name(dst: &mut [c_char], name: &CStr) {
    for (d, &s) in dst.iter_mut().zip(name.to_bytes_with_nul()) {
        *d = s as c_char;
    }
}

fn layer(name: &CStr) -> vk::LayerProperties {
    let mut properties = vk::LayerProperties::default();
    copy_name(&mut properties.layer_name, name);
    properties
}

fn extension(name: &CStr) -> vk::ExtensionProperties {
    let mut properties = vk::ExtensionProperties::default();
    copy_name(&mut properties.extension_name, name);
    properties
}

pub struct MockWindow {
    extensions: Vec<&'static CStr>,
}

impl MockWindow {
    pub fn new(extensions: &[&'static CStr]) -> Self {
        Self {
            extensions: extensions.to_vec(),
        }
    }
}

impl WindowSystem for MockWindow {
    fn required_instance_extensions(&self) -> crate::Result<Vec<&'static CStr>> {
        Ok(self.extensions.clone())
    }
}

/// What a single `create_instance` call was asked for.
#[derive(Debug, Clone)]
pub struct CreateCall {
    pub app_name: String,
    pub extensions: Vec<String>,
    pub layers: Vec<String>,
    pub chained_messenger: bool,
}

unsafe fn names(ptrs: *const *const c_char, count: u32) -> Vec<String> {
    (0..count as usize)
        .map(|i| {
            unsafe { CStr::from_ptr(*ptrs.add(i)) }
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

#[derive(Default)]
pub struct MockLoader {
    layers: Vec<vk::LayerProperties>,
    extensions: Vec<vk::ExtensionProperties>,
    create_result: Option<vk::Result>,
    instance: MockInstance,
    pub create_calls: RefCell<Vec<CreateCall>>,
    pub extension_listings: Cell<usize>,
}

impl MockLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layers(mut self, layers: &[&CStr]) -> Self {
        self.layers = layers.iter().map(|name| layer(name)).collect();
        self
    }

    pub fn with_extensions(mut self, extensions: &[&CStr]) -> Self {
        self.extensions = extensions.iter().map(|name| extension(name)).collect();
        self
    }

    pub fn failing_create(mut self, result: vk::Result) -> Self {
        self.create_result = Some(result);
        self
    }

    pub fn with_instance(mut self, instance: MockInstance) -> Self {
        self.instance = instance;
        self
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.borrow().len()
    }
}

impl Loader for MockLoader {
    type Instance = MockInstance;

    fn enumerate_instance_layer_properties(&self) -> VkResult<Vec<vk::LayerProperties>> {
        Ok(self.layers.clone())
    }

    fn enumerate_instance_extension_properties(&self) -> VkResult<Vec<vk::ExtensionProperties>> {
        self.extension_listings.set(self.extension_listings.get() + 1);
        Ok(self.extensions.clone())
    }

    unsafe fn create_instance(
        &self,
        create_info: &vk::InstanceCreateInfo<'_>,
    ) -> VkResult<MockInstance> {
        let app_name = unsafe {
            create_info
                .p_application_info
                .as_ref()
                .filter(|info| !info.p_application_name.is_null())
                .map(|info| CStr::from_ptr(info.p_application_name).to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let chained_messenger = unsafe {
            create_info
                .p_next
                .cast::<vk::BaseInStructure<'_>>()
                .as_ref()
                .is_some_and(|next| {
                    next.s_type == vk::StructureType::DEBUG_UTILS_MESSENGER_CREATE_INFO_EXT
                })
        };

        self.create_calls.borrow_mut().push(CreateCall {
            app_name,
            extensions: unsafe {
                names(
                    create_info.pp_enabled_extension_names,
                    create_info.enabled_extension_count,
                )
            },
            layers: unsafe {
                names(
                    create_info.pp_enabled_layer_names,
                    create_info.enabled_layer_count,
                )
            },
            chained_messenger,
        });

        if let Some(result) = self.create_result {
            return Err(result);
        }

        record(Event::InstanceCreated);
        Ok(self.instance.clone())
    }
}

#[derive(Debug, Clone)]
pub struct MockDevice {
    pub handle: vk::PhysicalDevice,
    pub name: String,
    pub queue_families: Vec<vk::QueueFamilyProperties>,
}

#[derive(Debug, Clone, Default)]
pub struct MockInstance {
    devices: Vec<MockDevice>,
    enumerate_result: Option<vk::Result>,
    resolve_create: bool,
    resolve_destroy: bool,
}

impl MockInstance {
    pub fn with_device(mut self, name: &str, queue_families: &[vk::QueueFamilyProperties]) -> Self {
        let handle = vk::PhysicalDevice::from_raw(0x100 + self.devices.len() as u64);
        self.devices.push(MockDevice {
            handle,
            name: name.to_string(),
            queue_families: queue_families.to_vec(),
        });
        self
    }

    pub fn failing_enumerate(mut self, result: vk::Result) -> Self {
        self.enumerate_result = Some(result);
        self
    }

    pub fn with_debug_utils(mut self, create: bool, destroy: bool) -> Self {
        self.resolve_create = create;
        self.resolve_destroy = destroy;
        self
    }

    pub fn device(&self, index: usize) -> vk::PhysicalDevice {
        self.devices[index].handle
    }
}

impl InstanceFns for MockInstance {
    fn handle(&self) -> vk::Instance {
        vk::Instance::from_raw(0x1)
    }

    fn proc_addr(&self, name: &CStr) -> vk::PFN_vkVoidFunction {
        type VoidFn = unsafe extern "system" fn();
        type CreateFn = vk::PFN_vkCreateDebugUtilsMessengerEXT;
        type DestroyFn = vk::PFN_vkDestroyDebugUtilsMessengerEXT;

        if name == CREATE_DEBUG_UTILS_MESSENGER_NAME && self.resolve_create {
            let create: CreateFn = fake_debug_utils::create;
            // SAFETY: only ever transmuted back to the same signature.
            return Some(unsafe { mem::transmute::<CreateFn, VoidFn>(create) });
        }
        if name == DESTROY_DEBUG_UTILS_MESSENGER_NAME && self.resolve_destroy {
            let destroy: DestroyFn = fake_debug_utils::destroy;
            // SAFETY: as above.
            return Some(unsafe { mem::transmute::<DestroyFn, VoidFn>(destroy) });
        }
        None
    }

    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        if let Some(result) = self.enumerate_result {
            return Err(result);
        }
        Ok(self.devices.iter().map(|device| device.handle).collect())
    }

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        self.devices
            .iter()
            .find(|device| device.handle == physical_device)
            .map(|device| device.queue_families.clone())
            .unwrap_or_default()
    }

    fn device_name(&self, physical_device: vk::PhysicalDevice) -> String {
        self.devices
            .iter()
            .find(|device| device.handle == physical_device)
            .map(|device| device.name.clone())
            .unwrap_or_default()
    }

    unsafe fn destroy_instance(&self) {
        record(Event::InstanceDestroyed);
    }
}

/// `extern "system"` stand-ins for the debug-utils entry points. They cannot
/// capture state, so they report through thread locals.
pub mod fake_debug_utils {
    use super::{Event, record};
    use ash::vk::{self, Handle};
    use std::cell::Cell;

    pub fn messenger() -> vk::DebugUtilsMessengerEXT {
        vk::DebugUtilsMessengerEXT::from_raw(0xdeb)
    }

    thread_local! {
        static CREATED: Cell<usize> = const { Cell::new(0) };
        static DESTROYED: Cell<usize> = const { Cell::new(0) };
        static FAIL_NEXT: Cell<Option<vk::Result>> = const { Cell::new(None) };
        static SAW_CALLBACK: Cell<bool> = const { Cell::new(false) };
    }

    pub fn reset() {
        CREATED.with(|c| c.set(0));
        DESTROYED.with(|c| c.set(0));
        FAIL_NEXT.with(|c| c.set(None));
        SAW_CALLBACK.with(|c| c.set(false));
    }

    pub fn created() -> usize {
        CREATED.with(Cell::get)
    }

    pub fn destroyed() -> usize {
        DESTROYED.with(Cell::get)
    }

    pub fn saw_callback() -> bool {
        SAW_CALLBACK.with(Cell::get)
    }

    pub fn fail_next_create(result: vk::Result) {
        FAIL_NEXT.with(|c| c.set(Some(result)));
    }

    pub unsafe extern "system" fn create(
        _instance: vk::Instance,
        p_create_info: *const vk::DebugUtilsMessengerCreateInfoEXT<'_>,
        _p_allocator: *const vk::AllocationCallbacks<'_>,
        p_messenger: *mut vk::DebugUtilsMessengerEXT,
    ) -> vk::Result {
        if let Some(result) = FAIL_NEXT.with(|c| c.take()) {
            return result;
        }
        let has_callback = unsafe { p_create_info.as_ref() }
            .is_some_and(|info| info.pfn_user_callback.is_some());
        SAW_CALLBACK.with(|c| c.set(has_callback));
        unsafe { *p_messenger = messenger() };
        CREATED.with(|c| c.set(c.get() + 1));
        record(Event::MessengerCreated);
        vk::Result::SUCCESS
    }

    pub unsafe extern "system" fn destroy(
        _instance: vk::Instance,
        _messenger: vk::DebugUtilsMessengerEXT,
        _p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        DESTROYED.with(|c| c.set(c.get() + 1));
        record(Event::MessengerDestroyed);
    }
}
