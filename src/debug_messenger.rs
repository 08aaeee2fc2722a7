//! Validation-layer messenger.
//!
//! `VK_EXT_debug_utils` entry points are not exported by the loader, so they
//! are looked up by name from the instance. Either lookup may come back
//! empty and callers branch on that.

use crate::InstanceError;
use crate::loader::InstanceFns;
use ash::vk;
use std::borrow::Cow;
use std::ffi::{CStr, c_void};
use std::mem;
use std::panic::{self, AssertUnwindSafe};

pub const CREATE_DEBUG_UTILS_MESSENGER_NAME: &CStr = c"vkCreateDebugUtilsMessengerEXT";
pub const DESTROY_DEBUG_UTILS_MESSENGER_NAME: &CStr = c"vkDestroyDebugUtilsMessengerEXT";

const TARGET: &str = "vk-debug-messenger";

/// Builds the messenger create info used both for the messenger proper and
/// for the copy chained onto instance creation.
pub fn messenger_create_info(
    severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
) -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(severity)
        .message_type(message_type)
        .pfn_user_callback(Some(vulkan_debug_callback))
}

type VoidFn = unsafe extern "system" fn();
type CreateFn = vk::PFN_vkCreateDebugUtilsMessengerEXT;
type DestroyFn = vk::PFN_vkDestroyDebugUtilsMessengerEXT;

#[derive(Clone, Copy)]
pub struct DebugUtilsFns {
    pub create: Option<vk::PFN_vkCreateDebugUtilsMessengerEXT>,
    pub destroy: Option<vk::PFN_vkDestroyDebugUtilsMessengerEXT>,
}

impl DebugUtilsFns {
    pub fn resolve(instance: &impl InstanceFns) -> Self {
        let create = instance
            .proc_addr(CREATE_DEBUG_UTILS_MESSENGER_NAME)
            // SAFETY: the runtime returned the entry point registered under
            // this exact name, whose signature is fixed by the extension.
            .map(|f| unsafe { mem::transmute::<VoidFn, CreateFn>(f) });
        let destroy = instance
            .proc_addr(DESTROY_DEBUG_UTILS_MESSENGER_NAME)
            // SAFETY: as above.
            .map(|f| unsafe { mem::transmute::<VoidFn, DestroyFn>(f) });

        tracing::trace!(
            create_resolved = create.is_some(),
            destroy_resolved = destroy.is_some()
        );

        Self { create, destroy }
    }
}

pub struct DebugMessenger {
    handle: vk::DebugUtilsMessengerEXT,
    destroy: Option<vk::PFN_vkDestroyDebugUtilsMessengerEXT>,
}

impl std::fmt::Debug for DebugMessenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugMessenger")
            .field("handle", &self.handle)
            .field("destroy_resolved", &self.destroy.is_some())
            .finish()
    }
}

impl DebugMessenger {
    #[tracing::instrument(skip_all)]
    pub fn install(
        instance: &impl InstanceFns,
        create_info: &vk::DebugUtilsMessengerCreateInfoEXT<'_>,
    ) -> crate::Result<Self> {
        let fns = DebugUtilsFns::resolve(instance);

        let Some(create) = fns.create else {
            return Err(InstanceError::DebugUtilsUnavailable(
                CREATE_DEBUG_UTILS_MESSENGER_NAME.to_string_lossy().into_owned(),
            )
            .into());
        };

        let mut handle = vk::DebugUtilsMessengerEXT::null();
        // SAFETY: create was resolved from this live instance and every
        // pointer passed outlives the call.
        let result =
            unsafe { create(instance.handle(), create_info, std::ptr::null(), &mut handle) };

        if result != vk::Result::SUCCESS {
            return Err(InstanceError::FailedCreateDebugMessenger(result).into());
        }

        tracing::info!("Created debug messenger {handle:?}");
        Ok(Self {
            handle,
            destroy: fns.destroy,
        })
    }

    pub fn handle(&self) -> vk::DebugUtilsMessengerEXT {
        self.handle
    }

    /// Best effort: without a destroy entry point there is nothing to call.
    pub fn uninstall(self, instance: &impl InstanceFns) {
        match self.destroy {
            Some(destroy) => {
                tracing::debug!("Destroying debug messenger {:?}", self.handle);
                // SAFETY: the messenger was created from this instance and
                // this is its last use.
                unsafe { destroy(instance.handle(), self.handle, std::ptr::null()) };
            }
            None => tracing::debug!(
                "{} unresolved, skipping messenger teardown",
                DESTROY_DEBUG_UTILS_MESSENGER_NAME.to_string_lossy()
            ),
        }
    }
}

/// True for WARNING and ERROR.
pub fn is_elevated(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> bool {
    severity.as_raw() >= vk::DebugUtilsMessageSeverityFlagsEXT::WARNING.as_raw()
}

fn message_type_name(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => "GENERAL",
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "VALIDATION",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "PERFORMANCE",
        _ => "UNKNOWN",
    }
}

/// # Safety
/// Called by the validation layers; `p_callback_data` is either null or
/// points at a valid callback data struct for the duration of the call.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    // Unwinding out of an extern "system" fn aborts the process.
    let _ = panic::catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: upheld by the caller.
        unsafe { log_message(message_severity, message_type, p_callback_data) }
    }));

    vk::FALSE
}

unsafe fn log_message(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
) {
    let (message_id_name, message_id_number, message, object_count) =
        match unsafe { p_callback_data.as_ref() } {
            Some(data) => (
                unsafe { lossy(data.p_message_id_name) },
                data.message_id_number,
                unsafe { lossy(data.p_message) },
                data.object_count,
            ),
            None => (Cow::from(""), 0, Cow::from(""), 0),
        };
    let type_str = message_type_name(message_type);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => tracing::debug!(
            target: TARGET,
            object_count,
            "[{type_str}] [{message_id_name} ({message_id_number})]: {message}"
        ),
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => tracing::info!(
            target: TARGET,
            object_count,
            "[{type_str}] [{message_id_name} ({message_id_number})]: {message}"
        ),
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => tracing::warn!(
            target: TARGET,
            object_count,
            "[{type_str}] [{message_id_name} ({message_id_number})]: {message}"
        ),
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => tracing::error!(
            target: TARGET,
            object_count,
            "[{type_str}] [{message_id_name} ({message_id_number})]: {message}"
        ),
        _ => tracing::debug!(
            target: TARGET,
            object_count,
            "[{type_str}] [{message_id_name} ({message_id_number})]: {message}"
        ),
    }

    if is_elevated(message_severity) {
        tracing::warn!(
            target: TARGET,
            "validation reported {message_severity:?}, this is likely a bug"
        );
    }
}

unsafe fn lossy<'a>(ptr: *const std::ffi::c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::from("")
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy()
    }
}
