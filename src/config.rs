use crate::Version;
use crate::system_info::VALIDATION_LAYER_NAME;
use ash::vk;
use std::ffi::CStr;

/// Everything the bootstrap sequence needs decided up front.
///
/// `enable_validation` defaults to on for debug builds and off for release
/// builds, but is an ordinary field so either branch can be driven from
/// tests or from the binary.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub app_name: String,
    pub app_version: Version,
    pub engine_name: String,
    pub engine_version: Version,
    pub api_version: Version,
    pub enable_validation: bool,
    pub validation_layers: Vec<&'static CStr>,
    pub debug_message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub debug_message_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            app_name: "Hello Triangle".to_string(),
            app_version: Version::V1_0_0,
            engine_name: "No Engine".to_string(),
            engine_version: Version::V1_0_0,
            api_version: Version::V1_0_0,
            enable_validation: cfg!(debug_assertions),
            validation_layers: vec![VALIDATION_LAYER_NAME],
            debug_message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            debug_message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }
}

impl BootstrapConfig {
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn app_version(mut self, version: Version) -> Self {
        self.app_version = version;
        self
    }

    pub fn engine_name(mut self, engine_name: impl Into<String>) -> Self {
        self.engine_name = engine_name.into();
        self
    }

    pub fn engine_version(mut self, version: Version) -> Self {
        self.engine_version = version;
        self
    }

    pub fn api_version(mut self, version: Version) -> Self {
        self.api_version = version;
        self
    }

    pub fn enable_validation(mut self, enable: bool) -> Self {
        self.enable_validation = enable;
        self
    }

    pub fn validation_layers(mut self, layers: Vec<&'static CStr>) -> Self {
        self.validation_layers = layers;
        self
    }

    pub fn debug_messenger_severity(
        mut self,
        severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    ) -> Self {
        self.debug_message_severity = severity;
        self
    }

    pub fn debug_messenger_type(mut self, message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> Self {
        self.debug_message_type = message_type;
        self
    }

    /// Layers actually requested: the validation list when validation is on,
    /// nothing otherwise.
    pub fn requested_layers(&self) -> &[&'static CStr] {
        if self.enable_validation {
            &self.validation_layers
        } else {
            &[]
        }
    }
}
