use crate::Version;
use crate::debug_messenger::messenger_create_info;
use crate::loader::Loader;
use ash::vk;
use std::ffi::{CStr, CString};

#[derive(Debug)]
pub struct InstanceBuilder {
    // VkApplicationInfo
    app_name: String,
    engine_name: String,
    application_version: Version,
    engine_version: Version,
    api_version: Version,

    // VkInstanceCreateInfo
    layers: Vec<&'static CStr>,
    extensions: Vec<&'static CStr>,

    // debug messenger chained onto instance creation
    enable_validation: bool,
    debug_message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    debug_message_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self {
            app_name: "".to_string(),
            engine_name: "".to_string(),
            application_version: Version::new(0, 0, 0),
            engine_version: Version::new(0, 0, 0),
            api_version: Version::V1_0_0,
            layers: vec![],
            extensions: vec![],
            enable_validation: false,
            debug_message_severity: vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            debug_message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }

    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    pub fn engine_name(mut self, engine_name: impl Into<String>) -> Self {
        self.engine_name = engine_name.into();
        self
    }

    pub fn app_version(mut self, version: Version) -> Self {
        self.application_version = version;
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

    pub fn enable_layers(mut self, layers: &[&'static CStr]) -> Self {
        self.layers.extend_from_slice(layers);
        self
    }

    pub fn enable_extensions(mut self, extensions: &[&'static CStr]) -> Self {
        self.extensions.extend_from_slice(extensions);
        self
    }

    /// Enables the requested layers and chains a messenger create info onto
    /// instance creation. Layer availability must be checked beforehand.
    pub fn enable_validation(mut self, enable: bool) -> Self {
        self.enable_validation = enable;
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

    #[tracing::instrument(skip_all)]
    pub fn build<L: Loader>(self, loader: &L) -> crate::Result<L::Instance> {
        let app_name =
            CString::new(self.app_name).map_err(|_| crate::InstanceError::InvalidAppName)?;
        let engine_name =
            CString::new(self.engine_name).map_err(|_| crate::InstanceError::InvalidAppName)?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(self.application_version.into())
            .engine_name(&engine_name)
            .engine_version(self.engine_version.into())
            .api_version(self.api_version.into());

        tracing::debug!(
            r#"
Application info: {{
    name: {:?},
    version: {},
    engine_name: {:?},
    engine_version: {},
    api_version: {},
}}
            "#,
            app_name,
            self.application_version,
            engine_name,
            self.engine_version,
            self.api_version,
        );

        let enabled_extension_ptr = self
            .extensions
            .iter()
            .map(|e| e.as_ptr())
            .collect::<Vec<_>>();

        let enabled_layers_ptr = if self.enable_validation {
            self.layers.iter().map(|l| l.as_ptr()).collect::<Vec<_>>()
        } else {
            vec![]
        };

        tracing::trace!(
            extensions = ?self.extensions,
            layers = ?self.layers,
            self.enable_validation
        );

        // Covers vkCreateInstance and vkDestroyInstance, which the messenger
        // installed later cannot observe.
        let mut debug_create_info =
            messenger_create_info(self.debug_message_severity, self.debug_message_type);

        let mut instance_create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&enabled_extension_ptr)
            .enabled_layer_names(&enabled_layers_ptr);

        if self.enable_validation {
            instance_create_info = instance_create_info.push_next(&mut debug_create_info);
        }

        tracing::info!("Creating vkInstance with application info...");
        // SAFETY: every pointer in instance_create_info borrows a local that
        // outlives this call.
        let instance = unsafe { loader.create_instance(&instance_create_info) }
            .map_err(crate::InstanceError::FailedCreateInstance)?;
        tracing::info!("Created vkInstance");

        list_available_extensions(loader);

        Ok(instance)
    }
}

/// Informational only: a failure here never fails the bootstrap.
fn list_available_extensions<L: Loader>(loader: &L) {
    match loader.enumerate_instance_extension_properties() {
        Ok(extensions) => {
            tracing::info!("Available extensions:");
            for extension in &extensions {
                if let Ok(name) = extension.extension_name_as_c_str() {
                    tracing::info!("\t{}", name.to_string_lossy());
                }
            }
        }
        Err(err) => tracing::warn!("Could not list instance extensions: {err}"),
    }
}
