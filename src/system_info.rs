use crate::loader::Loader;
use ash::vk;
use raw_window_handle::HasDisplayHandle;
use std::ffi::CStr;
use std::fmt::{Debug, Formatter};

pub const VALIDATION_LAYER_NAME: &CStr = c"VK_LAYER_KHRONOS_validation";
pub const DEBUG_UTILS_EXT_NAME: &CStr = ash::ext::debug_utils::NAME;

/// Supplies the instance extensions a window surface needs on this platform.
pub trait WindowSystem {
    fn required_instance_extensions(&self) -> crate::Result<Vec<&'static CStr>>;
}

/// Adapts anything exposing a display handle (a `winit` window, for one).
pub struct DisplayWindow<'w, W: HasDisplayHandle>(pub &'w W);

impl<W: HasDisplayHandle> WindowSystem for DisplayWindow<'_, W> {
    fn required_instance_extensions(&self) -> crate::Result<Vec<&'static CStr>> {
        let display_handle = self.0.display_handle()?;
        let extensions = ash_window::enumerate_required_extensions(display_handle.as_raw())?;

        Ok(extensions
            .iter()
            // SAFETY: ash_window hands out static nul terminated names.
            .map(|&ext| unsafe { CStr::from_ptr(ext) })
            .collect())
    }
}

/// The windowing extensions followed by `VK_EXT_debug_utils` when
/// validation is on.
#[tracing::instrument(skip(window))]
pub fn required_extensions(
    window: &dyn WindowSystem,
    enable_validation: bool,
) -> crate::Result<Vec<&'static CStr>> {
    let mut extensions = window.required_instance_extensions()?;

    if enable_validation {
        extensions.push(DEBUG_UTILS_EXT_NAME);
    }

    tracing::trace!(?extensions);
    Ok(extensions)
}

pub struct SystemInfo {
    pub available_layers: Vec<vk::LayerProperties>,
}

impl Debug for SystemInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemInfo")
            .field(
                "available_layers",
                &self.available_layers.iter().map(layer_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl SystemInfo {
    #[tracing::instrument(skip(loader))]
    pub fn get_system_info<L: Loader>(loader: &L) -> crate::Result<Self> {
        let available_layers = loader.enumerate_instance_layer_properties()?;
        tracing::trace!(layer_count = available_layers.len());

        Ok(Self { available_layers })
    }

    pub fn is_layer_available(&self, layer: &CStr) -> bool {
        self.available_layers
            .iter()
            .any(|available| available.layer_name_as_c_str().is_ok_and(|name| name == layer))
    }

    /// True when every requested layer is present on the host.
    pub fn layers_supported(&self, requested: &[&CStr]) -> bool {
        requested.iter().all(|layer| self.is_layer_available(layer))
    }

    pub fn missing_layers(&self, requested: &[&CStr]) -> Vec<String> {
        requested
            .iter()
            .filter(|layer| !self.is_layer_available(layer))
            .map(|layer| layer.to_string_lossy().into_owned())
            .collect()
    }
}

fn layer_name(layer: &vk::LayerProperties) -> String {
    layer
        .layer_name_as_c_str()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
