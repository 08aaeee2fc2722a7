use anyhow::Context;
use std::panic::{self, AssertUnwindSafe};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use vk_bootstrap_triangle::{AppContext, AshInstance, AshLoader, BootstrapConfig, DisplayWindow};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;

struct App {
    loader: AshLoader,
    config: BootstrapConfig,
    window: Option<Window>,
    context: Option<AppContext<AshInstance>>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(loader: AshLoader, config: BootstrapConfig) -> Self {
        Self {
            loader,
            config,
            window: None,
            context: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    /// Runs however the event loop ended. The window goes last.
    fn cleanup(&mut self) {
        if let Some(mut context) = self.context.take() {
            context.destroy();
        }
        self.window = None;
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("Vulkan")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .with_resizable(false);
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(err) => {
                let err = anyhow::Error::new(err).context("Could not create window");
                return self.fail(event_loop, err);
            }
        };

        let mut context = AppContext::new(self.config.clone());
        let result = context
            .init_vulkan(&self.loader, &DisplayWindow(&window))
            .and_then(|()| context.mark_running());

        self.context = Some(context);
        self.window = Some(window);

        if let Err(err) = result {
            self.fail(event_loop, err.into());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            event_loop.exit();
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // SAFETY: loading the system Vulkan loader is the point of this binary.
    let loader = unsafe { AshLoader::load() }.context("Could not load Vulkan")?;
    let event_loop = EventLoop::new()?;

    let mut app = App::new(loader, BootstrapConfig::default());
    let run = panic::catch_unwind(AssertUnwindSafe(|| event_loop.run_app(&mut app)));
    app.cleanup();
    match run {
        Ok(run) => run?,
        Err(payload) => panic::resume_unwind(payload),
    }

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
