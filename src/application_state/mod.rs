//! # Application State Management
//!
//! This module handles the viewer's lifecycle, including:
//! - Window and graphics initialization
//! - Input handling
//! - Application lifecycle events
//! - The transition from initialization to the running state

pub mod graphics_resources_builder;
pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics};
use input_manager::InputManager;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::engine_state::{
    config::ViewerConfig, error::ViewerError, voxels::volume::VoxelMap, EngineState,
};

/// The main application state container that manages the viewer's lifecycle.
///
/// Borrows the volume for the whole run; the engine state created once graphics are ready
/// borrows it in turn.
pub struct ApplicationState<'v> {
    /// The displayed volume
    volume: &'v VoxelMap,
    /// Viewer configuration
    config: ViewerConfig,
    /// The current graphics state
    pub graphics: MaybeGraphics,
    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState<'v>>,
    /// The error that stopped the event loop, if any
    failure: Option<ViewerError>,
}

/// Represents the fully initialized and running state of the viewer.
pub struct InitializedApplicationState<'v> {
    /// The engine state: displayer, camera and renderer
    pub engine_state: EngineState<'v>,

    /// Handle to the application window
    pub window: Arc<Window>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: web_time::Instant,
}

impl<'v> ApplicationState<'v> {
    /// Creates the application state; graphics are built once the event loop resumes.
    pub fn new(
        volume: &'v VoxelMap,
        config: ViewerConfig,
        event_loop_proxy: EventLoopProxy<Graphics>,
    ) -> Self {
        Self {
            volume,
            config,
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            state: None,
            failure: None,
        }
    }

    /// The error that stopped the event loop, or `Ok` after a normal exit.
    pub fn into_result(self) -> Result<(), ViewerError> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Logs `e`, keeps it for `into_result` and stops the event loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, e: ViewerError) {
        error!("{}", e);
        self.failure = Some(e);
        event_loop.exit();
    }

    /// Initializes the application state with the required graphics resources.
    ///
    /// This transitions the viewer from the initialization phase to the running state by
    /// setting up the engine state with the provided graphics resources.
    fn initialize_application_state(&mut self, event_loop: &ActiveEventLoop) {
        let MaybeGraphics::Graphics(gfx) = std::mem::replace(&mut self.graphics, MaybeGraphics::Moved)
        else {
            return;
        };

        let engine_state = match EngineState::new(
            self.volume,
            &self.config,
            gfx.surface,
            gfx.surface_config,
            gfx.device,
            gfx.queue,
        ) {
            Ok(engine_state) => engine_state,
            Err(e) => return self.fail(event_loop, e),
        };
        info!("Viewer running");

        self.state = Some(InitializedApplicationState {
            engine_state,
            window: gfx.window,
            input_manager: InputManager::new(),
            last_wait_time: web_time::Instant::now(),
        });
    }
}

impl ApplicationHandler<Graphics> for ApplicationState<'_> {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested
        | WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(KeyCode::Escape),
                    ..
                },
            ..
        } = event
        {
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };
        let input_manager = &mut state.input_manager;
        let engine_state = &mut state.engine_state;

        input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                engine_state.resize_surface(size);
            }
            WindowEvent::Focused(is_focused) => {
                if !is_focused {
                    input_manager.release_all();
                }
            }
            WindowEvent::RedrawRequested => {
                engine_state.render();
            }
            _ => (),
        }
    }

    /// Called when the application is resumed; builds the graphics resources the first time.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            if let Err(e) = builder.build_and_send(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    /// Receives the initialized graphics resources and starts the engine.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: Graphics) {
        self.graphics = MaybeGraphics::Graphics(graphics);
        self.initialize_application_state(event_loop);
    }

    /// Called before the event loop goes to sleep.
    ///
    /// This method handles frame timing, input processing, and requests the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            let now = web_time::Instant::now();
            let wait_dt = now - state.last_wait_time;

            let processed_input = state.input_manager.get_and_reset_processed_input();
            state.engine_state.set_input_commands(processed_input);

            state.engine_state.process_input(wait_dt);

            state.last_wait_time = now;
            state.window.request_redraw();
        }
    }
}
