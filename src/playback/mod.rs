pub mod controller;
pub mod events;
pub mod overlay;
pub mod state;

pub use controller::{video_no_from_url, PlaybackController};
pub use events::{ControllerEvent, MediaEvent, OverlayAction, PageEvent, PageEvents};
pub use overlay::{ButtonView, ItemView, OverlayView};
pub use state::{ControllerSnapshot, Phase, SessionState};
