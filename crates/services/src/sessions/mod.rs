mod driver;
mod screen;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use driver::{DriverEvent, SessionDriver};
pub use screen::QuizScreen;
pub use view::SessionView;
pub use workflow::{SessionLoopService, StepOutcome};
