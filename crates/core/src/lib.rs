//! Remote gesture control for iOS devices driven through WebDriverAgent.
//!
//! A gesture is sent through whichever of three wire protocols the backend
//! build understands. The [`Dispatcher`] tries them in mode order, falls back
//! only when nothing can have executed upstream, and pins the protocol that
//! works. Sessions are adopted or created on demand by the
//! [`SessionManager`] and healed once when the backend reports them gone.
//!
//! Most callers only need [`Controller`]:
//!
//! ```ignore
//! let controller = wdactl::Controller::new(wdactl::Config::default())?;
//! controller.dispatch_tap(120.0, 300.0).await?;
//! ```

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod gesture;
pub mod heal;
pub mod screen;
pub mod session;
pub mod transport;

pub use config::{AdoptionConfig, Config, HttpConfig};
pub use controller::Controller;
pub use dispatch::{Dispatcher, Mode, ModeSelector, ModeSnapshot, Protocol, Route, TapPreference, TapVariant, attempt_order};
pub use error::{Error, FallbackDecision, Result, TransportError};
pub use gesture::Command;
pub use heal::{AdoptStrategy, CapabilitiesStrategy, Healed, RecreateStrategy, with_auto_heal};
pub use screen::DeviceInfo;
pub use session::{BackendContext, SessionManager};
pub use transport::{BoxFut, HttpTransport, Transport};
pub use wdactl_protocol as protocol;
