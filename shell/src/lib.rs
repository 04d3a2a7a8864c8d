//! Core of the on-device application shell: the app lifecycle, the touch
//! input bridge shared with the polling context, and the render lock that
//! guards the visual tree.

pub mod application;
pub mod clock;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod render_lock;
pub mod scene;
pub mod services;

pub use application::{AppContext, AppDescriptor, AppId, AppInfo, AppState, Application, IconRef, Rgb};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, ShellError};
pub use input::{InputBridge, TouchState};
pub use lifecycle::{LifecycleManager, LifecycleSnapshot, Switch};
pub use render_lock::{LockStats, RenderGuard, RenderLock};
pub use scene::{NodeId, NodeKind, Scene};
pub use services::{Services, SharedScene};
