//! geoedit editor: interaction state and the session hosts embed.
//!
//! - [`state`]: immutable snapshots and the event reducer
//! - [`store`]: holds the current snapshot
//! - [`gesture`]: pointer/keyboard state machine and its armed listeners
//! - [`shortcuts`]: key bindings
//! - [`session`]: store + gestures + redraw + change notification

pub mod gesture;
pub mod session;
pub mod shortcuts;
pub mod state;
pub mod store;

pub use gesture::{GestureAction, GestureController, Listener, Mode};
pub use session::{EditorSession, Inspection, ListenerId};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use state::{EditorState, Event, reduce};
pub use store::Store;
