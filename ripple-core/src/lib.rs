//! # Saorsa Ripple Core
//!
//! Material-style press ripples for any element tree.
//! The lifecycle runs against a [`Surface`], so the same controller drives
//! the browser DOM (feature `wasm`) and the in-memory [`Document`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               ripple-core                   │
//! ├─────────────────────────────────────────────┤
//! │  Hooks           │  Lifecycle Controller    │
//! │  - use_ripple    │  - Spawn / grow / fade   │
//! │  - custom_ripple │  - Release subscriptions │
//! │  - Options merge │  - Manual cancel         │
//! ├─────────────────────────────────────────────┤
//! │  Geometry/Style  │  Scheduling              │
//! │  - Ripple size   │  - After next paint      │
//! │  - Transitions   │  - After delay           │
//! ├─────────────────────────────────────────────┤
//! │  Surface: Document (memory) | DomSurface    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Testing
//!
//! The browser binding is feature-gated; its native tests only build with
//! the feature on:
//!
//! ```bash
//! cargo test -p ripple-core --features wasm
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dom;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hook;
pub mod options;
pub mod ripple;
pub mod scheduler;
pub mod style;
pub mod subscription;
pub mod surface;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use dom::{Document, Node, NodeId};
pub use error::{RippleError, RippleResult};
pub use event::{NativeEvent, PointerEvent, ReleaseKind};
pub use geometry::{pointer_offset, position_at_pointer, ripple_size, Rect};
pub use hook::{custom_ripple, use_ripple, RippleFactory};
pub use options::{
    OnSpawn, RippleConfig, RippleOptions, RipplePatch, DEFAULT_CLASS_NAME, DEFAULT_COLOR,
    DEFAULT_CONTAINER_CLASS_NAME, DEFAULT_DURATION_MS, DEFAULT_TIMING_FUNCTION,
};
pub use ripple::{
    CancelHandle, ContainerStrategy, HostRef, RippleController, RippleId, RipplePhase,
    SpawnContext, COMPLETED_FACTOR,
};
pub use scheduler::{Clock, FrameScheduler, ManualClock, SystemClock};
pub use subscription::{ReleaseRegistry, SubscriptionId};
pub use surface::{Surface, TouchSupport};

/// Ripple core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
