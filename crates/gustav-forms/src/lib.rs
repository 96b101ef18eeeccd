//! GUSTAV form glue.
//!
//! This crate holds the per-form upload state machine and the small pieces of UI
//! state around it:
//! - **controller**: mode switching, dirty tracking and submit interception
//! - **fields**: the hidden fields filled by a prepared upload
//! - **context**: the two form flavours (learning submission, material creation)
//! - **notify**: transient notification banner
//! - **settings**: persisted theme and sidebar preferences
//! - **registry**: one-time initialization per element

pub mod context;
pub mod controller;
pub mod fields;
pub mod notify;
pub mod preparer;
pub mod registry;
pub mod settings;

pub use context::FormContext;
pub use controller::{FieldGroup, FormController, PreparationState, SubmitOutcome};
pub use fields::HiddenFields;
pub use notify::{Notification, NotificationCenter, NotificationLevel};
pub use preparer::{FormSubmitter, PrepareUpload};
pub use registry::{ElementRole, FormRegistry, InitRegistry};
pub use settings::{
    FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore, Preferences,
    Settings, Theme,
};
