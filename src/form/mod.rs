pub mod controller;
pub mod service;

pub use controller::{ContactForm, FormState, Notice, SubmitOutcome};
pub use service::{LeadService, SUBMIT_ACTION, SubmitError, Submitted};
