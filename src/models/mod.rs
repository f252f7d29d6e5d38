pub mod lead;

pub use lead::{Field, LeadInput, LeadRecord, NewLead};
