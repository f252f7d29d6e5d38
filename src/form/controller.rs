use std::time::Duration;

use uuid::Uuid;

use super::service::{LeadService, SubmitError, Submitted};
use crate::models::{Field, LeadInput};
use crate::validate::{self, FieldErrors};

#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Editing,
    Submitting,
    Success { lead_id: Uuid },
    Error { message: String },
}

/// Transient banner shown while the form stays editable.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Throttled { retry_after: Duration },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Throttled { retry_after } => write!(
                f,
                "Too many attempts. Please wait {} seconds and try again.",
                retry_after.as_secs().max(1)
            ),
        }
    }
}

pub enum SubmitOutcome {
    Accepted(Submitted),
    Invalid(FieldErrors),
    Throttled(Duration),
    Failed(String),
    /// The form was not in `Editing`.
    Ignored,
}

pub const STORE_FAILURE_MESSAGE: &str =
    "We could not save your request. Please try again in a moment.";

/// Contact form: `Editing -> Submitting -> Success | Error`.
///
/// Field values are sanitized on every edit. Errors are tracked only for
/// fields that were edited, while `can_submit` always checks every field.
#[derive(Debug, Clone)]
pub struct ContactForm {
    input: LeadInput,
    errors: FieldErrors,
    state: FormState,
    notice: Option<Notice>,
}

impl ContactForm {
    pub fn new() -> Self {
        Self {
            input: LeadInput::default(),
            errors: FieldErrors::new(),
            state: FormState::Editing,
            notice: None,
        }
    }

    /// A form with every field typed in at once.
    pub fn from_input(raw: &LeadInput) -> Self {
        let mut form = Self::new();
        form.edit(Field::Name, &raw.name);
        form.edit(Field::Phone, &raw.phone);
        form.edit(Field::Social, &raw.social);
        form
    }

    pub fn input(&self) -> &LeadInput {
        &self.input
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Apply one keystroke-level change. Ignored outside `Editing`.
    pub fn edit(&mut self, field: Field, raw: &str) -> bool {
        if self.state != FormState::Editing {
            return false;
        }

        let value = validate::sanitize(raw);
        let error = match field {
            Field::Name => validate::name_error(&value),
            Field::Phone => validate::phone_error(&value),
            Field::Social => validate::social_error(&value),
        };

        match field {
            Field::Name => self.input.name = value,
            Field::Phone => self.input.phone = value,
            Field::Social => self.input.social = value,
        }

        match error {
            Some(e) => {
                self.errors.insert(field.as_str(), e);
            }
            None => {
                self.errors.remove(field.as_str());
            }
        }
        self.notice = None;
        true
    }

    pub fn can_submit(&self) -> bool {
        self.state == FormState::Editing && validate::validate_lead(&self.input).is_empty()
    }

    pub async fn submit(
        &mut self,
        service: &LeadService,
        client_key: &str,
        website: Option<String>,
    ) -> SubmitOutcome {
        if self.state != FormState::Editing {
            return SubmitOutcome::Ignored;
        }

        let errors = validate::validate_lead(&self.input);
        if !errors.is_empty() {
            self.errors = errors.clone();
            return SubmitOutcome::Invalid(errors);
        }

        self.notice = None;
        self.state = FormState::Submitting;

        match service.submit(&self.input, client_key, website).await {
            Ok(submitted) => {
                self.state = FormState::Success {
                    lead_id: submitted.record.id,
                };
                SubmitOutcome::Accepted(submitted)
            }
            Err(SubmitError::RateLimited { retry_after }) => {
                self.state = FormState::Editing;
                self.notice = Some(Notice::Throttled { retry_after });
                SubmitOutcome::Throttled(retry_after)
            }
            Err(SubmitError::Invalid(errors)) => {
                self.state = FormState::Editing;
                self.errors = errors.clone();
                SubmitOutcome::Invalid(errors)
            }
            Err(SubmitError::Store(_)) => {
                let message = STORE_FAILURE_MESSAGE.to_string();
                self.state = FormState::Error {
                    message: message.clone(),
                };
                SubmitOutcome::Failed(message)
            }
        }
    }

    /// `Error -> Editing`, keeping what was typed.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.state, FormState::Error { .. }) {
            return false;
        }
        self.state = FormState::Editing;
        true
    }

    /// `Success -> Editing` with an empty form.
    pub fn reset(&mut self) -> bool {
        if !matches!(self.state, FormState::Success { .. }) {
            return false;
        }
        *self = Self::new();
        true
    }
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new()
    }
}
