//! Shared submit machinery for the form controllers.
//!
//! ```text
//! Idle ──submit──► Submitting ──ok──► Succeeded
//!                      │
//!                      └──invalid / failed──► Idle
//! ```
//!
//! A submit that arrives while another is in flight is ignored. The
//! in-flight flag lives in an [`InFlight`] guard, so dropping a pending
//! submit future also clears it.

use std::cell::{Cell, Ref, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use intake_core::validation::{FieldValue, RawValues, Schema, ValidationErrors};
use intake_core::{ActionError, ActionResult, AppConfig, PersistenceActions};

use crate::field::{filter_options, render_field, FieldSpec, RenderedField, SelectOption};
use crate::routes::{Navigator, Route};
use crate::values::{FormValues, SubscriptionId};

/// Submission errors surfaced to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("Submission timed out after {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    Idle,
    Submitting,
    Succeeded,
}

/// Result of one submit call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Persisted and moved to another route
    Navigated(Route),
    /// Persisted and the overlay was closed
    Closed,
    /// Validation failed; nothing was sent
    Invalid(ValidationErrors),
    /// The persistence call failed; values are kept
    Failed(SubmissionError),
    /// Another submit was already in flight
    Ignored,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Navigated(_) | SubmitOutcome::Closed)
    }
}

/// What every controller needs to submit: the persistence actions, a
/// navigator and the submit timeout.
#[derive(Clone)]
pub struct FormContext {
    pub actions: Rc<dyn PersistenceActions>,
    pub navigator: Rc<dyn Navigator>,
    pub submit_timeout: Option<Duration>,
}

impl FormContext {
    pub fn new(actions: Rc<dyn PersistenceActions>, navigator: Rc<dyn Navigator>) -> Self {
        Self { actions, navigator, submit_timeout: None }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.submit_timeout = timeout;
        self
    }

    /// Context using the configured submit timeout.
    pub fn from_config(
        config: &AppConfig,
        actions: Rc<dyn PersistenceActions>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self::new(actions, navigator).with_timeout(config.submit_timeout())
    }
}

/// Value tree, errors and submit state of one form.
#[derive(Debug)]
pub struct FormCore {
    values: RefCell<FormValues>,
    errors: RefCell<ValidationErrors>,
    status: Cell<FormStatus>,
    in_flight: Cell<bool>,
    timeout: Option<Duration>,
}

impl FormCore {
    pub fn new(defaults: RawValues, timeout: Option<Duration>) -> Self {
        Self {
            values: RefCell::new(FormValues::new(defaults)),
            errors: RefCell::new(ValidationErrors::new()),
            status: Cell::new(FormStatus::Idle),
            in_flight: Cell::new(false),
            timeout,
        }
    }

    pub fn values(&self) -> Ref<'_, FormValues> {
        self.values.borrow()
    }

    pub fn set(&self, field: &str, value: impl Into<FieldValue>) {
        let changes = self.values.borrow_mut().set(field, value);
        changes.deliver();
    }

    pub fn subscribe(&self, observer: impl Fn(&str, &FieldValue) + 'static) -> SubscriptionId {
        self.values.borrow_mut().subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.values.borrow_mut().unsubscribe(id)
    }

    pub fn errors(&self) -> Ref<'_, ValidationErrors> {
        self.errors.borrow()
    }

    pub fn status(&self) -> FormStatus {
        self.status.get()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.get()
    }

    /// Restore the default values and clear errors.
    pub fn reset(&self) {
        let changes = self.values.borrow_mut().reset();
        self.errors.borrow_mut().clear();
        changes.deliver();
    }

    pub fn render(&self, specs: &[FieldSpec]) -> Vec<RenderedField> {
        let values = self.values.borrow();
        let errors = self.errors.borrow();
        specs
            .iter()
            .map(|spec| render_field(spec, &values, &errors))
            .collect()
    }

    /// Start a submission, or `None` if one is already in flight.
    pub fn begin(&self) -> Option<InFlight<'_>> {
        if self.in_flight.replace(true) {
            return None;
        }
        self.status.set(FormStatus::Submitting);
        Some(InFlight { core: self, succeeded: false })
    }

    /// Validate the current values, storing the errors for rendering.
    pub fn validate<S: Schema>(&self, schema: &S) -> Result<S::Output, ValidationErrors> {
        let snapshot = self.values.borrow().snapshot();
        let result = schema.validate(&snapshot);
        *self.errors.borrow_mut() = match &result {
            Ok(_) => ValidationErrors::new(),
            Err(errors) => errors.clone(),
        };
        result
    }

    /// Await a persistence call under the submit timeout.
    pub async fn call<T>(&self, action: impl Future<Output = ActionResult<T>>) -> Result<T, SubmissionError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, action)
                .await
                .map_err(|_| SubmissionError::TimedOut(limit))?
                .map_err(SubmissionError::from),
            None => action.await.map_err(SubmissionError::from),
        }
    }

    /// Log a failed submission and wrap it as an outcome.
    pub fn failed(&self, form: &str, error: SubmissionError) -> SubmitOutcome {
        log::error!("{} submission failed: {}", form, error);
        SubmitOutcome::Failed(error)
    }
}

/// Marks a submission in flight until dropped.
pub struct InFlight<'a> {
    core: &'a FormCore,
    succeeded: bool,
}

impl InFlight<'_> {
    pub fn succeed(mut self) {
        self.succeeded = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.core.in_flight.set(false);
        self.core.status.set(if self.succeeded {
            FormStatus::Succeeded
        } else {
            FormStatus::Idle
        });
    }
}

/// Accessors shared by every form controller.
pub trait Form {
    fn core(&self) -> &FormCore;

    /// Fields currently shown, in display order.
    fn fields(&self) -> Vec<FieldSpec>;

    fn submit_label(&self) -> &'static str;

    fn render(&self) -> Vec<RenderedField> {
        self.core().render(&self.fields())
    }

    fn set(&self, field: &str, value: impl Into<FieldValue>) {
        self.core().set(field, value);
    }

    /// Options of a select field that match what the user typed. Empty for
    /// fields without options.
    fn search_options(&self, field: &str, query: &str) -> Vec<SelectOption> {
        self.fields()
            .into_iter()
            .find(|spec| spec.name == field)
            .map(|spec| filter_options(&spec.options, query).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    fn value(&self, field: &str) -> FieldValue {
        self.core().values().get(field).clone()
    }

    fn errors(&self) -> ValidationErrors {
        self.core().errors().clone()
    }

    fn status(&self) -> FormStatus {
        self.core().status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::validation::{raw_values, PatientIntakeSchema};

    fn make_core() -> FormCore {
        FormCore::new(raw_values([("name", ""), ("email", ""), ("phone", "")]), None)
    }

    #[test]
    fn test_second_begin_is_refused() {
        let core = make_core();
        let guard = core.begin().unwrap();
        assert_eq!(core.status(), FormStatus::Submitting);
        assert!(core.begin().is_none());

        drop(guard);
        assert_eq!(core.status(), FormStatus::Idle);
        assert!(!core.is_submitting());

        core.begin().unwrap().succeed();
        assert_eq!(core.status(), FormStatus::Succeeded);
    }

    #[test]
    fn test_validate_stores_errors() {
        let core = make_core();
        assert!(core.validate(&PatientIntakeSchema).is_err());
        assert!(core.errors().contains("name"));

        core.set("name", "Jean Dupont");
        core.set("email", "jean@x.com");
        core.set("phone", "+225 0102030405");
        assert!(core.validate(&PatientIntakeSchema).is_ok());
        assert!(core.errors().is_empty());
    }

    #[test]
    fn test_observer_can_read_the_form() {
        let core = Rc::new(make_core());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let watcher = Rc::downgrade(&core);
        let sink = Rc::clone(&seen);
        core.subscribe(move |field, _| {
            if let Some(core) = watcher.upgrade() {
                let email = core.values().get("email").clone();
                sink.borrow_mut().push((field.to_string(), email));
            }
        });

        core.set("email", "jean@x.com");
        core.set("name", "Jean");
        core.reset();

        let seen = seen.borrow();
        assert_eq!(seen[1], ("name".to_string(), FieldValue::from("jean@x.com")));
        // reset notifies after the defaults are back
        assert!(seen[2..].iter().all(|(_, email)| *email == FieldValue::from("")));
        assert_eq!(seen.len(), 4);
    }

    #[tokio::test]
    async fn test_call_times_out() {
        let core = FormCore::new(RawValues::new(), Some(Duration::from_millis(10)));
        let result = core
            .call(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, ActionError>(())
            })
            .await;
        assert_eq!(result, Err(SubmissionError::TimedOut(Duration::from_millis(10))));
    }

    #[tokio::test]
    async fn test_call_passes_action_errors() {
        let core = make_core();
        let result: Result<(), _> = core.call(async { Err(ActionError::Backend("down".into())) }).await;
        assert_eq!(result, Err(SubmissionError::Action(ActionError::Backend("down".into()))));
    }
}
