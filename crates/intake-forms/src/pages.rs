//! Pages behind each route: they fetch what their form needs and build it.

use chrono::{DateTime, Utc};
use thiserror::Error;

use intake_core::models::{find_physician, Appointment, Patient, PatientIdentity, Physician};
use intake_core::notify::format_date_time;
use intake_core::{ActionError, AppConfig};

use crate::admin::AdminDashboard;
use crate::appointment_form::AppointmentForm;
use crate::controller::FormContext;
use crate::patient_form::PatientForm;
use crate::register_form::RegisterForm;
use crate::routes::{AdminAccess, Route};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Could not load page: {0}")]
    Action(ActionError),
}

impl From<ActionError> for PageError {
    fn from(e: ActionError) -> Self {
        match e {
            ActionError::NotFound(what) => PageError::NotFound(what),
            other => PageError::Action(other),
        }
    }
}

pub type PageResult<T> = Result<T, PageError>;

/// `/` and `/?admin=true`: the intake form, with the passkey prompt when asked.
pub struct HomePage {
    pub form: PatientForm,
    pub admin_access: Option<AdminAccess>,
}

impl HomePage {
    pub fn load(route: &Route, config: &AppConfig, context: FormContext) -> Self {
        Self {
            form: PatientForm::new(context),
            admin_access: AdminAccess::is_requested(route).then(|| AdminAccess::new(config)),
        }
    }
}

/// `/patients/{user_id}/register`
pub struct RegisterPage {
    pub identity: PatientIdentity,
    pub form: RegisterForm,
}

impl RegisterPage {
    pub async fn load(user_id: &str, context: FormContext) -> PageResult<Self> {
        let identity = context.actions.get_patient_identity(user_id).await?;
        let form = RegisterForm::new(&identity, context);
        Ok(Self { identity, form })
    }
}

/// `/patients/{user_id}/new-appointment`
pub struct NewAppointmentPage {
    pub patient: Patient,
    pub form: AppointmentForm,
}

impl NewAppointmentPage {
    pub async fn load(user_id: &str, now: DateTime<Utc>, context: FormContext) -> PageResult<Self> {
        let patient = context.actions.get_patient_by_id(user_id).await?;
        let form = AppointmentForm::create(user_id, patient.id.clone(), now, context);
        Ok(Self { patient, form })
    }
}

/// `/patients/{user_id}/new-appointment/success?appointmentId={id}`
#[derive(Debug, Clone)]
pub struct SuccessPage {
    pub appointment: Appointment,
    pub physician: Option<&'static Physician>,
    pub formatted_date: String,
}

impl SuccessPage {
    pub const HEADLINE: &'static str = "Your appointment request has been successfully submitted!";

    pub async fn load(appointment_id: &str, context: &FormContext) -> PageResult<Self> {
        let appointment = context.actions.get_appointment(appointment_id).await?;
        Ok(Self {
            physician: find_physician(&appointment.primary_physician),
            formatted_date: format_date_time(&appointment),
            appointment,
        })
    }

    /// Link back to booking another appointment.
    pub fn new_appointment_route(&self) -> Route {
        Route::NewAppointment { user_id: self.appointment.user_id.clone() }
    }
}

/// A loaded page.
pub enum Page {
    Home(HomePage),
    Register(RegisterPage),
    NewAppointment(NewAppointmentPage),
    Success(SuccessPage),
    Admin(AdminDashboard),
}

impl Page {
    /// Load the page for a route.
    pub async fn load(
        route: &Route,
        config: &AppConfig,
        now: DateTime<Utc>,
        context: FormContext,
    ) -> PageResult<Self> {
        log::debug!("Loading page {}", route);
        Ok(match route {
            Route::Home | Route::AdminPrompt => Page::Home(HomePage::load(route, config, context)),
            Route::Register { user_id } => Page::Register(RegisterPage::load(user_id, context).await?),
            Route::NewAppointment { user_id } => {
                Page::NewAppointment(NewAppointmentPage::load(user_id, now, context).await?)
            }
            Route::AppointmentSuccess { appointment_id, .. } => {
                Page::Success(SuccessPage::load(appointment_id, &context).await?)
            }
            Route::Admin => Page::Admin(AdminDashboard::load(&context).await?),
        })
    }
}
