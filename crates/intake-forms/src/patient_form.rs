//! Public intake form: name, email and phone.

use intake_core::validation::fields::{EMAIL, NAME, PHONE};
use intake_core::validation::{raw_values, PatientIntakeSchema, RawValues};
use intake_core::ActionError;

use crate::controller::{Form, FormContext, FormCore, SubmissionError, SubmitOutcome};
use crate::field::{FieldSpec, FieldType};
use crate::routes::Route;

pub struct PatientForm {
    core: FormCore,
    context: FormContext,
}

impl PatientForm {
    pub fn new(context: FormContext) -> Self {
        Self {
            core: FormCore::new(Self::defaults(), context.submit_timeout),
            context,
        }
    }

    pub fn defaults() -> RawValues {
        raw_values([(NAME, ""), (EMAIL, ""), (PHONE, "")])
    }

    pub fn title(&self) -> &'static str {
        "Salut me voici !"
    }

    /// Validate, create the patient identity and move on. A returning
    /// patient who already registered goes straight to booking.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(in_flight) = self.core.begin() else {
            return SubmitOutcome::Ignored;
        };

        let intake = match self.core.validate(&PatientIntakeSchema) {
            Ok(intake) => intake,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let identity = match self
            .core
            .call(self.context.actions.create_patient_identity(intake))
            .await
        {
            Ok(identity) => identity,
            Err(e) => return self.core.failed("Patient", e),
        };

        let existing = self
            .core
            .call(self.context.actions.get_patient_by_id(&identity.id))
            .await;
        let route = match existing {
            Ok(patient) => {
                log::info!("Identity {} already registered as {}", identity.id, patient.id);
                Route::NewAppointment { user_id: identity.id }
            }
            Err(SubmissionError::Action(ActionError::NotFound(_))) => {
                log::info!("Patient identity {} ready for registration", identity.id);
                Route::Register { user_id: identity.id }
            }
            Err(e) => return self.core.failed("Patient", e),
        };

        self.context.navigator.push(route.clone());
        in_flight.succeed();
        SubmitOutcome::Navigated(route)
    }
}

impl Form for PatientForm {
    fn core(&self) -> &FormCore {
        &self.core
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new(FieldType::Input, NAME)
                .label("Full Name")
                .placeholder("John Doe")
                .icon("/assets/icons/user.svg"),
            FieldSpec::new(FieldType::Input, EMAIL)
                .label("Email Address")
                .placeholder("johndoe.example@gmail.com")
                .icon("/assets/icons/email.svg"),
            FieldSpec::new(FieldType::PhoneInput, PHONE)
                .label("Phone Number")
                .placeholder("(+225) 01 02 03 04 05"),
        ]
    }

    fn submit_label(&self) -> &'static str {
        "Get Started"
    }
}
