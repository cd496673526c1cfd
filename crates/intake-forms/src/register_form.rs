//! Full registration form, prefilled from the patient identity.

use intake_core::models::{Gender, IdentificationUpload, PatientIdentity};
use intake_core::validation::fields::*;
use intake_core::validation::{FieldValue, RawValues, RegistrationSchema};

use crate::controller::{Form, FormContext, FormCore, SubmitOutcome};
use crate::field::{
    gender_options, identification_type_options, physician_options, FieldSpec, FieldType,
};
use crate::routes::Route;

/// Form sections, in display order.
pub const SECTIONS: [&str; 4] = [
    "Information personnel",
    "Information medicale",
    "Identification et verification",
    "Consentement et vie privée",
];

pub const DEFAULT_IDENTIFICATION_TYPE: &str = "Birth Certificate";

pub struct RegisterForm {
    core: FormCore,
    context: FormContext,
    user_id: String,
}

impl RegisterForm {
    pub fn new(identity: &PatientIdentity, context: FormContext) -> Self {
        Self {
            core: FormCore::new(Self::defaults(identity), context.submit_timeout),
            context,
            user_id: identity.id.clone(),
        }
    }

    /// Initial values: identity fields from the identity, the rest blank.
    /// The birth date starts empty so the patient has to pick one.
    pub fn defaults(identity: &PatientIdentity) -> RawValues {
        let text: [(&str, &str); 17] = [
            (NAME, identity.name.as_str()),
            (EMAIL, identity.email.as_str()),
            (PHONE, identity.phone.as_str()),
            (GENDER, Gender::Male.as_str()),
            (ADDRESS, ""),
            (OCCUPATION, ""),
            (EMERGENCY_CONTACT_NAME, ""),
            (EMERGENCY_CONTACT_NUMBER, ""),
            (PRIMARY_PHYSICIAN, ""),
            (INSURANCE_PROVIDER, ""),
            (INSURANCE_POLICY_NUMBER, ""),
            (ALLERGIES, ""),
            (CURRENT_MEDICATION, ""),
            (FAMILY_MEDICAL_HISTORY, ""),
            (PAST_MEDICAL_HISTORY, ""),
            (IDENTIFICATION_TYPE, DEFAULT_IDENTIFICATION_TYPE),
            (IDENTIFICATION_NUMBER, ""),
        ];

        let mut values: RawValues = text
            .into_iter()
            .map(|(field, value)| (field.to_string(), FieldValue::from(value)))
            .collect();
        values.insert(BIRTH_DATE.into(), FieldValue::Empty);
        values.insert(IDENTIFICATION_DOCUMENT.into(), FieldValue::Files(Vec::new()));
        for consent in [TREATMENT_CONSENT, DISCLOSURE_CONSENT, PRIVACY_CONSENT] {
            values.insert(consent.into(), FieldValue::Bool(false));
        }
        values
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn title(&self) -> &'static str {
        "Bienvenu !"
    }

    /// Validate, package the identification file and register the patient.
    pub async fn submit(&self) -> SubmitOutcome {
        let Some(in_flight) = self.core.begin() else {
            return SubmitOutcome::Ignored;
        };

        let registration = match self.core.validate(&RegistrationSchema) {
            Ok(registration) => registration,
            Err(errors) => return SubmitOutcome::Invalid(errors),
        };

        let (registration, document) = registration.into_parts(self.user_id.clone());
        let upload = document.map(IdentificationUpload::package);

        match self
            .core
            .call(self.context.actions.register_patient(registration, upload))
            .await
        {
            Ok(patient) => {
                log::info!("Registered patient {}", patient.id);
                let route = Route::NewAppointment { user_id: self.user_id.clone() };
                self.context.navigator.push(route.clone());
                in_flight.succeed();
                SubmitOutcome::Navigated(route)
            }
            Err(e) => self.core.failed("Registration", e),
        }
    }
}

impl Form for RegisterForm {
    fn core(&self) -> &FormCore {
        &self.core
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            // Information personnel
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
            FieldSpec::new(FieldType::DatePicker, BIRTH_DATE).label("Date de naissance"),
            FieldSpec::new(FieldType::Skeleton, GENDER)
                .label("Gender")
                .options(gender_options()),
            FieldSpec::new(FieldType::Input, ADDRESS)
                .label("Address")
                .placeholder("Abidjan Koumassi, Cité 147"),
            FieldSpec::new(FieldType::Input, OCCUPATION)
                .label("Occupation")
                .placeholder("Developpeur web"),
            FieldSpec::new(FieldType::Input, EMERGENCY_CONTACT_NAME)
                .label("Emergency contact name")
                .placeholder("Guardian's name"),
            FieldSpec::new(FieldType::PhoneInput, EMERGENCY_CONTACT_NUMBER)
                .label("Emergency contact Number")
                .placeholder("(+225) 01 02 03 04 05"),
            // Information medicale
            FieldSpec::new(FieldType::Select, PRIMARY_PHYSICIAN)
                .label("Primary Physician")
                .placeholder("Select a physician")
                .options(physician_options()),
            FieldSpec::new(FieldType::Input, INSURANCE_PROVIDER)
                .label("Insurance provider")
                .placeholder("BlueCross BlueShield"),
            FieldSpec::new(FieldType::Input, INSURANCE_POLICY_NUMBER)
                .label("Insurance policy number")
                .placeholder("ABC1020345"),
            FieldSpec::new(FieldType::Textarea, ALLERGIES)
                .label("Allergies (if any)")
                .placeholder("Peanuts, Penicillin, Pollen"),
            FieldSpec::new(FieldType::Textarea, CURRENT_MEDICATION)
                .label("Current medication (if any)")
                .placeholder("Paracetamol 500mg, Atefan"),
            FieldSpec::new(FieldType::Textarea, FAMILY_MEDICAL_HISTORY)
                .label("Family medical history")
                .placeholder("Maman a un maladie du coeur"),
            FieldSpec::new(FieldType::Textarea, PAST_MEDICAL_HISTORY)
                .label("Past medical history")
                .placeholder("Paludisme avec infection generale"),
            // Identification et verification
            FieldSpec::new(FieldType::Select, IDENTIFICATION_TYPE)
                .label("Identification Type")
                .placeholder("Select an identification type")
                .options(identification_type_options()),
            FieldSpec::new(FieldType::Input, IDENTIFICATION_NUMBER)
                .label("Identification number")
                .placeholder("10203459876"),
            FieldSpec::new(FieldType::Skeleton, IDENTIFICATION_DOCUMENT)
                .label("Scanned copy of identification document"),
            // Consentement et vie privée
            FieldSpec::new(FieldType::Checkbox, TREATMENT_CONSENT).label("I consent to treatment"),
            FieldSpec::new(FieldType::Checkbox, DISCLOSURE_CONSENT)
                .label("I consent to disclosure of information"),
            FieldSpec::new(FieldType::Checkbox, PRIVACY_CONSENT).label("I consent to privacy policy"),
        ]
    }

    fn submit_label(&self) -> &'static str {
        "Get Started"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Widget;
    use crate::routes::History;
    use intake_core::{IntakeCore, PersistenceActions};
    use std::rc::Rc;

    fn identity() -> PatientIdentity {
        PatientIdentity {
            id: "user-1".into(),
            name: "Jean Dupont".into(),
            email: "jean@x.com".into(),
            phone: "+225 0102030405".into(),
            created_at: "2030-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_defaults_prefill_identity() {
        let defaults = RegisterForm::defaults(&identity());
        assert_eq!(defaults[NAME].as_text(), Some("Jean Dupont"));
        assert_eq!(defaults[EMAIL].as_text(), Some("jean@x.com"));
        assert_eq!(defaults[PHONE].as_text(), Some("+225 0102030405"));
        assert_eq!(defaults[BIRTH_DATE], FieldValue::Empty);
        assert_eq!(defaults[PRIVACY_CONSENT], FieldValue::Bool(false));
    }

    #[test]
    fn test_defaults_are_stable() {
        assert_eq!(RegisterForm::defaults(&identity()), RegisterForm::defaults(&identity()));
    }

    fn make_form() -> RegisterForm {
        let actions: Rc<dyn PersistenceActions> = Rc::new(IntakeCore::open_in_memory().unwrap());
        RegisterForm::new(&identity(), FormContext::new(actions, Rc::new(History::new())))
    }

    #[test]
    fn test_every_field_has_a_default() {
        let defaults = RegisterForm::defaults(&identity());
        let specs = make_form().fields();
        for spec in &specs {
            assert!(defaults.contains_key(spec.name), "no default for {}", spec.name);
        }
        assert_eq!(specs.len(), defaults.len());
    }

    #[test]
    fn test_consents_render_unchecked() {
        let rendered = make_form().render();
        let treatment = rendered.iter().find(|f| f.name == TREATMENT_CONSENT).unwrap();
        assert!(matches!(treatment.widget, Widget::Checkbox { checked: false, .. }));
    }
}
