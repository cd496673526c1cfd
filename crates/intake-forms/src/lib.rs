//! Intake Forms
//!
//! Headless form controllers, routes and the admin dashboard for the
//! patient intake workflow. Everything here is plain state that a shell
//! draws; persistence goes through [`intake_core::PersistenceActions`].
//!
//! # Flow
//!
//! ```text
//! PatientForm ──► /patients/{id}/register ──► RegisterForm
//!                                                  │
//!                                                  ▼
//!                 /patients/{id}/new-appointment ◄─┘
//!                          │
//!                          ▼
//!                 AppointmentForm (create) ──► success page
//!
//! /admin ──► AdminDashboard ──► AppointmentModal ──► AppointmentForm (schedule / cancel)
//! ```
//!
//! Controllers are single-threaded: they hold their state in `Cell` and
//! `RefCell` and submit futures are not `Send`.

pub mod admin;
pub mod appointment_form;
pub mod controller;
pub mod field;
pub mod pages;
pub mod patient_form;
pub mod register_form;
pub mod routes;
pub mod values;

pub use admin::{AdminDashboard, AppointmentModal, AppointmentRow, StatCard, StatKind};
pub use appointment_form::{appointment_defaults, AppointmentForm, UpdateAction};
pub use controller::{Form, FormContext, FormCore, FormStatus, SubmissionError, SubmitOutcome};
pub use field::{render_field, FieldSpec, FieldType, RenderedField, Widget};
pub use pages::{Page, PageError, PageResult};
pub use patient_form::PatientForm;
pub use register_form::RegisterForm;
pub use routes::{AdminAccess, History, Navigator, Route, RouteError};
pub use values::{Changes, FormValues};
