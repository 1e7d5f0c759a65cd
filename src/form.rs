//! Contact form validation, simulated submission and feedback.

use std::sync::LazyLock;
use std::time::Duration;

use log::{info, warn};
use rand::Rng;
use regex::Regex;

use crate::error::{FieldError, SubmitError};
use crate::timer::{TimerId, Timers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Message,
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn validate(kind: FieldKind, required: bool, value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if required && value.is_empty() {
        return Err(FieldError::Required);
    }
    if kind == FieldKind::Email && !value.is_empty() && !is_valid_email(value) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    value: String,
    error: Option<FieldError>,
}

impl Field {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind, required: bool) -> Self {
        Self {
            name,
            label,
            kind,
            required,
            value: String::new(),
            error: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// At most one message per field.
    pub fn error(&self) -> Option<FieldError> {
        self.error
    }

    /// Typing clears any shown error.
    pub fn input(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.error = None;
    }

    /// Validates on focus loss.
    pub fn blur(&mut self) -> bool {
        self.error = validate(self.kind, self.required, &self.value).err();
        self.error.is_none()
    }

    pub fn reset(&mut self) {
        self.value.clear();
        self.error = None;
    }
}

/// The values handed to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Submission {
    pub fields: Vec<(&'static str, String)>,
}

/// Whatever actually delivers a submission.
pub trait Transport {
    /// How long delivery takes to resolve.
    fn delay(&self) -> Duration;
    fn deliver(&mut self, submission: &Submission) -> Result<(), SubmitError>;
}

/// Resolves after a fixed delay, succeeding at a configured rate.
pub struct SimulatedTransport<R> {
    delay: Duration,
    success_rate: f64,
    rng: R,
}

impl<R: Rng> SimulatedTransport<R> {
    pub fn new(delay: Duration, success_rate: f64, rng: R) -> Self {
        Self {
            delay,
            // NaN never succeeds
            success_rate: success_rate.max(0.0).min(1.0),
            rng,
        }
    }
}

impl<R: Rng> Transport for SimulatedTransport<R> {
    fn delay(&self) -> Duration {
        self.delay
    }

    fn deliver(&mut self, _submission: &Submission) -> Result<(), SubmitError> {
        if self.rng.gen_bool(self.success_rate) {
            Ok(())
        } else {
            Err(SubmitError::Network("simulated delivery failure".into()))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Sending,
    Sent,
    Failed,
}

impl ButtonState {
    pub fn label(self) -> &'static str {
        match self {
            ButtonState::Idle => "Send Message",
            ButtonState::Sending => "Sending...",
            ButtonState::Sent => "Message Sent!",
            ButtonState::Failed => "Failed to Send",
        }
    }

    pub fn is_enabled(self) -> bool {
        self == ButtonState::Idle
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    /// Sliding out, about to be removed
    pub leaving: bool,
}

#[derive(Clone, Copy, Debug)]
enum NotificationEvent {
    SlideOut(u64),
    Remove(u64),
}

/// Transient toasts in the corner of the page.
#[derive(Default)]
pub struct Notifications {
    next_id: u64,
    items: Vec<Notification>,
    timers: Timers<NotificationEvent>,
}

impl Notifications {
    pub const VISIBLE: Duration = Duration::from_millis(5000);
    pub const SLIDE_OUT: Duration = Duration::from_millis(500);

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.items.push(Notification {
            id,
            kind,
            message: message.into(),
            leaving: false,
        });
        self.timers
            .schedule(Self::VISIBLE, NotificationEvent::SlideOut(id));
        id
    }

    pub fn advance(&mut self, dt: Duration) {
        let target = self.timers.now() + dt;
        while let Some(event) = self.timers.pop_until(target) {
            match event {
                NotificationEvent::SlideOut(id) => {
                    if let Some(item) = self.items.iter_mut().find(|n| n.id == id) {
                        item.leaving = true;
                    }
                    self.timers
                        .schedule(Self::SLIDE_OUT, NotificationEvent::Remove(id));
                }
                NotificationEvent::Remove(id) => self.items.retain(|n| n.id != id),
            }
        }
        self.timers.settle(target);
    }

    /// Catches the clock up to `at`, firing whatever falls due on the way.
    pub fn advance_to(&mut self, at: Duration) {
        let dt = at.saturating_sub(self.timers.now());
        self.advance(dt);
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }
}

#[derive(Clone, Copy, Debug)]
enum FormEvent {
    Resolve,
    ResetButton,
}

pub struct ContactForm {
    fields: Vec<Field>,
    button: ButtonState,
    notifications: Notifications,
    transport: Box<dyn Transport>,
    in_flight: Option<Submission>,
    reset_timer: Option<TimerId>,
    timers: Timers<FormEvent>,
}

impl ContactForm {
    pub const BUTTON_RESET: Duration = Duration::from_millis(3000);

    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            fields: vec![
                Field::new("name", "Name", FieldKind::Text, true),
                Field::new("email", "Email", FieldKind::Email, true),
                Field::new("subject", "Subject", FieldKind::Text, false),
                Field::new("message", "Message", FieldKind::Message, true),
            ],
            button: ButtonState::Idle,
            notifications: Notifications::default(),
            transport,
            in_flight: None,
            reset_timer: None,
            timers: Timers::new(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn button(&self) -> ButtonState {
        self.button
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Validates every field and, if they all pass, hands the values to the
    /// transport. Ignored while a submission is in flight.
    pub fn submit(&mut self) -> Result<(), SubmitError> {
        if self.in_flight.is_some() {
            return Ok(());
        }

        let mut valid = true;
        for field in &mut self.fields {
            valid &= field.blur();
        }
        if !valid {
            return Err(SubmitError::Invalid);
        }

        if let Some(timer) = self.reset_timer.take() {
            self.timers.cancel(timer);
        }

        self.in_flight = Some(Submission {
            fields: self
                .fields
                .iter()
                .map(|f| (f.name, f.value.trim().to_owned()))
                .collect(),
        });
        self.button = ButtonState::Sending;
        self.timers
            .schedule(self.transport.delay(), FormEvent::Resolve);
        Ok(())
    }

    pub fn advance(&mut self, dt: Duration) {
        let target = self.timers.now() + dt;
        while let Some(event) = self.timers.pop_until(target) {
            self.notifications.advance_to(self.timers.now());
            match event {
                FormEvent::Resolve => self.resolve(),
                FormEvent::ResetButton => {
                    self.button = ButtonState::Idle;
                    self.reset_timer = None;
                }
            }
        }
        self.timers.settle(target);
        self.notifications.advance_to(target);
    }

    pub fn is_animating(&self) -> bool {
        !self.timers.is_idle() || !self.notifications.items().is_empty()
    }

    fn resolve(&mut self) {
        let Some(submission) = self.in_flight.take() else {
            return;
        };

        match self.transport.deliver(&submission) {
            Ok(()) => {
                info!("Contact form delivered");
                self.button = ButtonState::Sent;
                self.notifications
                    .push(NotificationKind::Success, "Message sent successfully!");
                self.fields.iter_mut().for_each(Field::reset);
            }
            Err(err) => {
                warn!("Contact form failed: {err}");
                self.button = ButtonState::Failed;
                self.notifications.push(
                    NotificationKind::Error,
                    "Failed to send message. Please try again.",
                );
            }
        }

        self.reset_timer = Some(
            self.timers
                .schedule(Self::BUTTON_RESET, FormEvent::ResetButton),
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::timer::ms;

    struct Fixed(bool);

    impl Transport for Fixed {
        fn delay(&self) -> Duration {
            ms(2000)
        }

        fn deliver(&mut self, _submission: &Submission) -> Result<(), SubmitError> {
            if self.0 {
                Ok(())
            } else {
                Err(SubmitError::Network("down".into()))
            }
        }
    }

    fn filled(ok: bool) -> ContactForm {
        let mut form = ContactForm::new(Box::new(Fixed(ok)));
        form.field_mut("name").unwrap().input("Ada");
        form.field_mut("email").unwrap().input("ada@example.com");
        form.field_mut("message").unwrap().input("Hello there");
        form
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.co"));
    }

    #[test]
    fn validation_rules() {
        assert_eq!(validate(FieldKind::Text, true, "  "), Err(FieldError::Required));
        assert_eq!(validate(FieldKind::Text, false, ""), Ok(()));
        assert_eq!(validate(FieldKind::Email, false, ""), Ok(()));
        assert_eq!(
            validate(FieldKind::Email, true, "nope"),
            Err(FieldError::InvalidEmail)
        );
        assert_eq!(validate(FieldKind::Email, true, " a@b.co "), Ok(()));
    }

    #[test]
    fn required_field_shows_one_error_and_clears_on_input() {
        let mut field = Field::new("name", "Name", FieldKind::Text, true);
        assert!(!field.blur());
        assert!(!field.blur());
        assert_eq!(field.error(), Some(FieldError::Required));
        assert_eq!(field.error().unwrap().to_string(), "This field is required");

        field.input("Ada");
        assert_eq!(field.error(), None);
        assert!(field.blur());
        assert_eq!(field.error(), None);
    }

    #[test]
    fn invalid_form_is_not_sent() {
        let mut form = ContactForm::new(Box::new(Fixed(true)));
        assert_eq!(form.submit(), Err(SubmitError::Invalid));
        assert_eq!(form.button(), ButtonState::Idle);

        let errors = form.fields().iter().filter(|f| f.error().is_some()).count();
        assert_eq!(errors, 3);
    }

    #[test]
    fn successful_submission_flow() {
        let mut form = filled(true);
        form.submit().unwrap();
        assert_eq!(form.button(), ButtonState::Sending);
        assert!(!form.button().is_enabled());

        form.advance(ms(1999));
        assert_eq!(form.button(), ButtonState::Sending);

        form.advance(ms(1));
        assert_eq!(form.button(), ButtonState::Sent);
        assert_eq!(form.notifications().items().len(), 1);
        assert_eq!(
            form.notifications().items()[0].kind,
            NotificationKind::Success
        );
        assert!(form.fields().iter().all(|f| f.value().is_empty()));

        form.advance(ms(3000));
        assert_eq!(form.button(), ButtonState::Idle);
    }

    #[test]
    fn failed_submission_keeps_values() {
        let mut form = filled(false);
        form.submit().unwrap();
        form.advance(ms(2000));

        assert_eq!(form.button(), ButtonState::Failed);
        assert_eq!(form.notifications().items()[0].kind, NotificationKind::Error);
        assert_eq!(form.fields()[0].value(), "Ada");

        form.advance(ms(3000));
        assert_eq!(form.button(), ButtonState::Idle);
    }

    #[test]
    fn resubmitting_while_sending_is_ignored() {
        let mut form = filled(true);
        form.submit().unwrap();
        form.submit().unwrap();
        form.advance(ms(2000));
        assert_eq!(form.notifications().items().len(), 1);
    }

    #[test]
    fn notifications_slide_out_then_go() {
        let mut notes = Notifications::default();
        notes.push(NotificationKind::Success, "ok");

        notes.advance(ms(4999));
        assert!(!notes.items()[0].leaving);
        notes.advance(ms(1));
        assert!(notes.items()[0].leaving);
        notes.advance(ms(499));
        assert_eq!(notes.items().len(), 1);
        notes.advance(ms(1));
        assert!(notes.items().is_empty());
    }

    #[test]
    fn simulated_transport_rates() {
        let submission = Submission { fields: vec![] };

        let mut always = SimulatedTransport::new(ms(2000), 1.0, StdRng::seed_from_u64(0));
        assert!((0..50).all(|_| always.deliver(&submission).is_ok()));

        let mut never = SimulatedTransport::new(ms(2000), 0.0, StdRng::seed_from_u64(0));
        assert!((0..50).all(|_| never.deliver(&submission).is_err()));

        let mut usual = SimulatedTransport::new(ms(2000), 0.9, StdRng::seed_from_u64(1));
        let ok = (0..1000)
            .filter(|_| usual.deliver(&submission).is_ok())
            .count();
        assert!((850..=950).contains(&ok));

        let mut broken = SimulatedTransport::new(ms(2000), f64::NAN, StdRng::seed_from_u64(0));
        assert!((0..50).all(|_| broken.deliver(&submission).is_err()));
    }
}
