//! Contact & Booking Relays
//!
//! Single-message forms forwarded to the store mailbox. No pricing, no
//! persistence.

use serde::Deserialize;

use crate::error::ValidationError;

/// A subject/body pair ready for the mailer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayMessage {
    pub subject: String,
    pub body: String,
}

fn require<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

/// Contact form submission
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactForm {
    pub fn to_message(&self) -> Result<RelayMessage, ValidationError> {
        let name = require(self.name.as_deref(), "name")?;
        let email = require(self.email.as_deref(), "email")?;
        let message = require(self.message.as_deref(), "message")?;

        Ok(RelayMessage {
            subject: format!("New Contact Form Submission from {name}"),
            body: format!("Name: {name}\nEmail: {email}\nMessage:\n{message}\n"),
        })
    }
}

/// Service booking request
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookingForm {
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl BookingForm {
    pub fn to_message(&self) -> Result<RelayMessage, ValidationError> {
        let service = require(self.service.as_deref(), "service")?;
        let date = require(self.date.as_deref(), "date")?;
        let time = require(self.time.as_deref(), "time")?;
        let name = require(self.name.as_deref(), "name")?;
        let email = require(self.email.as_deref(), "email")?;
        let phone = require(self.phone.as_deref(), "phone")?;
        let address = require(self.address.as_deref(), "address")?;
        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("No additional notes");

        Ok(RelayMessage {
            subject: format!("New Booking Request from {name}"),
            body: format!(
                "Service: {service}\nDate: {date}\nTime: {time}\nName: {name}\n\
                 Email: {email}\nPhone: {phone}\nAddress: {address}\nNotes: {notes}\n"
            ),
        })
    }
}
