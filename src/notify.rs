//! Notification senders: the adapter family.
//!
//! [`SmsGateway`] is a third-party style client with its own call surface
//! (`login`, `set_port`, `send_sms`). [`SmsAdapter`] owns a gateway and exposes
//! it as a [`Notification`] without changing the data passed through.

use crate::error::NotifyError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Proof of delivery handed back by a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub channel: String,
    pub recipient: String,
    pub id: u64,
}

/// Target interface clients code against.
pub trait Notification: Send + Sync {
    fn channel(&self) -> &str;
    fn send(&self, recipient: &str, message: &str) -> Result<Receipt, NotifyError>;
}

pub fn notify_users(
    notifier: &dyn Notification,
    recipients: &[&str],
    message: &str,
) -> Vec<Result<Receipt, NotifyError>> {
    recipients
        .iter()
        .map(|recipient| notifier.send(recipient, message))
        .collect()
}

// ============================================================================
// Adaptee
// ============================================================================

/// Message accepted by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sms {
    pub id: u64,
    pub port: u16,
    pub number: String,
    pub text: String,
}

/// In-memory SMS gateway. Delivered messages land in its outbox.
#[derive(Debug)]
pub struct SmsGateway {
    accept_login: bool,
    port: Mutex<u16>,
    next_id: AtomicU64,
    outbox: Mutex<Vec<Sms>>,
}

impl SmsGateway {
    pub const DEFAULT_PORT: u16 = 2775;

    pub fn new() -> Self {
        Self::with_login(true)
    }

    /// Gateway whose `login` succeeds only if `accept_login` is set.
    pub fn with_login(accept_login: bool) -> Self {
        Self {
            accept_login,
            port: Mutex::new(Self::DEFAULT_PORT),
            next_id: AtomicU64::new(1),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn login(&self) -> bool {
        self.accept_login
    }

    /// Switches the outgoing port and returns the previous one.
    pub fn set_port(&self, port: u16) -> u16 {
        let mut current = self.port.lock().unwrap_or_else(|p| p.into_inner());
        std::mem::replace(&mut *current, port)
    }

    pub fn send_sms(&self, number: &str, text: &str) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let port = *self.port.lock().unwrap_or_else(|p| p.into_inner());
        self.outbox
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(Sms {
                id,
                port,
                number: number.to_string(),
                text: text.to_string(),
            });
        id
    }

    pub fn outbox(&self) -> Vec<Sms> {
        self.outbox.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Default for SmsGateway {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Adapters
// ============================================================================

pub struct SmsAdapter {
    gateway: SmsGateway,
    port: u16,
}

impl SmsAdapter {
    pub fn new(gateway: SmsGateway) -> Self {
        Self::on_port(gateway, SmsGateway::DEFAULT_PORT)
    }

    pub fn on_port(gateway: SmsGateway, port: u16) -> Self {
        Self { gateway, port }
    }

    /// Gives the gateway back, e.g. to inspect its outbox.
    pub fn into_inner(self) -> SmsGateway {
        self.gateway
    }
}

impl Notification for SmsAdapter {
    fn channel(&self) -> &str {
        "sms"
    }

    fn send(&self, recipient: &str, message: &str) -> Result<Receipt, NotifyError> {
        if recipient.trim().is_empty() {
            return Err(NotifyError::EmptyRecipient);
        }
        if !self.gateway.login() {
            return Err(NotifyError::LoginRefused {
                channel: self.channel().to_string(),
            });
        }
        self.gateway.set_port(self.port);
        let id = self.gateway.send_sms(recipient, message);
        debug!(id, recipient, "sms handed to gateway");

        Ok(Receipt {
            channel: self.channel().to_string(),
            recipient: recipient.to_string(),
            id,
        })
    }
}

/// Call surface of anything that can deliver an SMS.
pub trait SendsSms: Send + Sync {
    fn send_sms(&self, number: &str, text: &str) -> u64;
}

impl SendsSms for SmsGateway {
    fn send_sms(&self, number: &str, text: &str) -> u64 {
        SmsGateway::send_sms(self, number, text)
    }
}

/// Generic adapter, monomorphized per adaptee.
pub struct Adapted<T> {
    inner: T,
}

impl<T: SendsSms> Adapted<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: SendsSms> Notification for Adapted<T> {
    fn channel(&self) -> &str {
        "sms"
    }

    fn send(&self, recipient: &str, message: &str) -> Result<Receipt, NotifyError> {
        if recipient.trim().is_empty() {
            return Err(NotifyError::EmptyRecipient);
        }
        let id = self.inner.send_sms(recipient, message);
        Ok(Receipt {
            channel: self.channel().to_string(),
            recipient: recipient.to_string(),
            id,
        })
    }
}

/// Native implementation, no adaptation needed.
#[derive(Debug, Default)]
pub struct EmailNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl EmailNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Notification for EmailNotifier {
    fn channel(&self) -> &str {
        "email"
    }

    fn send(&self, recipient: &str, message: &str) -> Result<Receipt, NotifyError> {
        if recipient.trim().is_empty() {
            return Err(NotifyError::EmptyRecipient);
        }
        let mut sent = self.sent.lock().unwrap_or_else(|p| p.into_inner());
        sent.push((recipient.to_string(), message.to_string()));
        Ok(Receipt {
            channel: self.channel().to_string(),
            recipient: recipient.to_string(),
            id: sent.len() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_forwards_message_unchanged() {
        let adapter = SmsAdapter::on_port(SmsGateway::new(), 9000);
        let receipt = adapter.send("+15550100", "Your code is 1234").unwrap();
        assert_eq!(receipt.channel, "sms");
        assert_eq!(receipt.id, 1);

        let outbox = adapter.into_inner().outbox();
        assert_eq!(
            outbox,
            vec![Sms {
                id: 1,
                port: 9000,
                number: "+15550100".to_string(),
                text: "Your code is 1234".to_string(),
            }]
        );
    }

    #[test]
    fn test_refused_login_sends_nothing() {
        let adapter = SmsAdapter::new(SmsGateway::with_login(false));
        let err = adapter.send("+15550100", "hi").unwrap_err();
        assert_eq!(
            err,
            NotifyError::LoginRefused {
                channel: "sms".to_string()
            }
        );
        assert!(adapter.into_inner().outbox().is_empty());
    }

    #[test]
    fn test_notify_users_through_any_sender() {
        let email = EmailNotifier::new();
        let sms = SmsAdapter::new(SmsGateway::new());
        let generic = Adapted::new(SmsGateway::new());

        let senders: [&dyn Notification; 3] = [&email, &sms, &generic];
        for sender in senders {
            let results = notify_users(sender, &["a", "", "b"], "release shipped");
            assert!(results[0].is_ok());
            assert_eq!(results[1], Err(NotifyError::EmptyRecipient));
            assert!(results[2].is_ok());
        }

        assert_eq!(email.sent().len(), 2);
        assert_eq!(generic.inner().outbox().len(), 2);
    }

    #[test]
    fn test_gateway_port_switch() {
        let gateway = SmsGateway::new();
        assert_eq!(gateway.set_port(404), SmsGateway::DEFAULT_PORT);
        assert_eq!(gateway.set_port(80), 404);
    }
}
