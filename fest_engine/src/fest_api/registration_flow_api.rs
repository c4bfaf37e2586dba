use std::fmt::Debug;

use fest_common::Secret;
use log::*;

use crate::{
    db_types::{event_key, Registration},
    events::{EventProducers, NotificationFailedEvent, RegistrationCreatedEvent},
    fest_api::{
        errors::RegistrationError,
        registration_objects::{RegistrationOutcome, RegistrationSubmission},
    },
    helpers::{normalise_email, normalise_text, retry, PaymentProof, RetryError, RetryPolicy, SignatureError},
    notifications::{MessageTransport, NotificationDispatcher, NotifyError},
    traits::{RegistrationManagement, StoreError},
};

/// `RegistrationFlowApi` runs the payment-gated registration pipeline.
///
/// A submission passes through four stages, strictly in this order, and the first failure ends the request:
/// 1. the duplicate guard ([`Self::check_duplicate`]),
/// 2. payment verification ([`Self::verify_payment`]),
/// 3. persistence with bounded retries ([`Self::persist`]),
/// 4. the confirmation mail ([`Self::notify`]).
///
/// Stage 4 is the exception to the rule: once the registration is stored it stands, so a mail failure is logged and
/// reported as [`RegistrationOutcome::notification_sent`] rather than as an error.
pub struct RegistrationFlowApi<B, T> {
    db: B,
    dispatcher: NotificationDispatcher<T>,
    payment_secret: Secret<String>,
    persist_policy: RetryPolicy,
    producers: EventProducers,
}

impl<B, T> Debug for RegistrationFlowApi<B, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RegistrationFlowApi")
    }
}

impl<B, T> RegistrationFlowApi<B, T> {
    pub fn new(db: B, transport: T, payment_secret: Secret<String>) -> Self {
        Self {
            db,
            dispatcher: NotificationDispatcher::new(transport),
            payment_secret,
            persist_policy: RetryPolicy::for_persistence(),
            producers: EventProducers::default(),
        }
    }

    pub fn with_persist_policy(mut self, policy: RetryPolicy) -> Self {
        self.persist_policy = policy;
        self
    }

    pub fn with_notify_policy(mut self, policy: RetryPolicy) -> Self {
        self.dispatcher = self.dispatcher.with_policy(policy);
        self
    }

    pub fn with_producers(mut self, producers: EventProducers) -> Self {
        self.producers = producers;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    /// Checks a payment proof against the gateway secret. No prefix checks are applied here; see
    /// [`Self::verify_payment`] for the stricter check used by the registration pipeline.
    pub fn verify_signature(&self, proof: &PaymentProof) -> Result<(), SignatureError> {
        let result = proof.verify(&self.payment_secret);
        match &result {
            Ok(()) => info!("🔐️ Payment verification successful for order {}", proof.order_id),
            Err(SignatureError::ConfigurationError) => error!("🔐️ The payment gateway secret is not configured"),
            Err(e) => warn!("🔐️ Payment verification failed for order {}. {e}", proof.order_id),
        }
        result
    }
}

impl<B, T> RegistrationFlowApi<B, T>
where
    B: RegistrationManagement,
    T: MessageTransport,
{
    /// Rejects the submission if a registration for the same event already uses the leader's email or mobile.
    ///
    /// This is a fast path only. Two concurrent submissions can both pass it; the store's uniqueness rules catch the
    /// second one when it is persisted.
    pub async fn check_duplicate(
        &self,
        email: Option<&str>,
        event: Option<&str>,
        mobile: Option<&str>,
    ) -> Result<(), RegistrationError> {
        fn field(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        let (Some(email), Some(event), Some(mobile)) = (field(email), field(event), field(mobile)) else {
            return Err(RegistrationError::Validation("Missing required fields for registration validation".into()));
        };
        let email = normalise_email(email);
        let mobile = normalise_text(mobile);
        let event = event_key(event);
        let exists = self.db.registration_exists(&event, &email, &mobile).await.map_err(|e| {
            error!("🔄️ Duplicate check failed. {e}");
            RegistrationError::Store(e)
        })?;
        if exists {
            info!("🔄️ Rejecting duplicate registration for {event}");
            return Err(RegistrationError::Conflict);
        }
        Ok(())
    }

    /// Checks that the submission carries a complete payment proof with the gateway's id prefixes, then checks its
    /// signature. The format checks come first so that malformed proofs never reach the HMAC.
    pub fn verify_payment(&self, submission: &RegistrationSubmission) -> Result<PaymentProof, RegistrationError> {
        let proof = submission.validate_payment_proof().map_err(|e| {
            warn!("🔐️ Registration submitted without a usable payment proof. {e}");
            e
        })?;
        self.verify_signature(&proof)?;
        Ok(proof)
    }

    /// Validates and normalises the submission, then stores it.
    ///
    /// Payment proof and fee are validated again here, so this stage can never store an unpaid registration even if
    /// it is called on its own. Transient store failures are retried according to the persistence policy; a
    /// uniqueness conflict is reported as [`RegistrationError::Conflict`] straight away.
    pub async fn persist(&self, submission: &RegistrationSubmission) -> Result<Registration, RegistrationError> {
        let new_registration = submission.validate()?;
        let result = retry(self.persist_policy, "🗃️ Persisting registration", StoreError::is_transient, |_| {
            self.db.insert_registration(new_registration.clone())
        })
        .await;
        match result {
            Ok(registration) => {
                info!(
                    "🔄️ Registration #{} saved for {}",
                    registration.registration_id, registration.selected_event
                );
                Ok(registration)
            },
            Err(RetryError::Aborted(StoreError::Conflict)) => {
                info!("🔄️ Store rejected a duplicate registration for {}", new_registration.selected_event);
                Err(RegistrationError::Conflict)
            },
            Err(RetryError::Aborted(e)) => {
                error!("🔄️ Registration could not be saved. {e}");
                Err(RegistrationError::PersistFailed { attempts: 1, last: e })
            },
            Err(RetryError::Exhausted { attempts, last }) => {
                error!("🔄️ Registration could not be saved after {attempts} attempts. {last}");
                Err(RegistrationError::PersistFailed { attempts, last })
            },
        }
    }

    /// Sends the confirmation mail, retrying transient failures.
    pub async fn notify(&self, registration: &Registration) -> Result<(), NotifyError> {
        self.dispatcher.notify(registration).await
    }

    /// Runs the full pipeline for one submission.
    pub async fn register(&self, submission: RegistrationSubmission) -> Result<RegistrationOutcome, RegistrationError> {
        self.check_duplicate(
            submission.leader_email.as_deref(),
            submission.selected_event.as_deref(),
            submission.leader_mobile.as_deref(),
        )
        .await?;
        self.verify_payment(&submission)?;
        let registration = self.persist(&submission).await?;
        self.call_registration_created_hook(&registration).await;
        let notification_sent = match self.notify(&registration).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "📧️ Registration #{} is saved, but the confirmation mail to {} failed. {e}",
                    registration.registration_id, registration.leader_email
                );
                self.call_notification_failed_hook(&registration, &e).await;
                false
            },
        };
        debug!("🔄️ Registration #{} processing complete", registration.registration_id);
        Ok(RegistrationOutcome { registration, notification_sent })
    }

    async fn call_registration_created_hook(&self, registration: &Registration) {
        for emitter in &self.producers.registration_created_producer {
            debug!("🔄️ Notifying registration created hook subscribers");
            emitter.publish_event(RegistrationCreatedEvent::new(registration.clone())).await;
        }
    }

    async fn call_notification_failed_hook(&self, registration: &Registration, reason: &NotifyError) {
        for emitter in &self.producers.notification_failed_producer {
            debug!("🔄️ Notifying notification failed hook subscribers");
            let event = NotificationFailedEvent::new(registration.clone(), reason.to_string());
            emitter.publish_event(event).await;
        }
    }
}
