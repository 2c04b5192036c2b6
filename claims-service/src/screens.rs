//! Screen routing: which top-level screen a session is on, and how user
//! actions and background checks move it.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clients::ClientError;

/// The screens a session can be on. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Chat,
    EditMode,
    PostClaimChat,
    ClaimReview,
    AuthLogin,
    AuthSignup,
    Subscription,
    Success,
    DocumentPreview,
    DocumentSigning,
}

/// User actions and external outcomes that drive screen transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenEvent {
    OpenLogin,
    OpenSignup,
    BackToChat,
    LoginSucceeded {
        user_id: String,
        #[serde(default)]
        email: Option<String>,
    },
    SignupSucceeded { user_id: String },
    IntakeCompleted,
    EditRequested,
    EditCompleted,
    /// The user confirmed their claim and wants to pay.
    ProceedToPayment,
    PaymentConfirmed,
    /// Returned from the payment provider's checkout.
    CheckoutCompleted,
    SuccessAcknowledged,
    SigningStarted,
    SigningCompleted,
    SigningDeferred,
    OpenPostClaimChat,
    BackToDocument,
    StartNewClaim,
    Logout,
}

/// Where an event leads. Subscription-gated events defer to a background
/// lookup; reset events clear the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routed {
    To(Screen),
    /// Run the paid-customer lookup for this user and route on the result.
    SubscriptionCheck { user_id: String },
    /// Clear profile, transcript, and flow position, then return to chat.
    Reset,
}

/// Pure transition table. `user` is the authenticated user id, when any.
pub fn route(event: &ScreenEvent, user: Option<&str>) -> Routed {
    match event {
        ScreenEvent::OpenLogin => Routed::To(Screen::AuthLogin),
        ScreenEvent::OpenSignup => Routed::To(Screen::AuthSignup),
        ScreenEvent::BackToChat => Routed::To(Screen::Chat),
        ScreenEvent::LoginSucceeded { user_id, .. } => Routed::SubscriptionCheck {
            user_id: user_id.clone(),
        },
        // New accounts have never paid; send them straight to the plans.
        ScreenEvent::SignupSucceeded { .. } => Routed::To(Screen::Subscription),
        ScreenEvent::IntakeCompleted | ScreenEvent::EditCompleted => match user {
            Some(user_id) => Routed::SubscriptionCheck {
                user_id: user_id.to_string(),
            },
            None => Routed::To(Screen::ClaimReview),
        },
        ScreenEvent::EditRequested => Routed::To(Screen::EditMode),
        // Payment is gated on having an account first.
        ScreenEvent::ProceedToPayment => match user {
            Some(user_id) => Routed::SubscriptionCheck {
                user_id: user_id.to_string(),
            },
            None => Routed::To(Screen::AuthSignup),
        },
        ScreenEvent::CheckoutCompleted => Routed::To(Screen::Success),
        ScreenEvent::PaymentConfirmed | ScreenEvent::SuccessAcknowledged => {
            Routed::To(Screen::DocumentPreview)
        }
        ScreenEvent::SigningStarted => Routed::To(Screen::DocumentSigning),
        ScreenEvent::SigningCompleted | ScreenEvent::SigningDeferred => {
            Routed::To(Screen::DocumentPreview)
        }
        ScreenEvent::OpenPostClaimChat => Routed::To(Screen::PostClaimChat),
        ScreenEvent::BackToDocument => Routed::To(Screen::DocumentPreview),
        ScreenEvent::StartNewClaim | ScreenEvent::Logout => Routed::Reset,
    }
}

/// Resolve a paid-customer lookup into a screen. Any lookup failure routes
/// to the subscription screen rather than granting access.
pub fn screen_for_subscription(result: Result<bool, ClientError>) -> Screen {
    match result {
        Ok(true) => Screen::DocumentPreview,
        Ok(false) => Screen::Subscription,
        Err(e) => {
            warn!(error = %e, "subscription lookup failed, routing to subscription");
            Screen::Subscription
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_intake_completion_shows_review() {
        assert_eq!(
            route(&ScreenEvent::IntakeCompleted, None),
            Routed::To(Screen::ClaimReview)
        );
    }

    #[test]
    fn authenticated_intake_completion_defers_to_subscription_check() {
        assert_eq!(
            route(&ScreenEvent::IntakeCompleted, Some("user-1")),
            Routed::SubscriptionCheck {
                user_id: "user-1".to_string()
            }
        );
    }

    #[test]
    fn signup_goes_straight_to_subscription() {
        assert_eq!(
            route(
                &ScreenEvent::SignupSucceeded {
                    user_id: "user-1".to_string()
                },
                Some("user-1")
            ),
            Routed::To(Screen::Subscription)
        );
    }

    #[test]
    fn unauthenticated_payment_attempt_prompts_signup() {
        assert_eq!(
            route(&ScreenEvent::ProceedToPayment, None),
            Routed::To(Screen::AuthSignup)
        );
        assert_eq!(
            route(&ScreenEvent::ProceedToPayment, Some("user-1")),
            Routed::SubscriptionCheck {
                user_id: "user-1".to_string()
            }
        );
    }

    #[test]
    fn checkout_return_shows_success_then_preview() {
        assert_eq!(
            route(&ScreenEvent::CheckoutCompleted, Some("u")),
            Routed::To(Screen::Success)
        );
        assert_eq!(
            route(&ScreenEvent::SuccessAcknowledged, Some("u")),
            Routed::To(Screen::DocumentPreview)
        );
    }

    #[test]
    fn signing_returns_to_preview_either_way() {
        assert_eq!(
            route(&ScreenEvent::SigningCompleted, Some("u")),
            Routed::To(Screen::DocumentPreview)
        );
        assert_eq!(
            route(&ScreenEvent::SigningDeferred, Some("u")),
            Routed::To(Screen::DocumentPreview)
        );
    }

    #[test]
    fn new_claim_and_logout_reset_the_session() {
        assert_eq!(route(&ScreenEvent::StartNewClaim, Some("u")), Routed::Reset);
        assert_eq!(route(&ScreenEvent::Logout, None), Routed::Reset);
    }

    #[test]
    fn subscription_lookup_failure_is_fail_safe() {
        assert_eq!(screen_for_subscription(Ok(true)), Screen::DocumentPreview);
        assert_eq!(screen_for_subscription(Ok(false)), Screen::Subscription);
        assert_eq!(
            screen_for_subscription(Err(ClientError::Config("missing url".into()))),
            Screen::Subscription
        );
    }
}
