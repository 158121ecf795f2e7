//! Callback payloads and document captions, parsed once at the chat boundary.

use crate::error::OrderError;
use crate::models::order::{ClientId, DeliveryStage};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Operator accepts a new order for pricing.
    Accept,
    /// Operator declines a new order.
    Reject,
    /// Client accepts the quoted price.
    PriceAccept,
    /// Client declines the quoted price.
    PriceReject,
    /// Client claims the payment went through.
    PaymentDone,
    /// Operator confirms the payment screenshot.
    Approve,
    /// Operator rejects the payment screenshot.
    RejectPayment,
}

impl ActionKind {
    // Longer prefixes first so `price_accept_` never matches as `accept_`.
    const PREFIXES: [(&'static str, ActionKind); 7] = [
        ("price_accept_", ActionKind::PriceAccept),
        ("price_reject_", ActionKind::PriceReject),
        ("payment_done_", ActionKind::PaymentDone),
        ("rejectpay_", ActionKind::RejectPayment),
        ("approve_", ActionKind::Approve),
        ("accept_", ActionKind::Accept),
        ("reject_", ActionKind::Reject),
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            ActionKind::Accept => "accept_",
            ActionKind::Reject => "reject_",
            ActionKind::PriceAccept => "price_accept_",
            ActionKind::PriceReject => "price_reject_",
            ActionKind::PaymentDone => "payment_done_",
            ActionKind::Approve => "approve_",
            ActionKind::RejectPayment => "rejectpay_",
        }
    }

    /// Actions only the configured operator may press.
    pub fn is_operator_action(self) -> bool {
        matches!(
            self,
            ActionKind::Accept | ActionKind::Reject | ActionKind::Approve | ActionKind::RejectPayment
        )
    }
}

/// A validated button action and the client it targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionTag {
    pub kind: ActionKind,
    pub client: ClientId,
}

impl ActionTag {
    pub fn new(kind: ActionKind, client: ClientId) -> Self {
        Self { kind, client }
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.client)
    }
}

impl FromStr for ActionTag {
    type Err = OrderError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let invalid = || OrderError::InvalidAction(data.to_string());
        let (kind, rest) = ActionKind::PREFIXES
            .iter()
            .find_map(|(prefix, kind)| data.strip_prefix(prefix).map(|rest| (*kind, rest)))
            .ok_or_else(invalid)?;
        let client = rest.parse::<ClientId>().map_err(|_| invalid())?;
        Ok(ActionTag { kind, client })
    }
}

/// Routing caption on an operator upload: `<clientId>_<partial|full>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryCaption {
    pub client: ClientId,
    pub stage: DeliveryStage,
}

impl FromStr for DeliveryCaption {
    type Err = OrderError;

    fn from_str(caption: &str) -> Result<Self, Self::Err> {
        let invalid = || OrderError::InvalidCaption(caption.to_string());
        let (client, stage) = caption.trim().rsplit_once('_').ok_or_else(invalid)?;
        let stage = stage.parse::<DeliveryStage>().map_err(|_| invalid())?;
        let client = client.parse::<ClientId>().map_err(|_| invalid())?;
        Ok(DeliveryCaption { client, stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_action_prefix() {
        let cases = [
            ("accept_42", ActionKind::Accept),
            ("reject_42", ActionKind::Reject),
            ("price_accept_42", ActionKind::PriceAccept),
            ("price_reject_42", ActionKind::PriceReject),
            ("payment_done_42", ActionKind::PaymentDone),
            ("approve_42", ActionKind::Approve),
            ("rejectpay_42", ActionKind::RejectPayment),
        ];
        for (data, kind) in cases {
            let tag: ActionTag = data.parse().unwrap();
            assert_eq!(tag, ActionTag::new(kind, ClientId(42)), "{data}");
            assert_eq!(tag.to_string(), data);
        }
    }

    #[test]
    fn negative_chat_ids_survive_parsing() {
        let tag: ActionTag = "approve_-1001234".parse().unwrap();
        assert_eq!(tag.client, ClientId(-1001234));
    }

    #[test]
    fn rejects_unknown_or_malformed_tags() {
        assert!(matches!(
            "refund_42".parse::<ActionTag>(),
            Err(OrderError::InvalidAction(_))
        ));
        assert!("accept_".parse::<ActionTag>().is_err());
        assert!("accept_abc".parse::<ActionTag>().is_err());
        assert!("price_accept_1_2".parse::<ActionTag>().is_err());
    }

    #[test]
    fn caption_splits_at_last_underscore() {
        let caption: DeliveryCaption = "12345_full".parse().unwrap();
        assert_eq!(caption.client, ClientId(12345));
        assert_eq!(caption.stage, DeliveryStage::Full);

        let caption: DeliveryCaption = " 99_Partial ".parse().unwrap();
        assert_eq!(caption.stage, DeliveryStage::Partial);
    }

    #[test]
    fn malformed_captions_are_reported() {
        for bad in ["12345", "12345_final", "abc_full", "_full", ""] {
            assert!(
                matches!(bad.parse::<DeliveryCaption>(), Err(OrderError::InvalidCaption(_))),
                "{bad}"
            );
        }
    }
}
