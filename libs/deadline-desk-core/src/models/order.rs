use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Telegram identity of the party that placed an order. In a private chat this
/// is also the chat id the bot replies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub i64);

impl ClientId {
    pub fn as_user(self) -> UserId {
        UserId(self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(ClientId)
    }
}

/// Identity of whoever sent an inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    pub fn as_client(self) -> ClientId {
        ClientId(self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Ppt,
    Notes,
    Resume,
    Assignment,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Ppt,
        ServiceType::Notes,
        ServiceType::Resume,
        ServiceType::Assignment,
    ];

    /// Maps the menu codes `1`..`4` to a service.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(ServiceType::Ppt),
            "2" => Some(ServiceType::Notes),
            "3" => Some(ServiceType::Resume),
            "4" => Some(ServiceType::Assignment),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ServiceType::Ppt => "1",
            ServiceType::Notes => "2",
            ServiceType::Resume => "3",
            ServiceType::Assignment => "4",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ServiceType::Ppt => "PPT",
            ServiceType::Notes => "Notes",
            ServiceType::Resume => "Resume",
            ServiceType::Assignment => "Assignment",
        }
    }

    pub fn menu_label(self) -> &'static str {
        match self {
            ServiceType::Ppt => "PPT Creation",
            ServiceType::Notes => "Notes Making",
            ServiceType::Resume => "Resume Building",
            ServiceType::Assignment => "Assignment Formatting",
        }
    }

    pub fn details_prompt(self) -> &'static str {
        match self {
            ServiceType::Ppt => "Please send the PPT topic and number of slides.",
            ServiceType::Notes => "Please send the subject and number of pages for notes.",
            ServiceType::Resume => {
                "Please send your resume details as text: education, experience and skills."
            }
            ServiceType::Assignment => "Please send the assignment details and pages required.",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Position of an order in the workflow. A completed or rejected order is
/// removed from the store, so there is no terminal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderState {
    ChooseService,
    GetDetails,
    GetDeadline,
    PendingReview,
    SetPrice,
    AwaitUserApproval,
    AwaitPayment,
    PartialSent,
    WaitingScreenshot,
    VerificationPending,
}

impl OrderState {
    /// The client is still filling in the order.
    pub fn is_intake(self) -> bool {
        matches!(
            self,
            OrderState::ChooseService | OrderState::GetDetails | OrderState::GetDeadline
        )
    }

    /// A price has been quoted for the order.
    pub fn is_priced(self) -> bool {
        matches!(
            self,
            OrderState::AwaitUserApproval
                | OrderState::AwaitPayment
                | OrderState::PartialSent
                | OrderState::WaitingScreenshot
                | OrderState::VerificationPending
        )
    }

    /// The client has accepted the quote and is expected to pay.
    pub fn is_awaiting_payment(self) -> bool {
        matches!(self, OrderState::AwaitPayment | OrderState::PartialSent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderState::ChooseService => "chooseService",
            OrderState::GetDetails => "getDetails",
            OrderState::GetDeadline => "getDeadline",
            OrderState::PendingReview => "pendingReview",
            OrderState::SetPrice => "setPrice",
            OrderState::AwaitUserApproval => "awaitUserApproval",
            OrderState::AwaitPayment => "awaitPayment",
            OrderState::PartialSent => "partialSent",
            OrderState::WaitingScreenshot => "waitingScreenshot",
            OrderState::VerificationPending => "verificationPending",
        }
    }
}

impl fmt::Display for OrderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Largest quote accepted, in major currency units.
pub const MAX_PRICE: f64 = 10_000_000.0;

/// Amount quoted by the operator, in major currency units, rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    /// Accepts an amount between 0.01 and [`MAX_PRICE`] after rounding to
    /// two decimals, optionally prefixed with `₹` or `Rs`.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('₹')
            .or_else(|| trimmed.strip_prefix("Rs."))
            .or_else(|| trimmed.strip_prefix("Rs"))
            .unwrap_or(trimmed)
            .trim();
        let value = digits.parse::<f64>().ok()?;
        if !value.is_finite() {
            return None;
        }
        let value = (value * 100.0).round() / 100.0;
        if (0.01..=MAX_PRICE).contains(&value) {
            Some(Price(value))
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Two-decimal form used in payment links.
    pub fn as_amount_param(self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}", self.0)
        } else {
            write!(f, "{:.2}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStage {
    Partial,
    Full,
}

impl DeliveryStage {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStage::Partial => "partial",
            DeliveryStage::Full => "full",
        }
    }
}

impl fmt::Display for DeliveryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "partial" => Ok(DeliveryStage::Partial),
            "full" => Ok(DeliveryStage::Full),
            _ => Err(()),
        }
    }
}

/// Where a deliverable file lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deliverable {
    /// Uploaded by the operator through the chat; re-sent by file id.
    Uploaded { file_id: String },
    /// Found in the deliverables directory on disk.
    Stored { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub reference: String,
    pub client: ClientId,
    pub client_name: Option<String>,
    pub state: OrderState,
    pub service: Option<ServiceType>,
    pub details: Option<String>,
    pub deadline: Option<String>,
    pub price: Option<Price>,
    pub partial: Option<Deliverable>,
    /// The stored partial has already gone out to the client.
    #[serde(default)]
    pub partial_delivered: bool,
    pub full: Option<Deliverable>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(client: ClientId, client_name: Option<String>) -> Self {
        let reference = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
        Self {
            reference,
            client,
            client_name,
            state: OrderState::ChooseService,
            service: None,
            details: None,
            deadline: None,
            price: None,
            partial: None,
            partial_delivered: false,
            full: None,
            created_at: Utc::now(),
        }
    }

    pub fn deliverable(&self, stage: DeliveryStage) -> Option<&Deliverable> {
        match stage {
            DeliveryStage::Partial => self.partial.as_ref(),
            DeliveryStage::Full => self.full.as_ref(),
        }
    }

    pub fn set_deliverable(&mut self, stage: DeliveryStage, deliverable: Deliverable) {
        match stage {
            DeliveryStage::Partial => {
                self.partial = Some(deliverable);
                self.partial_delivered = false;
            }
            DeliveryStage::Full => self.full = Some(deliverable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_codes_map_to_names() {
        assert_eq!(ServiceType::from_code("1"), Some(ServiceType::Ppt));
        assert_eq!(ServiceType::from_code(" 2 "), Some(ServiceType::Notes));
        assert_eq!(ServiceType::from_code("4").map(|s| s.name()), Some("Assignment"));
        assert_eq!(ServiceType::from_code("5"), None);
        assert_eq!(ServiceType::from_code("PPT"), None);
    }

    #[test]
    fn price_parse_rejects_non_positive_and_garbage() {
        assert_eq!(Price::parse("499").map(Price::value), Some(499.0));
        assert_eq!(Price::parse("₹ 250.5").map(Price::value), Some(250.5));
        assert_eq!(Price::parse("Rs 100").map(Price::value), Some(100.0));
        assert!(Price::parse("0").is_none());
        assert!(Price::parse("-10").is_none());
        assert!(Price::parse("five hundred").is_none());
        assert!(Price::parse("NaN").is_none());
        assert!(Price::parse("inf").is_none());
        assert!(Price::parse("0.001").is_none());
        assert!(Price::parse("0.004").is_none());
        assert!(Price::parse("1e300").is_none());
        assert!(Price::parse("10000000.01").is_none());
        assert_eq!(Price::parse("0.01").map(Price::as_amount_param), Some("0.01".into()));
        assert_eq!(Price::parse("0.005").map(Price::as_amount_param), Some("0.01".into()));
        assert_eq!(Price::parse("199.999").map(Price::value), Some(200.0));
    }

    #[test]
    fn price_display_drops_zero_fraction() {
        assert_eq!(Price::parse("300").unwrap().to_string(), "300");
        assert_eq!(Price::parse("300.5").unwrap().to_string(), "300.50");
        assert_eq!(Price::parse("300").unwrap().as_amount_param(), "300.00");
    }

    #[test]
    fn new_order_starts_at_choose_service() {
        let order = Order::new(ClientId(7), None);
        assert_eq!(order.state, OrderState::ChooseService);
        assert_eq!(order.reference.len(), 8);
        assert!(order.price.is_none());
        assert!(order.deliverable(DeliveryStage::Full).is_none());
    }

    #[test]
    fn priced_states_start_at_user_approval() {
        assert!(!OrderState::SetPrice.is_priced());
        assert!(OrderState::AwaitUserApproval.is_priced());
        assert!(OrderState::VerificationPending.is_priced());
        assert!(OrderState::GetDeadline.is_intake());
        assert!(OrderState::PartialSent.is_awaiting_payment());
    }
}
