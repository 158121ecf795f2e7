//! Order workflow: decides the next state and the outbound effects for each
//! inbound event. Nothing here talks to the network; the caller executes the
//! returned [`Effect`]s.

pub mod messages;


use crate::action::{ActionKind, ActionTag, DeliveryCaption};
use crate::error::OrderError;
use crate::files::{FileStore, NoFileStore};
use crate::models::order::{
    ClientId, Deliverable, DeliveryStage, Order, OrderState, Price, ServiceType, UserId,
};
use crate::repositories::order_repo::{MemoryOrderStore, OrderStore};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    pub operator: UserId,
    /// Tell the operator when a client declines a quote.
    pub notify_operator_on_price_reject: bool,
}

impl MachineConfig {
    pub fn new(operator: UserId) -> Self {
        Self {
            operator,
            notify_operator_on_price_reject: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Client(ClientId),
    Operator,
}

/// A message previously sent by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat: i64,
    pub message_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ActionTag,
}

impl Button {
    pub fn new(label: impl Into<String>, kind: ActionKind, client: ClientId) -> Self {
        Self {
            label: label.into(),
            action: ActionTag::new(kind, client),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Photo {
    FileId(String),
    Png(Vec<u8>),
}

/// Everything needed to render a payment QR code for an order.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub client: ClientId,
    pub reference: String,
    pub amount: Price,
    /// Quote message whose buttons are cleared once the QR code is out.
    pub origin: Option<MessageRef>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Text {
        to: Recipient,
        text: String,
        buttons: Vec<Vec<Button>>,
    },
    Photo {
        to: Recipient,
        photo: Photo,
        caption: String,
        buttons: Vec<Vec<Button>>,
    },
    Document {
        to: Recipient,
        document: Deliverable,
        caption: String,
    },
    ClearButtons(MessageRef),
    /// Render the QR code, then feed [`Event::PaymentRendered`] back in.
    RenderPayment(PaymentRequest),
}

impl Effect {
    fn text(to: Recipient, text: String) -> Self {
        Effect::Text {
            to,
            text,
            buttons: Vec::new(),
        }
    }

    fn text_with_buttons(to: Recipient, text: String, buttons: Vec<Vec<Button>>) -> Self {
        Effect::Text { to, text, buttons }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start`: discard any order and begin a new one.
    Begin { name: Option<String> },
    Text(String),
    Photo { file_id: String },
    Document { file_id: String, caption: Option<String> },
    Action {
        tag: ActionTag,
        origin: Option<MessageRef>,
    },
    PaymentRendered {
        client: ClientId,
        image: Vec<u8>,
        origin: Option<MessageRef>,
    },
}

pub struct OrderMachine<S = MemoryOrderStore, F = NoFileStore> {
    store: S,
    files: F,
    config: MachineConfig,
}

impl<S: OrderStore, F: FileStore> OrderMachine<S, F> {
    pub fn new(store: S, files: F, config: MachineConfig) -> Self {
        Self {
            store,
            files,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_operator(&self, user: UserId) -> bool {
        user == self.config.operator
    }

    /// Applies one inbound event. On `Err` the store is untouched.
    pub fn handle(&mut self, sender: UserId, event: Event) -> Result<Vec<Effect>, OrderError> {
        match event {
            Event::Begin { name } => Ok(self.begin(sender.as_client(), name)),
            Event::Text(text) => self.on_text(sender, &text),
            Event::Photo { file_id } => Ok(self.on_photo(sender.as_client(), file_id)),
            Event::Document { file_id, caption } => self.on_document(sender, file_id, caption),
            Event::Action { tag, origin } => self.on_action(sender, tag, origin),
            Event::PaymentRendered {
                client,
                image,
                origin,
            } => self.on_payment_rendered(sender, client, image, origin),
        }
    }

    fn begin(&mut self, client: ClientId, name: Option<String>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(previous) = self.store.remove(client) {
            info!(client = %client, state = %previous.state, "Discarding in-flight order on restart");
            if !previous.state.is_intake() {
                effects.push(Effect::text(
                    Recipient::Operator,
                    messages::order_discarded(&previous),
                ));
            }
        }
        if self.store.pricing_cursor() == Some(client) {
            self.store.set_pricing_cursor(None);
        }

        let order = Order::new(client, name);
        info!(client = %client, reference = %order.reference, "New order started");
        self.store.set(order);
        effects.push(Effect::text(Recipient::Client(client), messages::welcome()));
        effects
    }

    fn on_text(&mut self, sender: UserId, text: &str) -> Result<Vec<Effect>, OrderError> {
        if self.is_operator(sender) {
            if let Some(target) = self.live_cursor() {
                return self.enter_price(target, text);
            }
        }

        let client = sender.as_client();
        let Some(mut order) = self.store.get(client) else {
            return Ok(vec![Effect::text(
                Recipient::Client(client),
                messages::start_first(),
            )]);
        };
        let to = Recipient::Client(client);
        let reply = text.trim();

        let effects = match order.state {
            OrderState::ChooseService => match ServiceType::from_code(reply) {
                Some(service) => {
                    order.service = Some(service);
                    order.state = OrderState::GetDetails;
                    vec![Effect::text(to, service.details_prompt().to_string())]
                }
                None => return Ok(vec![Effect::text(to, messages::choose_valid_service())]),
            },
            OrderState::GetDetails => {
                if reply.is_empty() {
                    return Ok(vec![Effect::text(to, messages::empty_reply())]);
                }
                order.details = Some(reply.to_string());
                order.state = OrderState::GetDeadline;
                vec![Effect::text(to, messages::ask_deadline())]
            }
            OrderState::GetDeadline => {
                if reply.is_empty() {
                    return Ok(vec![Effect::text(to, messages::empty_reply())]);
                }
                order.deadline = Some(reply.to_string());
                order.state = OrderState::PendingReview;
                vec![
                    Effect::text(to, messages::under_review(&order)),
                    Effect::text_with_buttons(
                        Recipient::Operator,
                        messages::operator_summary(&order),
                        vec![vec![
                            Button::new("✅ Accept", ActionKind::Accept, client),
                            Button::new("❌ Reject", ActionKind::Reject, client),
                        ]],
                    ),
                ]
            }
            state => {
                debug!(client = %client, state = %state, "Ignoring text outside intake");
                return Ok(Vec::new());
            }
        };

        info!(client = %client, state = %order.state, "Order transition");
        self.store.set(order);
        Ok(effects)
    }

    /// Pricing cursor, if it still points at an order waiting for a price.
    fn live_cursor(&self) -> Option<ClientId> {
        let target = self.store.pricing_cursor()?;
        match self.store.get(target) {
            Some(order) if order.state == OrderState::SetPrice => Some(target),
            _ => None,
        }
    }

    fn enter_price(&mut self, client: ClientId, text: &str) -> Result<Vec<Effect>, OrderError> {
        let price = Price::parse(text).ok_or_else(|| OrderError::InvalidPrice(text.trim().to_string()))?;
        let mut order = self.store.get(client).ok_or(OrderError::OrderNotFound(client))?;

        order.price = Some(price);
        order.state = OrderState::AwaitUserApproval;
        self.store.set_pricing_cursor(None);

        let effects = vec![
            Effect::text_with_buttons(
                Recipient::Client(client),
                messages::price_proposal(&order, price),
                vec![vec![
                    Button::new("✅ Accept", ActionKind::PriceAccept, client),
                    Button::new("❌ Reject", ActionKind::PriceReject, client),
                ]],
            ),
            Effect::text(Recipient::Operator, messages::price_sent(&order, price)),
        ];
        info!(client = %client, price = %price, state = %order.state, "Order priced");
        self.store.set(order);
        Ok(effects)
    }

    fn on_photo(&mut self, client: ClientId, file_id: String) -> Vec<Effect> {
        let Some(mut order) = self.store.get(client) else {
            debug!(client = %client, "Photo without an order");
            return Vec::new();
        };
        if order.state != OrderState::WaitingScreenshot {
            debug!(client = %client, state = %order.state, "Ignoring photo");
            return Vec::new();
        }

        order.state = OrderState::VerificationPending;
        let effects = vec![
            Effect::text(Recipient::Client(client), messages::screenshot_received()),
            Effect::Photo {
                to: Recipient::Operator,
                photo: Photo::FileId(file_id),
                caption: messages::screenshot_caption(&order),
                buttons: vec![vec![
                    Button::new("✅ Approve", ActionKind::Approve, client),
                    Button::new("❌ Reject", ActionKind::RejectPayment, client),
                ]],
            },
        ];
        info!(client = %client, state = %order.state, "Payment screenshot forwarded");
        self.store.set(order);
        effects
    }

    fn on_document(
        &mut self,
        sender: UserId,
        file_id: String,
        caption: Option<String>,
    ) -> Result<Vec<Effect>, OrderError> {
        if !self.is_operator(sender) {
            let client = sender.as_client();
            return match self.store.get(client) {
                Some(order) if order.state.is_intake() => {
                    debug!(client = %client, state = %order.state, "Client file during intake");
                    Ok(vec![Effect::text(
                        Recipient::Client(client),
                        messages::text_only(),
                    )])
                }
                _ => Err(OrderError::UploadNotAllowed),
            };
        }
        let caption: DeliveryCaption = caption.as_deref().unwrap_or_default().parse()?;
        let client = caption.client;
        let mut order = self.store.get(client).ok_or(OrderError::OrderNotFound(client))?;
        if order.state.is_intake() {
            return Err(OrderError::IntakeIncomplete(client));
        }

        let document = Deliverable::Uploaded { file_id };
        order.set_deliverable(caption.stage, document.clone());
        info!(client = %client, stage = %caption.stage, state = %order.state, "Deliverable uploaded");

        let to = Recipient::Client(client);
        let effects = match caption.stage {
            DeliveryStage::Partial if order.state.is_awaiting_payment() => {
                order.state = OrderState::PartialSent;
                order.partial_delivered = true;
                vec![
                    Effect::Document {
                        to,
                        document,
                        caption: messages::partial_delivery_caption(),
                    },
                    Effect::text(Recipient::Operator, messages::partial_sent(&order)),
                ]
            }
            DeliveryStage::Partial => {
                vec![Effect::text(Recipient::Operator, messages::partial_held(&order))]
            }
            DeliveryStage::Full if order.state == OrderState::VerificationPending => {
                self.store.remove(client);
                info!(client = %client, "Order completed on upload");
                return Ok(vec![
                    Effect::Document {
                        to,
                        document,
                        caption: messages::full_delivery_caption(),
                    },
                    Effect::text(Recipient::Operator, messages::delivered(&order)),
                ]);
            }
            DeliveryStage::Full => vec![
                Effect::text(to, messages::full_ready_client()),
                Effect::text(Recipient::Operator, messages::full_held(&order)),
            ],
        };

        self.store.set(order);
        Ok(effects)
    }

    fn on_action(
        &mut self,
        sender: UserId,
        tag: ActionTag,
        origin: Option<MessageRef>,
    ) -> Result<Vec<Effect>, OrderError> {
        let client = tag.client;
        if tag.kind.is_operator_action() {
            if !self.is_operator(sender) {
                return Err(OrderError::NotOperator);
            }
        } else if sender != client.as_user() {
            return Err(OrderError::NotOwner);
        }

        let order = self.store.get(client).ok_or(OrderError::OrderNotFound(client))?;
        let expected = match tag.kind {
            ActionKind::Accept | ActionKind::Reject => order.state == OrderState::PendingReview,
            ActionKind::PriceAccept | ActionKind::PriceReject => {
                order.state == OrderState::AwaitUserApproval
            }
            ActionKind::PaymentDone => order.state.is_awaiting_payment(),
            ActionKind::Approve | ActionKind::RejectPayment => {
                order.state == OrderState::VerificationPending
            }
        };
        if !expected {
            return Err(OrderError::UnexpectedState {
                client,
                state: order.state,
            });
        }

        let mut effects: Vec<Effect> = origin.into_iter().map(Effect::ClearButtons).collect();
        match tag.kind {
            ActionKind::Accept => effects.extend(self.accept_for_pricing(order)?),
            ActionKind::Reject => {
                self.store.remove(client);
                info!(client = %client, "Order rejected in review");
                effects.push(Effect::text(
                    Recipient::Client(client),
                    messages::order_rejected(),
                ));
            }
            ActionKind::PriceAccept => {
                // Buttons stay until the QR code is out so a failed render can be retried.
                let amount = order.price.ok_or(OrderError::UnexpectedState {
                    client,
                    state: order.state,
                })?;
                return Ok(vec![Effect::RenderPayment(PaymentRequest {
                    client,
                    reference: order.reference,
                    amount,
                    origin,
                })]);
            }
            ActionKind::PriceReject => {
                self.store.remove(client);
                info!(client = %client, "Quote declined by client");
                effects.push(Effect::text(
                    Recipient::Client(client),
                    messages::price_declined_client(),
                ));
                if self.config.notify_operator_on_price_reject {
                    effects.push(Effect::text(
                        Recipient::Operator,
                        messages::price_declined_operator(&order),
                    ));
                }
            }
            ActionKind::PaymentDone => {
                let mut order = order;
                order.state = OrderState::WaitingScreenshot;
                effects.push(Effect::text(
                    Recipient::Client(client),
                    messages::ask_screenshot(),
                ));
                effects.push(Effect::text(
                    Recipient::Operator,
                    messages::payment_claimed(&order),
                ));
                info!(client = %client, state = %order.state, "Order transition");
                self.store.set(order);
            }
            ActionKind::Approve => {
                let document = order
                    .full
                    .clone()
                    .or_else(|| self.files.locate(client, DeliveryStage::Full))
                    .ok_or(OrderError::MissingDeliverable(client))?;
                self.store.remove(client);
                info!(client = %client, "Payment approved, order completed");
                effects.push(Effect::Document {
                    to: Recipient::Client(client),
                    document,
                    caption: messages::full_delivery_caption(),
                });
                effects.push(Effect::text(Recipient::Operator, messages::delivered(&order)));
            }
            ActionKind::RejectPayment => {
                let mut order = order;
                order.state = OrderState::AwaitPayment;
                let preview = self.release_preview(&mut order);
                effects.push(Effect::text_with_buttons(
                    Recipient::Client(client),
                    messages::resend_screenshot(),
                    vec![vec![Button::new(
                        "💸 Payment Done",
                        ActionKind::PaymentDone,
                        client,
                    )]],
                ));
                effects.push(Effect::text(
                    Recipient::Operator,
                    messages::payment_rejected_operator(&order),
                ));
                effects.extend(preview);
                info!(client = %client, state = %order.state, "Payment screenshot rejected");
                self.store.set(order);
            }
        }
        Ok(effects)
    }

    fn accept_for_pricing(&mut self, mut order: Order) -> Result<Vec<Effect>, OrderError> {
        let client = order.client;
        if let Some(pending) = self.live_cursor() {
            if pending != client {
                return Err(OrderError::PricingInProgress(pending));
            }
        }

        order.state = OrderState::SetPrice;
        self.store.set_pricing_cursor(Some(client));
        let effects = vec![Effect::text(Recipient::Operator, messages::ask_price(&order))];
        info!(client = %client, state = %order.state, "Order accepted for pricing");
        self.store.set(order);
        Ok(effects)
    }

    /// Called when an order enters `awaitPayment`: a preview that is on hand
    /// goes out now and the order moves to `partialSent`.
    fn release_preview(&self, order: &mut Order) -> Vec<Effect> {
        if order.partial_delivered {
            order.state = OrderState::PartialSent;
            return Vec::new();
        }
        let client = order.client;
        let Some(document) = order
            .partial
            .clone()
            .or_else(|| self.files.locate(client, DeliveryStage::Partial))
        else {
            return Vec::new();
        };

        order.state = OrderState::PartialSent;
        order.partial_delivered = true;
        vec![Effect::Document {
            to: Recipient::Client(client),
            document,
            caption: messages::partial_delivery_caption(),
        }]
    }

    fn on_payment_rendered(
        &mut self,
        sender: UserId,
        client: ClientId,
        image: Vec<u8>,
        origin: Option<MessageRef>,
    ) -> Result<Vec<Effect>, OrderError> {
        if sender != client.as_user() {
            return Err(OrderError::NotOwner);
        }
        let mut order = self.store.get(client).ok_or(OrderError::OrderNotFound(client))?;
        let price = match (order.state, order.price) {
            (OrderState::AwaitUserApproval, Some(price)) => price,
            (state, _) => return Err(OrderError::UnexpectedState { client, state }),
        };

        order.state = OrderState::AwaitPayment;
        let mut effects: Vec<Effect> = origin.into_iter().map(Effect::ClearButtons).collect();
        effects.push(Effect::Photo {
            to: Recipient::Client(client),
            photo: Photo::Png(image),
            caption: messages::payment_instructions(price),
            buttons: vec![vec![Button::new(
                "💸 Payment Done",
                ActionKind::PaymentDone,
                client,
            )]],
        });
        effects.push(Effect::text(
            Recipient::Operator,
            messages::client_accepted_price(&order),
        ));

        effects.extend(self.release_preview(&mut order));

        info!(client = %client, state = %order.state, "Payment request sent");
        self.store.set(order);
        Ok(effects)
    }
}
