use crate::config::BotConfig;
use crate::services::qr_service::QrService;
use anyhow::Result;
use deadline_desk_core::{
    DirFileStore, MachineConfig, MemoryOrderStore, OrderMachine, Recipient, UserId,
};
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

pub type Machine = OrderMachine<MemoryOrderStore, DirFileStore>;

#[derive(Clone)]
pub struct AppState {
    /// Every decision is taken under this lock, one event at a time.
    pub machine: Arc<Mutex<Machine>>,
    pub qr_service: QrService,
    pub operator_chat: ChatId,
}

impl AppState {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let machine = OrderMachine::new(
            MemoryOrderStore::new(),
            DirFileStore::new(config.deliverables_dir.clone()),
            MachineConfig {
                operator: UserId(config.operator_id),
                notify_operator_on_price_reject: config.notify_operator_on_price_reject,
            },
        );

        Ok(Self {
            machine: Arc::new(Mutex::new(machine)),
            qr_service: QrService::new(config.payment.clone())?,
            operator_chat: ChatId(config.operator_id),
        })
    }

    pub fn chat_for(&self, recipient: Recipient) -> ChatId {
        match recipient {
            Recipient::Client(client) => ChatId(client.0),
            Recipient::Operator => self.operator_chat,
        }
    }
}
