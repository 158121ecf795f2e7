pub mod action;
pub mod error;
pub mod files;
pub mod machine;
pub mod models;
pub mod repositories;
pub mod utils;

pub use action::{ActionKind, ActionTag, DeliveryCaption};
pub use error::OrderError;
pub use files::{DirFileStore, FileStore, NoFileStore};
pub use machine::{
    Button, Effect, Event, MachineConfig, MessageRef, OrderMachine, PaymentRequest, Photo, Recipient,
};
pub use models::order::{
    ClientId, Deliverable, DeliveryStage, Order, OrderState, Price, ServiceType, UserId,
};
pub use repositories::order_repo::{MemoryOrderStore, OrderStore};
