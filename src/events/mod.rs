pub mod dispatcher;
pub mod types;

pub use dispatcher::{LoggingSink, NotificationSink, RewardsSink, SideEffectDispatcher};
pub use types::{EventEnvelope, EventType, TransactionEvent};
