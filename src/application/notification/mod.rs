mod dispatcher;

pub use dispatcher::{DispatchError, NotificationDispatcher};
