use tracing::{debug, info};

use crate::task::Task;
use crate::view::{remaining_count, remaining_message};

pub const NOTIFICATION_TITLE: &str = "Todo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Not decided yet; the platform will prompt.
    Default,
    Granted,
    Denied,
    Unsupported,
}

impl Permission {
    pub fn as_label(self) -> &'static str {
        match self {
            Permission::Default => "Permission not requested",
            Permission::Granted => "Permission granted",
            Permission::Denied => "Permission denied",
            Permission::Unsupported => "Notifications unsupported",
        }
    }
}

/// Platform notification capability.
pub trait Notifier {
    fn permission(&self) -> Permission;

    /// Starts a permission prompt. Completion is not awaited by callers.
    fn request_permission(&self);

    /// Returns whether a notification was actually shown.
    fn show(&self, title: &str, body: &str) -> bool;
}

/// Asks for permission once at startup, only while it is still undetermined.
pub fn request_on_startup<N: Notifier + ?Sized>(notifier: &N) -> bool {
    match notifier.permission() {
        Permission::Default => {
            info!("requesting notification permission");
            notifier.request_permission();
            true
        }
        other => {
            debug!(permission = ?other, "not requesting notification permission");
            false
        }
    }
}

/// Sends the remaining-task count. Silently does nothing without permission.
pub fn push_remaining<N: Notifier + ?Sized>(notifier: &N, tasks: &[Task]) -> bool {
    let permission = notifier.permission();
    if permission != Permission::Granted {
        debug!(permission = ?permission, "skipping notification");
        return false;
    }

    let body = remaining_message(remaining_count(tasks));
    notifier.show(NOTIFICATION_TITLE, &body)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use uuid::Uuid;

    use super::*;
    use crate::task::Priority;

    struct FakeNotifier {
        permission: Permission,
        requests: Cell<usize>,
        shown: RefCell<Vec<(String, String)>>,
    }

    impl FakeNotifier {
        fn new(permission: Permission) -> Self {
            Self {
                permission,
                requests: Cell::new(0),
                shown: RefCell::new(vec![]),
            }
        }
    }

    impl Notifier for FakeNotifier {
        fn permission(&self) -> Permission {
            self.permission
        }

        fn request_permission(&self) {
            self.requests.set(self.requests.get() + 1);
        }

        fn show(&self, title: &str, body: &str) -> bool {
            self.shown
                .borrow_mut()
                .push((title.to_string(), body.to_string()));
            true
        }
    }

    fn open_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            name: "Stretch".to_string(),
            is_done: false,
            priority: Priority::Low,
            deadline: None,
        }
    }

    #[test]
    fn requests_only_when_undetermined() {
        for (permission, expected) in [
            (Permission::Default, 1),
            (Permission::Granted, 0),
            (Permission::Denied, 0),
            (Permission::Unsupported, 0),
        ] {
            let notifier = FakeNotifier::new(permission);
            request_on_startup(&notifier);
            assert_eq!(notifier.requests.get(), expected, "{permission:?}");
        }
    }

    #[test]
    fn push_embeds_remaining_count() {
        let notifier = FakeNotifier::new(Permission::Granted);
        let mut done = open_task();
        done.is_done = true;
        assert!(push_remaining(&notifier, &[open_task(), done, open_task()]));
        assert_eq!(
            notifier.shown.borrow().as_slice(),
            &[("Todo".to_string(), "You have 2 tasks left!".to_string())]
        );
    }

    #[test]
    fn push_is_silent_when_denied() {
        let notifier = FakeNotifier::new(Permission::Denied);
        assert!(!push_remaining(&notifier, &[open_task()]));
        assert!(notifier.shown.borrow().is_empty());
    }
}
