//! The sample (call set) name list: pending until the first batch, or a
//! header, establishes it, then fixed for the life of the source.

use std::sync::Arc;
use tokio::sync::watch;

pub type Names = Arc<Vec<String>>;

pub struct CallNames {
    tx: watch::Sender<Option<Names>>,
    // keeps the channel open while nobody is waiting
    _rx: watch::Receiver<Option<Names>>,
}

impl CallNames {
    pub fn pending() -> Self {
        let (tx, rx) = watch::channel(None);
        Self { tx, _rx: rx }
    }

    pub fn resolved(names: Vec<String>) -> Self {
        let cell = Self::pending();
        cell.resolve(names);
        cell
    }

    pub fn get(&self) -> Option<Names> {
        self.tx.borrow().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Set the list if still pending. Returns whichever list is now in
    /// effect, which is the earlier one if another caller got there first.
    pub fn resolve(&self, names: Vec<String>) -> Names {
        let mut names = Some(Arc::new(names));
        self.tx.send_if_modified(|current| {
            if current.is_none() {
                *current = names.take();
                true
            } else {
                false
            }
        });
        self.tx
            .borrow()
            .clone()
            .unwrap_or_else(|| Arc::new(Vec::new()))
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Names>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_resolution_wins() {
        let cell = CallNames::pending();
        assert!(cell.get().is_none());

        let first = cell.resolve(vec!["NORMAL".into(), "TUMOR".into()]);
        let second = cell.resolve(vec!["OTHER".into()]);
        assert_eq!(*first, vec!["NORMAL", "TUMOR"]);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cell.is_resolved());
    }

    #[tokio::test]
    async fn test_waiter_wakes_on_resolve() {
        let cell = Arc::new(CallNames::pending());
        let mut rx = cell.subscribe();
        let resolver = cell.clone();
        tokio::spawn(async move {
            resolver.resolve(vec!["s1".into()]);
        });
        let names = rx.wait_for(Option::is_some).await.unwrap().clone().unwrap();
        assert_eq!(*names, vec!["s1"]);
    }
}
