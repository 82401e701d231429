//! Top-level render failure supervision. Once an error is caught the
//! boundary stays in the fallback state; the only way out is a page reload.

use std::any::Any;

pub const DEFAULT_FALLBACK_TITLE: &str = "Something went wrong";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryView {
    Children,
    Fallback { title: String, message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBoundaryState {
    title: Option<String>,
    caught: Option<String>,
}

impl ErrorBoundaryState {
    pub fn new(title: Option<String>) -> Self {
        Self {
            title: title.filter(|t| !t.trim().is_empty()),
            caught: None,
        }
    }

    /// Record an error. The first one wins so the fallback keeps showing
    /// the original cause.
    pub fn catch(&mut self, message: impl Into<String>) {
        if self.caught.is_none() {
            self.caught = Some(message.into());
        }
    }

    pub fn has_caught(&self) -> bool {
        self.caught.is_some()
    }

    pub fn caught(&self) -> Option<&str> {
        self.caught.as_deref()
    }

    /// Record a panic and return what should replace the page.
    pub fn catch_panic(&mut self, payload: &(dyn Any + Send)) -> BoundaryView {
        self.catch(panic_message(payload));
        self.view()
    }

    pub fn view(&self) -> BoundaryView {
        match &self.caught {
            None => BoundaryView::Children,
            Some(message) => BoundaryView::Fallback {
                title: self
                    .title
                    .clone()
                    .unwrap_or_else(|| DEFAULT_FALLBACK_TITLE.to_string()),
                message: message.clone(),
            },
        }
    }
}

/// Best-effort text from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_until_caught() {
        let state = ErrorBoundaryState::new(None);
        assert_eq!(state.view(), BoundaryView::Children);
    }

    #[test]
    fn test_message_verbatim_with_default_title() {
        let mut state = ErrorBoundaryState::new(None);
        state.catch("TypeError: cannot read 'round' of <undefined>");
        assert_eq!(
            state.view(),
            BoundaryView::Fallback {
                title: "Something went wrong".to_string(),
                message: "TypeError: cannot read 'round' of <undefined>".to_string(),
            }
        );
    }

    #[test]
    fn test_custom_title_and_sticky_first_error() {
        let mut state = ErrorBoundaryState::new(Some("Governance failed to render".to_string()));
        state.catch("first");
        state.catch("second");
        match state.view() {
            BoundaryView::Fallback { title, message } => {
                assert_eq!(title, "Governance failed to render");
                assert_eq!(message, "first");
            }
            BoundaryView::Children => panic!("children rendered after catching"),
        }
        assert!(state.has_caught());
    }

    #[test]
    fn test_blank_title_falls_back_to_default() {
        let mut state = ErrorBoundaryState::new(Some("  ".to_string()));
        state.catch("x");
        assert!(matches!(state.view(), BoundaryView::Fallback { title, .. } if title == DEFAULT_FALLBACK_TITLE));
    }

    #[test]
    fn test_panic_replaces_children_and_keeps_first_cause() {
        let mut state = ErrorBoundaryState::new(None);
        let first = std::panic::catch_unwind(|| panic!("shard list index out of range")).unwrap_err();
        let second = std::panic::catch_unwind(|| panic!("later failure")).unwrap_err();

        let view = state.catch_panic(first.as_ref());
        assert_eq!(
            view,
            BoundaryView::Fallback {
                title: DEFAULT_FALLBACK_TITLE.to_string(),
                message: "shard list index out of range".to_string(),
            }
        );
        state.catch_panic(second.as_ref());
        assert_eq!(state.caught(), Some("shard list index out of range"));
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "Unknown error");
    }
}
