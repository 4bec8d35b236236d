use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use crate::config::{PageConfig, REVEAL_THRESHOLD};
use crate::dom::{self, ACTIVE_CLASS};
use crate::log;

pub fn should_reveal(top: f64, viewport_height: f64) -> bool {
    top < viewport_height - REVEAL_THRESHOLD
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealSet {
    active: Vec<bool>,
}

impl RevealSet {
    pub fn new(len: usize) -> Self {
        Self {
            active: vec![false; len],
        }
    }

    pub fn from_flags(active: Vec<bool>) -> Self {
        Self { active }
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Runs one pass and returns the indexes revealed by it. `top_of` is only asked
    /// about elements that are still hidden.
    pub fn update(&mut self, viewport_height: f64, mut top_of: impl FnMut(usize) -> f64) -> Vec<usize> {
        let mut revealed = Vec::new();
        for (index, active) in self.active.iter_mut().enumerate() {
            if *active {
                continue;
            }
            if should_reveal(top_of(index), viewport_height) {
                *active = true;
                revealed.push(index);
            }
        }
        revealed
    }
}

pub struct Reveal {
    elements: Vec<Element>,
    set: RevealSet,
}

impl Reveal {
    pub fn set(&self) -> &RevealSet {
        &self.set
    }

    pub fn run(&mut self, window: &Window) {
        let viewport_height = window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let elements = &self.elements;
        for index in self
            .set
            .update(viewport_height, |i| elements[i].get_bounding_client_rect().top())
        {
            let _ = elements[index].class_list().add_1(ACTIVE_CLASS);
        }
    }
}

pub fn bind(
    window: &Window,
    document: &Document,
    config: &PageConfig,
) -> Result<Option<Rc<RefCell<Reveal>>>, JsValue> {
    let Some(root) = document.document_element() else {
        return Ok(None);
    };
    let elements = dom::query_all(&root, config.reveal)?;
    if elements.is_empty() {
        log::debug("reveal: no tagged elements on page");
        return Ok(None);
    }

    let flags = elements
        .iter()
        .map(|el| el.class_list().contains(ACTIVE_CLASS))
        .collect();
    let reveal = Rc::new(RefCell::new(Reveal {
        elements,
        set: RevealSet::from_flags(flags),
    }));

    {
        let reveal = Rc::clone(&reveal);
        let window_cb = window.clone();
        dom::listen(window, "scroll", move |_event| {
            reveal.borrow_mut().run(&window_cb);
        })?;
    }
    reveal.borrow_mut().run(window);

    Ok(Some(reveal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        assert!(should_reveal(449.0, 600.0));
        assert!(!should_reveal(450.0, 600.0));
        assert!(!should_reveal(900.0, 600.0));
    }

    #[test]
    fn reveals_elements_above_the_fold() {
        let mut set = RevealSet::new(3);
        let tops = [10.0, 500.0, 2000.0];
        let revealed = set.update(800.0, |i| tops[i]);
        assert_eq!(revealed, vec![0, 1]);
        assert!(!set.is_active(2));
    }

    #[test]
    fn revealed_elements_stay_active_after_scrolling_away() {
        let mut set = RevealSet::new(2);
        set.update(800.0, |i| [100.0, 3000.0][i]);
        assert!(set.is_active(0));

        // Scrolled far back so every element sits below the viewport.
        let revealed = set.update(800.0, |_| 5000.0);
        assert!(revealed.is_empty());
        assert!(set.is_active(0));
        assert!(!set.is_active(1));

        let revealed = set.update(800.0, |i| [-4000.0, 200.0][i]);
        assert_eq!(revealed, vec![1]);
        assert!(set.is_active(0) && set.is_active(1));
    }

    #[test]
    fn active_elements_are_not_measured_again() {
        let mut set = RevealSet::from_flags(vec![true, false]);
        let mut asked = Vec::new();
        set.update(800.0, |i| {
            asked.push(i);
            0.0
        });
        assert_eq!(asked, vec![1]);
    }
}
