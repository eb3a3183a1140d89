//! The compiled statement.

use indexmap::IndexMap;

use crate::data::Subject;
use crate::gadgets::AnyGadget;

/// Used subjects by alias and the final gadget sequence.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    subjects: IndexMap<String, Subject>,
    gadgets: Vec<AnyGadget>,
}

impl Statement {
    pub fn new(subjects: IndexMap<String, Subject>, gadgets: Vec<AnyGadget>) -> Self {
        Self { subjects, gadgets }
    }

    pub fn subjects(&self) -> &IndexMap<String, Subject> {
        &self.subjects
    }

    pub fn subject(&self, alias: &str) -> Option<&Subject> {
        self.subjects.get(alias)
    }

    pub fn gadgets(&self) -> &[AnyGadget] {
        &self.gadgets
    }

    /// Whether a gadget equal to `gadget` is part of this statement.
    pub fn proves(&self, gadget: &AnyGadget) -> bool {
        self.gadgets.iter().any(|g| g.is_equal_to(gadget))
    }

    /// Drops the gadgets `discard` returns true for, returning them.
    pub(crate) fn remove_gadgets(&mut self, mut discard: impl FnMut(&AnyGadget) -> bool) -> Vec<AnyGadget> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.gadgets)
            .into_iter()
            .partition(|g| discard(g));
        self.gadgets = kept;
        removed
    }
}
