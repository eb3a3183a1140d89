//! Textual IR rendering.
//!
//! Every gadget becomes one line: its template with each placeholder replaced
//! by a slot name. Witness variables get `w<N>` slots and instance variables
//! `i<N>`, numbered in first-use order. Slot values are kept in two separate
//! tables so witness data never appears in the IR text itself.

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::debug;

use crate::data::{Classification, Literal, Variable};
use crate::statement::Statement;

/// Rendered IR plus the values bound to each slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub witness: IndexMap<String, Literal>,
    pub instance: IndexMap<String, Literal>,
}

impl Rendered {
    /// JSON document with the IR lines and both slot tables.
    pub fn to_json(&self) -> Value {
        let table = |slots: &IndexMap<String, Literal>| {
            slots
                .iter()
                .map(|(slot, literal)| (slot.clone(), Value::String(literal.to_string())))
                .collect::<serde_json::Map<_, _>>()
        };
        json!({
            "ir": self.text.lines().collect::<Vec<_>>(),
            "witness": table(&self.witness),
            "instance": table(&self.instance),
        })
    }
}

/// Variables sharing a slot: same classification, origin and value.
#[derive(PartialEq, Eq, Hash)]
struct SlotKey {
    classification: Classification,
    origin: Option<String>,
    literal: Literal,
}

impl SlotKey {
    fn of(variable: &Variable) -> Self {
        Self {
            classification: variable.classification(),
            origin: variable.reference().map(|r| r.to_string()),
            literal: variable.value().clone(),
        }
    }
}

#[derive(Default)]
struct Slots {
    assigned: IndexMap<SlotKey, String>,
    witness: IndexMap<String, Literal>,
    instance: IndexMap<String, Literal>,
}

impl Slots {
    fn slot(&mut self, variable: &Variable) -> String {
        let key = SlotKey::of(variable);
        if let Some(slot) = self.assigned.get(&key) {
            return slot.clone();
        }

        let (prefix, table) = match variable.classification() {
            Classification::Witness => ("w", &mut self.witness),
            Classification::Instance => ("i", &mut self.instance),
        };
        let slot = format!("{}{}", prefix, table.len());
        table.insert(slot.clone(), variable.value().clone());
        self.assigned.insert(key, slot.clone());
        slot
    }
}

pub fn render(statement: &Statement) -> Rendered {
    let mut slots = Slots::default();
    let mut lines = Vec::with_capacity(statement.gadgets().len());

    for gadget in statement.gadgets() {
        let format = gadget.to_target_format();
        let mut line = format.template;
        for (name, variable) in &format.bindings {
            let slot = slots.slot(variable);
            line = line.replace(&format!("%({})", name), &slot);
        }
        lines.push(line);
    }

    debug!(
        lines = lines.len(),
        witness = slots.witness.len(),
        instance = slots.instance.len(),
        "rendered"
    );

    Rendered {
        text: lines.join("\n"),
        witness: slots.witness,
        instance: slots.instance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataType, Reference};
    use crate::gadgets::test_support::{int, pos, witness};
    use crate::gadgets::{BoundsCheckGadget, EqualityGadget, Gadget};

    fn statement() -> Statement {
        Statement::new(
            IndexMap::new(),
            vec![
                BoundsCheckGadget::new(witness("dateOfBirth"), int(0), int(20000101)).into_any(),
                EqualityGadget::new(witness("dateOfBirth"), witness("dateOfExpiry")).into_any(),
            ],
        )
    }

    #[test]
    fn test_slots_in_first_use_order() {
        let rendered = render(&statement());
        assert_eq!(rendered.text, "BOUND w0 i0 i1\nEQUALS w0 w1");
        assert_eq!(rendered.witness.len(), 2);
        assert_eq!(rendered.instance.len(), 2);
        assert_eq!(rendered.instance["i1"], Literal::Integer(20000101.into()));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(render(&statement()), render(&statement()));
    }

    #[test]
    fn test_witness_values_stay_out_of_text() {
        let secret = Variable::witness(
            Literal::Integer(424242.into()),
            pos(0),
            Reference::new(DataType::Integer, "pass", "dateOfBirth".into()),
        );
        let statement = Statement::new(
            IndexMap::new(),
            vec![BoundsCheckGadget::new(secret, int(0), int(10)).into_any()],
        );
        let rendered = render(&statement);
        assert!(!rendered.text.contains("424242"));
        assert_eq!(rendered.witness["w0"], Literal::Integer(424242.into()));
    }

    #[test]
    fn test_json_document() {
        let document = render(&statement()).to_json();
        assert_eq!(document["ir"][1], "EQUALS w0 w1");
        assert_eq!(document["instance"]["i0"], "0");
    }
}
