//! `root IS MERKLE ROOT OF ((a, b), c)`

use linkme::distributed_slice;
use strata_ast::PredicateKind;

use super::fields::{FieldMap, VariableTree};
use super::registry::{GadgetDescriptor, GADGETS};
use super::{require_instance, require_type, AnyGadget, Gadget, GadgetKind, TargetFormat};
use crate::data::{DataType, Variable};
use crate::error::CompileResult;

#[distributed_slice(GADGETS)]
static MERKLE_TREE: GadgetDescriptor =
    GadgetDescriptor::of::<MerkleTreeGadget>(PredicateKind::MerkleTree);

#[derive(Debug, Clone)]
pub struct MerkleTreeGadget {
    pub root: Variable,
    pub tree: VariableTree,
}

impl Gadget for MerkleTreeGadget {
    const KIND: GadgetKind = GadgetKind::MerkleTree;

    fn init_from(mut fields: FieldMap) -> CompileResult<Self> {
        let gadget = Self {
            root: fields.take_variable("root")?,
            tree: fields.take_tree("tree")?,
        };
        gadget.perform_checks()?;
        Ok(gadget)
    }

    fn perform_checks(&self) -> CompileResult<()> {
        require_instance(Self::KIND, "root", &self.root)?;
        require_type(Self::KIND, "root", &self.root, DataType::Bytes)?;
        for (index, leaf) in self.tree.leaves().into_iter().enumerate() {
            require_type(Self::KIND, &format!("leaf_{}", index), leaf, DataType::Bytes)?;
        }
        Ok(())
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        self.root == other.root && self.tree == other.tree
    }

    fn to_target_format(&self) -> TargetFormat {
        let mut format = TargetFormat::new(String::new()).bind("root", &self.root);
        let mut nested = String::new();
        let mut next_leaf = 0;
        render_tree(&self.tree, &mut nested, &mut next_leaf, &mut format);
        format.template = format!("MERKLE_TREE %(root) {}", nested);
        format
    }

    fn into_any(self) -> AnyGadget {
        AnyGadget::MerkleTree(self)
    }

    fn from_any(gadget: &AnyGadget) -> Option<&Self> {
        match gadget {
            AnyGadget::MerkleTree(g) => Some(g),
            _ => None,
        }
    }
}

fn render_tree(tree: &VariableTree, out: &mut String, next_leaf: &mut usize, format: &mut TargetFormat) {
    match tree {
        VariableTree::Leaf(variable) => {
            let name = format!("leaf_{}", next_leaf);
            *next_leaf += 1;
            out.push_str(&format!("%({})", name));
            format.bindings.insert(name, variable.clone());
        }
        VariableTree::Branch(left, right) => {
            out.push('(');
            render_tree(left, out, next_leaf, format);
            out.push_str(", ");
            render_tree(right, out, next_leaf, format);
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gadgets::fields::FieldValue;
    use crate::gadgets::test_support::{bytes, int, pos, witness_bytes};

    fn fields(root: Variable, tree: VariableTree) -> FieldMap {
        FieldMap::new(pos(0))
            .with("root", FieldValue::Variable(root))
            .with("tree", FieldValue::Tree(tree))
    }

    fn tree() -> VariableTree {
        VariableTree::branch(
            VariableTree::branch(
                VariableTree::Leaf(witness_bytes("signature")),
                VariableTree::Leaf(bytes(&[2])),
            ),
            VariableTree::Leaf(bytes(&[3])),
        )
    }

    #[test]
    fn test_nested_template() {
        let gadget = MerkleTreeGadget::init_from(fields(bytes(&[0xff]), tree())).unwrap();
        let format = gadget.to_target_format();
        assert_eq!(format.template, "MERKLE_TREE %(root) ((%(leaf_0), %(leaf_1)), %(leaf_2))");
        assert_eq!(
            format.bindings.keys().collect::<Vec<_>>(),
            vec!["root", "leaf_0", "leaf_1", "leaf_2"]
        );
    }

    #[test]
    fn test_field_contract() {
        let err = MerkleTreeGadget::init_from(fields(witness_bytes("root"), tree())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::WitnessExposure);

        let bad_leaf = VariableTree::branch(VariableTree::Leaf(bytes(&[1])), VariableTree::Leaf(int(2)));
        let err = MerkleTreeGadget::init_from(fields(bytes(&[0xff]), bad_leaf)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_equality_is_structural() {
        let a = MerkleTreeGadget::init_from(fields(bytes(&[0xff]), tree())).unwrap();
        let b = MerkleTreeGadget::init_from(fields(bytes(&[0xff]), tree())).unwrap();
        assert!(a.is_equal_to(&b));

        let flipped = VariableTree::branch(
            VariableTree::Leaf(bytes(&[3])),
            VariableTree::branch(
                VariableTree::Leaf(witness_bytes("signature")),
                VariableTree::Leaf(bytes(&[2])),
            ),
        );
        let c = MerkleTreeGadget::init_from(fields(bytes(&[0xff]), flipped)).unwrap();
        assert!(!a.is_equal_to(&c));
    }
}
