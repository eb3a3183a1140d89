//! `image IS MIMC HASH OF preimage`

use linkme::distributed_slice;
use strata_ast::PredicateKind;

use super::fields::FieldMap;
use super::registry::{GadgetDescriptor, GADGETS};
use super::{distinct_instances, require_instance, require_type, require_witness, AnyGadget, Gadget, GadgetKind, TargetFormat};
use crate::data::{DataType, Variable};
use crate::error::{CompileError, CompileResult, ErrorKind};

#[distributed_slice(GADGETS)]
static MIMC_HASH: GadgetDescriptor = GadgetDescriptor::of::<MimcHashGadget>(PredicateKind::MimcHash);

#[derive(Debug, Clone)]
pub struct MimcHashGadget {
    /// Secret integer being hashed
    pub preimage: Variable,
    /// Published digest
    pub image: Variable,
}

impl Gadget for MimcHashGadget {
    const KIND: GadgetKind = GadgetKind::MimcHash;

    fn init_from(mut fields: FieldMap) -> CompileResult<Self> {
        let gadget = Self {
            preimage: fields.take_variable("preimage")?,
            image: fields.take_variable("image")?,
        };
        gadget.perform_checks()?;
        Ok(gadget)
    }

    fn perform_checks(&self) -> CompileResult<()> {
        require_witness(Self::KIND, "preimage", &self.preimage)?;
        require_type(Self::KIND, "preimage", &self.preimage, DataType::Integer)?;
        require_instance(Self::KIND, "image", &self.image)?;
        require_type(Self::KIND, "image", &self.image, DataType::Bytes)
    }

    fn is_equal_to(&self, other: &Self) -> bool {
        self.preimage == other.preimage && self.image == other.image
    }

    fn to_target_format(&self) -> TargetFormat {
        TargetFormat::new("MIMC_HASH %(image) %(preimage)")
            .bind("image", &self.image)
            .bind("preimage", &self.preimage)
    }

    fn into_any(self) -> AnyGadget {
        AnyGadget::MimcHash(self)
    }

    fn from_any(gadget: &AnyGadget) -> Option<&Self> {
        match gadget {
            AnyGadget::MimcHash(g) => Some(g),
            _ => None,
        }
    }
}

/// One preimage cannot hash to two different images.
pub fn conflicting_images(a: &MimcHashGadget, b: &MimcHashGadget) -> CompileResult<()> {
    if a.preimage == b.preimage && distinct_instances(&a.image, &b.image) {
        return Err(CompileError::unpositioned(
            ErrorKind::Contradiction,
            format!(
                "Contradiction: `{}` cannot hash to both {} and {}.",
                a.preimage, a.image, b.image
            ),
        )
        .with_variable(&a.image, "first image")
        .with_variable(&b.image, "second image"));
    }
    Ok(())
}
