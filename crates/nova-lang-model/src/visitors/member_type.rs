use super::{unsupported, RelationCx, Visitors};
use crate::kind::{Modifier, TypeKind};
use crate::model::{ElementId, TypeId};
use crate::Result;

impl Visitors {
    /// The type of `member` as seen from `containing`.
    ///
    /// The declaring type's type variables are replaced by the arguments `containing` supplies
    /// for it (found through its supertypes and enclosing types). Members seen through a raw
    /// type are erased; static members keep their declared type.
    pub fn member_type(&self, containing: TypeId, member: ElementId) -> Result<TypeId> {
        self.cx().member_type(containing, member)
    }
}

impl RelationCx<'_> {
    pub(super) fn member_type(&self, ty: TypeId, member: ElementId) -> Result<TypeId> {
        let model = self.model();
        let member_type = model.element_type(member)?.unwrap_or_else(|| self.none());
        if model.has_modifier(member, Modifier::Static)? {
            return Ok(member_type);
        }
        let ty = self.resolve(ty)?;
        match self.kind(ty)? {
            TypeKind::Wildcard => self.member_type(self.wild_upper_bound(ty)?, member),
            TypeKind::TypeVar => self.member_type(self.upper_bound(ty)?, member),
            TypeKind::Declared | TypeKind::Intersection => {
                self.member_type_in(ty, member, member_type)
            }
            TypeKind::Error => Ok(ty),
            TypeKind::Array => Ok(member_type),
            kind => Err(unsupported("member_type", kind)),
        }
    }

    fn member_type_in(&self, ty: TypeId, member: ElementId, member_type: TypeId) -> Result<TypeId> {
        let model = self.model();
        let Some(owner) = model.enclosing_element(member)? else {
            return Ok(member_type);
        };
        let owner = model.resolve_element(owner)?;
        if !model.element_kind(owner)?.is_type_element() {
            return Ok(member_type);
        }
        let owner_type = self.declared_type_of(owner)?;
        let owner_params = self.all_type_arguments(owner_type)?;
        if owner_params.is_empty() {
            return Ok(member_type);
        }
        let Some(base) = self.as_outer_super(ty, owner)? else {
            return Ok(member_type);
        };
        if self.kind(base)? != TypeKind::Declared {
            return Ok(member_type);
        }
        // Arguments that are wildcards are captured so they never land in a member's signature.
        let base = self.capture(base)?;
        let base_params = self.all_type_arguments(base)?;
        if base_params.is_empty() {
            return self.erase(member_type);
        }
        self.subst(member_type, &owner_params, &base_params)
    }
}
