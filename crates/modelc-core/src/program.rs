//! Top-level program shape (spec.md §3 "Program").

use crate::ir::meta::Decoration;
use crate::ir::stmt::Stmt;
use crate::types::BlockOrigin;

/// A program block: an ordered list of statements. `None` means the block
/// keyword was absent from the source entirely (distinct from present but
/// empty).
pub type Block<D> = Option<Vec<Stmt<D>>>;

/// A full compilation unit, generic over the same `Decoration` as the
/// trees it holds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Program<D: Decoration> {
    pub name: String,
    pub functions: Block<D>,
    pub data: Block<D>,
    pub transformed_data: Block<D>,
    pub parameters: Block<D>,
    pub transformed_parameters: Block<D>,
    pub model: Block<D>,
    pub generated_quantities: Block<D>,
}

impl<D: Decoration> Program<D> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: None,
            data: None,
            transformed_data: None,
            parameters: None,
            transformed_parameters: None,
            model: None,
            generated_quantities: None,
        }
    }

    /// The blocks paired with their origin, in the fixed walk order the
    /// analyzer uses (spec.md §4.5: "functions, data, transformed_data,
    /// parameters, transformed_parameters, model, generated_quantities").
    pub fn blocks_in_order(&self) -> impl Iterator<Item = (BlockOrigin, &Block<D>)> {
        [
            (BlockOrigin::Functions, &self.functions),
            (BlockOrigin::Data, &self.data),
            (BlockOrigin::TData, &self.transformed_data),
            (BlockOrigin::Param, &self.parameters),
            (BlockOrigin::TParam, &self.transformed_parameters),
            (BlockOrigin::Model, &self.model),
            (BlockOrigin::GQuant, &self.generated_quantities),
        ]
        .into_iter()
    }

    fn block_mut(&mut self, origin: BlockOrigin) -> &mut Block<D> {
        match origin {
            BlockOrigin::Functions => &mut self.functions,
            BlockOrigin::Data => &mut self.data,
            BlockOrigin::TData => &mut self.transformed_data,
            BlockOrigin::Param => &mut self.parameters,
            BlockOrigin::TParam => &mut self.transformed_parameters,
            BlockOrigin::Model => &mut self.model,
            BlockOrigin::GQuant => &mut self.generated_quantities,
            BlockOrigin::MathLibrary => unreachable!("MathLibrary is a meta-origin, not a program block"),
        }
    }

    /// Sets a block's statement list, creating the block if absent.
    pub fn set_block(&mut self, origin: BlockOrigin, stmts: Vec<Stmt<D>>) {
        *self.block_mut(origin) = Some(stmts);
    }
}
