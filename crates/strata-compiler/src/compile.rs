//! Compile pipeline: main statement, validation rules and premises.
//!
//! The main statement and each premise are visited in isolation against the
//! same [`DataContext`]. Premises are compiled on the rayon pool; their
//! results are collected in premise order so the reported error does not
//! depend on scheduling. Gadgets of the main statement that a premise already
//! proves are removed at the end.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use strata_ast::{SourceId, SourceMap, StatementTree};
use thiserror::Error;
use tracing::{info, instrument};

use crate::data::{Schema, SharedAccessor, ValueAccessor};
use crate::error::{CompileError, DiagnosticFormatter, Diagnostics};
use crate::optimizer::{Optimizer, OptimizerConfig};
use crate::statement::Statement;
use crate::visitor::{DataContext, StatementVisitor};

/// Everything one compile needs.
#[derive(Clone)]
pub struct CompileArgs {
    pub name: String,
    pub statement: StatementTree,
    pub premises: Vec<StatementTree>,
    pub witness: IndexMap<String, SharedAccessor>,
    pub instance: IndexMap<String, SharedAccessor>,
    pub schemas: IndexMap<String, Schema>,
    pub optimizer: OptimizerConfig,
}

impl CompileArgs {
    pub fn builder(name: impl Into<String>, statement: StatementTree) -> CompileArgsBuilder {
        CompileArgsBuilder {
            args: CompileArgs {
                name: name.into(),
                statement,
                premises: Vec::new(),
                witness: IndexMap::new(),
                instance: IndexMap::new(),
                schemas: IndexMap::new(),
                optimizer: OptimizerConfig::default(),
            },
        }
    }

    fn data_context(&self) -> DataContext {
        let mut data = DataContext::new();
        for (name, schema) in &self.schemas {
            data = data.with_schema(name.clone(), schema.clone());
        }
        for (alias, accessor) in &self.witness {
            data = data.with_witness(alias.clone(), Arc::clone(accessor));
        }
        for (alias, accessor) in &self.instance {
            data = data.with_instance(alias.clone(), Arc::clone(accessor));
        }
        data
    }
}

impl fmt::Debug for CompileArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileArgs")
            .field("name", &self.name)
            .field("premises", &self.premises.len())
            .field("witness", &self.witness.keys().collect::<Vec<_>>())
            .field("instance", &self.instance.keys().collect::<Vec<_>>())
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("optimizer", &self.optimizer)
            .finish_non_exhaustive()
    }
}

pub struct CompileArgsBuilder {
    args: CompileArgs,
}

impl CompileArgsBuilder {
    pub fn premise(mut self, premise: StatementTree) -> Self {
        self.args.premises.push(premise);
        self
    }

    pub fn witness(mut self, alias: impl Into<String>, accessor: impl ValueAccessor + 'static) -> Self {
        self.args.witness.insert(alias.into(), Arc::new(accessor));
        self
    }

    pub fn instance(mut self, alias: impl Into<String>, accessor: impl ValueAccessor + 'static) -> Self {
        self.args.instance.insert(alias.into(), Arc::new(accessor));
        self
    }

    pub fn schema(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.args.schemas.insert(name.into(), schema);
        self
    }

    pub fn optimizer(mut self, config: OptimizerConfig) -> Self {
        self.args.optimizer = config;
        self
    }

    pub fn build(self) -> CompileArgs {
        self.args
    }
}

/// A successful compile.
#[derive(Debug)]
pub struct Compilation {
    pub statement: Statement,
    /// Compiled premises, in the order they were given
    pub premises: Vec<Statement>,
    /// Warnings collected from every visited statement
    pub diagnostics: Diagnostics,
    pub sources: SourceMap,
}

impl Compilation {
    pub fn has_warnings(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn format_diagnostics(&self) -> String {
        DiagnosticFormatter::new(&self.sources).format_all(self.diagnostics.iter())
    }
}

/// A failed compile: the aborting error plus the warnings collected before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct CompileFailure {
    pub error: CompileError,
    pub diagnostics: Diagnostics,
    pub sources: SourceMap,
}

impl CompileFailure {
    pub fn format(&self) -> String {
        DiagnosticFormatter::new(&self.sources)
            .format_all(self.diagnostics.iter().chain(std::iter::once(&self.error)))
    }
}

#[instrument(skip_all, name = "compile", fields(name = %args.name, premises = args.premises.len()))]
pub fn compile(args: &CompileArgs) -> Result<Compilation, CompileFailure> {
    let mut sources = SourceMap::new();
    let main_source = register(&mut sources, &args.statement);
    let premise_sources: Vec<SourceId> = args
        .premises
        .iter()
        .map(|premise| register(&mut sources, premise))
        .collect();

    let mut data = args.data_context();
    data.register_rules(&mut sources);

    let optimizer = Optimizer::new(args.optimizer);
    let mut diagnostics = Diagnostics::new();

    let main = match StatementVisitor::new(&data, main_source).visit(&args.statement, &optimizer) {
        Ok(output) => output,
        Err(error) => {
            return Err(CompileFailure {
                error,
                diagnostics,
                sources,
            })
        }
    };
    diagnostics.extend(main.diagnostics);

    let results: Vec<_> = args
        .premises
        .par_iter()
        .zip(premise_sources.par_iter())
        .map(|(premise, &source)| StatementVisitor::new(&data, source).visit(premise, &optimizer))
        .collect();

    let mut premises = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(output) => {
                diagnostics.extend(output.diagnostics);
                premises.push(output.statement);
            }
            Err(error) => {
                return Err(CompileFailure {
                    error,
                    diagnostics,
                    sources,
                })
            }
        }
    }

    let mut statement = main.statement;
    let proven = statement.remove_gadgets(|gadget| premises.iter().any(|premise| premise.proves(gadget)));
    for gadget in &proven {
        info!(gadget = %gadget, "already proven by a premise");
    }

    info!(
        gadgets = statement.gadgets().len(),
        subjects = statement.subjects().len(),
        warnings = diagnostics.len(),
        "compiled"
    );

    Ok(Compilation {
        statement,
        premises,
        diagnostics,
        sources,
    })
}

fn register(sources: &mut SourceMap, tree: &StatementTree) -> SourceId {
    sources.add_source(tree.source.clone(), tree.statement.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::JsonAccessor;
    use crate::error::ErrorKind;
    use serde_json::json;
    use strata_ast::{BoundsCheck, Ident, Operand, Predicate, Span, SubjectDecl};

    fn span(start: u32) -> Span {
        Span::new(start, start + 4, 1)
    }

    fn bounded(source: &str, min: i64, max: i64) -> StatementTree {
        StatementTree::new(source, "WITNESS pass COMPLIANT WITH passport_ch PROOF FOR ...")
            .with_subject(SubjectDecl::witness(
                Ident::new("pass", span(8)),
                Ident::new("passport_ch", span(28)),
            ))
            .with_predicate(Predicate::BoundsCheck(BoundsCheck {
                value: Operand::identifier("pass", "dateOfBirth", span(50)),
                min: Some(Operand::integer(min, span(70))),
                max: Some(Operand::integer(max, span(80))),
                span: span(50),
            }))
    }

    #[test]
    fn test_compile_registers_all_sources() {
        let args = CompileArgs::builder("main", bounded("main", 0, 10))
            .premise(bounded("premise", 0, 10))
            .build();
        let compilation = compile(&args).unwrap();
        assert_eq!(compilation.sources.source_count(), 2);
        assert_eq!(compilation.premises.len(), 1);
    }

    #[test]
    fn test_premise_removes_proven_gadget() {
        let args = CompileArgs::builder("main", bounded("main", 0, 10))
            .premise(bounded("premise", 0, 10))
            .build();
        let compilation = compile(&args).unwrap();
        assert!(compilation.statement.gadgets().is_empty());
    }

    #[test]
    fn test_unrelated_premise_keeps_gadget() {
        let args = CompileArgs::builder("main", bounded("main", 0, 10))
            .premise(bounded("premise", 0, 20))
            .build();
        let compilation = compile(&args).unwrap();
        assert_eq!(compilation.statement.gadgets().len(), 1);
    }

    #[test]
    fn test_failing_premise_fails_compile() {
        let args = CompileArgs::builder("main", bounded("main", 0, 10))
            .premise(bounded("premise", 20, 10))
            .build();
        let failure = compile(&args).unwrap_err();
        assert_eq!(failure.error.kind, ErrorKind::Contradiction);
        assert!(failure.format().contains("premise"));
    }

    #[test]
    fn test_witness_data_is_used() {
        let args = CompileArgs::builder("main", bounded("main", 0, 10))
            .witness("pass", JsonAccessor::new(json!({ "dateOfBirth": 5 })))
            .build();
        let compilation = compile(&args).unwrap();
        let pass = compilation.statement.subject("pass").unwrap();
        assert!(pass.is_witness());
    }

    #[test]
    fn test_debug_lists_aliases_only() {
        let args = CompileArgs::builder("main", bounded("main", 0, 10))
            .witness("pass", JsonAccessor::new(json!({ "dateOfBirth": 424242 })))
            .build();

        let debug = format!("{:?}", args);
        assert!(debug.contains("\"pass\""));
        assert!(!debug.contains("424242"));
        assert!(!format!("{:?}", args.data_context()).contains("424242"));
    }
}
