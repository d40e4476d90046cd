//! Executes a computed schedule on a real worker pool, to confirm that
//! instructions sharing a cycle really are independent.
//!
//! strictly a demonstration layer: the schedule is final before
//! anything here runs, so a worker failure cannot corrupt it. errors
//! are reported per instruction and never abort sibling work.

use std::{collections::HashMap, fmt};

use anyhow::Result;
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    instr::{Instr, Operand},
    sched::Schedule,
};

/// values by identifier. seeded by the caller for the initial ready
/// identifiers; destinations are merged in after each cycle joins.
pub type Env = HashMap<String, i64>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("unknown op `{0}`")]
    UnknownOp(String),
    #[error("operand `{0}` has no value")]
    Unresolved(String),
    #[error("`{op}` expects {expects} operand(s), found {found}")]
    Arity {
        op: String,
        expects: usize,
        found: usize,
    },
}

/// fixed-size pool; one worker evaluates one instruction.
pub struct ExecPool {
    pool: rayon::ThreadPool,
}

impl ExecPool {
    pub fn new(workers: usize) -> Result<Self> {
        Ok(Self {
            pool: rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()?,
        })
    }

    /// runs bundles in order with a join between them. instructions of
    /// a bundle evaluate in parallel against a snapshot of `env`, so an
    /// intra-bundle consumer of an intra-bundle destination fails with
    /// [`ExecError::Unresolved`] rather than racing.
    pub fn run(&self, schedule: &Schedule, env: &mut Env) -> Vec<CycleReport> {
        let mut reports = Vec::with_capacity(schedule.num_cycles());
        for bundle in schedule {
            let results: Vec<(String, Result<i64, ExecError>)> = {
                let snapshot = &*env;
                self.pool.install(|| {
                    bundle
                        .as_slice()
                        .par_iter()
                        .map(|instr| (instr.dest.clone(), eval(instr, snapshot)))
                        .collect()
                })
            };
            for (dest, r) in &results {
                if let Ok(v) = r {
                    env.insert(dest.clone(), *v);
                }
            }
            reports.push(CycleReport { results });
        }
        reports
    }
}

fn eval(instr: &Instr, env: &Env) -> Result<i64, ExecError> {
    let mut vals = Vec::with_capacity(instr.operands.len());
    for oprnd in &instr.operands {
        vals.push(match oprnd {
            Operand::Lit(v) => *v,
            Operand::Ident(id) => *env
                .get(id)
                .ok_or_else(|| ExecError::Unresolved(id.clone()))?,
        });
    }
    match instr.op.as_str() {
        "add" | "sub" | "mul" => {
            if vals.len() != 2 {
                return Err(ExecError::Arity {
                    op: instr.op.clone(),
                    expects: 2,
                    found: vals.len(),
                });
            }
            Ok(match instr.op.as_str() {
                "add" => vals[0].wrapping_add(vals[1]),
                "sub" => vals[0].wrapping_sub(vals[1]),
                _ => vals[0].wrapping_mul(vals[1]),
            })
        }
        _ => Err(ExecError::UnknownOp(instr.op.clone())),
    }
}

/// outcome of one cycle, in bundle order.
pub struct CycleReport {
    results: Vec<(String, Result<i64, ExecError>)>,
}

impl CycleReport {
    pub fn results(&self) -> &[(String, Result<i64, ExecError>)] {
        &self.results
    }
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|(_, r)| r.is_ok())
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (dest, r)) in self.results.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match r {
                Ok(v) => write!(f, "{dest} = {v}")?,
                Err(e) => write!(f, "{dest}: {e}")?,
            }
        }
        Ok(())
    }
}
