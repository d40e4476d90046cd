//! Run-time issue: every cycle rescans all remaining instructions, the
//! way a superscalar core dispatches whatever is ready.

use thiserror::Error;

use crate::{
    instr::Instr,
    ready::ReadySet,
    sched::{Bundle, Schedule},
};

/// no remaining instruction is issuable, yet instructions remain.
/// state cannot change without new ready values, so this is terminal.
#[derive(Error, Debug)]
#[error(
    "deadlock after {} cycle(s): {} instruction(s) can never issue",
    .completed.num_cycles(),
    .stuck.len()
)]
pub struct DeadlockError {
    /// the cycles issued before the stall; still a valid partial
    /// schedule.
    pub completed: Schedule,
    /// the unissuable remainder, in original relative order.
    pub stuck: Vec<Instr>,
}

/// issues every ready instruction each cycle until none remain.
///
/// readiness is decided against the ready-set as it stood when the
/// cycle began: each cycle partitions a snapshot of the remaining
/// instructions into issued and deferred, then destinations of the
/// issued ones become available for the next cycle. relative order is
/// preserved on both sides of the partition.
pub fn schedule_dynamic(instrs: Vec<Instr>, ready: ReadySet) -> Result<Schedule, DeadlockError> {
    let mut ready = ready;
    let mut remaining = instrs;
    let mut schedule = Schedule::default();
    while !remaining.is_empty() {
        let (issued, rest): (Vec<Instr>, Vec<Instr>) = remaining
            .into_iter()
            .partition(|i| ready.all_satisfied(i));
        if issued.is_empty() {
            return Err(DeadlockError {
                completed: schedule,
                stuck: rest,
            });
        }
        for instr in &issued {
            if !ready.mark_produced(&instr.dest) {
                log::warn!("destination `{}` shadows an available value", instr.dest);
            }
        }
        schedule.push(Bundle::from(issued));
        remaining = rest;
    }
    Ok(schedule)
}
